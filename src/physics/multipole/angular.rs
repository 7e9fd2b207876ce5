//! Real spherical harmonics and their polar derivative

use crate::physics::math::{SQRT_FOUR_PI, Scalar};
use crate::physics::special::SpecialFunctions;

/// cos(mφ) and sin(mφ) for m = 0..=lmax at a single azimuth.
///
/// Allocated once per worker and refilled per point.
#[derive(Debug, Clone)]
pub struct AzimuthalTable {
    cos_m: Vec<Scalar>,
    sin_m: Vec<Scalar>,
}

impl AzimuthalTable {
    pub fn new(lmax: usize) -> Self {
        Self {
            cos_m: vec![0.0; lmax + 1],
            sin_m: vec![0.0; lmax + 1],
        }
    }

    pub fn fill(&mut self, phi: Scalar) {
        let entries = self.cos_m.iter_mut().zip(self.sin_m.iter_mut());
        for (m, (cos_m, sin_m)) in entries.enumerate() {
            let angle = m as Scalar * phi;
            *cos_m = libm::cos(angle);
            *sin_m = libm::sin(angle);
        }
    }

    #[inline]
    pub fn cos(&self, m: usize) -> Scalar {
        self.cos_m[m]
    }

    #[inline]
    pub fn sin(&self, m: usize) -> Scalar {
        self.sin_m[m]
    }
}

/// Angular factors of the expansion, backed by a [`SpecialFunctions`]
/// implementation.
#[derive(Debug)]
pub struct AngularBasis<'a, F: SpecialFunctions + ?Sized> {
    functions: &'a F,
}

impl<F: SpecialFunctions + ?Sized> Clone for AngularBasis<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: SpecialFunctions + ?Sized> Copy for AngularBasis<'_, F> {}

impl<'a, F: SpecialFunctions + ?Sized> AngularBasis<'a, F> {
    pub fn new(functions: &'a F) -> Self {
        Self { functions }
    }

    /// Y_lm(cos θ) without the azimuthal factor
    #[inline]
    pub fn harmonic(&self, l: usize, m: usize, cos_theta: Scalar) -> Scalar {
        self.functions.legendre_sph_plm(l, m, cos_theta)
    }

    /// A(l, m) = sqrt(2l+1)/sqrt(4π) · sqrt(Γ(l-m+1)/Γ(l+m+1)), the factor
    /// turning P_lm into Y_lm
    pub fn derivative_normalization(&self, l: usize, m: usize) -> Scalar {
        let degree_factor = libm::sqrt((2 * l + 1) as Scalar) / SQRT_FOUR_PI;
        let denominator = self.functions.gamma((l + m + 1) as Scalar);
        if l == m {
            degree_factor * libm::sqrt(1.0 / denominator)
        } else {
            degree_factor * libm::sqrt(self.functions.gamma((l - m + 1) as Scalar) / denominator)
        }
    }

    /// dY_lm/dθ, from (1-x²) dP_l^m/dx = -l x P_l^m + (l+m) P_{l-1}^m.
    ///
    /// Divides by `sin_theta`, so the result is not finite on the polar axis.
    pub fn harmonic_dtheta(
        &self,
        l: usize,
        m: usize,
        cos_theta: Scalar,
        sin_theta: Scalar,
    ) -> Scalar {
        if l == 0 {
            return 0.0;
        }

        let p_lm = self.functions.legendre_plm(l, m, cos_theta);
        let p_l1m = if m < l {
            self.functions.legendre_plm(l - 1, m, cos_theta)
        } else {
            0.0
        };

        let l_f = l as Scalar;
        let m_f = m as Scalar;
        self.derivative_normalization(l, m) / sin_theta
            * (l_f * cos_theta * p_lm - (l_f + m_f) * p_l1m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::special::LegendreRecurrence;

    #[test]
    fn test_azimuthal_table() {
        let mut table = AzimuthalTable::new(3);
        table.fill(std::f64::consts::FRAC_PI_2);

        assert_eq!(table.cos(0), 1.0);
        assert_eq!(table.sin(0), 0.0);
        assert!(table.cos(1).abs() < 1e-15);
        assert!((table.sin(1) - 1.0).abs() < 1e-15);
        assert!((table.cos(2) + 1.0).abs() < 1e-15);
        assert!((table.sin(3) + 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_dipole_harmonic() {
        let functions = LegendreRecurrence;
        let basis = AngularBasis::new(&functions);
        let x = 0.6;
        let expected = libm::sqrt(3.0) / SQRT_FOUR_PI * x;
        assert!((basis.harmonic(1, 0, x) - expected).abs() < 1e-14);
    }

    #[test]
    fn test_polar_derivative_matches_finite_difference() {
        let functions = LegendreRecurrence;
        let basis = AngularBasis::new(&functions);
        let h = 1e-6;

        for l in 0..=6usize {
            for m in 0..=l {
                for &theta in &[0.3, 1.1, 2.0, 2.9] {
                    let y = |angle: Scalar| basis.harmonic(l, m, libm::cos(angle));
                    let numerical = (y(theta + h) - y(theta - h)) / (2.0 * h);
                    let analytic =
                        basis.harmonic_dtheta(l, m, libm::cos(theta), libm::sin(theta));
                    assert!(
                        (numerical - analytic).abs() < 1e-7,
                        "l={l} m={m} θ={theta}: {numerical} vs {analytic}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_monopole_has_no_polar_derivative() {
        let functions = LegendreRecurrence;
        let basis = AngularBasis::new(&functions);
        assert_eq!(basis.harmonic_dtheta(0, 0, 0.2, libm::sqrt(0.96)), 0.0);
    }

    #[test]
    fn test_sectoral_normalization_uses_single_gamma() {
        let functions = LegendreRecurrence;
        let basis = AngularBasis::new(&functions);
        // A(2, 2) = sqrt(5/(4π)) / sqrt(4!)
        let expected = libm::sqrt(5.0) / SQRT_FOUR_PI / libm::sqrt(24.0);
        assert!((basis.derivative_normalization(2, 2) - expected).abs() < 1e-14);
    }
}

//! Potential, gradient and density summation over the (l, m) terms

use super::angular::{AngularBasis, AzimuthalTable};
use super::coefficients::{CoefficientSet, ExpansionConfig};
use super::radial::BoundaryCondition;
use crate::physics::math::{Scalar, SphericalCoord, Vector};
use crate::physics::special::SpecialFunctions;
use rayon::prelude::*;

/// Evaluates one expansion (config + coefficients) at arbitrary points.
///
/// The evaluator borrows everything it needs and holds no mutable state, so
/// it can be shared across threads. Per-point scratch lives in an
/// [`AzimuthalTable`] which the `*_with` methods let callers reuse.
///
/// Coefficient pairs where both `S_lm` and `T_lm` are exactly zero are
/// skipped without touching the special functions.
pub struct MultipoleEvaluator<'a, F: SpecialFunctions + ?Sized> {
    config: &'a ExpansionConfig,
    coefficients: &'a CoefficientSet,
    angular: AngularBasis<'a, F>,
}

impl<'a, F: SpecialFunctions + ?Sized> MultipoleEvaluator<'a, F> {
    pub fn new(
        config: &'a ExpansionConfig,
        coefficients: &'a CoefficientSet,
        functions: &'a F,
    ) -> Self {
        Self {
            config,
            coefficients,
            angular: AngularBasis::new(functions),
        }
    }

    #[inline]
    pub fn config(&self) -> &ExpansionConfig {
        self.config
    }

    #[inline]
    pub fn coefficients(&self) -> &CoefficientSet {
        self.coefficients
    }

    /// Scratch table sized for this expansion
    pub fn scratch(&self) -> AzimuthalTable {
        AzimuthalTable::new(self.coefficients.lmax())
    }

    pub fn potential(&self, position: Vector) -> Scalar {
        self.potential_with(position, &mut self.scratch())
    }

    /// Potential at `position`.
    ///
    /// The interior solution is defined as exactly zero at the origin.
    pub fn potential_with(&self, position: Vector, table: &mut AzimuthalTable) -> Scalar {
        let point = SphericalCoord::from_cartesian(position);
        let boundary = self.config.boundary;
        if point.r == 0.0 && boundary == BoundaryCondition::Interior {
            return 0.0;
        }

        let s = point.r / self.config.scale_radius;
        table.fill(point.phi);

        let mut value = 0.0;
        for (l, m, s_lm, t_lm) in self.coefficients.terms() {
            if s_lm == 0.0 && t_lm == 0.0 {
                continue;
            }
            value += boundary.potential(s, l)
                * self.angular.harmonic(l, m, point.cos_theta)
                * (s_lm * table.cos(m) + t_lm * table.sin(m));
        }

        value * self.config.potential_scale()
    }

    pub fn gradient(&self, position: Vector, out: &mut Vector) {
        self.gradient_with(position, &mut self.scratch(), out);
    }

    /// Add ∇Φ(`position`) to `out`.
    ///
    /// Post-condition: `out` after the call equals `out` before the call
    /// plus the gradient; existing contents are never overwritten, so
    /// several field components can accumulate into one buffer.
    ///
    /// At the origin the interior solution contributes the constant
    /// gradient of its l = 1 terms (all other degrees vanish there); the
    /// exterior solution is singular and yields non-finite components. On
    /// the polar axis (sin θ = 0) the polar and azimuthal components divide
    /// by zero and are left unguarded.
    pub fn gradient_with(&self, position: Vector, table: &mut AzimuthalTable, out: &mut Vector) {
        let point = SphericalCoord::from_cartesian(position);
        let boundary = self.config.boundary;
        if point.r == 0.0 && boundary == BoundaryCondition::Interior {
            *out += self.interior_origin_gradient();
            return;
        }

        let s = point.r / self.config.scale_radius;
        let cos_theta = point.cos_theta;
        let sin_theta = point.sin_theta();
        table.fill(point.phi);

        let (mut g_r, mut g_theta, mut g_phi) = (0.0, 0.0, 0.0);
        for (l, m, s_lm, t_lm) in self.coefficients.terms() {
            if s_lm == 0.0 && t_lm == 0.0 {
                continue;
            }

            let (cos_m, sin_m) = (table.cos(m), table.sin(m));
            let azimuthal = s_lm * cos_m + t_lm * sin_m;
            let harmonic = self.angular.harmonic(l, m, cos_theta);
            let radial = boundary.potential(s, l);

            g_r += boundary.potential_derivative(s, l) * harmonic * azimuthal;
            g_theta += self.angular.harmonic_dtheta(l, m, cos_theta, sin_theta) * radial / s
                * azimuthal;
            if m > 0 {
                g_phi += m as Scalar * harmonic * radial * (t_lm * cos_m - s_lm * sin_m)
                    / (s * sin_theta);
            }
        }

        *out += point.rotate_to_cartesian(g_r, g_theta, g_phi) * self.config.gradient_scale();
    }

    /// ∇Φ of the interior solution at the origin: only l = 1 survives, and
    /// s·Y_1m(θ)·(S cos φ + T sin φ) is linear in the scaled coordinates.
    fn interior_origin_gradient(&self) -> Vector {
        let (s_10, _) = self.coefficients.get(1, 0).unwrap_or((0.0, 0.0));
        let (s_11, t_11) = self.coefficients.get(1, 1).unwrap_or((0.0, 0.0));

        let y_10_pole = self.angular.harmonic(1, 0, 1.0);
        let y_11_equator = self.angular.harmonic(1, 1, 0.0);

        Vector::new(s_11 * y_11_equator, t_11 * y_11_equator, s_10 * y_10_pole)
            * self.config.gradient_scale()
    }

    /// Mass density at `position`.
    ///
    /// Always exactly zero: the density has not yet been derived as the
    /// Laplacian of this potential, and [`Self::density_series`] has not
    /// been verified against it. Kept at zero until that consistency check
    /// exists.
    pub fn density(&self, _position: Vector) -> Scalar {
        0.0
    }

    /// The radial-density series (M/r_s³)·Σ ρ_l(s)·Y_lm·(S cos mφ + T sin mφ).
    ///
    /// This is the candidate density formula; [`Self::density`] does not use it.
    pub fn density_series(&self, position: Vector) -> Scalar {
        let point = SphericalCoord::from_cartesian(position);
        let boundary = self.config.boundary;
        let s = point.r / self.config.scale_radius;
        let mut table = self.scratch();
        table.fill(point.phi);

        let mut value = 0.0;
        for (l, m, s_lm, t_lm) in self.coefficients.terms() {
            if s_lm == 0.0 && t_lm == 0.0 {
                continue;
            }
            value += boundary.density(s, l)
                * self.angular.harmonic(l, m, point.cos_theta)
                * (s_lm * table.cos(m) + t_lm * table.sin(m));
        }

        value * self.config.density_scale()
    }

    /// Potential at every point, evaluated in parallel.
    pub fn potential_batch(&self, positions: &[Vector]) -> Vec<Scalar> {
        positions
            .par_iter()
            .map_init(|| self.scratch(), |table, &position| self.potential_with(position, table))
            .collect()
    }

    /// Add the gradient at `positions[i]` to `out[i]`, in parallel.
    ///
    /// Each worker writes a disjoint slot, so no synchronization is needed.
    ///
    /// # Panics
    ///
    /// Panics if `positions` and `out` have different lengths.
    pub fn gradient_batch(&self, positions: &[Vector], out: &mut [Vector]) {
        assert_eq!(
            positions.len(),
            out.len(),
            "gradient output must have one slot per position"
        );
        positions
            .par_iter()
            .zip(out.par_iter_mut())
            .for_each_init(
                || self.scratch(),
                |table, (&position, slot)| self.gradient_with(position, table, slot),
            );
    }

    pub fn density_batch(&self, positions: &[Vector]) -> Vec<Scalar> {
        positions.iter().map(|&position| self.density(position)).collect()
    }
}

//! Special functions consumed by the multipole evaluator
//!
//! The evaluator never computes Legendre functions or Γ itself; it asks a
//! [`SpecialFunctions`] implementation. This keeps the numerical core
//! testable against any library that honours the contract below.

use crate::physics::math::{SQRT_FOUR_PI, Scalar};

/// Associated Legendre functions and the gamma function.
///
/// Contract, for integer `0 <= m` and `|x| <= 1`:
///
/// ```text
/// legendre_plm(l, m, x)     = P_l^m(x), Condon-Shortley phase (-1)^m included,
///                             0 when m > l
/// legendre_sph_plm(l, m, x) = sqrt((2l+1)/(4π)) sqrt((l-m)!/(l+m)!) P_l^m(x)
/// gamma(x)                  = Γ(x)
/// ```
///
/// Implementations are called once per (point, l, m) from parallel batch
/// evaluation and therefore must be `Send + Sync` and free of shared mutable
/// state.
pub trait SpecialFunctions: Send + Sync {
    fn legendre_plm(&self, l: usize, m: usize, x: Scalar) -> Scalar;

    fn legendre_sph_plm(&self, l: usize, m: usize, x: Scalar) -> Scalar;

    fn gamma(&self, x: Scalar) -> Scalar;
}

/// Reference backend using the standard upward recurrences in degree.
///
/// The spherically-normalized values are produced by the normalized
/// recurrence rather than by scaling `P_l^m`, so they stay finite for
/// degrees where `(l+m)!` overflows.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegendreRecurrence;

impl LegendreRecurrence {
    /// P_m^m(x) = (-1)^m (2m-1)!! (1-x²)^{m/2}
    fn sectoral(m: usize, x: Scalar) -> Scalar {
        let root_factor = libm::sqrt(1.0 - x) * libm::sqrt(1.0 + x);
        let mut p_mm = 1.0;
        let mut odd_factor = 1.0;
        for _ in 0..m {
            p_mm *= -odd_factor * root_factor;
            odd_factor += 2.0;
        }
        p_mm
    }

    /// Normalized sectoral term Y_m^m(x) without the azimuthal factor
    fn sph_sectoral(m: usize, x: Scalar) -> Scalar {
        if m == 0 {
            return 1.0 / SQRT_FOUR_PI;
        }

        let one_minus_x2 = (1.0 - x) * (1.0 + x);
        if one_minus_x2 <= 0.0 {
            return 0.0;
        }

        // sqrt((2m+1)/(4π)) * sqrt((2m)!) / (2^m m!) * (1-x²)^{m/2}
        let m_f = m as Scalar;
        let log_magnitude = 0.5 * libm::lgamma(2.0 * m_f + 1.0)
            - m_f * core::f64::consts::LN_2
            - libm::lgamma(m_f + 1.0)
            + 0.5 * m_f * libm::log(one_minus_x2);
        let sign = if m % 2 == 1 { -1.0 } else { 1.0 };

        sign * libm::sqrt(2.0 * m_f + 1.0) / SQRT_FOUR_PI * libm::exp(log_magnitude)
    }
}

impl SpecialFunctions for LegendreRecurrence {
    fn legendre_plm(&self, l: usize, m: usize, x: Scalar) -> Scalar {
        if m > l {
            return 0.0;
        }

        let p_mm = Self::sectoral(m, x);
        if l == m {
            return p_mm;
        }

        let mut p_prev = p_mm;
        let mut p_curr = x * (2 * m + 1) as Scalar * p_mm;
        for n in (m + 2)..=l {
            let n_f = n as Scalar;
            let m_f = m as Scalar;
            let p_next =
                ((2.0 * n_f - 1.0) * x * p_curr - (n_f + m_f - 1.0) * p_prev) / (n_f - m_f);
            p_prev = p_curr;
            p_curr = p_next;
        }
        p_curr
    }

    fn legendre_sph_plm(&self, l: usize, m: usize, x: Scalar) -> Scalar {
        if m > l {
            return 0.0;
        }

        let y_mm = Self::sph_sectoral(m, x);
        if l == m {
            return y_mm;
        }

        let m_f = m as Scalar;
        let mut y_prev = y_mm;
        let mut y_curr = x * libm::sqrt(2.0 * m_f + 3.0) * y_mm;
        for n in (m + 2)..=l {
            let n_f = n as Scalar;
            let a_n = libm::sqrt((4.0 * n_f * n_f - 1.0) / (n_f * n_f - m_f * m_f));
            let n1 = n_f - 1.0;
            let b_n = libm::sqrt((n1 * n1 - m_f * m_f) / (4.0 * n1 * n1 - 1.0));
            let y_next = a_n * (x * y_curr - b_n * y_prev);
            y_prev = y_curr;
            y_curr = y_next;
        }
        y_curr
    }

    fn gamma(&self, x: Scalar) -> Scalar {
        libm::tgamma(x)
    }
}

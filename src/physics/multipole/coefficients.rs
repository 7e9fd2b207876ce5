//! Expansion configuration and triangular (l, m) coefficient storage

use super::radial::BoundaryCondition;
use crate::physics::error::{ModelError, ensure_finite};
use crate::physics::math::Scalar;

/// Number of (l, m) pairs with 0 <= m <= l <= lmax
///
/// Overflows for `lmax` near `usize::MAX.sqrt()`; untrusted degrees go
/// through [`checked_num_coefficients`].
#[inline]
pub const fn num_coefficients(lmax: usize) -> usize {
    (lmax + 1) * (lmax + 2) / 2
}

/// [`num_coefficients`], or `None` when the count does not fit in `usize`
pub const fn checked_num_coefficients(lmax: usize) -> Option<usize> {
    let (Some(a), Some(b)) = (lmax.checked_add(1), lmax.checked_add(2)) else {
        return None;
    };
    match a.checked_mul(b) {
        Some(product) => Some(product / 2),
        None => None,
    }
}

/// Triangular count for a degree read from a model description
pub(crate) fn coefficient_count(lmax: usize) -> Result<usize, ModelError> {
    checked_num_coefficients(lmax).ok_or(ModelError::InvalidCount {
        name: "lmax",
        value: lmax as Scalar,
    })
}

/// Position of (l, m) in the triangular packing l = 0..lmax, m = 0..l
#[inline]
pub const fn packed_index(l: usize, m: usize) -> usize {
    l * (l + 1) / 2 + m
}

/// Inverse of [`packed_index`]
pub fn degree_order(index: usize) -> (usize, usize) {
    let mut l = 0;
    while packed_index(l + 1, 0) <= index {
        l += 1;
    }
    (l, index - packed_index(l, 0))
}

/// All (l, m) pairs up to `lmax` in packed order
pub fn triangular(lmax: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..=lmax).flat_map(|l| (0..=l).map(move |m| (l, m)))
}

/// Scalar parameters shared by every term of one expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionConfig {
    pub gravitational_constant: Scalar,
    pub lmax: usize,
    pub boundary: BoundaryCondition,
    pub mass: Scalar,
    pub scale_radius: Scalar,
}

impl ExpansionConfig {
    pub fn new(
        gravitational_constant: Scalar,
        lmax: usize,
        boundary: BoundaryCondition,
        mass: Scalar,
        scale_radius: Scalar,
    ) -> Result<Self, ModelError> {
        let config = Self {
            gravitational_constant,
            lmax,
            boundary,
            mass,
            scale_radius,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        ensure_finite("gravitational constant", self.gravitational_constant)?;
        ensure_finite("mass", self.mass)?;
        coefficient_count(self.lmax)?;
        if !(self.scale_radius.is_finite() && self.scale_radius > 0.0) {
            return Err(ModelError::InvalidScaleRadius(self.scale_radius));
        }
        Ok(())
    }

    #[inline]
    pub fn num_coefficients(&self) -> usize {
        num_coefficients(self.lmax)
    }

    /// G·M/r_s, the potential scale
    #[inline]
    pub fn potential_scale(&self) -> Scalar {
        self.gravitational_constant * self.mass / self.scale_radius
    }

    /// G·M/r_s², the gradient scale
    #[inline]
    pub fn gradient_scale(&self) -> Scalar {
        self.gravitational_constant * self.mass / (self.scale_radius * self.scale_radius)
    }

    /// M/r_s³, the density scale
    #[inline]
    pub fn density_scale(&self) -> Scalar {
        self.mass / (self.scale_radius * self.scale_radius * self.scale_radius)
    }
}

/// Cosine (`S_lm`) and sine (`T_lm`) weights in triangular packing.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    lmax: usize,
    s_lm: Vec<Scalar>,
    t_lm: Vec<Scalar>,
}

impl CoefficientSet {
    pub fn new(lmax: usize, s_lm: Vec<Scalar>, t_lm: Vec<Scalar>) -> Result<Self, ModelError> {
        let expected = coefficient_count(lmax)?;
        for (name, values) in [("S_lm", &s_lm), ("T_lm", &t_lm)] {
            if values.len() != expected {
                return Err(ModelError::LengthMismatch {
                    name,
                    expected,
                    found: values.len(),
                });
            }
            for &value in values.iter() {
                ensure_finite(name, value)?;
            }
        }
        Ok(Self { lmax, s_lm, t_lm })
    }

    pub fn zeros(lmax: usize) -> Self {
        let count = num_coefficients(lmax);
        Self {
            lmax,
            s_lm: vec![0.0; count],
            t_lm: vec![0.0; count],
        }
    }

    #[inline]
    pub fn lmax(&self) -> usize {
        self.lmax
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.s_lm.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.s_lm.is_empty()
    }

    #[inline]
    pub fn s_lm(&self) -> &[Scalar] {
        &self.s_lm
    }

    #[inline]
    pub fn t_lm(&self) -> &[Scalar] {
        &self.t_lm
    }

    /// (S_lm, T_lm) for the given degree and order, or `None` past lmax
    pub fn get(&self, l: usize, m: usize) -> Option<(Scalar, Scalar)> {
        if m > l || l > self.lmax {
            return None;
        }
        let index = packed_index(l, m);
        Some((self.s_lm[index], self.t_lm[index]))
    }

    pub fn set(&mut self, l: usize, m: usize, s: Scalar, t: Scalar) {
        assert!(m <= l && l <= self.lmax, "({l}, {m}) outside lmax {}", self.lmax);
        let index = packed_index(l, m);
        self.s_lm[index] = s;
        self.t_lm[index] = t;
    }

    /// Iterate `(l, m, S_lm, T_lm)` in packed order
    pub fn terms(&self) -> impl Iterator<Item = (usize, usize, Scalar, Scalar)> + '_ {
        triangular(self.lmax)
            .zip(self.s_lm.iter().zip(self.t_lm.iter()))
            .map(|((l, m), (&s, &t))| (l, m, s, t))
    }
}

/// Ascending-power polynomial in time: c₀ + c₁ t + c₂ t² + …
///
/// An empty polynomial is identically zero, which is how a fixed-zero
/// coefficient is expressed in the time-varying layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimePolynomial {
    coefficients: Vec<Scalar>,
}

impl TimePolynomial {
    pub fn new(coefficients: Vec<Scalar>) -> Self {
        Self { coefficients }
    }

    pub fn constant(value: Scalar) -> Self {
        Self::new(vec![value])
    }

    /// Number of stored coefficients (the `deg` entry in the buffer layout)
    #[inline]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    #[inline]
    pub fn coefficients(&self) -> &[Scalar] {
        &self.coefficients
    }

    pub fn evaluate(&self, t: Scalar) -> Scalar {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |accumulator, &c| accumulator * t + c)
    }
}

/// Per-(l, m) time polynomials for `S_lm(t)` and `T_lm(t)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeVaryingCoefficients {
    lmax: usize,
    s_lm: Vec<TimePolynomial>,
    t_lm: Vec<TimePolynomial>,
}

impl TimeVaryingCoefficients {
    pub fn new(
        lmax: usize,
        s_lm: Vec<TimePolynomial>,
        t_lm: Vec<TimePolynomial>,
    ) -> Result<Self, ModelError> {
        let expected = coefficient_count(lmax)?;
        for (name, polynomials) in [("S_lm(t)", &s_lm), ("T_lm(t)", &t_lm)] {
            if polynomials.len() != expected {
                return Err(ModelError::LengthMismatch {
                    name,
                    expected,
                    found: polynomials.len(),
                });
            }
            for polynomial in polynomials.iter() {
                for &value in polynomial.coefficients() {
                    ensure_finite(name, value)?;
                }
            }
        }
        Ok(Self { lmax, s_lm, t_lm })
    }

    /// Constant-in-time polynomials reproducing a static coefficient set
    pub fn from_static(coefficients: &CoefficientSet) -> Self {
        Self {
            lmax: coefficients.lmax(),
            s_lm: coefficients.s_lm().iter().map(|&s| TimePolynomial::constant(s)).collect(),
            t_lm: coefficients.t_lm().iter().map(|&t| TimePolynomial::constant(t)).collect(),
        }
    }

    #[inline]
    pub fn lmax(&self) -> usize {
        self.lmax
    }

    #[inline]
    pub fn s_lm(&self) -> &[TimePolynomial] {
        &self.s_lm
    }

    #[inline]
    pub fn t_lm(&self) -> &[TimePolynomial] {
        &self.t_lm
    }

    /// Instantaneous coefficients at time `t`
    pub fn at(&self, t: Scalar) -> CoefficientSet {
        CoefficientSet {
            lmax: self.lmax,
            s_lm: self.s_lm.iter().map(|p| p.evaluate(t)).collect(),
            t_lm: self.t_lm.iter().map(|p| p.evaluate(t)).collect(),
        }
    }
}

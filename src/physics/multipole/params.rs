//! Flat parameter buffer layouts shared with the orbit-integration framework
//!
//! Static expansion:
//!
//! ```text
//! [0] G  [1] lmax  [2] num_coeff  [3] inner (0/1)  [4] M  [5] r_s
//! [6 + 2i] S_i  [7 + 2i] T_i      for i in 0..num_coeff
//! ```
//!
//! Time-varying expansion (n = num_coeff):
//!
//! ```text
//! [0] G  [1] lmax  [2] n
//! [3 .. 3+n)      deg_a[i]
//! [3+n .. 3+2n)   deg_b[i]
//! [3+2n] M  [4+2n] r_s
//! then, for each packed i: deg_a[i] S_i(t) coefficients, deg_b[i] T_i(t) coefficients
//! ```
//!
//! Polynomial coefficients are in ascending power of t.

use super::coefficients::{
    CoefficientSet, ExpansionConfig, TimePolynomial, TimeVaryingCoefficients, coefficient_count,
};
use super::radial::BoundaryCondition;
use crate::physics::error::{ModelError, count_from_scalar};
use crate::physics::math::Scalar;

pub const STATIC_HEADER_LEN: usize = 6;

/// Fixed entries of the time-varying layout besides the two degree runs
pub const TIME_VARYING_HEADER_LEN: usize = 5;

fn require_len(params: &[Scalar], expected: usize) -> Result<(), ModelError> {
    if params.len() < expected {
        Err(ModelError::BufferTooShort {
            expected,
            found: params.len(),
        })
    } else {
        Ok(())
    }
}

/// Read lmax and num_coeff and check that they agree.
fn decode_counts(params: &[Scalar]) -> Result<(usize, usize), ModelError> {
    require_len(params, 3)?;
    let lmax = count_from_scalar("lmax", params[1])?;
    let found = count_from_scalar("num_coeff", params[2])?;
    let expected = coefficient_count(lmax)?;
    if found != expected {
        return Err(ModelError::CoefficientCount {
            lmax,
            expected,
            found,
        });
    }
    Ok((lmax, found))
}

pub fn decode_static(params: &[Scalar]) -> Result<(ExpansionConfig, CoefficientSet), ModelError> {
    let (lmax, count) = decode_counts(params)?;
    require_len(params, STATIC_HEADER_LEN + 2 * count)?;

    let config = ExpansionConfig::new(
        params[0],
        lmax,
        BoundaryCondition::from_flag(params[3])?,
        params[4],
        params[5],
    )?;

    let pairs = &params[STATIC_HEADER_LEN..STATIC_HEADER_LEN + 2 * count];
    let s_lm = pairs.iter().step_by(2).copied().collect();
    let t_lm = pairs.iter().skip(1).step_by(2).copied().collect();

    Ok((config, CoefficientSet::new(lmax, s_lm, t_lm)?))
}

pub fn encode_static(config: &ExpansionConfig, coefficients: &CoefficientSet) -> Vec<Scalar> {
    let count = coefficients.len();
    let mut params = Vec::with_capacity(STATIC_HEADER_LEN + 2 * count);
    params.extend_from_slice(&[
        config.gravitational_constant,
        config.lmax as Scalar,
        count as Scalar,
        config.boundary.flag(),
        config.mass,
        config.scale_radius,
    ]);
    for (&s, &t) in coefficients.s_lm().iter().zip(coefficients.t_lm()) {
        params.push(s);
        params.push(t);
    }
    params
}

/// Decode a time-varying buffer.
///
/// The returned config always uses the interior branch: time-varying
/// expansions are evaluated in the regular convention.
pub fn decode_time_varying(
    params: &[Scalar],
) -> Result<(ExpansionConfig, TimeVaryingCoefficients), ModelError> {
    let (lmax, count) = decode_counts(params)?;
    let header_len = TIME_VARYING_HEADER_LEN + 2 * count;
    require_len(params, header_len)?;

    let degrees = |offset: usize, name: &'static str| {
        params[offset..offset + count]
            .iter()
            .map(|&value| count_from_scalar(name, value))
            .collect::<Result<Vec<_>, _>>()
    };
    let deg_a = degrees(3, "deg_a")?;
    let deg_b = degrees(3 + count, "deg_b")?;

    let config = ExpansionConfig::new(
        params[0],
        lmax,
        BoundaryCondition::Interior,
        params[3 + 2 * count],
        params[4 + 2 * count],
    )?;

    let total: usize = deg_a.iter().chain(deg_b.iter()).sum();
    require_len(params, header_len + total)?;

    let mut cursor = header_len;
    let mut take = |len: usize| {
        let polynomial = TimePolynomial::new(params[cursor..cursor + len].to_vec());
        cursor += len;
        polynomial
    };

    let mut s_lm = Vec::with_capacity(count);
    let mut t_lm = Vec::with_capacity(count);
    for (&a, &b) in deg_a.iter().zip(&deg_b) {
        s_lm.push(take(a));
        t_lm.push(take(b));
    }

    Ok((config, TimeVaryingCoefficients::new(lmax, s_lm, t_lm)?))
}

pub fn encode_time_varying(
    config: &ExpansionConfig,
    coefficients: &TimeVaryingCoefficients,
) -> Vec<Scalar> {
    let count = coefficients.s_lm().len();
    let mut params = vec![
        config.gravitational_constant,
        config.lmax as Scalar,
        count as Scalar,
    ];
    params.extend(coefficients.s_lm().iter().map(|p| p.len() as Scalar));
    params.extend(coefficients.t_lm().iter().map(|p| p.len() as Scalar));
    params.push(config.mass);
    params.push(config.scale_radius);
    for (s, t) in coefficients.s_lm().iter().zip(coefficients.t_lm()) {
        params.extend_from_slice(s.coefficients());
        params.extend_from_slice(t.coefficients());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dipole_params() -> Vec<Scalar> {
        // G, lmax, num_coeff, inner, M, r_s, then (S, T) for (0,0), (1,0), (1,1)
        vec![
            1.5, 1.0, 3.0, 0.0, 2.0, 0.5, //
            1.0, 0.0, //
            0.25, 0.0, //
            -0.5, 0.75,
        ]
    }

    #[test]
    fn test_decode_static_layout() {
        let (config, coefficients) = decode_static(&dipole_params()).unwrap();
        assert_eq!(config.gravitational_constant, 1.5);
        assert_eq!(config.lmax, 1);
        assert_eq!(config.boundary, BoundaryCondition::Exterior);
        assert_eq!(config.mass, 2.0);
        assert_eq!(config.scale_radius, 0.5);
        assert_eq!(coefficients.s_lm(), &[1.0, 0.25, -0.5]);
        assert_eq!(coefficients.t_lm(), &[0.0, 0.0, 0.75]);
    }

    #[test]
    fn test_static_encode_inverts_decode() {
        let params = dipole_params();
        let (config, coefficients) = decode_static(&params).unwrap();
        assert_eq!(encode_static(&config, &coefficients), params);
    }

    #[test]
    fn test_decode_static_rejects_inconsistent_count() {
        let mut params = dipole_params();
        params[2] = 4.0;
        assert_eq!(
            decode_static(&params).unwrap_err(),
            ModelError::CoefficientCount {
                lmax: 1,
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn test_decode_static_rejects_short_buffer() {
        let params = dipole_params();
        assert_eq!(
            decode_static(&params[..10]).unwrap_err(),
            ModelError::BufferTooShort {
                expected: 12,
                found: 10
            }
        );
        assert!(matches!(
            decode_static(&[1.0]),
            Err(ModelError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_decode_static_rejects_bad_scalars() {
        let mut params = dipole_params();
        params[3] = 2.0;
        assert_eq!(
            decode_static(&params).unwrap_err(),
            ModelError::InvalidBoundary(2.0)
        );

        let mut params = dipole_params();
        params[5] = -1.0;
        assert_eq!(
            decode_static(&params).unwrap_err(),
            ModelError::InvalidScaleRadius(-1.0)
        );

        let mut params = dipole_params();
        params[1] = 1.5;
        assert!(matches!(
            decode_static(&params),
            Err(ModelError::InvalidCount { name: "lmax", .. })
        ));
    }

    fn time_varying_params() -> Vec<Scalar> {
        // lmax = 1: deg_a = [2, 0, 1], deg_b = [0, 1, 3]
        vec![
            1.0, 1.0, 3.0, //
            2.0, 0.0, 1.0, //
            0.0, 1.0, 3.0, //
            4.0, 2.0, //
            1.0, 0.5, // S_00(t) = 1 + 0.5 t, T_00 empty
            -2.0, // S_10 empty, T_10(t) = -2
            0.25, 1.0, 0.0, 3.0, // S_11(t) = 0.25, T_11(t) = 1 + 3 t²
        ]
    }

    #[test]
    fn test_decode_time_varying_layout() {
        let (config, coefficients) = decode_time_varying(&time_varying_params()).unwrap();
        assert_eq!(config.boundary, BoundaryCondition::Interior);
        assert_eq!(config.mass, 4.0);
        assert_eq!(config.scale_radius, 2.0);

        let at_two = coefficients.at(2.0);
        assert_eq!(at_two.s_lm(), &[2.0, 0.0, 0.25]);
        assert_eq!(at_two.t_lm(), &[0.0, -2.0, 13.0]);
    }

    #[test]
    fn test_time_varying_encode_inverts_decode() {
        let params = time_varying_params();
        let (config, coefficients) = decode_time_varying(&params).unwrap();
        assert_eq!(encode_time_varying(&config, &coefficients), params);
    }

    #[test]
    fn test_decode_time_varying_rejects_truncated_polynomials() {
        let params = time_varying_params();
        assert_eq!(
            decode_time_varying(&params[..params.len() - 1]).unwrap_err(),
            ModelError::BufferTooShort {
                expected: params.len(),
                found: params.len() - 1
            }
        );
    }

    #[test]
    fn test_decode_time_varying_rejects_fractional_degree() {
        let mut params = time_varying_params();
        params[4] = 0.5;
        assert!(matches!(
            decode_time_varying(&params),
            Err(ModelError::InvalidCount { name: "deg_a", .. })
        ));
    }

    #[test]
    fn test_degree_too_large_for_triangular_count() {
        let lmax = u32::MAX as Scalar;
        let expected = ModelError::InvalidCount {
            name: "lmax",
            value: lmax,
        };

        let static_params = [1.0, lmax, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(decode_static(&static_params).unwrap_err(), expected);

        let time_params = [1.0, lmax, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0];
        assert_eq!(decode_time_varying(&time_params).unwrap_err(), expected);
    }
}

//! Scalar and vector types plus Cartesian/spherical coordinate transforms

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for positions and gradients
pub type Vector = bevy::math::DVec3;

/// √(4π), the normalization of the monopole harmonic Y₀₀ = 1/√(4π)
pub const SQRT_FOUR_PI: Scalar = 3.544_907_701_811_031;

/// Spherical coordinates of a single evaluation point.
///
/// The polar angle is carried as its cosine, which is what the Legendre
/// functions consume. At the origin `cos_theta` is NaN (0/0); callers that
/// can meet the origin must branch on `r == 0.0` before using it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCoord {
    pub r: Scalar,
    pub cos_theta: Scalar,
    /// Azimuth in (-π, π]
    pub phi: Scalar,
}

impl SphericalCoord {
    pub fn from_cartesian(position: Vector) -> Self {
        let r = libm::sqrt(position.dot(position));
        Self {
            r,
            cos_theta: position.z / r,
            phi: libm::atan2(position.y, position.x),
        }
    }

    #[inline]
    pub fn sin_theta(&self) -> Scalar {
        libm::sqrt(1.0 - self.cos_theta * self.cos_theta)
    }

    pub fn to_cartesian(&self) -> Vector {
        let sin_theta = self.sin_theta();
        Vector::new(
            self.r * sin_theta * libm::cos(self.phi),
            self.r * sin_theta * libm::sin(self.phi),
            self.r * self.cos_theta,
        )
    }

    /// Rotate a vector given in the local (r̂, θ̂, φ̂) basis at this point
    /// into Cartesian components.
    pub fn rotate_to_cartesian(&self, g_r: Scalar, g_theta: Scalar, g_phi: Scalar) -> Vector {
        let cos_theta = self.cos_theta;
        let sin_theta = self.sin_theta();
        let cos_phi = libm::cos(self.phi);
        let sin_phi = libm::sin(self.phi);

        Vector::new(
            sin_theta * cos_phi * g_r + cos_theta * cos_phi * g_theta - sin_phi * g_phi,
            sin_theta * sin_phi * g_r + cos_theta * sin_phi * g_theta + cos_phi * g_phi,
            cos_theta * g_r - sin_theta * g_theta,
        )
    }
}

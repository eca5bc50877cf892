//! Mathematical types shared across the effect subsystem.
//!
//! Orientation follows the row-vector convention: a `Matrix3` stores its
//! right, up and forward axes directly.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - position, velocity, direction
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit X vector
    pub const X: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit Z vector
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Returns `self + dir * scale`.
    #[must_use]
    pub fn scale_add(self, dir: Self, scale: f32) -> Self {
        self + dir * scale
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Orientation matrix stored as its three basis rows.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Matrix3 {
    /// Right axis
    pub rvec: Vec3,
    /// Up axis
    pub uvec: Vec3,
    /// Forward axis
    pub fvec: Vec3,
}

impl Matrix3 {
    /// Creates a matrix from its right, up and forward rows.
    #[must_use]
    pub const fn new(rvec: Vec3, uvec: Vec3, fvec: Vec3) -> Self {
        Self { rvec, uvec, fvec }
    }

    /// Identity orientation
    pub const IDENTITY: Self = Self::new(Vec3::X, Vec3::Y, Vec3::Z);

    /// Rotation of `angle` radians about the up (heading) axis.
    #[must_use]
    pub fn from_heading(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            Vec3::new(cos, 0.0, -sin),
            Vec3::Y,
            Vec3::new(sin, 0.0, cos),
        )
    }

    /// Row-vector product `self * rhs`.
    #[must_use]
    pub fn multiply(&self, rhs: &Self) -> Self {
        let row = |r: Vec3| rhs.rvec * r.x + rhs.uvec * r.y + rhs.fvec * r.z;
        Self::new(row(self.rvec), row(self.uvec), row(self.fvec))
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

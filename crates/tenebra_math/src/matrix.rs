//! Row-major 4x4 matrices using the row-vector convention of fixed-function
//! pipelines: points are transformed as `p · M`, so translations live in the
//! last row and `A * B` applies `A` first.

use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, Index, IndexMut, Mul, MulAssign};

use crate::number_traits::{Float, NumericOps, One, Zero};
use crate::vector::Vector3;

pub type Matrix4f = Matrix4<f32>;

#[derive(Clone, Copy, PartialEq)]
pub struct Matrix4<T = f32> {
    values: [T; 16],
}

impl<T> Debug for Matrix4<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[")?;
        for i in 0..Self::ROWS {
            write!(f, "\t")?;
            for j in 0..Self::COLS {
                write!(f, "{}, ", self.values[i * Self::COLS + j])?;
            }
            writeln!(f)?;
        }
        writeln!(f, "]")
    }
}

impl<T> Matrix4<T> {
    const COLS: usize = 4;
    const ROWS: usize = 4;

    pub const fn with_values(values: [T; 16]) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[T; 16] {
        &self.values
    }
}

impl<T> Matrix4<T>
where
    T: Float,
{
    #[rustfmt::skip]
    #[must_use]
    pub fn new_translation(translation: &Vector3<T>) -> Self {
        Self {
            values: [
                T::one(), T::zero(), T::zero(), T::zero(),
                T::zero(), T::one(), T::zero(), T::zero(),
                T::zero(), T::zero(), T::one(), T::zero(),
                translation.x, translation.y, translation.z, T::one(),
            ]
        }
    }

    #[must_use]
    pub fn new_scale_uniform(scale: T) -> Self {
        Self::new_scale(&Vector3::new(scale, scale, scale))
    }

    #[rustfmt::skip]
    #[must_use]
    pub fn new_scale(scale: &Vector3<T>) -> Self {
        Self {
            values: [
                scale.x, T::zero(), T::zero(), T::zero(),
                T::zero(), scale.y, T::zero(), T::zero(),
                T::zero(), T::zero(), scale.z, T::zero(),
                T::zero(), T::zero(), T::zero(), T::one(),
            ]
        }
    }

    /// Rotation of `angle` radians around `axis`.
    ///
    /// The axis is normalized on a copy; a zero axis is used as is.
    #[must_use]
    pub fn new_rotation_axis(axis: Vector3<T>, angle: T) -> Self {
        let axis = axis.normalized();
        let (sin, cos) = (angle.sin(), angle.cos());
        let one_minus_cos = T::one() - cos;

        let xy = axis.x * axis.y;
        let xz = axis.x * axis.z;
        let yz = axis.y * axis.z;

        let mut m = Self::identity();
        m[0][0] = cos + axis.x * axis.x * one_minus_cos;
        m[1][0] = xy * one_minus_cos - axis.z * sin;
        m[2][0] = xz * one_minus_cos + axis.y * sin;

        m[0][1] = xy * one_minus_cos + axis.z * sin;
        m[1][1] = cos + axis.y * axis.y * one_minus_cos;
        m[2][1] = yz * one_minus_cos - axis.x * sin;

        m[0][2] = xz * one_minus_cos - axis.y * sin;
        m[1][2] = yz * one_minus_cos + axis.x * sin;
        m[2][2] = cos + axis.z * axis.z * one_minus_cos;
        m
    }

    #[must_use]
    pub fn new_rotation_x(angle: T) -> Self {
        Self::new_rotation_axis(Vector3::new(T::one(), T::zero(), T::zero()), angle)
    }

    #[must_use]
    pub fn new_rotation_y(angle: T) -> Self {
        Self::new_rotation_axis(Vector3::new(T::zero(), T::one(), T::zero()), angle)
    }

    #[must_use]
    pub fn new_rotation_z(angle: T) -> Self {
        Self::new_rotation_axis(Vector3::new(T::zero(), T::zero(), T::one()), angle)
    }

    /// Composes `Rz(roll) * Rx(pitch) * Ry(yaw)`.
    #[must_use]
    pub fn new_rotation_yaw_pitch_roll(yaw: T, pitch: T, roll: T) -> Self {
        Self::new_rotation_z(roll) * Self::new_rotation_x(pitch) * Self::new_rotation_y(yaw)
    }

    /// View matrix looking from `eye` towards `at`.
    ///
    /// The camera basis is `forward = eye - at`, `right = up x forward` and
    /// `true_up = forward x right`. `true_up` is not normalized again.
    #[rustfmt::skip]
    #[must_use]
    pub fn new_look_at(eye: &Vector3<T>, at: &Vector3<T>, up: &Vector3<T>) -> Self {
        let forward = (*eye - *at).normalized();
        let right = up.cross(&forward).normalized();
        let true_up = forward.cross(&right);

        Self {
            values: [
                -right.x, true_up.x, forward.x, T::zero(),
                -right.y, true_up.y, forward.y, T::zero(),
                -right.z, true_up.z, forward.z, T::zero(),
                right.dot(eye), -true_up.dot(eye), -forward.dot(eye), T::one(),
            ]
        }
    }

    /// Left-handed orthographic projection of a `width` x `height` view volume
    /// centered on the origin, mapping `near..far` to `0..1`.
    #[rustfmt::skip]
    #[must_use]
    pub fn new_orthographic_lh(width: T, height: T, near: T, far: T) -> Self {
        Self {
            values: [
                T::two() / width, T::zero(), T::zero(), T::zero(),
                T::zero(), T::two() / height, T::zero(), T::zero(),
                T::zero(), T::zero(), T::one() / (far - near), T::zero(),
                T::zero(), T::zero(), near / (near - far), T::one(),
            ]
        }
    }

    /// Transforms a point as a row vector with an implicit `w = 1`, dropping
    /// the resulting `w`.
    pub fn transform_point(&self, point: &Vector3<T>) -> Vector3<T> {
        let x = self[0][0] * point.x + self[1][0] * point.y + self[2][0] * point.z + self[3][0];
        let y = self[0][1] * point.x + self[1][1] * point.y + self[2][1] * point.z + self[3][1];
        let z = self[0][2] * point.x + self[1][2] * point.y + self[2][2] * point.z + self[3][2];
        Vector3::new(x, y, z)
    }
}

impl<T> Matrix4<T>
where
    T: Copy + NumericOps + Zero + One,
{
    /// Inverts the matrix through its adjugate and returns it along with the
    /// determinant.
    ///
    /// Singular or nearly singular matrices are not rejected: the adjugate is
    /// divided by whatever determinant comes out, which yields huge or
    /// infinite entries. Callers that care must check the determinant.
    #[rustfmt::skip]
    #[must_use]
    pub fn inverse(&self) -> (Matrix4<T>, T) {
        let a2323 = self[2][2] * self[3][3] - self[2][3] * self[3][2];
        let a1323 = self[2][1] * self[3][3] - self[2][3] * self[3][1];
        let a1223 = self[2][1] * self[3][2] - self[2][2] * self[3][1];
        let a0323 = self[2][0] * self[3][3] - self[2][3] * self[3][0];
        let a0223 = self[2][0] * self[3][2] - self[2][2] * self[3][0];
        let a0123 = self[2][0] * self[3][1] - self[2][1] * self[3][0];
        let a2313 = self[1][2] * self[3][3] - self[1][3] * self[3][2];
        let a1313 = self[1][1] * self[3][3] - self[1][3] * self[3][1];
        let a1213 = self[1][1] * self[3][2] - self[1][2] * self[3][1];
        let a2312 = self[1][2] * self[2][3] - self[1][3] * self[2][2];
        let a1312 = self[1][1] * self[2][3] - self[1][3] * self[2][1];
        let a1212 = self[1][1] * self[2][2] - self[1][2] * self[2][1];
        let a0313 = self[1][0] * self[3][3] - self[1][3] * self[3][0];
        let a0213 = self[1][0] * self[3][2] - self[1][2] * self[3][0];
        let a0312 = self[1][0] * self[2][3] - self[1][3] * self[2][0];
        let a0212 = self[1][0] * self[2][2] - self[1][2] * self[2][0];
        let a0113 = self[1][0] * self[3][1] - self[1][1] * self[3][0];
        let a0112 = self[1][0] * self[2][1] - self[1][1] * self[2][0];

        let det = self[0][0] * (self[1][1] * a2323 - self[1][2] * a1323 + self[1][3] * a1223)
            - self[0][1] * (self[1][0] * a2323 - self[1][2] * a0323 + self[1][3] * a0223)
            + self[0][2] * (self[1][0] * a1323 - self[1][1] * a0323 + self[1][3] * a0123)
            - self[0][3] * (self[1][0] * a1223 - self[1][1] * a0223 + self[1][2] * a0123);

        let inv_det = T::one() / det;

        let inverse = Matrix4 {
            values: [
                inv_det * (self[1][1] * a2323 - self[1][2] * a1323 + self[1][3] * a1223),
                inv_det * -(self[0][1] * a2323 - self[0][2] * a1323 + self[0][3] * a1223),
                inv_det * (self[0][1] * a2313 - self[0][2] * a1313 + self[0][3] * a1213),
                inv_det * -(self[0][1] * a2312 - self[0][2] * a1312 + self[0][3] * a1212),
                inv_det * -(self[1][0] * a2323 - self[1][2] * a0323 + self[1][3] * a0223),
                inv_det * (self[0][0] * a2323 - self[0][2] * a0323 + self[0][3] * a0223),
                inv_det * -(self[0][0] * a2313 - self[0][2] * a0313 + self[0][3] * a0213),
                inv_det * (self[0][0] * a2312 - self[0][2] * a0312 + self[0][3] * a0212),
                inv_det * (self[1][0] * a1323 - self[1][1] * a0323 + self[1][3] * a0123),
                inv_det * -(self[0][0] * a1323 - self[0][1] * a0323 + self[0][3] * a0123),
                inv_det * (self[0][0] * a1313 - self[0][1] * a0313 + self[0][3] * a0113),
                inv_det * -(self[0][0] * a1312 - self[0][1] * a0312 + self[0][3] * a0112),
                inv_det * -(self[1][0] * a1223 - self[1][1] * a0223 + self[1][2] * a0123),
                inv_det * (self[0][0] * a1223 - self[0][1] * a0223 + self[0][2] * a0123),
                inv_det * -(self[0][0] * a1213 - self[0][1] * a0213 + self[0][2] * a0113),
                inv_det * (self[0][0] * a1212 - self[0][1] * a0212 + self[0][2] * a0112),
            ]
        };

        (inverse, det)
    }
}

impl<T> Mul<Self> for Matrix4<T>
where
    T: Copy + Zero + Add<Output = T> + Mul<Output = T>,
{
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut values = [T::zero(); 16];
        for (index, value) in values.iter_mut().enumerate() {
            let (row, col) = (index / Self::COLS, index % Self::COLS);
            *value = (0..Self::COLS).fold(T::zero(), |sum, k| {
                sum + self[row][k] * rhs[k][col]
            });
        }

        Self { values }
    }
}

impl<T> MulAssign<Self> for Matrix4<T>
where
    T: Copy + Zero + Add<Output = T> + Mul<Output = T>,
{
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<T> Index<usize> for Matrix4<T> {
    type Output = [T];

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index * Self::ROWS..index * Self::ROWS + Self::COLS]
    }
}

impl<T> IndexMut<usize> for Matrix4<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.values[index * Self::ROWS..index * Self::ROWS + Self::COLS]
    }
}

pub trait Identity {
    fn identity() -> Self;
}

#[rustfmt::skip]
impl<T> Identity for Matrix4<T>
    where T: One + Zero {
    fn identity() -> Self {
        Self {
            values: [
                T::one(), T::zero(), T::zero(), T::zero(),
                T::zero(), T::one(), T::zero(), T::zero(),
                T::zero(), T::zero(), T::one(), T::zero(),
                T::zero(), T::zero(), T::zero(), T::one()
            ]
        }
    }
}

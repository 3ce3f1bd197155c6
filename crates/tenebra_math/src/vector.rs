use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::number_traits::{Float, Zero};

pub type Vector2f = Vector2<f32>;
pub type Vector2i = Vector2<i32>;
pub type Vector3f = Vector3<f32>;

/// `Op` between two vectors of the same type, and its assigning form.
macro_rules! componentwise_op {
    ($name:ident { $($dim:ident),* }, $Op:ident :: $op:ident, $OpAssign:ident :: $op_assign:ident) => {
        impl<T> $Op for $name<T>
        where
            T: $Op<Output = T>,
        {
            type Output = Self;

            fn $op(self, rhs: Self) -> Self {
                Self { $($dim: self.$dim.$op(rhs.$dim)),* }
            }
        }

        impl<T> $OpAssign for $name<T>
        where
            T: $OpAssign,
        {
            fn $op_assign(&mut self, rhs: Self) {
                $(self.$dim.$op_assign(rhs.$dim);)*
            }
        }
    };
}

/// `Op` between a vector and a scalar, and its assigning form.
macro_rules! scalar_op {
    ($name:ident { $($dim:ident),* }, $Op:ident :: $op:ident, $OpAssign:ident :: $op_assign:ident) => {
        impl<T> $Op<T> for $name<T>
        where
            T: Copy + $Op<Output = T>,
        {
            type Output = Self;

            fn $op(self, rhs: T) -> Self {
                Self { $($dim: self.$dim.$op(rhs)),* }
            }
        }

        impl<T> $OpAssign<T> for $name<T>
        where
            T: Copy + $OpAssign,
        {
            fn $op_assign(&mut self, rhs: T) {
                $(self.$dim.$op_assign(rhs);)*
            }
        }
    };
}

macro_rules! vector_type {
    ($name:ident { $($dim:ident),* }, $size:literal) => {
        #[must_use]
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub struct $name<T = f32> {
            $(pub $dim: T,)*
        }

        impl<T> $name<T> {
            pub const fn new($($dim: T),*) -> Self {
                Self { $($dim),* }
            }
        }

        impl<T> $name<T>
        where
            T: Float,
        {
            /// Euclidean length of the vector.
            pub fn norm(&self) -> T {
                let mut squared = T::zero();
                $(squared += self.$dim * self.$dim;)*
                squared.sqrt()
            }

            /// Scales the vector to unit length.
            ///
            /// A zero-length vector is divided by one instead, so it is left
            /// untouched rather than turned into NaNs.
            pub fn normalize(&mut self) {
                let norm = self.norm();
                let divisor = if norm == T::zero() { T::one() } else { norm };
                $(self.$dim /= divisor;)*
            }

            pub fn normalized(&self) -> Self {
                let mut normalized = *self;
                normalized.normalize();
                normalized
            }
        }

        impl<T> Default for $name<T>
        where
            T: Zero,
        {
            fn default() -> Self {
                Self { $($dim: T::zero()),* }
            }
        }

        componentwise_op!($name { $($dim),* }, Add::add, AddAssign::add_assign);
        componentwise_op!($name { $($dim),* }, Sub::sub, SubAssign::sub_assign);
        scalar_op!($name { $($dim),* }, Mul::mul, MulAssign::mul_assign);
        scalar_op!($name { $($dim),* }, Div::div, DivAssign::div_assign);

        impl<T> Neg for $name<T>
        where
            T: Neg<Output = T>,
        {
            type Output = Self;

            fn neg(self) -> Self {
                Self { $($dim: -self.$dim),* }
            }
        }

        impl<T> Display for $name<T>
        where
            T: Display,
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                let components = [$(self.$dim.to_string()),*];
                write!(f, "({})", components.join(", "))
            }
        }

        impl<T> From<[T; $size]> for $name<T> {
            fn from(components: [T; $size]) -> Self {
                let [$($dim),*] = components;
                Self { $($dim),* }
            }
        }

        impl<T> From<$name<T>> for [T; $size] {
            fn from(vector: $name<T>) -> Self {
                [$(vector.$dim),*]
            }
        }
    };
}

vector_type!(Vector2 { x, y }, 2);
vector_type!(Vector3 { x, y, z }, 3);

impl<T> Vector3<T>
where
    T: Float,
{
    pub fn cross(&self, other: &Vector3<T>) -> Vector3<T> {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn dot(&self, other: &Vector3<T>) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn vector3_new() {
        let v = Vector3::new(1, 2, 3);

        assert_eq!(v.x, 1);
        assert_eq!(v.y, 2);
        assert_eq!(v.z, 3);
    }

    #[test]
    fn add() {
        let a = Vector3::new(1, 2, 3);
        let b = Vector3::new(4, 5, 6);

        let result = a + b;

        assert_eq!(result, Vector3::new(5, 7, 9));
    }

    #[test]
    fn sub_assign() {
        let mut a = Vector3::new(1, 2, 3);
        let b = Vector3::new(4, 3, 2);

        a -= b;

        assert_eq!(a, Vector3::new(-3, -1, 1));
    }

    #[test]
    fn scale() {
        let vec = Vector3::new(1.5, -2.0, 3.0);

        let scaled = vec * 2.0;

        assert_float_absolute_eq!(scaled.x, 3.0, 0.0001);
        assert_float_absolute_eq!(scaled.y, -4.0, 0.0001);
        assert_float_absolute_eq!(scaled.z, 6.0, 0.0001);
    }

    #[test]
    fn neg() {
        let a = Vector3::new(1, 2, 3);

        assert_eq!(-a, Vector3::new(-1, -2, -3));
    }

    #[test]
    fn display() {
        let result = format!("{}", Vector3::new(1, 2, 3));
        assert_eq!("(1, 2, 3)", &result);
    }

    #[test]
    fn norm() {
        let vector = Vector3::new(1.0, 2.0, 3.0);
        assert_float_absolute_eq!(vector.norm(), 3.74, 0.01);
    }

    #[test]
    fn normalize() {
        let mut vector = Vector3::new(1.0, 2.0, 3.0);

        vector.normalize();

        assert_float_absolute_eq!(vector.x, 0.26, 0.01);
        assert_float_absolute_eq!(vector.y, 0.53, 0.01);
        assert_float_absolute_eq!(vector.z, 0.80, 0.01);
    }

    #[test]
    fn normalized_has_unit_length() {
        let vectors = [
            Vector3f::new(1.0, 2.0, 3.0),
            Vector3f::new(-0.001, 0.0, 0.0),
            Vector3f::new(1000.0, -250.0, 12.5),
            Vector3f::new(0.3, 0.3, -0.3),
        ];

        for vector in vectors {
            assert_float_absolute_eq!(vector.normalized().norm(), 1.0, 0.0001);
        }
    }

    #[test]
    fn normalize_zero_vector_is_unchanged() {
        let zero = Vector3f::new(0.0, 0.0, 0.0);

        let normalized = zero.normalized();

        assert_eq!(normalized, zero);
        assert!(!normalized.x.is_nan());
    }

    #[test]
    fn cross_vec3() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);

        let result = a.cross(&b);

        assert_float_absolute_eq!(result.x, -3.0, 0.01);
        assert_float_absolute_eq!(result.y, 6.0, 0.01);
        assert_float_absolute_eq!(result.z, -3.0, 0.01);
    }

    #[test]
    fn dot_vec3() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, -5.0, 6.0);

        assert_float_absolute_eq!(a.dot(&b), 12.0, 0.0001);
    }

    #[test]
    fn default() {
        let vector = Vector2::<f32>::default();

        assert_float_absolute_eq!(vector.x, 0.0, 0.0);
        assert_float_absolute_eq!(vector.y, 0.0, 0.0);
    }

    #[test]
    fn array_conversions() {
        let v = Vector3::from([0, 1, 2]);
        assert_eq!(v, Vector3::new(0, 1, 2));

        let components: [i32; 2] = Vector2::new(7, -7).into();
        assert_eq!(components, [7, -7]);
    }

    #[test]
    fn scalar_assign_ops() {
        let mut v = Vector2::new(6, 9);

        v *= 2;
        v /= 3;

        assert_eq!(v, Vector2::new(4, 6));
    }
}

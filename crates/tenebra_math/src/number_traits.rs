use std::fmt::Display;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

pub trait Zero {
    fn zero() -> Self;
}

pub trait One {
    fn one() -> Self;
}

pub trait Two {
    fn two() -> Self;
}

pub trait NumericOps:
    Sized
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Mul<Output = Self>
    + MulAssign
    + Div<Output = Self>
    + DivAssign
    + Neg<Output = Self>
    + PartialOrd
{
}

/// Scalar type the geometric constructors are written against.
pub trait Float: Display + Copy + Zero + One + Two + NumericOps {
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn sqrt(self) -> Self;
}

macro_rules! constants {
    ($($ty:ty => $zero:literal, $one:literal, $two:literal;)*) => {
        $(
            impl Zero for $ty {
                fn zero() -> Self {
                    $zero
                }
            }

            impl One for $ty {
                fn one() -> Self {
                    $one
                }
            }

            impl Two for $ty {
                fn two() -> Self {
                    $two
                }
            }

            impl NumericOps for $ty {}
        )*
    };
}

constants! {
    i32 => 0, 1, 2;
    f32 => 0.0, 1.0, 2.0;
    f64 => 0.0, 1.0, 2.0;
}

macro_rules! float {
    ($($ty:ty),*) => {
        $(
            impl Float for $ty {
                fn sin(self) -> Self {
                    <$ty>::sin(self)
                }

                fn cos(self) -> Self {
                    <$ty>::cos(self)
                }

                fn sqrt(self) -> Self {
                    <$ty>::sqrt(self)
                }
            }
        )*
    };
}

float!(f32, f64);

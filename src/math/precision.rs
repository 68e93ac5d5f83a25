use num::FromPrimitive;

/// Arbitrary precision fallback type for sign computations that are
/// unreliable in f64.
pub type PrecisionFloat = num::BigRational;

pub const DETERMINANT_3X3_EPSILON: f64 = 1.0e-9;
pub const DETERMINANT_4X4_EPSILON: f64 = 1.0e-10;
pub const DETERMINANT_5X5_EPSILON: f64 = 1.0e-11;

pub fn lift(x: f64) -> PrecisionFloat {
    PrecisionFloat::from_f64(x).unwrap()
}

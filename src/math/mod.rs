pub mod precision;

use std::cmp::Ordering;

use num::Signed;
use num::Zero;

use self::precision::lift;
use self::precision::PrecisionFloat;
use self::precision::DETERMINANT_3X3_EPSILON;
use self::precision::DETERMINANT_4X4_EPSILON;
use self::precision::DETERMINANT_5X5_EPSILON;

pub trait Num: Clone + Zero + Signed + PartialOrd {}

impl<T: Clone + Zero + Signed + PartialOrd> Num for T {}

// MxN matrix: This type is just here for clarity, because the
// order of indices is as it would be in math, i.e. Matrix<M, N>
// has M rows and N columns.
pub type Matrix<const M: usize, const N: usize, F> = [[F; N]; M];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
    Zero,
}

impl Sign {
    pub fn of<T: Zero + PartialOrd>(val: T) -> Self {
        match val.partial_cmp(&T::zero()).unwrap() {
            Ordering::Less => Sign::Negative,
            Ordering::Equal => Sign::Zero,
            Ordering::Greater => Sign::Positive,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Sign::Positive)
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Sign::Negative)
    }
}

fn lift_matrix<const D: usize>(m: Matrix<D, D, f64>) -> Matrix<D, D, PrecisionFloat> {
    m.map(|row| row.map(lift))
}

/// The f64 result is only trusted if it is not small compared to the
/// matrix entries. Otherwise the sign is recomputed with arbitrary
/// precision rationals.
fn result_is_reliable<const D: usize>(val: f64, m: &Matrix<D, D, f64>, epsilon: f64) -> bool {
    if val == 0.0 {
        return false;
    }
    for row in m.iter() {
        for entry in row.iter() {
            if *entry != 0.0 && (val / entry).abs() < epsilon {
                return false;
            }
        }
    }
    true
}

fn determine_sign_with_fallback<const D: usize>(
    m: Matrix<D, D, f64>,
    f: fn(Matrix<D, D, f64>) -> f64,
    f_arbitrary_precision: fn(Matrix<D, D, PrecisionFloat>) -> PrecisionFloat,
    epsilon: f64,
) -> Sign {
    let val = f(m);
    if result_is_reliable(val, &m, epsilon) {
        Sign::of(val)
    } else {
        Sign::of(f_arbitrary_precision(lift_matrix(m)))
    }
}

pub fn determinant3x3_sign(a: Matrix<3, 3, f64>) -> Sign {
    determine_sign_with_fallback(
        a,
        determinant3x3::<f64>,
        determinant3x3::<PrecisionFloat>,
        DETERMINANT_3X3_EPSILON,
    )
}

pub fn determinant4x4_sign(a: Matrix<4, 4, f64>) -> Sign {
    determine_sign_with_fallback(
        a,
        determinant4x4::<f64>,
        determinant4x4::<PrecisionFloat>,
        DETERMINANT_4X4_EPSILON,
    )
}

pub fn determinant5x5_sign(a: Matrix<5, 5, f64>) -> Sign {
    determine_sign_with_fallback(
        a,
        determinant5x5::<f64>,
        determinant5x5::<PrecisionFloat>,
        DETERMINANT_5X5_EPSILON,
    )
}

#[rustfmt::skip]
pub fn determinant3x3<F: Num>(
    a: Matrix<3, 3, F>,
) -> F {
    let [[a00, a01, a02], [a10, a11, a12], [a20, a21, a22]] = a;
      a00.clone() * a11.clone() * a22.clone()
    + a01.clone() * a12.clone() * a20.clone()
    + a02.clone() * a10.clone() * a21.clone()
    - a02 * a11 * a20
    - a01 * a10 * a22
    - a00 * a12 * a21
}

#[rustfmt::skip]
pub fn determinant4x4<F: Num>(
    a: Matrix<4, 4, F>,
) -> F {
      a[0][0].clone() * determinant3x3([[a[1][1].clone(), a[1][2].clone(), a[1][3].clone()], [a[2][1].clone(), a[2][2].clone(), a[2][3].clone()], [a[3][1].clone(), a[3][2].clone(), a[3][3].clone()]])
    - a[1][0].clone() * determinant3x3([[a[0][1].clone(), a[0][2].clone(), a[0][3].clone()], [a[2][1].clone(), a[2][2].clone(), a[2][3].clone()], [a[3][1].clone(), a[3][2].clone(), a[3][3].clone()]])
    + a[2][0].clone() * determinant3x3([[a[0][1].clone(), a[0][2].clone(), a[0][3].clone()], [a[1][1].clone(), a[1][2].clone(), a[1][3].clone()], [a[3][1].clone(), a[3][2].clone(), a[3][3].clone()]])
    - a[3][0].clone() * determinant3x3([[a[0][1].clone(), a[0][2].clone(), a[0][3].clone()], [a[1][1].clone(), a[1][2].clone(), a[1][3].clone()], [a[2][1].clone(), a[2][2].clone(), a[2][3].clone()]])
}

#[rustfmt::skip]
pub fn determinant5x5<F: Num>(
    a: Matrix<5, 5, F>,
) -> F {
      a[0][0].clone() * determinant4x4([[a[1][1].clone(), a[1][2].clone(), a[1][3].clone(), a[1][4].clone()], [a[2][1].clone(), a[2][2].clone(), a[2][3].clone(), a[2][4].clone()], [a[3][1].clone(), a[3][2].clone(), a[3][3].clone(), a[3][4].clone()], [a[4][1].clone(), a[4][2].clone(), a[4][3].clone(), a[4][4].clone()]])
    - a[1][0].clone() * determinant4x4([[a[0][1].clone(), a[0][2].clone(), a[0][3].clone(), a[0][4].clone()], [a[2][1].clone(), a[2][2].clone(), a[2][3].clone(), a[2][4].clone()], [a[3][1].clone(), a[3][2].clone(), a[3][3].clone(), a[3][4].clone()], [a[4][1].clone(), a[4][2].clone(), a[4][3].clone(), a[4][4].clone()]])
    + a[2][0].clone() * determinant4x4([[a[0][1].clone(), a[0][2].clone(), a[0][3].clone(), a[0][4].clone()], [a[1][1].clone(), a[1][2].clone(), a[1][3].clone(), a[1][4].clone()], [a[3][1].clone(), a[3][2].clone(), a[3][3].clone(), a[3][4].clone()], [a[4][1].clone(), a[4][2].clone(), a[4][3].clone(), a[4][4].clone()]])
    - a[3][0].clone() * determinant4x4([[a[0][1].clone(), a[0][2].clone(), a[0][3].clone(), a[0][4].clone()], [a[1][1].clone(), a[1][2].clone(), a[1][3].clone(), a[1][4].clone()], [a[2][1].clone(), a[2][2].clone(), a[2][3].clone(), a[2][4].clone()], [a[4][1].clone(), a[4][2].clone(), a[4][3].clone(), a[4][4].clone()]])
    + a[4][0].clone() * determinant4x4([[a[0][1].clone(), a[0][2].clone(), a[0][3].clone(), a[0][4].clone()], [a[1][1].clone(), a[1][2].clone(), a[1][3].clone(), a[1][4].clone()], [a[2][1].clone(), a[2][2].clone(), a[2][3].clone(), a[2][4].clone()], [a[3][1].clone(), a[3][2].clone(), a[3][3].clone(), a[3][4].clone()]])
}

#[cfg(test)]
mod tests {
    use super::determinant3x3_sign;
    use super::lift_matrix;
    use super::Matrix;
    use super::Sign;

    fn assert_float_is_close(x: f64, y: f64) {
        assert!((x - y).abs() < 1e-10, "{} != {}", x, y)
    }

    #[test]
    #[rustfmt::skip]
    fn determinant3x3() {
        assert_float_is_close(
            super::determinant3x3(
                [
                    [1.0, 2.0, 4.0],
                    [5.0, 6.0, 7.0],
                    [8.0, 9.0, 10.0]
                ]
            ),
            -3.0,
        );
        assert_float_is_close(
            super::determinant3x3(
                [
                    [10.0, 9.0, 8.0],
                    [7.0, 6.0, 5.0],
                    [4.0, 2.0, 1.0]
                ]
            ),
            -3.0,
        );
    }

    #[test]
    #[rustfmt::skip]
    fn determinant4x4() {
        assert_float_is_close(
            super::determinant4x4(
                [
                    [1.0, 1.0, 4.0, 9.0],
                    [16.0, 25.0, 36.0, 49.0],
                    [64.0, 81.0, 100.0, 121.0],
                    [144.0, 169.0, 196.0, 225.0],
                ]
            ),
            -512.0,
        );
    }

    #[test]
    #[rustfmt::skip]
    fn determinant5x5() {
        assert_float_is_close(
            super::determinant5x5(
                [
                    [1.0, 2.0, 3.0, 4.0, 5.0],
                    [6.0, 7.0, 15.0, 16.0, 17.0],
                    [18.0, 19.0, 20.0, 21.0, 29.0],
                    [30.0, 31.0, 32.0, 33.0, 34.0],
                    [35.0, 43.0, 44.0, 45.0, 46.0],
                ]
            ),
            -9947.0,
        );
    }

    #[test]
    fn sign_of_degenerate_matrix_falls_back_to_exact_arithmetic() {
        // Rows 0 and 2 are identical, so the determinant is exactly zero,
        // but naive f64 evaluation of a slightly perturbed version is not.
        let matrix: Matrix<3, 3, f64> = [
            [7.041529113171147e-9, 7.041529113171147e-9, 7.041529113171147e-9],
            [-0.013275610231885723, -4.5767114632396e-13, 7.041529113212176e-9],
            [7.041529113171147e-9, 7.041529113171147e-9, 7.041529113171147e-9],
        ];
        assert_eq!(determinant3x3_sign(matrix), Sign::Zero);
        assert_eq!(
            determinant3x3_sign(matrix),
            Sign::of(super::determinant3x3(lift_matrix(matrix)))
        );
    }
}

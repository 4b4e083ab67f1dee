//! Lagrange coefficients for Shamir secret-sharing recombination, as used
//! in the BSW paper's Decryption algorithm (section 4.2). Kept as its own
//! module, in the style of a dedicated polynomial-arithmetic file seen
//! elsewhere in this corpus, even though this scheme only ever needs the
//! coefficient at `x = 0`.

use log::trace;

use crate::pairing::Zr;

/// `Lambda_i(0) = prod_{j in s, j != i} (-j) / (i - j)`, the scalar that
/// recovers `q(0)` from the evaluations `{q(j) : j in s}` of a degree
/// `|s|-1` polynomial (`lagrange_coef` in `libbswabe`).
///
/// `s` is the set of 1-based child indices chosen during witness
/// selection; every element is pairwise distinct, so every inversion
/// below succeeds.
pub(crate) fn coefficient(s: &[usize], i: usize) -> Zr {
    let mut result = Zr::one();
    for &j in s {
        if j == i {
            continue;
        }
        let num = Zr::set_si(-(j as i64));
        let den = Zr::set_si(i as i64 - j as i64);
        let den_inv = den
            .invert()
            .expect("witness indices are pairwise distinct, so i - j != 0");
        result = result * num * den_inv;
        trace!("lagrange::coefficient: folded in factor for witness index {}", j);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_share_coefficient_is_one() {
        // A degree-0 polynomial: one share exactly reproduces q(0).
        assert_eq!(coefficient(&[1], 1), Zr::one());
    }

    #[test]
    fn two_of_two_coefficients_sum_does_not_collapse_to_identity() {
        // Sanity: coefficients for distinct indices differ.
        let l1 = coefficient(&[1, 2], 1);
        let l2 = coefficient(&[1, 2], 2);
        assert_ne!(l1, l2);
    }

    #[test]
    fn reconstructs_constant_term_of_a_linear_polynomial() {
        // q(x) = 3 + 5x, sampled at x=1,2; interpolate q(0) = 3.
        let a = Zr::set_si(3) + Zr::set_si(5); // q(1)
        let b = Zr::set_si(3) + Zr::set_si(5) * Zr::set_si(2); // q(2)
        let recombined = a * coefficient(&[1, 2], 1) + b * coefficient(&[1, 2], 2);
        assert_eq!(recombined, Zr::set_si(3));
    }
}

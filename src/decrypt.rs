//! Satisfiability-driven decryption (BSW Decryption, section 4.2).
//!
//! `libbswabe` marks `satisfiable`/`min_leaves`/`satl`/`attri` directly
//! onto the policy tree, which makes two concurrent decryptions of one
//! ciphertext race on that shared mutable state. This implementation
//! keeps [`crate::encrypt::Ciphertext`] immutable: [`mark`] builds a
//! parallel, throwaway shadow tree holding exactly those fields, and
//! [`flatten`] walks the ciphertext tree and the shadow tree together.
//! Nothing here ever writes back into the ciphertext.

use log::{debug, warn};

use crate::encrypt::Ciphertext;
use crate::error::CpAbeError;
use crate::keys::{PrivateKey, PublicParams};
use crate::lagrange;
use crate::pairing::{e, Gt, Zr};
use crate::policy::PolicyNode;

/// Per-node shadow state computed by [`mark`]: the transient
/// decryption-time fields `libbswabe` stores on the policy tree itself,
/// kept here instead.
enum Mark {
    Leaf {
        satisfiable: bool,
        attri: Option<usize>,
    },
    Internal {
        satisfiable: bool,
        min_leaves: usize,
        /// 1-based indices of the chosen witness children, ascending.
        satl: Vec<usize>,
        children: Vec<Mark>,
    },
}

impl Mark {
    fn satisfiable(&self) -> bool {
        match self {
            Mark::Leaf { satisfiable, .. } => *satisfiable,
            Mark::Internal { satisfiable, .. } => *satisfiable,
        }
    }

    fn min_leaves(&self) -> usize {
        match self {
            Mark::Leaf { satisfiable, .. } => {
                if *satisfiable {
                    1
                } else {
                    0
                }
            }
            Mark::Internal { min_leaves, .. } => *min_leaves,
        }
    }
}

/// Satisfiability marking (`check_sat` in `libbswabe`) fused with
/// minimum-leaf witness selection (`pick_sat_min_leaves`): a single
/// bottom-up pass, since a parent's selection needs every child's
/// `min_leaves` already computed.
fn mark(node: &PolicyNode, key: &PrivateKey) -> Mark {
    match node {
        PolicyNode::Leaf { attr, .. } => {
            let attri = key.find(attr);
            Mark::Leaf {
                satisfiable: attri.is_some(),
                attri,
            }
        }
        PolicyNode::Internal { k, children } => {
            let children: Vec<Mark> = children.iter().map(|c| mark(c, key)).collect();

            let mut candidates: Vec<usize> = children
                .iter()
                .enumerate()
                .filter(|(_, m)| m.satisfiable())
                .map(|(idx, _)| idx)
                .collect();

            let satisfiable = candidates.len() >= *k as usize;
            if !satisfiable {
                return Mark::Internal {
                    satisfiable: false,
                    min_leaves: 0,
                    satl: Vec::new(),
                    children,
                };
            }

            candidates.sort_by_key(|&idx| (children[idx].min_leaves(), idx));
            candidates.truncate(*k as usize);
            candidates.sort_unstable();

            let min_leaves = candidates.iter().map(|&idx| children[idx].min_leaves()).sum();
            let satl = candidates.iter().map(|&idx| idx + 1).collect();

            Mark::Internal {
                satisfiable: true,
                min_leaves,
                satl,
                children,
            }
        }
    }
}

/// Flattened recombination (`dec_flatten` in `libbswabe`): walks only the
/// chosen witness children, scaling each by its Lagrange coefficient, and
/// multiplies every reached leaf's unblinding factor into the running
/// product.
fn flatten(node: &PolicyNode, shadow: &Mark, key: &PrivateKey, exponent: Zr) -> Gt {
    match (node, shadow) {
        (PolicyNode::Leaf { c, cp, .. }, Mark::Leaf { attri, .. }) => {
            let idx = attri.expect("flatten only reaches leaves mark() deemed satisfiable");
            let comp = key.component(idx);
            let numerator = e(c, &comp.d);
            let denominator = e(&comp.dp, cp);
            numerator.op(&denominator.inv()).exp(&exponent)
        }
        (
            PolicyNode::Internal { children, .. },
            Mark::Internal {
                satl,
                children: child_marks,
                ..
            },
        ) => {
            let mut acc = Gt::identity();
            for &i in satl {
                let idx = i - 1;
                let lambda = lagrange::coefficient(satl, i);
                let child_exponent = exponent * lambda;
                let contrib = flatten(&children[idx], &child_marks[idx], key, child_exponent);
                acc = acc.op(&contrib);
            }
            acc
        }
        _ => unreachable!("mark() shape always mirrors the policy tree shape"),
    }
}

/// Decrypts `cph` under `key` (BSW Decryption, section 4.2). `pub_params`
/// is accepted for interface symmetry with `setup`/`keygen`/`encrypt`;
/// this core's pairing operations need no runtime context beyond the
/// ciphertext and key themselves.
///
/// Fails recoverably with [`CpAbeError::PolicyNotSatisfied`] if `key`'s
/// attributes do not satisfy `cph`'s policy (recorded via
/// [`crate::error::last_error`]); any other failure here would indicate
/// a pairing-backend fault and is unreachable from safe inputs.
pub fn decrypt(
    _pub_params: &PublicParams,
    key: &PrivateKey,
    cph: &Ciphertext,
) -> Result<Gt, CpAbeError> {
    let root_mark = mark(&cph.root, key);
    if !root_mark.satisfiable() {
        let err = CpAbeError::PolicyNotSatisfied;
        warn!(
            "decrypt: key's {} attributes do not satisfy the ciphertext's policy",
            key.components.len()
        );
        crate::error::record(&err);
        return Err(err);
    }

    let r = flatten(&cph.root, &root_mark, key, Zr::one());
    let blinded = cph.c_tilde.op(&r);
    let stripped = e(&cph.c, &key.d).inv();
    debug!("decrypt: recovered blinding element via {} witness leaves", root_mark.min_leaves());
    Ok(blinded.op(&stripped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encrypt::encrypt;
    use crate::keys::{keygen, setup};

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn two_of_two_succeeds_with_full_attributes() {
        let mut rng = rand::thread_rng();
        let (pp, msk) = setup(&mut rng);
        let key = keygen(&pp, &msk, &attrs(&["A", "B"]), &mut rng).unwrap();
        let (cph, m) = encrypt(&pp, "A B 2of2", &mut rng).unwrap();
        let recovered = decrypt(&pp, &key, &cph).unwrap();
        assert_eq!(recovered, m);
    }

    #[test]
    fn two_of_two_fails_with_one_attribute() {
        let mut rng = rand::thread_rng();
        let (pp, msk) = setup(&mut rng);
        let key = keygen(&pp, &msk, &attrs(&["A"]), &mut rng).unwrap();
        let (cph, _m) = encrypt(&pp, "A B 2of2", &mut rng).unwrap();
        let err = decrypt(&pp, &key, &cph).unwrap_err();
        assert!(matches!(err, CpAbeError::PolicyNotSatisfied));
        assert_eq!(
            crate::error::last_error(),
            "cannot decrypt, attributes in key do not satisfy policy"
        );
    }

    #[test]
    fn single_leaf_policy() {
        let mut rng = rand::thread_rng();
        let (pp, msk) = setup(&mut rng);
        let key_a = keygen(&pp, &msk, &attrs(&["A"]), &mut rng).unwrap();
        let key_b = keygen(&pp, &msk, &attrs(&["B"]), &mut rng).unwrap();
        let (cph, m) = encrypt(&pp, "A", &mut rng).unwrap();
        assert_eq!(decrypt(&pp, &key_a, &cph).unwrap(), m);
        assert!(decrypt(&pp, &key_b, &cph).is_err());
    }

    #[test]
    fn nested_threshold_two_of_three_across_a_1of2_subtree() {
        let mut rng = rand::thread_rng();
        let (pp, msk) = setup(&mut rng);
        let (cph, m) = encrypt(&pp, "A B 1of2 C 2of2", &mut rng).unwrap();

        let key_bc = keygen(&pp, &msk, &attrs(&["B", "C"]), &mut rng).unwrap();
        assert_eq!(decrypt(&pp, &key_bc, &cph).unwrap(), m);

        let key_a = keygen(&pp, &msk, &attrs(&["A"]), &mut rng).unwrap();
        assert!(decrypt(&pp, &key_a, &cph).is_err());

        let key_c = keygen(&pp, &msk, &attrs(&["C"]), &mut rng).unwrap();
        assert!(decrypt(&pp, &key_c, &cph).is_err());
    }

    #[test]
    fn two_of_three_picks_fewest_leaves_but_any_satisfying_pair_decrypts() {
        let mut rng = rand::thread_rng();
        let (pp, msk) = setup(&mut rng);
        let key = keygen(&pp, &msk, &attrs(&["A", "C"]), &mut rng).unwrap();
        let (cph, m) = encrypt(&pp, "A B C 2of3", &mut rng).unwrap();
        assert_eq!(decrypt(&pp, &key, &cph).unwrap(), m);
    }
}

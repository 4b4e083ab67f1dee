//! Policy-based encryption of a blinding element (BSW Encryption, section
//! 4.2).

use log::{debug, trace, warn};
use rand_core::{CryptoRng, RngCore};

use crate::codec::{read_elem, write_elem};
use crate::error::CpAbeError;
use crate::keys::PublicParams;
use crate::pairing::{G1, G2, Gt, Zr};
use crate::policy::{self, ParsedNode, PolicyNode};

/// A CP-ABE ciphertext `(C~, C, root)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext {
    pub(crate) c_tilde: Gt,
    pub(crate) c: G1,
    pub(crate) root: PolicyNode,
}

/// Encrypts a freshly drawn blinding element `m in GT` under `policy`
/// (BSW Encryption, section 4.2). `m` is handed back to the caller for
/// use as a symmetric session key in whatever hybrid scheme wraps this
/// core.
///
/// On a policy parse failure the error is recorded for
/// [`crate::error::last_error`] and also returned directly, so callers can
/// use either the `Result` or the legacy string accessor.
pub fn encrypt<R: RngCore + CryptoRng>(
    pub_params: &PublicParams,
    policy: &str,
    rng: &mut R,
) -> Result<(Ciphertext, Gt), CpAbeError> {
    let parsed = policy::parse(policy).map_err(|err| {
        warn!("encrypt: rejected policy: {}", err);
        crate::error::record(&err);
        err
    })?;

    let m = Gt::random(rng);
    let s = Zr::random(rng);

    let c_tilde = pub_params.egg_alpha.exp(&s).op(&m);
    let c = pub_params.h.exp(&s);
    let root = fill_policy(pub_params, &parsed, s, rng);

    debug!("encrypt: sealed blinding element under parsed policy tree");

    Ok((Ciphertext { c_tilde, c, root }, m))
}

/// Random-polynomial share distribution, `fill_policy` in `libbswabe`. At
/// each node, builds a degree `k-1` polynomial with constant term
/// `share`; leaves get `(c, c')` from their own share, internal nodes
/// recurse into each child with that child's 1-based-index evaluation.
fn fill_policy<R: RngCore + CryptoRng>(
    pub_params: &PublicParams,
    node: &ParsedNode,
    share: Zr,
    rng: &mut R,
) -> PolicyNode {
    match node {
        ParsedNode::Leaf(attr) => {
            let c = pub_params.g.exp(&share);
            let cp = G2::hash_attribute(attr).exp(&share);
            PolicyNode::Leaf {
                attr: attr.clone(),
                c,
                cp,
            }
        }
        ParsedNode::Internal { k, children } => {
            let coeffs = random_poly(*k, share, rng);
            let decorated = children
                .iter()
                .enumerate()
                .map(|(idx, child)| {
                    let x = Zr::set_si((idx + 1) as i64);
                    let share_i = eval_poly(&coeffs, x);
                    fill_policy(pub_params, child, share_i, rng)
                })
                .collect();
            PolicyNode::Internal {
                k: *k,
                children: decorated,
            }
        }
    }
}

/// Degree `k-1` polynomial with constant term `share`; every other
/// coefficient is an independent uniform scalar (`rand_poly` in
/// `libbswabe`).
fn random_poly<R: RngCore + CryptoRng>(k: u32, share: Zr, rng: &mut R) -> Vec<Zr> {
    let mut coeffs = Vec::with_capacity(k as usize);
    coeffs.push(share);
    for _ in 1..k {
        coeffs.push(Zr::random(rng));
        trace!("random_poly: drew coefficient {}/{}", coeffs.len() - 1, k - 1);
    }
    coeffs
}

/// Horner evaluation of `coeffs` (lowest degree first) at `x`
/// (`eval_poly` in `libbswabe`).
fn eval_poly(coeffs: &[Zr], x: Zr) -> Zr {
    let mut acc = Zr::zero();
    for c in coeffs.iter().rev() {
        acc = acc * x + *c;
        trace!("eval_poly: folded in next coefficient via Horner's method");
    }
    acc
}

impl Ciphertext {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_elem(&mut buf, &self.c_tilde);
        write_elem(&mut buf, &self.c);
        buf.extend_from_slice(&self.root.to_bytes());
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let mut offset = 0;
        let c_tilde = read_elem(bytes, &mut offset)?;
        let c = read_elem(bytes, &mut offset)?;
        let root = PolicyNode::read(bytes, &mut offset)?;
        if offset != bytes.len() {
            return Err(CpAbeError::DeserializeError(
                "trailing bytes after ciphertext".into(),
            ));
        }
        Ok(Ciphertext { c_tilde, c, root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::setup;

    #[test]
    fn encrypt_rejects_malformed_policy() {
        let mut rng = rand::thread_rng();
        let (pp, _) = setup(&mut rng);
        let err = encrypt(&pp, "A 1of1", &mut rng).unwrap_err();
        assert!(matches!(
            err,
            CpAbeError::ParseError(crate::error::ParseErrorKind::IdentityOperator(_))
        ));
        assert!(!crate::error::last_error().is_empty());
    }

    #[test]
    fn encrypt_round_trips() {
        let mut rng = rand::thread_rng();
        let (pp, _) = setup(&mut rng);
        let (cph, _m) = encrypt(&pp, "A B 2of2", &mut rng).unwrap();
        let bytes = cph.to_bytes();
        assert_eq!(Ciphertext::from_bytes(&bytes).unwrap(), cph);
    }

    #[test]
    fn leaf_shares_carry_the_root_secret_directly() {
        // A single-leaf policy's share is exactly the root secret `s`,
        // so the leaf's (c, c') are deterministic functions of it; two
        // independent encryptions under "A" should (overwhelmingly)
        // differ since s is freshly drawn each time.
        let mut rng = rand::thread_rng();
        let (pp, _) = setup(&mut rng);
        let (cph1, _) = encrypt(&pp, "A", &mut rng).unwrap();
        let (cph2, _) = encrypt(&pp, "A", &mut rng).unwrap();
        assert_ne!(cph1, cph2);
    }

    #[test]
    fn fill_policy_preserves_tree_shape() {
        let mut rng = rand::thread_rng();
        let (pp, _) = setup(&mut rng);
        let (cph, _) = encrypt(&pp, "A B 1of2 C 2of2", &mut rng).unwrap();
        match cph.root {
            PolicyNode::Internal { k: 2, children } => {
                assert_eq!(children.len(), 2);
                match &children[0] {
                    PolicyNode::Internal { k: 1, children } => assert_eq!(children.len(), 2),
                    _ => panic!("expected nested 1of2 internal node"),
                }
                match &children[1] {
                    PolicyNode::Leaf { attr, .. } => assert_eq!(attr, "C"),
                    _ => panic!("expected leaf C"),
                }
            }
            _ => panic!("expected root internal node"),
        }
    }
}

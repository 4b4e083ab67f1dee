//! Bilinear-pairing arithmetic wrapper around the BLS12-381 curve.
//!
//! `G1`, `G2`, `Gt` and `Zr` are opaque newtypes around the matching
//! `bls12_381` primitives. Every operation on them here is infallible;
//! the only failure path into this module is deserializing a foreign byte
//! string into a curve point, which the individual `from_bytes` methods
//! surface as [`CpAbeError::DeserializeError`].
//!
//! Groups are kept disjoint at the type level: there is no single "Element"
//! type a caller could accidentally pair `G1` with `G1`, so a pairing
//! type mismatch can only occur for a value that was never constructed
//! through this module, which cannot happen from safe code in this crate.

use bls12_381::hash_to_curve::{ExpandMsgXmd, HashToCurve};
use bls12_381::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use group::ff::Field;
use group::Group;
use rand_core::{CryptoRng, RngCore};
use sha1::{Digest, Sha1};
use std::convert::TryInto;
use std::ops::{Add, Mul, Neg, Sub};

use crate::codec::Element;
use crate::error::CpAbeError;

/// Self-describing pairing-parameter string embedded in every
/// [`crate::keys::PublicParams`]. Pins readers to the curve and
/// hash-to-curve suite this build uses, the BLS12-381 + RFC 9380 analogue
/// of `libbswabe`'s embedded Type-A PBC parameter blob.
pub const PAIRING_DESC: &str = "bls12_381-XMD:SHA-256_SSWU_RO-v1";

const ATTRIBUTE_DST: &[u8] = b"CPABE-BSW-BLS12_381G2_XMD:SHA-256_SSWU_RO_ATTR_";

/// A scalar in the field `Zr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Zr(pub(crate) Scalar);

/// A group element in `G1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct G1(pub(crate) G1Projective);

/// A group element in `G2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct G2(pub(crate) G2Projective);

/// A group element in the target group `GT`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gt(pub(crate) bls12_381::Gt);

impl Zr {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Zr(Scalar::random(rng))
    }

    /// `element_set_si`: builds a scalar from a small signed integer,
    /// the only form the Lagrange coefficients in BSW section 4.3's
    /// decryption algorithm need.
    pub fn set_si(i: i64) -> Self {
        let abs = Scalar::from(i.unsigned_abs());
        if i < 0 {
            Zr(-abs)
        } else {
            Zr(abs)
        }
    }

    pub fn zero() -> Self {
        Zr(Scalar::zero())
    }

    pub fn one() -> Self {
        Zr(Scalar::one())
    }

    /// Multiplicative inverse. `None` only for the zero scalar, which a
    /// correct Lagrange-coefficient computation never encounters (spec
    /// §4.6 operates over pairwise-distinct indices).
    pub fn invert(&self) -> Option<Self> {
        let inv = self.0.invert();
        if bool::from(inv.is_some()) {
            Some(Zr(inv.unwrap()))
        } else {
            None
        }
    }
}

impl Add for Zr {
    type Output = Zr;
    fn add(self, rhs: Zr) -> Zr {
        Zr(self.0 + rhs.0)
    }
}

impl Sub for Zr {
    type Output = Zr;
    fn sub(self, rhs: Zr) -> Zr {
        Zr(self.0 - rhs.0)
    }
}

impl Mul for Zr {
    type Output = Zr;
    fn mul(self, rhs: Zr) -> Zr {
        Zr(self.0 * rhs.0)
    }
}

impl Neg for Zr {
    type Output = Zr;
    fn neg(self) -> Zr {
        Zr(-self.0)
    }
}

impl G1 {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        G1(G1Projective::random(rng))
    }

    pub fn generator() -> Self {
        G1(G1Projective::generator())
    }

    /// Group "multiplication" (spec notation); the underlying `bls12_381`
    /// type represents the group additively, so this is point addition.
    pub fn op(&self, other: &Self) -> Self {
        G1(self.0 + other.0)
    }

    /// Exponentiation by a scalar (spec notation); scalar multiplication
    /// of the additive point.
    pub fn exp(&self, scalar: &Zr) -> Self {
        G1(self.0 * scalar.0)
    }

    pub fn inv(&self) -> Self {
        G1(-self.0)
    }
}

impl G2 {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        G2(G2Projective::random(rng))
    }

    pub fn generator() -> Self {
        G2(G2Projective::generator())
    }

    /// `H: string -> G2`: SHA-1 the attribute's bytes, then map the
    /// digest into `G2` through the pairing library's hash-to-curve
    /// primitive (RFC 9380's `hash_to_curve`, replacing `libbswabe`'s
    /// `element_from_string`, which relies on a PBC-specific
    /// point-derivation routine not available outside that library).
    /// Deterministic; two calls with the same attribute always yield the
    /// same point.
    ///
    /// The BSW paper's Type-A pairing is symmetric (`G1` and `G2` are the
    /// same group), so its single hash target is ambiguous once split
    /// across an asymmetric curve. `H` is pinned to `G2` here (not `G1`)
    /// because it is the only assignment under which `D_j = g2^r *
    /// H(attr)^rj` (both factors in `G2`) and the ciphertext share
    /// `c' = H(attr)^v` paired against `D'_j in G1` both type-check
    /// against a fixed `e: G1 x G2 -> GT`.
    pub fn hash_attribute(attr: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(attr.as_bytes());
        let digest = hasher.finalize();

        let point = <G2Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(
            &digest[..],
            ATTRIBUTE_DST,
        );
        G2(point)
    }

    pub fn op(&self, other: &Self) -> Self {
        G2(self.0 + other.0)
    }

    pub fn exp(&self, scalar: &Zr) -> Self {
        G2(self.0 * scalar.0)
    }

    pub fn inv(&self) -> Self {
        G2(-self.0)
    }
}

impl Gt {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Gt(bls12_381::Gt::random(rng))
    }

    pub fn identity() -> Self {
        Gt(bls12_381::Gt::identity())
    }

    pub fn op(&self, other: &Self) -> Self {
        Gt(self.0 + other.0)
    }

    pub fn exp(&self, scalar: &Zr) -> Self {
        Gt(self.0 * scalar.0)
    }

    pub fn inv(&self) -> Self {
        Gt(-self.0)
    }
}

/// The bilinear map `e: G1 x G2 -> GT`.
pub fn e(a: &G1, b: &G2) -> Gt {
    let a = G1Affine::from(a.0);
    let b = G2Affine::from(b.0);
    Gt(bls12_381::pairing(&a, &b))
}

impl Element for Zr {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CpAbeError::DeserializeError("Zr: expected 32 bytes".into()))?;
        let scalar = Scalar::from_bytes(&arr);
        if bool::from(scalar.is_some()) {
            Ok(Zr(scalar.unwrap()))
        } else {
            Err(CpAbeError::DeserializeError(
                "Zr: bytes are not a canonical scalar".into(),
            ))
        }
    }
}

impl Element for G1 {
    fn to_bytes(&self) -> Vec<u8> {
        G1Affine::from(self.0).to_compressed().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let arr: [u8; 48] = bytes
            .try_into()
            .map_err(|_| CpAbeError::DeserializeError("G1: expected 48 bytes".into()))?;
        let affine = G1Affine::from_compressed(&arr);
        if bool::from(affine.is_some()) {
            Ok(G1(affine.unwrap().into()))
        } else {
            Err(CpAbeError::DeserializeError(
                "G1: bytes are not a valid compressed point".into(),
            ))
        }
    }
}

impl Element for G2 {
    fn to_bytes(&self) -> Vec<u8> {
        G2Affine::from(self.0).to_compressed().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let arr: [u8; 96] = bytes
            .try_into()
            .map_err(|_| CpAbeError::DeserializeError("G2: expected 96 bytes".into()))?;
        let affine = G2Affine::from_compressed(&arr);
        if bool::from(affine.is_some()) {
            Ok(G2(affine.unwrap().into()))
        } else {
            Err(CpAbeError::DeserializeError(
                "G2: bytes are not a valid compressed point".into(),
            ))
        }
    }
}

impl Element for Gt {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_uncompressed().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let arr: [u8; 576] = bytes
            .try_into()
            .map_err(|_| CpAbeError::DeserializeError("Gt: expected 576 bytes".into()))?;
        let gt = bls12_381::Gt::from_uncompressed(&arr);
        if bool::from(gt.is_some()) {
            Ok(Gt(gt.unwrap()))
        } else {
            Err(CpAbeError::DeserializeError(
                "Gt: bytes are not a valid target-group element".into(),
            ))
        }
    }
}

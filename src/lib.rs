//! Ciphertext-Policy Attribute-Based Encryption on the
//! [BLS12-381 pairing-friendly elliptic curve](https://github.com/zkcrypto/bls12_381),
//! implementing the Bethencourt-Sahai-Waters scheme.
//!
//!  * From: "[Ciphertext-Policy Attribute-Based Encryption](https://www.cs.utexas.edu/~bwaters/publications/papers/cp-abe.pdf)"
//!  * Published in: IEEE Symposium on Security and Privacy, 2007
//!
//! A ciphertext is created under a policy, expressed as a k-of-n
//! threshold tree over attribute names (see [`policy`]'s postfix
//! grammar); a private key carries an attribute set. Decryption
//! succeeds only if the key's attributes satisfy the ciphertext's
//! policy.
//!
//! The recovered value is a uniformly random element of the pairing's
//! target group `GT`, intended for use as a symmetric key by whatever
//! hybrid encryption scheme wraps this core. That framing, along with
//! file I/O and command-line tooling, is out of scope here.
//!
//! The structure of the byte serialization of the various data
//! structures is not guaranteed to remain constant between releases of
//! this library.

#![forbid(unsafe_code)]

mod codec;
pub mod decrypt;
pub mod encrypt;
pub mod error;
mod lagrange;
pub mod keys;
pub mod pairing;
pub mod policy;

pub use decrypt::decrypt;
pub use encrypt::{encrypt, Ciphertext};
pub use error::{last_error, CpAbeError, ParseErrorKind};
pub use keys::{keygen, setup, MasterSecret, PrivateKey, PublicParams};
pub use pairing::Gt;
pub use policy::PolicyNode;

//! System setup and key generation for the Bethencourt-Sahai-Waters
//! ciphertext-policy scheme ("Ciphertext-Policy Attribute-Based
//! Encryption", IEEE S&P 2007, sections 4.2 and 4.3).

use log::debug;
use rand_core::{CryptoRng, RngCore};

use crate::codec::{read_elem, read_str, read_u32, write_elem, write_str, write_u32, Element};
use crate::error::CpAbeError;
use crate::pairing::{e, G1, G2, Gt, Zr, PAIRING_DESC};
use crate::policy::validate_attribute;

/// Public parameters `(g, h=g^beta, g2, e(g,g2)^alpha)` as defined in the
/// BSW paper's Setup algorithm (section 4.2). Carries the pairing
/// description so ciphertexts decode without out-of-band curve
/// configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicParams {
    pub(crate) g: G1,
    pub(crate) h: G1,
    pub(crate) g2: G2,
    pub(crate) egg_alpha: Gt,
}

/// The master secret `(beta, g2^alpha)` from Setup. Never serialized
/// alongside [`PublicParams`]; holding it lets you mint arbitrary private
/// keys.
#[derive(Clone, Debug, PartialEq)]
pub struct MasterSecret {
    pub(crate) beta: Zr,
    pub(crate) g_alpha: G2,
}

/// One attribute's pair of private-key components, `D_j = g2^r * H(a)^rj`
/// and `D'_j = g^rj`, as in the BSW paper's Key Generation algorithm
/// (section 4.3).
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct KeyComponent {
    pub(crate) attr: String,
    pub(crate) d: G2,
    pub(crate) dp: G1,
}

/// A private key `(D, components)`. `components` preserves insertion
/// order; matching against a ciphertext's leaves happens by attribute
/// name, not position, but order is preserved across (de)serialization
/// regardless.
#[derive(Clone, Debug, PartialEq)]
pub struct PrivateKey {
    pub(crate) d: G2,
    pub(crate) components: Vec<KeyComponent>,
}

/// Generates a fresh `(PublicParams, MasterSecret)` pair (BSW Setup,
/// section 4.2).
pub fn setup<R: RngCore + CryptoRng>(rng: &mut R) -> (PublicParams, MasterSecret) {
    let alpha = Zr::random(rng);
    let beta = Zr::random(rng);
    let g = G1::random(rng);
    let g2 = G2::random(rng);

    let h = g.exp(&beta);
    let g_alpha = g2.exp(&alpha);
    let egg_alpha = e(&g, &g_alpha);

    debug!("setup: generated public parameters and master secret");

    (
        PublicParams { g, h, g2, egg_alpha },
        MasterSecret { beta, g_alpha },
    )
}

/// Issues a private key for `attrs` (BSW Key Generation, section 4.3).
///
/// Each attribute's `rj` is drawn fresh and independently; this is what
/// prevents colluding users from combining their key components (BSW
/// section 4.3's collusion-resistance argument). Duplicate attributes are
/// permitted but meaningless; the caller is expected to deduplicate.
pub fn keygen<R: RngCore + CryptoRng>(
    pub_params: &PublicParams,
    msk: &MasterSecret,
    attrs: &[String],
    rng: &mut R,
) -> Result<PrivateKey, CpAbeError> {
    for attr in attrs {
        validate_attribute(attr)?;
    }

    let r = Zr::random(rng);
    let g_r = pub_params.g2.exp(&r);

    let beta_inv = msk
        .beta
        .invert()
        .ok_or_else(|| CpAbeError::CryptoError("master secret beta is zero".into()))?;
    let d = msk.g_alpha.op(&g_r).exp(&beta_inv);

    let mut components = Vec::with_capacity(attrs.len());
    for attr in attrs {
        let rj = Zr::random(rng);
        let hashed = G2::hash_attribute(attr);
        let dj = g_r.op(&hashed.exp(&rj));
        let dpj = pub_params.g.exp(&rj);
        components.push(KeyComponent {
            attr: attr.clone(),
            d: dj,
            dp: dpj,
        });
    }

    debug!("keygen: issued private key for {} attributes", attrs.len());

    Ok(PrivateKey { d, components })
}

impl PublicParams {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_str(&mut buf, PAIRING_DESC);
        write_elem(&mut buf, &self.g);
        write_elem(&mut buf, &self.h);
        write_elem(&mut buf, &self.g2);
        write_elem(&mut buf, &self.egg_alpha);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let mut offset = 0;
        let desc = read_str(bytes, &mut offset)?;
        if desc != PAIRING_DESC {
            return Err(CpAbeError::DeserializeError(format!(
                "unsupported pairing parameters: {}",
                desc
            )));
        }
        let g = read_elem(bytes, &mut offset)?;
        let h = read_elem(bytes, &mut offset)?;
        let g2 = read_elem(bytes, &mut offset)?;
        let egg_alpha = read_elem(bytes, &mut offset)?;
        if offset != bytes.len() {
            return Err(CpAbeError::DeserializeError(
                "trailing bytes after public parameters".into(),
            ));
        }
        Ok(PublicParams { g, h, g2, egg_alpha })
    }
}

impl MasterSecret {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_elem(&mut buf, &self.beta);
        write_elem(&mut buf, &self.g_alpha);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let mut offset = 0;
        let beta = read_elem(bytes, &mut offset)?;
        let g_alpha = read_elem(bytes, &mut offset)?;
        if offset != bytes.len() {
            return Err(CpAbeError::DeserializeError(
                "trailing bytes after master secret".into(),
            ));
        }
        Ok(MasterSecret { beta, g_alpha })
    }
}

impl PrivateKey {
    /// Finds the first component with the given attribute name (spec
    /// §4.6: "when multiple components share an attribute name ... the
    /// first match wins").
    pub(crate) fn find(&self, attr: &str) -> Option<usize> {
        self.components.iter().position(|c| c.attr == attr)
    }

    pub(crate) fn component(&self, index: usize) -> &KeyComponent {
        &self.components[index]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_elem(&mut buf, &self.d);
        write_u32(&mut buf, self.components.len() as u32);
        for c in &self.components {
            write_str(&mut buf, &c.attr);
            write_elem(&mut buf, &c.d);
            write_elem(&mut buf, &c.dp);
        }
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let mut offset = 0;
        let d = read_elem(bytes, &mut offset)?;
        let n = read_u32(bytes, &mut offset)? as usize;
        let mut components = Vec::with_capacity(n);
        for _ in 0..n {
            let attr = read_str(bytes, &mut offset)?;
            let cd = read_elem(bytes, &mut offset)?;
            let cdp = read_elem(bytes, &mut offset)?;
            components.push(KeyComponent {
                attr,
                d: cd,
                dp: cdp,
            });
        }
        if offset != bytes.len() {
            return Err(CpAbeError::DeserializeError(
                "trailing bytes after private key".into(),
            ));
        }
        Ok(PrivateKey { d, components })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_round_trips() {
        let mut rng = rand::thread_rng();
        let (pk, _) = setup(&mut rng);
        let bytes = pk.to_bytes();
        assert_eq!(PublicParams::from_bytes(&bytes).unwrap(), pk);
    }

    #[test]
    fn msk_round_trips() {
        let mut rng = rand::thread_rng();
        let (_, msk) = setup(&mut rng);
        let bytes = msk.to_bytes();
        assert_eq!(MasterSecret::from_bytes(&bytes).unwrap(), msk);
    }

    #[test]
    fn keygen_rejects_invalid_attribute_bytes() {
        let mut rng = rand::thread_rng();
        let (pk, msk) = setup(&mut rng);
        let err = keygen(&pk, &msk, &["has space".to_string()], &mut rng).unwrap_err();
        assert!(matches!(err, CpAbeError::AttributeError(_)));
    }

    #[test]
    fn keygen_round_trips() {
        let mut rng = rand::thread_rng();
        let (pk, msk) = setup(&mut rng);
        let key = keygen(&pk, &msk, &["A".to_string(), "B".to_string()], &mut rng).unwrap();
        let bytes = key.to_bytes();
        assert_eq!(PrivateKey::from_bytes(&bytes).unwrap(), key);
    }

    #[test]
    fn keygen_first_match_wins_on_duplicate_attributes() {
        let mut rng = rand::thread_rng();
        let (pk, msk) = setup(&mut rng);
        let key = keygen(
            &pk,
            &msk,
            &["A".to_string(), "A".to_string(), "B".to_string()],
            &mut rng,
        )
        .unwrap();
        assert_eq!(key.find("A"), Some(0));
        assert_eq!(key.find("B"), Some(2));
    }
}

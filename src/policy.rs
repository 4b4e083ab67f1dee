//! The postfix threshold-tree policy parser and the ciphertext-embedded
//! policy tree from the BSW scheme's access structure (IEEE S&P 2007,
//! section 3).
//!
//! Two distinct types exist because the tree's shape changes across
//! encryption: [`ParsedNode`] is what the parser produces, pure structure
//! with leaves holding only an attribute name, and [`PolicyNode`] is what
//! ends up inside a [`crate::encrypt::Ciphertext`]: the same shape, but
//! every leaf has been decorated with its `(c, c')` share components and
//! any polynomial state has been stripped.

use crate::codec::{read_str, read_u32, write_str, write_u32};
use crate::error::{CpAbeError, ParseErrorKind};
use crate::pairing::{G1, G2};

/// Output of [`parse`]: an in-memory k-of-n threshold tree with bare
/// leaves, not yet decorated with share components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ParsedNode {
    Leaf(String),
    Internal { k: u32, children: Vec<ParsedNode> },
}

/// The policy tree carried inside a [`crate::encrypt::Ciphertext`]. A
/// leaf's threshold is always conceptually 1 and is not stored
/// separately, mirroring `base_node(1, s)` in `libbswabe`.
///
/// A leaf's `c = g^v` lives in `G1`; its `c' = H(attr)^v` lives in `G2`
/// (not `G1`, as a literal reading of the BSW paper's symmetric-pairing
/// share formulas would suggest; see the note on
/// [`crate::pairing::G2::hash_attribute`]). Decryption pairs `c` against a
/// key's `D_j in G2` and `D'_j in G1` against `c'`, both valid
/// `(G1, G2)` pairing arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum PolicyNode {
    Leaf { attr: String, c: G1, cp: G2 },
    Internal { k: u32, children: Vec<PolicyNode> },
}

/// Parses a whitespace-separated postfix policy string into a threshold
/// tree.
///
/// Tokens are scanned left to right against a stack: a leaf token pushes
/// a leaf; a `kofn` token pops `n` nodes (rightmost pop becomes the
/// rightmost child) and pushes the resulting internal node. Exactly one
/// node must remain on the stack at the end.
pub(crate) fn parse(policy: &str) -> Result<ParsedNode, CpAbeError> {
    let mut stack: Vec<ParsedNode> = Vec::new();

    for tok in policy.split_whitespace() {
        match parse_threshold(tok) {
            Some((k, n)) => {
                if k < 1 {
                    return Err(ParseErrorKind::TriviallySatisfied(tok.to_owned()).into());
                }
                if k > n {
                    return Err(ParseErrorKind::Unsatisfiable(tok.to_owned()).into());
                }
                if n == 1 {
                    return Err(ParseErrorKind::IdentityOperator(tok.to_owned()).into());
                }
                if (stack.len() as u32) < n {
                    return Err(ParseErrorKind::StackUnderflow(tok.to_owned()).into());
                }
                let mut children = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    children.push(stack.pop().expect("length checked above"));
                }
                children.reverse();
                stack.push(ParsedNode::Internal { k, children });
            }
            None => stack.push(ParsedNode::Leaf(tok.to_owned())),
        }
    }

    match stack.len() {
        0 => Err(ParseErrorKind::EmptyPolicy.into()),
        1 => Ok(stack.pop().expect("length checked above")),
        _ => Err(ParseErrorKind::ExtraTokens.into()),
    }
}

/// Recognizes the `kofn` operator grammar: `digit+ "of" digit+`, the
/// entire token and nothing else. Anything that doesn't fully match
/// (including a leaf that merely contains the substring `"of"`) is a
/// leaf. Stricter than `libbswabe`'s `sscanf("%dof%d")`, which accepts a
/// token with trailing garbage after a valid match.
fn parse_threshold(tok: &str) -> Option<(u32, u32)> {
    let bytes = tok.as_bytes();
    let mut split = 0;
    while split < bytes.len() && bytes[split].is_ascii_digit() {
        split += 1;
    }
    if split == 0 || !tok[split..].starts_with("of") {
        return None;
    }
    let n_str = &tok[split + 2..];
    if n_str.is_empty() || !n_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let k = tok[..split].parse().ok()?;
    let n = n_str.parse().ok()?;
    Some((k, n))
}

/// Attribute byte set: printable ASCII, no whitespace, no NUL.
pub(crate) fn validate_attribute(attr: &str) -> Result<(), CpAbeError> {
    if attr.is_empty() || !attr.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(CpAbeError::AttributeError(attr.to_owned()));
    }
    Ok(())
}

impl PolicyNode {
    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        match self {
            PolicyNode::Leaf { attr, c, cp } => {
                write_u32(buf, 1);
                write_u32(buf, 0);
                write_str(buf, attr);
                crate::codec::write_elem(buf, c);
                crate::codec::write_elem(buf, cp);
            }
            PolicyNode::Internal { k, children } => {
                write_u32(buf, *k);
                write_u32(buf, children.len() as u32);
                for child in children {
                    child.write(buf);
                }
            }
        }
    }

    pub(crate) fn read(bytes: &[u8], offset: &mut usize) -> Result<Self, CpAbeError> {
        let k = read_u32(bytes, offset)?;
        let n_children = read_u32(bytes, offset)?;

        if n_children == 0 {
            let attr = read_str(bytes, offset)?;
            let c = crate::codec::read_elem(bytes, offset)?;
            let cp = crate::codec::read_elem(bytes, offset)?;
            Ok(PolicyNode::Leaf { attr, c, cp })
        } else {
            let mut children = Vec::with_capacity(n_children as usize);
            for _ in 0..n_children {
                children.push(PolicyNode::read(bytes, offset)?);
            }
            Ok(PolicyNode::Internal { k, children })
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write(&mut buf);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError> {
        let mut offset = 0;
        let node = PolicyNode::read(bytes, &mut offset)?;
        if offset != bytes.len() {
            return Err(CpAbeError::DeserializeError(
                "trailing bytes after policy tree".into(),
            ));
        }
        Ok(node)
    }
}

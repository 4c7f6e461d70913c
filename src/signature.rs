//! Canonical parameter signatures.
//!
//! A [`Signature`] is the ordered list of parameter type identifiers of a remote method. Client
//! and server both encode it with [`Signature::encode`] and the server keys overloads by it, so
//! the two sides only agree on an overload when they produce the same token.
//!
//! ```
//! use rni::Signature;
//!
//! let signature = Signature::new(["String", "i32"]).unwrap();
//! assert_eq!(signature.encode(), "String,i32");
//! assert_eq!(Signature::decode("String,i32").unwrap(), signature);
//! assert_eq!(Signature::decode("").unwrap().arity(), 0);
//! ```

use std::fmt;
use std::sync::Arc;

/// Separator between type identifiers in an encoded signature.
pub const DELIMITER: char = ',';

/// Reasons a list of type identifiers cannot form a [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// An identifier was empty, e.g. the token `"String,,i32"`.
    #[error("type identifier at position {position} is empty")]
    EmptyIdentifier { position: usize },

    /// An identifier contains the delimiter, whitespace or a non-ASCII character, so it cannot
    /// round-trip through the header.
    #[error("type identifier '{identifier}' contains a reserved or non-ASCII character")]
    ReservedCharacter { identifier: String },
}

/// Ordered parameter type identifiers of a method.
///
/// Equality is element-wise; the empty signature describes a method without parameters.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(Arc<[String]>);

impl Signature {
    /// Build a signature, validating every identifier.
    pub fn new<I, S>(type_names: I) -> Result<Self, SignatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let type_names: Vec<String> = type_names.into_iter().map(Into::into).collect();

        for (position, identifier) in type_names.iter().enumerate() {
            if identifier.is_empty() {
                return Err(SignatureError::EmptyIdentifier { position });
            }
            if !identifier
                .chars()
                .all(|c| c.is_ascii_graphic() && c != DELIMITER)
            {
                return Err(SignatureError::ReservedCharacter {
                    identifier: identifier.clone(),
                });
            }
        }

        Ok(Self(type_names.into()))
    }

    /// The signature of a method without parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Encode as the comma-joined token carried in the `X-RNI-Params` header.
    pub fn encode(&self) -> String {
        let mut delimiter = [0; 4];
        self.0.join(DELIMITER.encode_utf8(&mut delimiter))
    }

    /// Parse a token produced by [`encode`](Self::encode).
    ///
    /// The empty token is the empty signature. Surrounding whitespace around the whole token is
    /// ignored since some HTTP stacks trim header values.
    pub fn decode(token: &str) -> Result<Self, SignatureError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(Self::empty());
        }

        Self::new(token.split(DELIMITER))
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// The type identifiers in declaration order.
    pub fn type_names(&self) -> &[String] {
        &self.0
    }

    /// The type identifier of the parameter at `index`.
    pub fn type_name(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// Argument count implied by an encoded token without parsing it.
///
/// The empty token means no arguments, otherwise one more than the number of delimiters.
pub fn arity_of(token: &str) -> usize {
    if token.is_empty() {
        0
    } else {
        token.matches(DELIMITER).count() + 1
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.encode())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_signature_encodes_to_empty_token() {
        let signature = Signature::empty();
        assert_eq!(signature.encode(), "");
        assert_eq!(signature.arity(), 0);
        assert_eq!(Signature::decode("").unwrap(), signature);
    }

    #[test]
    fn test_decode_is_left_inverse_of_encode() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["String"],
            vec!["String", "i32"],
            vec!["demo.Person", "Vec<String>", "HashMap<String;i64>"],
            vec!["u8", "u8", "u8"],
        ];

        for names in cases {
            let signature = Signature::new(names.clone()).unwrap();
            let decoded = Signature::decode(&signature.encode()).unwrap();
            assert_eq!(decoded, signature);
            assert_eq!(decoded.type_names(), names.as_slice());
        }
    }

    #[test]
    fn test_order_matters() {
        let a = Signature::new(["String", "i32"]).unwrap();
        let b = Signature::new(["i32", "String"]).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn test_arity_from_token() {
        assert_eq!(arity_of(""), 0);
        assert_eq!(arity_of("String"), 1);
        assert_eq!(arity_of("String,i32,bool"), 3);
    }

    #[test]
    fn test_identifier_with_delimiter_is_rejected() {
        let result = Signature::new(["HashMap<String,String>"]);
        assert!(matches!(
            result,
            Err(SignatureError::ReservedCharacter { .. })
        ));
    }

    #[test]
    fn test_identifier_outside_visible_ascii_is_rejected() {
        for identifier in ["demo.Größe", "Vec<String >", "tab\there"] {
            assert!(
                matches!(
                    Signature::new([identifier]),
                    Err(SignatureError::ReservedCharacter { .. })
                ),
                "{identifier:?}"
            );
        }
        assert!(Signature::decode("Größe").is_err());
    }

    #[test]
    fn test_encode_joins_with_delimiter() {
        let signature = Signature::new(["String", "i32", "bool"]).unwrap();
        let expected = ["String", "i32", "bool"].join(&DELIMITER.to_string());
        assert_eq!(signature.encode(), expected);
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        let result = Signature::decode("String,,i32");
        assert_eq!(
            result.unwrap_err(),
            SignatureError::EmptyIdentifier { position: 1 }
        );
    }

    #[test]
    fn test_type_name_by_index() {
        let signature = Signature::decode("demo.Person,bool").unwrap();
        assert_eq!(signature.type_name(0), Some("demo.Person"));
        assert_eq!(signature.type_name(1), Some("bool"));
        assert_eq!(signature.type_name(2), None);
    }
}

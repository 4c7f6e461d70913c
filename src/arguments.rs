//! Positional arguments and the type identifiers that make up a [`Signature`].
//!
//! Every parameter type of a remote method implements [`RniType`], which names it with an
//! identifier stable across client and server builds. A method's parameter list is a tuple
//! implementing [`Arguments`]; the tuple's element identifiers form its signature and its
//! values travel as the `param-<index>` members of the request body.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use impl_trait_for_tuples::impl_for_tuples;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DispatchError;
use crate::signature::{Signature, SignatureError};

/// Body member name of the argument at `index`.
pub fn param_key(index: usize) -> String {
    format!("param-{index}")
}

/// A type that can be passed to a remote method.
///
/// The identifier returned by [`type_name`](RniType::type_name) must be identical on both sides
/// of a call and may only contain visible ASCII characters other than `,`. User types are usually named with
/// [`rni_types!`](crate::rni_types).
pub trait RniType: Serialize + DeserializeOwned + Send + 'static {
    fn type_name() -> Cow<'static, str>;
}

macro_rules! impl_rni_type {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl RniType for $ty {
                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed($name)
                }
            }
        )*
    };
}

impl_rni_type!(
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    String => "String",
);

impl<T: RniType> RniType for Vec<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Vec<{}>", T::type_name()))
    }
}

impl<T: RniType> RniType for Option<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Option<{}>", T::type_name()))
    }
}

impl<T: RniType> RniType for Box<T> {
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }
}

impl<T: RniType + Eq + Hash> RniType for HashSet<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("HashSet<{}>", T::type_name()))
    }
}

impl<T: RniType + Ord> RniType for BTreeSet<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("BTreeSet<{}>", T::type_name()))
    }
}

// Map identifiers separate key and value with `;` so no identifier ever contains the signature
// delimiter.
impl<K: RniType + Eq + Hash, V: RniType> RniType for HashMap<K, V> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("HashMap<{};{}>", K::type_name(), V::type_name()))
    }
}

impl<K: RniType + Ord, V: RniType> RniType for BTreeMap<K, V> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("BTreeMap<{};{}>", K::type_name(), V::type_name()))
    }
}

/// Reads positional arguments out of a request body in declaration order.
#[derive(Debug, Default)]
pub struct ParamReader {
    params: Map<String, Value>,
    index: usize,
}

impl ParamReader {
    pub fn new(params: Map<String, Value>) -> Self {
        Self { params, index: 0 }
    }

    /// Parse a request body for a call taking `arity` arguments.
    ///
    /// No body is read for zero arguments. Otherwise the body must be a JSON object.
    pub fn from_body(body: &[u8], arity: usize) -> Result<Self, DispatchError> {
        if arity == 0 {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(params)) => Ok(Self::new(params)),
            Ok(other) => Err(DispatchError::InvalidArguments {
                index: 0,
                reason: format!("expected a JSON object body, found {}", json_kind(&other)),
            }),
            Err(err) => Err(DispatchError::InvalidArguments {
                index: 0,
                reason: err.to_string(),
            }),
        }
    }

    /// Decode the next argument as `T`.
    ///
    /// An absent member decodes from `null`, so optional parameters may be omitted.
    pub fn read<T: RniType>(&mut self) -> Result<T, DispatchError> {
        let index = self.index;
        self.index += 1;

        let value = self.params.remove(&param_key(index)).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| DispatchError::InvalidArguments {
            index,
            reason: format!("expected {}: {err}", T::type_name()),
        })
    }
}

/// Collects positional arguments into a request body.
#[derive(Debug, Default)]
pub struct ParamWriter {
    params: Map<String, Value>,
}

impl ParamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next argument.
    pub fn write<T: RniType>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let key = param_key(self.params.len());
        self.params.insert(key, serde_json::to_value(value)?);
        Ok(())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.params)
    }
}

/// The parameter list of a remote method, as a tuple of [`RniType`]s.
///
/// Implemented for `()` and tuples of up to twelve elements.
pub trait Arguments: Sized + Send + 'static {
    /// Push the identifier of every parameter, in order.
    fn type_names(names: &mut Vec<String>);

    fn decode(reader: &mut ParamReader) -> Result<Self, DispatchError>;

    fn encode(&self, writer: &mut ParamWriter) -> Result<(), serde_json::Error>;

    /// The signature formed by the static parameter types.
    fn signature() -> Result<Signature, SignatureError> {
        let mut names = Vec::new();
        Self::type_names(&mut names);
        Signature::new(names)
    }
}

impl Arguments for () {
    fn type_names(_names: &mut Vec<String>) {}

    fn decode(_reader: &mut ParamReader) -> Result<Self, DispatchError> {
        Ok(())
    }

    fn encode(&self, _writer: &mut ParamWriter) -> Result<(), serde_json::Error> {
        Ok(())
    }
}

#[impl_for_tuples(1, 12)]
#[tuple_types_custom_trait_bound(RniType)]
impl Arguments for Tuple {
    fn type_names(names: &mut Vec<String>) {
        for_tuples!( #( names.push(Tuple::type_name().into_owned()); )* );
    }

    fn decode(reader: &mut ParamReader) -> Result<Self, DispatchError> {
        Ok(for_tuples!( ( #( reader.read::<Tuple>()? ),* ) ))
    }

    fn encode(&self, writer: &mut ParamWriter) -> Result<(), serde_json::Error> {
        for_tuples!( #( writer.write(&self.Tuple)?; )* );
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_type_names() {
        assert_eq!(String::type_name(), "String");
        assert_eq!(Vec::<i64>::type_name(), "Vec<i64>");
        assert_eq!(Option::<String>::type_name(), "Option<String>");
        assert_eq!(
            HashMap::<String, Vec<u8>>::type_name(),
            "HashMap<String;Vec<u8>>"
        );
    }

    #[test]
    fn test_tuple_signature() {
        let signature = <(String, i32, HashMap<String, String>)>::signature().unwrap();
        assert_eq!(signature.encode(), "String,i32,HashMap<String;String>");
        assert_eq!(<()>::signature().unwrap().encode(), "");
    }

    #[test]
    fn test_encode_positional_params() {
        let mut writer = ParamWriter::new();
        ("rni".to_string(), 30_i32).encode(&mut writer).unwrap();

        assert_eq!(
            writer.into_value(),
            json!({ "param-0": "rni", "param-1": 30 })
        );
    }

    #[test]
    fn test_decode_positional_params() {
        let body = json!({ "param-1": 30, "param-0": "rni" }).to_string();
        let mut reader = ParamReader::from_body(body.as_bytes(), 2).unwrap();

        let (name, age) = <(String, i32)>::decode(&mut reader).unwrap();
        assert_eq!(name, "rni");
        assert_eq!(age, 30);
    }

    #[test]
    fn test_missing_optional_param_is_none() {
        let mut reader = ParamReader::from_body(b"{}", 1).unwrap();
        let (value,) = <(Option<String>,)>::decode(&mut reader).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_type_mismatch_reports_index() {
        let body = json!({ "param-0": "rni", "param-1": "thirty" }).to_string();
        let mut reader = ParamReader::from_body(body.as_bytes(), 2).unwrap();

        let err = <(String, i32)>::decode(&mut reader).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { index: 1, .. }));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let err = ParamReader::from_body(b"[1, 2]", 2).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { index: 0, .. }));
    }

    #[test]
    fn test_zero_arity_ignores_body() {
        assert!(ParamReader::from_body(b"", 0).is_ok());
        assert!(ParamReader::from_body(b"not json", 0).is_ok());
    }
}

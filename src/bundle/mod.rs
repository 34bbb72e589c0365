//! Versioned key/value serialization for the media model
//!
//! Every value type numbers its fields with small stable integers and writes
//! them under the radix-36 rendering of that number (`0`..`9`, `a`..`z`,
//! `10`, ...). A [`Bundle`] is the resulting tree; [`Bundle::to_json`] wraps it
//! in an envelope carrying [`BUNDLE_FORMAT_VERSION`].

pub mod list;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::error::{MediaError, Result};

/// Version written into every serialized envelope.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Renders a field number as its radix-36 key.
pub fn field_key(field: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if field == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    let mut rest = field;
    while rest > 0 {
        digits.push(DIGITS[(rest % 36) as usize]);
        rest /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// A single value stored in a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BundleValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Bundle(Bundle),
    BundleList(Vec<Bundle>),
    IntList(Vec<i64>),
    BoolList(Vec<bool>),
    StringList(Vec<String>),
}

impl BundleValue {
    fn kind(&self) -> &'static str {
        match self {
            BundleValue::Bool(_) => "bool",
            BundleValue::Int(_) => "int",
            BundleValue::Float(_) => "float",
            BundleValue::String(_) => "string",
            BundleValue::Bytes(_) => "bytes",
            BundleValue::Bundle(_) => "bundle",
            BundleValue::BundleList(_) => "bundle list",
            BundleValue::IntList(_) => "int list",
            BundleValue::BoolList(_) => "bool list",
            BundleValue::StringList(_) => "string list",
        }
    }
}

macro_rules! into_bundle_value {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for BundleValue {
                fn from(value: $ty) -> Self {
                    BundleValue::$variant(value $(as $cast)?)
                }
            }
        )*
    };
}

into_bundle_value! {
    bool => Bool,
    i64 => Int,
    i32 => Int as i64,
    u32 => Int as i64,
    usize => Int as i64,
    f64 => Float,
    f32 => Float as f64,
    String => String,
    Vec<u8> => Bytes,
    Bundle => Bundle,
    Vec<Bundle> => BundleList,
    Vec<i64> => IntList,
    Vec<bool> => BoolList,
    Vec<String> => StringList,
}

impl From<&str> for BundleValue {
    fn from(value: &str) -> Self {
        BundleValue::String(value.to_string())
    }
}

/// Types that can be read back out of a [`BundleValue`].
pub trait FromBundleValue: Sized {
    fn from_bundle_value(value: &BundleValue) -> Option<Self>;
}

macro_rules! from_bundle_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromBundleValue for $ty {
                fn from_bundle_value(value: &BundleValue) -> Option<Self> {
                    match value {
                        BundleValue::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_bundle_value! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => String,
    Vec<u8> => Bytes,
    Bundle => Bundle,
    Vec<Bundle> => BundleList,
    Vec<i64> => IntList,
    Vec<bool> => BoolList,
    Vec<String> => StringList,
}

impl FromBundleValue for i32 {
    fn from_bundle_value(value: &BundleValue) -> Option<Self> {
        match value {
            BundleValue::Int(inner) => i32::try_from(*inner).ok(),
            _ => None,
        }
    }
}

impl FromBundleValue for u32 {
    fn from_bundle_value(value: &BundleValue) -> Option<Self> {
        match value {
            BundleValue::Int(inner) => u32::try_from(*inner).ok(),
            _ => None,
        }
    }
}

impl FromBundleValue for usize {
    fn from_bundle_value(value: &BundleValue) -> Option<Self> {
        match value {
            BundleValue::Int(inner) => usize::try_from(*inner).ok(),
            _ => None,
        }
    }
}

impl FromBundleValue for f32 {
    fn from_bundle_value(value: &BundleValue) -> Option<Self> {
        match value {
            BundleValue::Float(inner) => Some(*inner as f32),
            _ => None,
        }
    }
}

/// Value types that serialize to and from a [`Bundle`].
pub trait Bundleable: Sized {
    /// Writes every non-default field of `self`.
    fn to_bundle(&self) -> Bundle;

    /// Rebuilds a value; absent fields fall back to their defaults.
    fn from_bundle(bundle: &Bundle) -> Result<Self>;
}

/// An ordered tree of radix-36 keyed values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    fields: BTreeMap<String, BundleValue>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    fields: &'a Bundle,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    fields: Bundle,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<BundleValue> {
        self.fields.remove(key)
    }

    pub fn put<V: Into<BundleValue>>(&mut self, key: impl Into<String>, value: V) {
        self.fields.insert(key.into(), value.into());
    }

    /// Stores `value` when present; `None` leaves the key absent.
    pub fn put_opt<V: Into<BundleValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.put(key, value);
        }
    }

    pub fn put_bundleable<T: Bundleable>(&mut self, key: impl Into<String>, value: &T) {
        self.put(key, value.to_bundle());
    }

    pub fn put_bundleable_list<T: Bundleable>(&mut self, key: impl Into<String>, values: &[T]) {
        self.put(key, values.iter().map(Bundleable::to_bundle).collect::<Vec<_>>());
    }

    pub fn get_raw(&self, key: &str) -> Option<&BundleValue> {
        self.fields.get(key)
    }

    /// Reads a typed value; a value of the wrong type is an error.
    pub fn get<V: FromBundleValue>(&self, key: &str) -> Result<Option<V>> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(value) => V::from_bundle_value(value).map(Some).ok_or_else(|| {
                MediaError::bundle(format!(
                    "field '{}' holds {} of unexpected type or range",
                    key,
                    value.kind()
                ))
            }),
        }
    }

    pub fn get_or<V: FromBundleValue>(&self, key: &str, default: V) -> Result<V> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    pub fn require<V: FromBundleValue>(&self, key: &str) -> Result<V> {
        self.get(key)?
            .ok_or_else(|| MediaError::MissingField(key.to_string()))
    }

    pub fn get_bundleable<T: Bundleable>(&self, key: &str) -> Result<Option<T>> {
        self.get::<Bundle>(key)?
            .map(|bundle| T::from_bundle(&bundle))
            .transpose()
    }

    /// Absent lists decode as empty.
    pub fn get_bundleable_list<T: Bundleable>(&self, key: &str) -> Result<Vec<T>> {
        self.get::<Vec<Bundle>>(key)?
            .unwrap_or_default()
            .iter()
            .map(T::from_bundle)
            .collect()
    }

    /// Serializes the bundle inside a versioned JSON envelope.
    pub fn to_json(&self) -> Result<String> {
        let envelope = EnvelopeRef {
            version: BUNDLE_FORMAT_VERSION,
            fields: self,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Parses an envelope written by [`Bundle::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(json)?;
        if envelope.version != BUNDLE_FORMAT_VERSION {
            return Err(MediaError::UnsupportedVersion {
                found: envelope.version,
                expected: BUNDLE_FORMAT_VERSION,
            });
        }
        Ok(envelope.fields)
    }

    /// Size of the encoded field tree, used for chunking decisions.
    pub fn encoded_len(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_radix36() {
        assert_eq!(field_key(0), "0");
        assert_eq!(field_key(9), "9");
        assert_eq!(field_key(10), "a");
        assert_eq!(field_key(35), "z");
        assert_eq!(field_key(36), "10");
        assert_eq!(field_key(1000), "rs");
    }

    #[test]
    fn test_typed_access() {
        let mut bundle = Bundle::new();
        bundle.put("0", 42_i64);
        bundle.put("1", "title");
        bundle.put("2", 1.5_f32);
        bundle.put_opt::<bool>("3", None);

        assert_eq!(bundle.get::<i64>("0").unwrap(), Some(42));
        assert_eq!(bundle.get::<i32>("0").unwrap(), Some(42));
        assert_eq!(bundle.get::<String>("1").unwrap().as_deref(), Some("title"));
        assert_eq!(bundle.get::<f32>("2").unwrap(), Some(1.5));
        assert!(!bundle.contains_key("3"));
        assert_eq!(bundle.get_or("3", true).unwrap(), true);
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let mut bundle = Bundle::new();
        bundle.put("0", "not a number");
        assert!(matches!(bundle.get::<i64>("0"), Err(MediaError::Bundle(_))));
        assert!(matches!(bundle.require::<bool>("9"), Err(MediaError::MissingField(_))));

        bundle.put("1", -1_i64);
        assert!(bundle.get::<u32>("1").is_err());
    }

    #[test]
    fn test_envelope_versioning() {
        let mut bundle = Bundle::new();
        bundle.put("a", vec![1_i64, 2, 3]);
        let json = bundle.to_json().unwrap();
        assert!(json.contains("\"version\":1"));
        assert_eq!(Bundle::from_json(&json).unwrap(), bundle);

        let future = json.replace("\"version\":1", "\"version\":2");
        assert!(matches!(
            Bundle::from_json(&future),
            Err(MediaError::UnsupportedVersion { found: 2, expected: 1 })
        ));
    }
}

//! Cache Value Module
//!
//! Defines the typed payload stored in each cache entry.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Payload Trait ==
/// A user type that can be stored as a [`Value::Record`].
///
/// `TYPE_NAME` identifies the type inside snapshots and must be registered
/// with the cache (see [`crate::Cache::register_type`]) before the cache is
/// saved or loaded.
pub trait Payload: Serialize + DeserializeOwned {
    /// Stable name written alongside the encoded record.
    const TYPE_NAME: &'static str;
}

// == Value ==
/// The payload stored under a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// A bincode-encoded user type tagged with its [`Payload::TYPE_NAME`].
    Record { type_name: String, data: Vec<u8> },
}

impl Value {
    /// Encodes a user type into a record value.
    pub fn record<T: Payload>(payload: &T) -> Result<Self> {
        Ok(Value::Record {
            type_name: T::TYPE_NAME.to_string(),
            data: bincode::serialize(payload)?,
        })
    }

    /// Decodes a record value back into its user type.
    ///
    /// Fails with `Serialization` if the value is not a record of type `T`.
    pub fn decode<T: Payload>(&self) -> Result<T> {
        match self {
            Value::Record { type_name, data } if type_name == T::TYPE_NAME => {
                Ok(bincode::deserialize(data)?)
            }
            other => Err(CacheError::Serialization(format!(
                "expected record of type {}, found {}",
                T::TYPE_NAME,
                other.type_name()
            ))),
        }
    }

    /// Name of the payload type, used in snapshot registration checks and errors.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Record { type_name, .. } => type_name,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

// == Conversions ==
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

//! The JSON wire contract for request and response payloads.
//!
//! A payload is any record type serde can read and write which also has a zero
//! value. Request bodies are decoded from the first JSON value in the body,
//! laid over the zero value of the payload type; anything after that first
//! value is ignored. Response bodies are a single JSON value followed by a
//! newline.

use std::any::TypeId;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A type usable as a request or response payload.
///
/// Fields missing from a request body keep their value from
/// [`Default::default`], so a plain `#[derive(Default, Serialize, Deserialize)]`
/// record accepts `{}`, partial objects and `null`.
pub trait Payload: Serialize + DeserializeOwned + Default + 'static {}

impl<T> Payload for T where T: Serialize + DeserializeOwned + Default + 'static {}

/// The zero-field record.
///
/// A handler taking `Empty` as its request accepts an empty body, and one
/// producing `Empty` answers with `{}`.
#[allow(clippy::empty_structs_with_brackets, reason = "braces make serde read and write it as a JSON object")]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Empty {}

/// Whether `T` is the zero-field [`Empty`] record.
#[inline]
pub fn is_empty_record<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<Empty>()
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty body")]
    EmptyBody,

    #[error("malformed payload: {source}")]
    Malformed {
        #[from]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub fn is_empty_body(&self) -> bool {
        matches!(self, Self::EmptyBody)
    }
}

/// Decodes the first JSON value of `body` over `T::default()`.
///
/// Object members present in the body replace the matching members of the
/// zero value and nested objects are merged the same way. A `null`, whether
/// the whole body or a single member, leaves the zero value in place. A body with nothing but whitespace in it
/// is [`DecodeError::EmptyBody`], which callers tell apart from a malformed
/// one.
pub fn decode<T: Payload>(body: &[u8]) -> Result<T, DecodeError> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
    let patch = match values.next() {
        Some(value) => value?,
        None => return Err(DecodeError::EmptyBody),
    };

    let mut value = serde_json::to_value(T::default())?;
    merge(&mut value, patch);
    Ok(serde_json::from_value(value)?)
}

fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Encodes `value` as JSON followed by a newline.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = serde_json::to_vec(value)?;
    buf.push(b'\n');
    Ok(buf)
}

// SPDX-License-Identifier: MIT

//! Tri-state field for partial updates.

use crate::db::Document;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One field of a partial update.
///
/// JSON bodies distinguish a key that was left out from a key explicitly set
/// to `null`; `Option<T>` collapses the two. Fields of this type must be
/// declared with `#[serde(default)]` so a missing key becomes `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key not present: keep the stored value.
    Absent,
    /// Key present with `null`: clear the stored value.
    Null,
    /// Key present with a value: overwrite.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T: Serialize> Patch<T> {
    /// Write this field into a merge document under `key`.
    ///
    /// `Absent` writes nothing, `Null` writes an explicit JSON null.
    pub fn write_to(&self, doc: &mut Document, key: &str) -> Result<(), serde_json::Error> {
        match self {
            Patch::Absent => {}
            Patch::Null => {
                doc.insert(key.to_string(), Value::Null);
            }
            Patch::Value(v) => {
                doc.insert(key.to_string(), serde_json::to_value(v)?);
            }
        }
        Ok(())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

//! # Encoded Examples

use std::collections::BTreeMap;

use crate::{
    errors::{BTResult, BitextError},
    types::TokenType,
};

/// The record key holding source ids.
pub const INPUTS_KEY: &str = "inputs";
/// The record key holding target ids.
pub const TARGETS_KEY: &str = "targets";

/// A self-describing ``{ key -> [int] }`` record payload.
pub type Features = BTreeMap<String, Vec<i64>>;

/// One encoded line pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedExample<T: TokenType> {
    /// Source ids.
    pub inputs: Vec<T>,

    /// Target ids.
    pub targets: Vec<T>,
}

fn to_values<T: TokenType>(ids: &[T]) -> BTResult<Vec<i64>> {
    ids.iter()
        .map(|id| {
            id.to_i64().ok_or(BitextError::TokenOutOfRange {
                value: id.to_u64().map(|v| v as i64).unwrap_or(i64::MAX),
            })
        })
        .collect()
}

fn from_values<T: TokenType>(values: &[i64]) -> BTResult<Vec<T>> {
    values
        .iter()
        .map(|&value| T::from_i64(value).ok_or(BitextError::TokenOutOfRange { value }))
        .collect()
}

impl<T: TokenType> EncodedExample<T> {
    /// Build an example.
    pub fn new(
        inputs: Vec<T>,
        targets: Vec<T>,
    ) -> Self {
        Self { inputs, targets }
    }

    /// Convert to a feature map with exactly the `inputs` and `targets` keys.
    pub fn to_features(&self) -> BTResult<Features> {
        let mut features = Features::new();
        features.insert(INPUTS_KEY.to_string(), to_values(&self.inputs)?);
        features.insert(TARGETS_KEY.to_string(), to_values(&self.targets)?);
        Ok(features)
    }

    /// Convert from a feature map.
    ///
    /// ## Errors
    /// [`BitextError::CorruptRecord`] unless the keys are exactly `inputs` and `targets`.
    pub fn from_features(features: &Features) -> BTResult<Self> {
        if features.len() != 2 {
            return Err(BitextError::CorruptRecord(format!(
                "expected keys [{INPUTS_KEY}, {TARGETS_KEY}], found {:?}",
                features.keys().collect::<Vec<_>>()
            )));
        }
        let field = |key: &str| {
            features
                .get(key)
                .ok_or_else(|| BitextError::CorruptRecord(format!("missing key {key:?}")))
        };

        Ok(Self {
            inputs: from_values(field(INPUTS_KEY)?)?,
            targets: from_values(field(TARGETS_KEY)?)?,
        })
    }

    /// Serialize to a record payload.
    pub fn to_bytes(&self) -> BTResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_features()?)?)
    }

    /// Deserialize from a record payload.
    pub fn from_bytes(bytes: &[u8]) -> BTResult<Self> {
        let features: Features = serde_json::from_slice(bytes)?;
        Self::from_features(&features)
    }
}

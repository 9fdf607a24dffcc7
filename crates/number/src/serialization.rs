//! `serde_with` adapters for [`U256`] values coming from configuration files
//! and JSON documents written by humans.

use {
    alloy::primitives::U256,
    serde::{Deserialize, Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
};

/// Serialize [`U256`] as a decimal string and deserialize it from either a
/// decimal string, a `0x` prefixed hex string or a JSON number.
#[derive(Debug)]
pub struct HexOrDecimalU256;

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    String(String),
    Number(u64),
}

impl<'de> DeserializeAs<'de, U256> for HexOrDecimalU256 {
    fn deserialize_as<D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(U256::from(value)),
            Raw::String(s) => parse(&s).map_err(de::Error::custom),
        }
    }
}

impl SerializeAs<U256> for HexOrDecimalU256 {
    fn serialize_as<S>(source: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&source.to_string())
    }
}

fn parse(s: &str) -> Result<U256, String> {
    let s = s.trim();
    match s.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16)
            .map_err(|err| format!("failed to decode {s:?} as hex u256: {err}")),
        None => U256::from_str_radix(s, 10)
            .map_err(|err| format!("failed to decode {s:?} as decimal u256: {err}")),
    }
}

//! Core type definitions for the SDK

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::TxError;

/// Length of a Sui address / object id in bytes
pub const ADDRESS_LENGTH: usize = 32;

/// Normalize a hex account address to `0x` + 64 lowercase hex chars.
///
/// Short forms such as `0x2` are left-padded. Returns `None` when the input is
/// not valid hex or is longer than 32 bytes.
pub fn normalize_hex_address(raw: &str) -> Option<String> {
    let body = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if body.is_empty() || body.len() > ADDRESS_LENGTH * 2 {
        return None;
    }
    let padded = format!("{:0>64}", body.to_ascii_lowercase());
    hex::decode(&padded).ok()?;
    Some(format!("0x{}", padded))
}

/// Sui account address (32 bytes, hex-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    /// Create an address, normalizing it when it is valid hex.
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        match normalize_hex_address(&addr) {
            Some(normalized) => Self(normalized),
            None => Self(addr),
        }
    }

    /// Parse and validate an address
    pub fn parse(addr: &str) -> Result<Self, TxError> {
        normalize_hex_address(addr)
            .map(Self)
            .ok_or_else(|| TxError::InvalidAddress {
                address: addr.to_string(),
            })
    }

    /// The all-zero address
    pub fn zero() -> Self {
        Self::new(constants::ZERO_ADDRESS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-chain object ID (32 bytes, hex-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Create an object id, normalizing it when it is valid hex.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match normalize_hex_address(&id) {
            Some(normalized) => Self(normalized),
            None => Self(id),
        }
    }

    /// Parse and validate an object id
    pub fn parse(id: &str) -> Result<Self, TxError> {
        normalize_hex_address(id)
            .map(Self)
            .ok_or_else(|| TxError::InvalidObjectId { id: id.to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully-qualified Move coin type, e.g. `0x2::sui::SUI`
///
/// Address segments are normalized on construction so that `0x2::sui::SUI`
/// and its long form compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CoinType(String);

impl CoinType {
    pub fn new(type_tag: impl AsRef<str>) -> Self {
        Self(normalize_type_tag(type_tag.as_ref()))
    }

    /// Native SUI coin type
    pub fn sui() -> Self {
        Self::new(constants::SUI_COIN_TYPE)
    }

    pub fn is_sui(&self) -> bool {
        *self == Self::sui()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Module and struct name without the package address (e.g. `sui::SUI`)
    pub fn short_name(&self) -> &str {
        self.0.split_once("::").map(|(_, rest)| rest).unwrap_or(&self.0)
    }
}

impl From<String> for CoinType {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CoinType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CoinType> for String {
    fn from(value: CoinType) -> Self {
        value.0
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize every `0x..::` address segment inside a type tag.
fn normalize_type_tag(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 64);
    let mut rest = raw.trim();

    while let Some(start) = rest.find("0x") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let hex_len = candidate[2..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .count();
        let (addr, tail) = candidate.split_at(2 + hex_len);
        if tail.starts_with("::") {
            match normalize_hex_address(addr) {
                Some(normalized) => out.push_str(&normalized),
                None => out.push_str(addr),
            }
        } else {
            out.push_str(addr);
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// Chain identifier reported by `sui_getChainIdentifier`
    pub fn chain_identifier(&self) -> &'static str {
        match self {
            Self::Mainnet => "35834a8a",
            Self::Testnet => "4c78adac",
        }
    }

    pub fn from_chain_identifier(id: &str) -> Option<Self> {
        match id {
            "35834a8a" => Some(Self::Mainnet),
            "4c78adac" => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Amount in the smallest unit of a coin
pub type RawAmount = u64;

/// MIST amount (1 SUI = 1_000_000_000 MIST)
pub type Mist = u64;

/// Constants
pub mod constants {
    use super::Mist;

    /// 1 SUI in MIST
    pub const MIST_PER_SUI: Mist = 1_000_000_000;

    /// Native coin type
    pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

    /// Shared clock object
    pub const CLOCK_OBJECT_ID: &str = "0x6";

    /// Shared system state object
    pub const SYSTEM_STATE_OBJECT_ID: &str = "0x5";

    pub const ZERO_ADDRESS: &str = "0x0";

    /// Framework package hosting `coin` and `balance`
    pub const FRAMEWORK_PACKAGE: &str = "0x2";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalization() {
        let short = Address::new("0x2");
        assert_eq!(
            short.as_str(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
        assert_eq!(Address::new("0xABC"), Address::new("0x0abc"));
        assert!(Address::parse("0xzz").is_err());
        assert!(Address::parse(&format!("0x{}", "1".repeat(65))).is_err());
    }

    #[test]
    fn test_coin_type_normalization() {
        let short = CoinType::new("0x2::sui::SUI");
        let long = CoinType::new(
            "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI",
        );
        assert_eq!(short, long);
        assert!(short.is_sui());
        assert_eq!(short.short_name(), "sui::SUI");
    }

    #[test]
    fn test_coin_type_generic_normalization() {
        let tag = CoinType::new("0x2::coin::Coin<0x2::sui::SUI>");
        assert_eq!(tag.as_str().matches("0x0000").count(), 2);
    }

    #[test]
    fn test_network_chain_identifier() {
        assert_eq!(Network::Mainnet.as_str(), "mainnet");
        assert_eq!(
            Network::from_chain_identifier(Network::Testnet.chain_identifier()),
            Some(Network::Testnet)
        );
        assert_eq!(Network::from_chain_identifier("deadbeef"), None);
    }
}

pub mod rpc;

pub use rpc::JsonRpcClient;

use crate::abi::codec::{decode_hex, encode_hex};
use crate::Result;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Opaque record identifier, exactly the bytes the contract returned.
///
/// Rendered as `0x`-prefixed hex so it survives a trip through a URL or a
/// terminal without being re-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlogId(Vec<u8>);

impl BlogId {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&[u8]> for BlogId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl std::fmt::Display for BlogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}

impl std::str::FromStr for BlogId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "0x" {
            return Err(crate::Error::invalid_input("id", "identifier cannot be empty"));
        }
        decode_hex(trimmed)
            .map(Self)
            .map_err(|e| crate::Error::invalid_input("id", format!("'{trimmed}' is not hex: {e}")))
    }
}

impl Serialize for BlogId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlogId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// One blog post summary from the list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListItem {
    pub id: BlogId,
    pub title: String,
    pub description: String,
    /// Author identifier
    pub user: String,
    /// Serialized timestamp, passed through as stored
    pub publish_time: String,
    /// Cover URL (or bare filename when no gateway is configured)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
}

/// Full body of one blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogContent {
    pub id: BlogId,
    pub body: String,
}

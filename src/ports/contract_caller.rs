//! # Contract Caller Port
//!
//! The outbound seam between the adapter and the chain: one read-only
//! contract call in, raw ABI return data out.

use crate::abi::Address;
use crate::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Port interface for read-only contract calls
#[async_trait]
pub trait ContractCaller: Send + Sync + Debug {
    /// Execute `data` against the contract at `to` without creating a
    /// transaction, returning the raw return data.
    ///
    /// # Errors
    ///
    /// Returns a transport-class error if the endpoint cannot be reached,
    /// answers with a non-success status or malformed body, or reports a
    /// JSON-RPC error (including reverts).
    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>>;

    /// Where calls are sent, for logging
    fn endpoint(&self) -> &str;
}

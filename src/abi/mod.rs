//! # ABI Module
//!
//! Just enough of the Solidity ABI to talk to the blog contract: function
//! selectors, `bytes` argument encoding, `bytes` / `bytes[]` tuple decoding,
//! addresses, and the descriptor that says which functions to call and how
//! their columns map onto record fields.

pub mod address;
pub mod codec;
pub mod descriptor;

pub use address::Address;
pub use codec::{decode_bytes, decode_bytes_columns, encode_call, function_selector};
pub use descriptor::{AbiDescriptor, BlogField, FieldLayout};

//! # Ports Module
//!
//! Port interfaces for the hexagonal layout of the crate.
//!
//! - [`BlogServicePort`] is what callers use to read posts.
//! - [`ContractCaller`] is what the contract adapter needs from the chain.
//!
//! Adapters in [`crate::adapters`] implement the first on top of the second;
//! [`crate::client::JsonRpcClient`] implements the second over HTTP.

pub mod blog_service;
pub mod contract_caller;

pub use blog_service::BlogServicePort;
pub use contract_caller::ContractCaller;

pub mod abi;
pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod ports;

pub use abi::{AbiDescriptor, Address, BlogField, FieldLayout};
pub use adapters::ContractBlogAdapter;
pub use client::{BlogContent, BlogId, BlogListItem, JsonRpcClient};
pub use config::{Config, ConfigOverrides, Preset};
pub use error::{Error, ErrorKind, Result};
pub use ports::{BlogServicePort, ContractCaller};

//! # Adapters Module
//!
//! Concrete implementations of the port interfaces defined in
//! [`crate::ports`].
//!
//! ## Example Usage
//!
//! ```no_run
//! use chain_blog_reader::adapters::ContractBlogAdapter;
//! use chain_blog_reader::ports::BlogServicePort;
//! use chain_blog_reader::Config;
//! use std::sync::Arc;
//!
//! # async fn example() -> chain_blog_reader::Result<()> {
//! let adapter = ContractBlogAdapter::new(&Config::default())?;
//! let blogs: Arc<dyn BlogServicePort> = Arc::new(adapter);
//!
//! for post in blogs.fetch_list().await? {
//!     println!("{} {}", post.id, post.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod contract_blog_adapter;

pub use contract_blog_adapter::{gateway_url, ContractBlogAdapter};

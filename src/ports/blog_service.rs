//! # Blog Service Port
//!
//! Defines the port interface for reading blog posts. Callers (the CLI, a
//! web frontend, tests) depend on this trait rather than on the contract
//! adapter, so a different storage backend can be swapped in.

use crate::client::{BlogContent, BlogId, BlogListItem};
use crate::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Port interface for blog post reads
///
/// Implementations should:
/// - Return a fresh snapshot on every call
/// - Order list results newest-first
/// - Surface every failure to the caller unchanged
///
/// # Example
///
/// ```ignore
/// use chain_blog_reader::ports::BlogServicePort;
/// use std::sync::Arc;
///
/// async fn newest_title(blogs: Arc<dyn BlogServicePort>) -> chain_blog_reader::Result<Option<String>> {
///     let posts = blogs.fetch_list().await?;
///     Ok(posts.into_iter().next().map(|p| p.title))
/// }
/// ```
#[async_trait]
pub trait BlogServicePort: Send + Sync + Debug {
    /// Fetch every post summary, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The endpoint is unreachable or the call reverts
    /// - The returned tuple does not match the configured layout
    /// - Any field is not valid UTF-8
    ///
    /// A failed fetch never yields a partial list.
    async fn fetch_list(&self) -> Result<Vec<BlogListItem>>;

    /// Fetch the full body of one post
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier exactly as returned by [`fetch_list`](Self::fetch_list)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identifier is empty
    /// - The endpoint is unreachable or the call reverts
    /// - No post is stored under `id`
    /// - The body is not valid UTF-8
    async fn fetch_by_id(&self, id: &BlogId) -> Result<BlogContent>;
}

//! # Contract Blog Adapter
//!
//! Implements [`BlogServicePort`] on top of two read-only calls to the blog
//! contract: a list call returning parallel `bytes[]` columns and a content
//! call returning one `bytes` body.
//!
//! The contract is assumed to be append-only, so the last index is the most
//! recently published post. The adapter only reverses the order; it does not
//! check that assumption.

use crate::abi::{codec, Address, BlogField, FieldLayout};
use crate::client::{BlogContent, BlogId, BlogListItem, JsonRpcClient};
use crate::config::{Config, ContractConfig};
use crate::ports::{BlogServicePort, ContractCaller};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Build the gateway URL serving `file` from the file contract at `address`.
///
/// `https://<address, lower-case>.<domain>/<file>`; the file name is not
/// escaped and stray slashes at the joins are dropped.
#[must_use]
pub fn gateway_url(address: &Address, domain: &str, file: &str) -> String {
    format!(
        "https://{address}.{}/{}",
        domain.trim_matches('/'),
        file.trim_start_matches('/')
    )
}

/// Column positions resolved once from the layout
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    id: usize,
    title: usize,
    description: usize,
    user: usize,
    publish_time: usize,
    cover: Option<usize>,
    blog_url: Option<usize>,
}

impl ColumnIndex {
    fn from_layout(layout: &FieldLayout) -> Result<Self> {
        let required = |field: BlogField| {
            layout.position(field).ok_or_else(|| {
                Error::invalid_input("layout", format!("required field '{field}' is missing"))
            })
        };
        Ok(Self {
            id: required(BlogField::Id)?,
            title: required(BlogField::Title)?,
            description: required(BlogField::Description)?,
            user: required(BlogField::User)?,
            publish_time: required(BlogField::PublishTime)?,
            cover: layout.position(BlogField::Cover),
            blog_url: layout.position(BlogField::BlogUrl),
        })
    }
}

/// Blog reader backed by an on-chain contract
pub struct ContractBlogAdapter {
    caller: Arc<dyn ContractCaller>,
    contract: ContractConfig,
    columns: ColumnIndex,
    list_calldata: Vec<u8>,
    content_selector: [u8; 4],
}

impl std::fmt::Debug for ContractBlogAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractBlogAdapter")
            .field("endpoint", &self.caller.endpoint())
            .field("contract", &self.contract.address)
            .field("list_function", &self.contract.abi.list_function)
            .field("content_function", &self.contract.abi.content_function)
            .field("arity", &self.contract.abi.layout.arity())
            .finish_non_exhaustive()
    }
}

impl ContractBlogAdapter {
    /// Create an adapter that talks JSON-RPC to the configured endpoint
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let caller = Arc::new(JsonRpcClient::new(&config.rpc)?);
        Self::with_caller(caller, config.contract.clone())
    }

    /// Create an adapter over any [`ContractCaller`]
    pub fn with_caller(caller: Arc<dyn ContractCaller>, contract: ContractConfig) -> Result<Self> {
        contract.abi.validate()?;
        let columns = ColumnIndex::from_layout(&contract.abi.layout)?;
        let list_calldata = codec::encode_call(contract.abi.list_selector(), &[]);
        let content_selector = contract.abi.content_selector();

        info!(
            "Initialized blog adapter for {} via {} ({} columns)",
            contract.address,
            caller.endpoint(),
            contract.abi.layout.arity()
        );

        Ok(Self {
            caller,
            contract,
            columns,
            list_calldata,
            content_selector,
        })
    }

    #[must_use]
    pub const fn contract(&self) -> &ContractConfig {
        &self.contract
    }

    fn cover_url(&self, cover: String) -> String {
        match &self.contract.secondary_address {
            Some(address) => gateway_url(address, &self.contract.gateway_domain, &cover),
            None => cover,
        }
    }

    /// Zip decoded columns into records, last contract index first
    fn build_items(&self, columns: &[Vec<&[u8]>]) -> Result<Vec<BlogListItem>> {
        let fields = self.contract.abi.layout.fields();
        let len = columns.first().map_or(0, Vec::len);
        if let Some((field, column)) = fields
            .iter()
            .zip(columns)
            .find(|(_, column)| column.len() != len)
        {
            return Err(Error::contract_mismatch(
                format!("{len} entries in every column"),
                format!("{} entries in '{field}'", column.len()),
            ));
        }

        let text = |column: usize, index: usize| -> Result<String> {
            String::from_utf8(columns[column][index].to_vec()).map_err(|source| Error::Decode {
                field: fields[column].name().to_string(),
                index,
                source,
            })
        };

        let idx = self.columns;
        (0..len)
            .rev()
            .map(|i| {
                Ok(BlogListItem {
                    id: BlogId::from(columns[idx.id][i]),
                    title: text(idx.title, i)?,
                    description: text(idx.description, i)?,
                    user: text(idx.user, i)?,
                    publish_time: text(idx.publish_time, i)?,
                    cover: idx
                        .cover
                        .map(|c| text(c, i).map(|cover| self.cover_url(cover)))
                        .transpose()?,
                    blog_url: idx.blog_url.map(|c| text(c, i)).transpose()?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl BlogServicePort for ContractBlogAdapter {
    #[instrument(skip(self), fields(contract = %self.contract.address))]
    async fn fetch_list(&self) -> Result<Vec<BlogListItem>> {
        let raw = self
            .caller
            .call(&self.contract.address, &self.list_calldata)
            .await?;

        let columns = codec::decode_bytes_columns(&raw, self.contract.abi.layout.arity())
            .map_err(|e| {
                warn!("{} returned an unexpected shape: {}", self.contract.abi.list_signature(), e);
                e
            })?;
        let items = self.build_items(&columns)?;

        debug!("Fetched {} blog entries", items.len());
        Ok(items)
    }

    #[instrument(skip(self, id), fields(contract = %self.contract.address, id = %id))]
    async fn fetch_by_id(&self, id: &BlogId) -> Result<BlogContent> {
        if id.is_empty() {
            return Err(Error::invalid_input("id", "identifier cannot be empty"));
        }

        let calldata = codec::encode_call(self.content_selector, &[id.as_bytes()]);
        let raw = self.caller.call(&self.contract.address, &calldata).await?;
        let body = codec::decode_bytes(&raw)?;

        if body.is_empty() {
            return Err(Error::NotFound { id: id.to_string() });
        }

        let body = String::from_utf8(body.to_vec()).map_err(|source| Error::Decode {
            field: "content".to_string(),
            index: 0,
            source,
        })?;

        debug!("Fetched {} bytes of content", body.len());
        Ok(BlogContent {
            id: id.clone(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::codec::{encode_bytes, encode_bytes_columns};
    use crate::error::ErrorKind;
    use std::sync::Mutex;

    /// Replays a canned response and records the calldata it was sent
    #[derive(Debug, Default)]
    struct CannedCaller {
        response: Vec<u8>,
        calls: Mutex<Vec<Vec<u8>>>,
    }

    impl CannedCaller {
        fn new(response: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ContractCaller for CannedCaller {
        async fn call(&self, _to: &Address, data: &[u8]) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(data.to_vec());
            Ok(self.response.clone())
        }

        fn endpoint(&self) -> &str {
            "memory://canned"
        }
    }

    fn record(tag: &str) -> Vec<Vec<u8>> {
        ["id", "title", "desc", "user", "time", "cover.png"]
            .iter()
            .map(|f| format!("{tag}-{f}").into_bytes())
            .collect()
    }

    /// Transpose records into the contract's column-per-field shape
    fn columns(records: &[Vec<Vec<u8>>]) -> Vec<Vec<Vec<u8>>> {
        let arity = records.first().map_or(6, Vec::len);
        (0..arity)
            .map(|c| records.iter().map(|r| r[c].clone()).collect())
            .collect()
    }

    fn adapter(caller: Arc<CannedCaller>, contract: ContractConfig) -> ContractBlogAdapter {
        ContractBlogAdapter::with_caller(caller, contract).unwrap()
    }

    // Newest-first relies on the contract appending posts; the adapter only
    // reverses contract order.
    #[tokio::test]
    async fn test_fetch_list_is_newest_first() {
        let data = encode_bytes_columns(&columns(&[record("a"), record("b"), record("c")]));
        let caller = CannedCaller::new(data);
        let blogs = adapter(caller.clone(), ContractConfig::default());

        let items = blogs.fetch_list().await.unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["c-title", "b-title", "a-title"]);
        assert_eq!(items[0].id, BlogId::from(&b"c-id"[..]));

        let calls = caller.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], blogs.contract().abi.list_selector().to_vec());
    }

    #[tokio::test]
    async fn test_fetch_list_builds_gateway_cover() {
        let data = encode_bytes_columns(&columns(&[record("a")]));
        let blogs = adapter(CannedCaller::new(data), ContractConfig::default());

        let items = blogs.fetch_list().await.unwrap();
        assert_eq!(
            items[0].cover.as_deref(),
            Some("https://0x80bfb57ff7820accb9fcfa2c9633ffaaeef60f62.w3q-g.w3link.io/a-cover.png")
        );
    }

    #[tokio::test]
    async fn test_fetch_list_without_gateway_keeps_raw_cover() {
        let data = encode_bytes_columns(&columns(&[record("a")]));
        let contract = ContractConfig {
            secondary_address: None,
            ..ContractConfig::default()
        };
        let items = adapter(CannedCaller::new(data), contract).fetch_list().await.unwrap();
        assert_eq!(items[0].cover.as_deref(), Some("a-cover.png"));
        assert_eq!(items[0].blog_url, None);
    }

    #[tokio::test]
    async fn test_fetch_list_with_blog_url_layout() {
        let mut rec = record("a");
        rec.push(b"https://blog.example/a".to_vec());
        let data = encode_bytes_columns(&columns(&[rec]));
        let mut contract = ContractConfig::default();
        contract.abi.layout = FieldLayout::with_blog_url();

        let items = adapter(CannedCaller::new(data), contract).fetch_list().await.unwrap();
        assert_eq!(items[0].blog_url.as_deref(), Some("https://blog.example/a"));
    }

    #[tokio::test]
    async fn test_fetch_list_empty_contract() {
        let data = encode_bytes_columns(&vec![Vec::new(); 6]);
        let items = adapter(CannedCaller::new(data), ContractConfig::default())
            .fetch_list()
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_list_invalid_utf8_is_decode_error() {
        let mut bad = record("b");
        bad[3] = vec![0xc3, 0x28];
        let data = encode_bytes_columns(&columns(&[record("a"), bad]));
        let err = adapter(CannedCaller::new(data), ContractConfig::default())
            .fetch_list()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
        match err {
            Error::Decode { field, index, .. } => {
                assert_eq!(field, "user");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_list_ragged_columns_is_mismatch() {
        let mut cols = columns(&[record("a"), record("b")]);
        cols[2].pop();
        let data = encode_bytes_columns(&cols);
        let err = adapter(CannedCaller::new(data), ContractConfig::default())
            .fetch_list()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContractMismatch);
    }

    #[tokio::test]
    async fn test_fetch_list_wrong_arity_is_mismatch() {
        let mut contract = ContractConfig::default();
        contract.abi.layout = FieldLayout::with_blog_url();
        let data = encode_bytes_columns(&columns(&[record("a")]));
        let err = adapter(CannedCaller::new(data), contract)
            .fetch_list()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContractMismatch);
    }

    #[tokio::test]
    async fn test_fetch_by_id_sends_encoded_id() {
        let caller = CannedCaller::new(encode_bytes("# Hello\n\nbody".as_bytes()));
        let blogs = adapter(caller.clone(), ContractConfig::default());
        let id = BlogId::from(&b"uuid-1"[..]);

        let content = blogs.fetch_by_id(&id).await.unwrap();
        assert_eq!(content.body, "# Hello\n\nbody");
        assert_eq!(content.id, id);

        let calls = caller.calls.lock().unwrap();
        let expected = codec::encode_call(blogs.contract().abi.content_selector(), &[&b"uuid-1"[..]]);
        assert_eq!(calls[0], expected);
    }

    #[tokio::test]
    async fn test_fetch_by_id_empty_body_is_not_found() {
        let blogs = adapter(CannedCaller::new(encode_bytes(b"")), ContractConfig::default());
        let err = blogs
            .fetch_by_id(&BlogId::from(&b"missing"[..]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_by_id_invalid_utf8_is_decode_error() {
        let blogs = adapter(CannedCaller::new(encode_bytes(&[0xff, 0xfe])), ContractConfig::default());
        let err = blogs.fetch_by_id(&BlogId::from(&b"x"[..])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_fetch_by_id_rejects_empty_id_without_calling() {
        let caller = CannedCaller::new(encode_bytes(b"unused"));
        let blogs = adapter(caller.clone(), ContractConfig::default());
        let err = blogs.fetch_by_id(&BlogId::new(Vec::new())).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(caller.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_gateway_url_joins_cleanly() {
        let address: Address = "0xABCDEF0123456789abcdef0123456789ABCDEF01".parse().unwrap();
        assert_eq!(
            gateway_url(&address, "w3q-g.w3link.io/", "/img1.png"),
            "https://0xabcdef0123456789abcdef0123456789abcdef01.w3q-g.w3link.io/img1.png"
        );
        assert_eq!(
            gateway_url(&address, "gw.example", "my image.png"),
            "https://0xabcdef0123456789abcdef0123456789abcdef01.gw.example/my image.png"
        );
    }
}

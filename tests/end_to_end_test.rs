use chain_blog_reader::abi::codec::{encode_bytes, encode_bytes_columns, encode_hex};
use chain_blog_reader::{
    BlogId, BlogServicePort, Config, ContractBlogAdapter, Error, ErrorKind, FieldLayout,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.rpc.endpoint_url = server.uri();
    config.rpc.timeout_secs = 2;
    config
}

fn rpc_result(data: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": encode_hex(data),
    }))
}

fn rpc_error(code: i64, message: &str, data: Option<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message, "data": data },
    }))
}

/// Hex selector as it appears in the request's `data` field
fn selector_hex(selector: [u8; 4]) -> String {
    hex::encode(selector)
}

fn blog_columns(posts: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut columns = vec![Vec::new(); 6];
    for (id, title, time) in posts {
        columns[0].push(id.as_bytes().to_vec());
        columns[1].push(title.as_bytes().to_vec());
        columns[2].push(format!("About {title}").into_bytes());
        columns[3].push(b"alice".to_vec());
        columns[4].push(time.as_bytes().to_vec());
        columns[5].push(format!("{id}.png").into_bytes());
    }
    encode_bytes_columns(&columns)
}

/// Complete read flow: list, then open the newest post by its id
#[tokio::test]
async fn test_list_then_read_workflow() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let abi = config.contract.abi.clone();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("eth_call"))
        .and(body_string_contains(selector_hex(abi.list_selector())))
        .respond_with(rpc_result(&blog_columns(&[
            ("uuid-a", "First", "1650000000"),
            ("uuid-b", "Second", "1650000100"),
            ("uuid-c", "Third", "1650000200"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(selector_hex(abi.content_selector())))
        .and(body_string_contains(hex::encode("uuid-c")))
        .respond_with(rpc_result(&encode_bytes("# Third\n\nNewest post".as_bytes())))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config).unwrap();

    let items = blogs.fetch_list().await.unwrap();
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);
    assert_eq!(items[0].publish_time, "1650000200");
    assert_eq!(items[0].description, "About Third");
    assert_eq!(
        items[0].cover.as_deref(),
        Some("https://0x80bfb57ff7820accb9fcfa2c9633ffaaeef60f62.w3q-g.w3link.io/uuid-c.png")
    );

    // The id is passed back exactly as received.
    let content = blogs.fetch_by_id(&items[0].id).await.unwrap();
    assert_eq!(content.body, "# Third\n\nNewest post");
}

#[tokio::test]
async fn test_fetch_by_id_is_idempotent() {
    let server = MockServer::start().await;
    let config = config_for(&server);

    Mock::given(method("POST"))
        .respond_with(rpc_result(&encode_bytes(b"same body")))
        .expect(2)
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config).unwrap();
    let id = BlogId::from(&b"uuid-1"[..]);
    let first = blogs.fetch_by_id(&id).await.unwrap();
    let second = blogs.fetch_by_id(&id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_revert_surfaces_transport_error() {
    let server = MockServer::start().await;
    let mut reason = vec![0x08, 0xc3, 0x79, 0xa0];
    reason.extend(encode_bytes(b"paused"));

    Mock::given(method("POST"))
        .respond_with(rpc_error(3, "execution reverted", Some(encode_hex(&reason))))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config_for(&server)).unwrap();
    let err = blogs.fetch_list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    match err {
        Error::Rpc { code, message } => {
            assert_eq!(code, 3);
            assert_eq!(message, "execution reverted: paused");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_surfaces_transport_error() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.rpc.timeout_secs = 1;

    Mock::given(method("POST"))
        .respond_with(rpc_result(&blog_columns(&[])).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config).unwrap();
    let err = blogs.fetch_list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_http_failure_surfaces_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config_for(&server)).unwrap();
    let err = blogs.fetch_list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_response_surfaces_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config_for(&server)).unwrap();
    let err = blogs.fetch_list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_unreachable_endpoint_surfaces_transport_error() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    drop(server);

    let blogs = ContractBlogAdapter::new(&config).unwrap();
    let err = blogs.fetch_list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_layout_mismatch_surfaces_contract_mismatch() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.contract.abi.layout = FieldLayout::minimal();

    Mock::given(method("POST"))
        .respond_with(rpc_result(&blog_columns(&[("uuid-a", "First", "1")])))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config).unwrap();
    let err = blogs.fetch_list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContractMismatch);
}

#[tokio::test]
async fn test_missing_post_surfaces_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(&encode_bytes(b"")))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config_for(&server)).unwrap();
    let err = blogs
        .fetch_by_id(&"0x6e6f7065".parse().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Record not found: 0x6e6f7065");
}

#[tokio::test]
async fn test_invalid_utf8_surfaces_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(&encode_bytes(&[0x66, 0x6f, 0x80])))
        .mount(&server)
        .await;

    let blogs = ContractBlogAdapter::new(&config_for(&server)).unwrap();
    let err = blogs
        .fetch_by_id(&BlogId::from(&b"uuid-1"[..]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

//! Integration tests for deferred parameters and streamed uploads.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{stream, Stream};
use tenant_rest::clients::{RequestEvent, RequestObserver, STREAM_PLACEHOLDER};
use tenant_rest::{
    BaseUrl, Credentials, HttpMethod, Params, RecordingObserver, RestClient, RestContext,
    RestError, UploadStream,
};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHUNK_SIZE: usize = 64 * 1024;
const CHUNKS: usize = 160;

/// Records requests and producer invocations in a shared, ordered log.
#[derive(Default)]
struct OrderLog(Mutex<Vec<String>>);

impl OrderLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl RequestObserver for OrderLog {
    fn on_request(&self, event: &RequestEvent<'_>) {
        let path = event.url.splitn(4, '/').nth(3).unwrap_or_default();
        self.push(format!("request /{path}"));
    }
}

/// An upload source that raises a flag when it is released.
struct TrackedSource {
    chunks: std::vec::IntoIter<Bytes>,
    released: Arc<AtomicBool>,
}

impl TrackedSource {
    fn new(released: &Arc<AtomicBool>) -> Self {
        Self {
            chunks: vec![Bytes::from_static(b"hello")].into_iter(),
            released: Arc::clone(released),
        }
    }
}

impl Stream for TrackedSource {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.chunks.next().map(Ok))
    }
}

impl Drop for TrackedSource {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

fn ten_megabytes() -> UploadStream {
    let chunks = (0..CHUNKS).map(|_| Ok::<_, io::Error>(Bytes::from(vec![b'a'; CHUNK_SIZE])));
    UploadStream::new(stream::iter(chunks))
        .file_name("large.bin")
        .mime("application/octet-stream")
        .length((CHUNK_SIZE * CHUNKS) as u64)
}

#[tokio::test]
async fn test_stream_param_switches_post_to_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/content/create"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "c:cam:1"})))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = Arc::new(RecordingObserver::default());
    let client = RestClient::builder().observer(recorder.clone()).build();
    let ctx = RestContext::anonymous(BaseUrl::new(server.uri()).unwrap());
    let params = Params::new()
        .with("resourceSubType", "file")
        .with("viewers", vec!["u:cam:a", "u:cam:b"])
        .deferred("file", || ten_megabytes().into());

    let response = client.post(&ctx, "/api/content/create", params).await.unwrap();
    assert_eq!(response.code, 201);

    let requests = server.received_requests().await.unwrap();
    let body = &requests[0].body;
    assert!(body.len() > CHUNK_SIZE * CHUNKS);

    let text = String::from_utf8_lossy(body);
    assert_eq!(text.matches("name=\"file\"").count(), 1);
    assert!(text.contains("filename=\"large.bin\""));
    assert_eq!(text.matches("name=\"viewers\"").count(), 2);
    assert!(text.contains("name=\"resourceSubType\""));

    let events = recorder.events();
    assert!(matches!(
        &events[0],
        tenant_rest::clients::ObservedEvent::Request { method: HttpMethod::Post, data, .. }
            if data.contains(&("file".to_string(), STREAM_PLACEHOLDER.to_string()))
    ));
}

#[tokio::test]
async fn test_stream_param_switches_put_to_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/user/u:cam:alice/picture"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let ctx = RestContext::anonymous(BaseUrl::new(server.uri()).unwrap());
    let params = Params::new().deferred("file", || {
        UploadStream::from_bytes("avatar.png", vec![0x89, b'P', b'N', b'G'])
            .mime("image/png")
            .into()
    });

    client
        .put(&ctx, "/api/user/u:cam:alice/picture", params)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let text = String::from_utf8_lossy(&requests[0].body);
    assert!(text.contains("Content-Type: image/png"));
}

#[tokio::test]
async fn test_producer_runs_after_login_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/content/create"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let log = Arc::new(OrderLog::default());
    let client = RestClient::builder().observer(log.clone()).build();
    let ctx = RestContext::authenticated(
        BaseUrl::new(server.uri()).unwrap(),
        Credentials::new("alice", "s3cret").unwrap(),
    );

    let producer_log = Arc::clone(&log);
    let params = Params::new().deferred("file", move || {
        producer_log.push("produce");
        UploadStream::from_bytes("notes.txt", "hello").into()
    });

    client.post(&ctx, "/api/content/create", params).await.unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "request /api/auth/login",
            "produce",
            "request /api/content/create",
        ]
    );
}

#[tokio::test]
async fn test_producer_is_not_invoked_when_login_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let ctx = RestContext::authenticated(
        BaseUrl::new(server.uri()).unwrap(),
        Credentials::new("alice", "wrong").unwrap(),
    );

    let invoked = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&invoked);
    let params = Params::new().deferred("file", move || {
        *flag.lock().unwrap() = true;
        UploadStream::from_bytes("notes.txt", "hello").into()
    });

    let result = client.post(&ctx, "/api/content/create", params).await;

    assert!(matches!(result, Err(RestError::Auth(_))));
    assert!(!*invoked.lock().unwrap());
}

#[tokio::test]
async fn test_stream_is_dropped_from_query_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/content/c:cam:1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let ctx = RestContext::anonymous(BaseUrl::new(server.uri()).unwrap());
    let params = Params::new()
        .with("signature", "abc")
        .deferred("file", || UploadStream::from_bytes("x", "y").into());

    client.get(&ctx, "/api/content/c:cam:1", params).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("signature=abc"));
}

#[tokio::test]
async fn test_stream_is_released_when_server_is_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = RestClient::new();
    let ctx = RestContext::anonymous(BaseUrl::new(format!("http://127.0.0.1:{port}")).unwrap());

    let released = Arc::new(AtomicBool::new(false));
    let source = TrackedSource::new(&released);
    let params = Params::new().deferred("file", move || {
        UploadStream::new(source).file_name("notes.txt").into()
    });

    let result = client.post(&ctx, "/api/content/create", params).await;

    assert!(matches!(result, Err(RestError::Transport(_))));
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_stream_is_released_when_mime_type_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/content/create"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let ctx = RestContext::anonymous(BaseUrl::new(server.uri()).unwrap());

    let released = Arc::new(AtomicBool::new(false));
    let source = TrackedSource::new(&released);
    let params = Params::new().deferred("file", move || {
        UploadStream::new(source).mime("not a mime type").into()
    });

    let result = client.post(&ctx, "/api/content/create", params).await;

    assert!(matches!(result, Err(RestError::Validation(_))));
    assert!(released.load(Ordering::SeqCst));
}

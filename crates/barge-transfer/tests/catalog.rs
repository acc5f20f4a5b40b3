//! Catalog client behavior against a local single-request HTTP stub.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use barge_transfer::{CatalogClient, FetchError};

/// Serves exactly one request with `response`, handing back the base URL
/// and the raw request bytes the client sent.
async fn one_shot_server(response: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap_or(0);
        let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    (format!("http://{addr}"), rx)
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

#[tokio::test]
async fn sends_api_key_and_parses_the_file_list() {
    let (url, request) = one_shot_server(http_response(
        "200 OK",
        r#"{"files": ["https://a.example/1", "https://a.example/2"]}"#,
    ))
    .await;

    let release = CatalogClient::new("secret")
        .fetch_release("papers", &url)
        .await
        .unwrap();

    assert_eq!(
        release.file_urls,
        vec!["https://a.example/1", "https://a.example/2"]
    );
    let sent = request.await.unwrap();
    assert!(sent.contains("x-api-key: secret"));
}

#[tokio::test]
async fn non_2xx_response_is_a_status_error() {
    let (url, _request) = one_shot_server(http_response("403 Forbidden", "denied")).await;

    let err = CatalogClient::new("secret")
        .fetch_release("papers", &url)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Status { ref dataset, status: 403 } if dataset == "papers"
    ));
}

#[tokio::test]
async fn transport_failure_carries_the_dataset() {
    // Bind then drop so the port is known to refuse connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = CatalogClient::new("secret")
        .fetch_release("papers", &format!("http://{addr}"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http { ref dataset, .. } if dataset == "papers"));
}

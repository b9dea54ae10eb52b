//! Local HTTP endpoint for exercising the real client code paths.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server that answers exactly one request with a canned response.
pub struct OneShotServer {
    /// Base URL, without a trailing slash.
    pub url: String,
    /// Resolves to the raw request head once it has been answered.
    pub request: JoinHandle<String>,
}

/// Bind to an ephemeral port and answer the first request with `status_line`
/// (e.g. `"200 OK"`) and `body`.
pub async fn serve_once(status_line: &'static str, body: &'static str) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let request = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: text/plain; charset=utf-8\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        String::from_utf8_lossy(&head).into_owned()
    });

    OneShotServer { url, request }
}

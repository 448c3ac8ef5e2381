use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A minimal mock HTTP server built on tokio that returns canned responses.
pub(crate) struct MockServer {
    listener: TcpListener,
    pub base_url: String,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{port}");
        Self { listener, base_url }
    }

    /// Accept one connection, respond with the given status and JSON body,
    /// and return the raw request head that was received.
    pub async fn respond_once(self, status_code: u16, body: &str) -> String {
        let mut requests = self.respond_sequence(vec![(status_code, body.to_owned())]).await;
        requests.remove(0)
    }

    /// Serve one canned response per connection, in order.
    pub async fn respond_sequence(self, responses: Vec<(u16, String)>) -> Vec<String> {
        let mut requests = Vec::with_capacity(responses.len());
        for (status_code, body) in responses {
            let (mut stream, _) = self.listener.accept().await.unwrap();

            requests.push(read_request(&mut stream).await);

            let response = format!(
                "HTTP/1.1 {status_code} OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        requests
    }
}

/// Read the request head plus a `Content-Length` body, if any.
async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

//! One-shot HTTP stub for collaborator tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    /// Path plus query string, as sent.
    pub target: String,
    pub body: String,
}

pub(crate) struct HttpStub {
    pub base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl HttpStub {
    /// Answer one request per entry of `responses` (status, body), then stop.
    /// Every response closes its connection so clients cannot pool it.
    pub fn serve(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                let mut request_line = String::new();
                reader.read_line(&mut request_line).expect("request line");
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();

                let mut content_length = 0usize;
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).expect("header");
                    let header = header.trim_end();
                    if header.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = header.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                }
                let mut payload = vec![0u8; content_length];
                reader.read_exact(&mut payload).expect("body");

                let mut stream = stream;
                let reply = format!(
                    "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).expect("reply");
                seen.push(RecordedRequest {
                    method,
                    target,
                    body: String::from_utf8_lossy(&payload).into_owned(),
                });
            }
            seen
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    pub fn ok(count: usize) -> Self {
        Self::serve(vec![(200, "{}".to_string()); count])
    }

    pub fn requests(self) -> Vec<RecordedRequest> {
        self.handle.join().expect("stub thread")
    }
}

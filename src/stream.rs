//! MJPEG publisher: serves the composited feed at `/video_feed` as
//! `multipart/x-mixed-replace`, one JPEG part per consumed frame.
//!
//! A single thread accepts viewers and pushes frames. Each frame is encoded
//! once per tick no matter how many viewers are attached. Request heads are
//! read without blocking, so a slow client never holds up the feed.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::bridge::FrameBridge;
use crate::config::StreamConfig;
use crate::log_debug;
use crate::vision::Frame;

pub const STREAM_PATH: &str = "/video_feed";
const BOUNDARY: &str = "frame";
const MAX_REQUEST_HEAD: usize = 8 * 1024;
/// Total time a new connection gets to send its request head.
const ADMIT_DEADLINE: Duration = Duration::from_millis(500);
const CLIENT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

pub struct StreamServer {
    local_addr: SocketAddr,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StreamServer {
    /// Bind and start publishing. Failing to bind is fatal to the caller.
    pub fn spawn(config: &StreamConfig, bridge: FrameBridge) -> Result<Self> {
        let listener = TcpListener::bind(&config.addr)
            .with_context(|| format!("failed to bind stream server on {}", config.addr))?;
        listener
            .set_nonblocking(true)
            .context("failed to make stream listener non-blocking")?;
        let local_addr = listener.local_addr().context("stream listener address")?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        let worker_flag = Arc::clone(&stop_flag);
        let interval = config.interval;
        let quality = config.jpeg_quality;
        let handle = thread::Builder::new()
            .name("narcissus-stream".into())
            .spawn(move || {
                run_publisher(listener, bridge, interval, quality, &worker_flag);
                log_debug("stream publisher exiting");
            })
            .context("failed to spawn stream publisher")?;

        info!(addr = %local_addr, path = STREAM_PATH, "streaming MJPEG");
        Ok(Self {
            local_addr,
            stop_flag,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log_debug("stream publisher panicked");
            }
        }
    }
}

impl Drop for StreamServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A connection whose request head has not fully arrived yet.
struct PendingClient {
    stream: TcpStream,
    peer: SocketAddr,
    head: Vec<u8>,
    since: Instant,
}

enum HeadProgress {
    Complete,
    Waiting,
    Closed,
}

fn run_publisher(
    listener: TcpListener,
    bridge: FrameBridge,
    interval: Duration,
    quality: u8,
    stop_flag: &AtomicBool,
) {
    let mut pending: Vec<PendingClient> = Vec::new();
    let mut viewers: Vec<TcpStream> = Vec::new();
    while !stop_flag.load(Ordering::Relaxed) {
        accept_pending(&listener, &mut pending);
        if !pending.is_empty() {
            advance_pending(&mut pending, &mut viewers);
        }

        if !viewers.is_empty() {
            if let Some(frame) = bridge.consume() {
                match encode_part(&frame, quality) {
                    Ok(part) => {
                        let before = viewers.len();
                        viewers.retain_mut(|viewer| viewer.write_all(&part).is_ok());
                        if viewers.len() < before {
                            debug!(remaining = viewers.len(), "stream viewer disconnected");
                        }
                    }
                    Err(err) => warn!(error = %err, "jpeg encode failed"),
                }
            }
        }
        thread::sleep(interval);
    }
}

fn accept_pending(listener: &TcpListener, pending: &mut Vec<PendingClient>) {
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(err) = stream.set_nonblocking(true) {
                    debug!(%peer, error = %err, "stream client setup failed");
                    continue;
                }
                pending.push(PendingClient {
                    stream,
                    peer,
                    head: Vec::with_capacity(512),
                    since: Instant::now(),
                });
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
            Err(err) => {
                warn!(error = %err, "stream accept failed");
                break;
            }
        }
    }
}

/// Read whatever each pending client has sent so far without blocking.
/// Clients that finish their head are answered; the rest get
/// `ADMIT_DEADLINE` in total before they are dropped.
fn advance_pending(pending: &mut Vec<PendingClient>, viewers: &mut Vec<TcpStream>) {
    for mut client in std::mem::take(pending) {
        match read_available(&mut client) {
            HeadProgress::Complete => {
                if let Some(viewer) = admit(client.stream, client.peer, &client.head) {
                    viewers.push(viewer);
                }
            }
            HeadProgress::Waiting if client.since.elapsed() < ADMIT_DEADLINE => {
                pending.push(client);
            }
            HeadProgress::Waiting => {
                debug!(peer = %client.peer, "stream request head timed out");
            }
            HeadProgress::Closed => {
                debug!(peer = %client.peer, "stream client left before sending a request");
            }
        }
    }
}

fn read_available(client: &mut PendingClient) -> HeadProgress {
    let mut chunk = [0u8; 512];
    loop {
        match client.stream.read(&mut chunk) {
            Ok(0) => return HeadProgress::Closed,
            Ok(read) => {
                client.head.extend_from_slice(&chunk[..read]);
                if head_complete(&client.head) || client.head.len() >= MAX_REQUEST_HEAD {
                    return HeadProgress::Complete;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => return HeadProgress::Waiting,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return HeadProgress::Closed,
        }
    }
}

fn head_complete(head: &[u8]) -> bool {
    head.windows(4).any(|w| w == b"\r\n\r\n")
}

/// Keep the connection only for `GET /video_feed`.
fn admit(mut stream: TcpStream, peer: SocketAddr, head: &[u8]) -> Option<TcpStream> {
    stream.set_nonblocking(false).ok()?;
    stream.set_write_timeout(Some(CLIENT_WRITE_TIMEOUT)).ok()?;

    let head = String::from_utf8_lossy(head);
    let mut parts = head.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();
    let path = target.split('?').next().unwrap_or_default();

    if method != "GET" || path != STREAM_PATH {
        debug!(%peer, path, "stream request rejected");
        let body = "Not Found";
        let reply = format!(
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(reply.as_bytes());
        return None;
    }

    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace; boundary={BOUNDARY}\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(header.as_bytes()).ok()?;
    info!(%peer, "stream viewer connected");
    Some(stream)
}

/// One multipart section: boundary, headers, JPEG bytes.
pub fn encode_part(frame: &Frame, quality: u8) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(frame)
        .context("jpeg encode")?;
    let mut part = format!(
        "--{BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
        jpeg.len()
    )
    .into_bytes();
    part.extend_from_slice(&jpeg);
    part.extend_from_slice(b"\r\n");
    Ok(part)
}

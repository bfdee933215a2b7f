// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Minimal in-process HTTP backend for exercising the client in tests.
//!
//! Every accepted connection has its request head read, is counted, and then
//! gets the configured reply. Only available with the `mock` feature.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How the mock backend answers each request.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Send a JSON response after an optional delay.
    Json {
        status: u16,
        body: String,
        delay: Duration,
    },

    /// Accept the request and never answer.
    Hang,
}

impl MockReply {
    /// Immediate JSON response.
    pub fn json(status: u16, body: &str) -> Self {
        Self::delayed(status, body, Duration::ZERO)
    }

    /// JSON response sent after `delay`.
    pub fn delayed(status: u16, body: &str, delay: Duration) -> Self {
        MockReply::Json {
            status,
            body: body.to_string(),
            delay,
        }
    }
}

/// A running mock backend bound to an ephemeral localhost port.
///
/// The accept loop is aborted when the handle is dropped.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    accept_task: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start(reply: MockReply) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let hits = Arc::new(AtomicUsize::new(0));

        let accept_hits = hits.clone();
        let accept_task = tokio::spawn(async move {
            while let Ok((socket, peer)) = listener.accept().await {
                debug!("Mock backend accepted connection from {}", peer);
                let reply = reply.clone();
                let hits = accept_hits.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(socket, &reply, &hits).await {
                        debug!("Mock backend connection error: {}", e);
                    }
                });
            }
        });

        Ok(Self {
            addr,
            hits,
            accept_task,
        })
    }

    /// Origin to point a client at, e.g. `http://127.0.0.1:49152`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// Origin of a localhost port with nothing listening on it.
pub async fn unreachable_url() -> String {
    let addr = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener.local_addr().ok(),
        Err(_) => None,
    };
    match addr {
        // Listener is dropped above, so connections to this port are refused.
        Some(addr) => format!("http://{addr}"),
        None => "http://127.0.0.1:9".to_string(),
    }
}

async fn serve(mut socket: TcpStream, reply: &MockReply, hits: &AtomicUsize) -> io::Result<()> {
    read_request_head(&mut socket).await?;
    hits.fetch_add(1, Ordering::SeqCst);

    match reply {
        MockReply::Hang => {
            // Hold the socket open without answering.
            std::future::pending::<()>().await;
            Ok(())
        }
        MockReply::Json {
            status,
            body,
            delay,
        } => {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            let reason = reqwest::StatusCode::from_u16(*status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("Unknown");
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await?;
            socket.shutdown().await
        }
    }
}

async fn read_request_head(socket: &mut TcpStream) -> io::Result<()> {
    let mut head = Vec::with_capacity(512);
    let mut buf = [0u8; 512];
    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before request head",
            ));
        }
        head.extend_from_slice(&buf[..n]);
        if head.windows(4).any(|w| w == b"\r\n\r\n") {
            return Ok(());
        }
    }
}

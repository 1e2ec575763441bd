//! Multi-client TCP fan-out, split across the three roles CANboat's `n2kd`
//! exposes on consecutive ports: `BASE` serves each connecting client one
//! JSON dump of the current state then closes the socket; `BASE+1` streams
//! every decoded JSON line as it arrives; `BASE+2` streams derived NMEA 0183
//! sentences. Each stream client is served by its own task so one slow
//! reader can't stall the others.
use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::RenderContext;
use crate::core::RawMessage;
use crate::n2kd::state::{StateKey, StateMap};

/// Number of lines a lagging client can fall behind before it starts
/// missing broadcasts; mirrors `tokio::sync::broadcast`'s own backlog.
const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy)]
enum StreamRole {
    Json,
    Nmea0183,
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamRole::Json => write!(f, "JSON"),
            StreamRole::Nmea0183 => write!(f, "NMEA 0183"),
        }
    }
}

pub struct Server {
    json_sender: broadcast::Sender<Arc<str>>,
    nmea_sender: broadcast::Sender<Arc<str>>,
    state: Arc<Mutex<StateMap>>,
}

impl Server {
    pub fn new() -> Self {
        let (json_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (nmea_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            json_sender,
            nmea_sender,
            state: Arc::new(Mutex::new(StateMap::new())),
        }
    }

    /// Handle for feeding rendered JSON lines into the stream fan-out
    /// (`BASE+1`); also used for `-r` raw pass-through. Cheap to clone.
    pub fn json_sender(&self) -> broadcast::Sender<Arc<str>> {
        self.json_sender.clone()
    }

    /// Handle for feeding derived NMEA 0183 sentences into the stream
    /// fan-out (`BASE+2`). Cheap to clone.
    pub fn nmea_sender(&self) -> broadcast::Sender<Arc<str>> {
        self.nmea_sender.clone()
    }

    /// Shared state map backing the on-demand JSON dump (`BASE`); the
    /// caller's decode loop keeps this updated as messages arrive.
    pub fn state(&self) -> Arc<Mutex<StateMap>> {
        self.state.clone()
    }

    /// Bind and serve all three roles on `base_port`, `base_port + 1`, and
    /// `base_port + 2` until one of the listeners fails.
    pub async fn serve(self: &Arc<Self>, base_port: u16) -> std::io::Result<()> {
        let on_demand = self.clone().serve_on_demand(base_port);
        let json_stream = self.clone().serve_stream(base_port + 1, StreamRole::Json);
        let nmea_stream = self.clone().serve_stream(base_port + 2, StreamRole::Nmea0183);
        tokio::try_join!(on_demand, json_stream, nmea_stream)?;
        Ok(())
    }

    /// `BASE`: every connection gets one JSON-rendered line per entry
    /// currently in the state map, then the socket closes. No ongoing
    /// subscription; a one-shot dump is the entire contract for this role.
    async fn serve_on_demand(self: Arc<Self>, port: u16) -> std::io::Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        tracing::info!("n2kd on-demand JSON listening on 0.0.0.0:{port}");
        loop {
            let (mut socket, peer) = listener.accept().await?;
            let state = self.state.clone();
            tokio::spawn(async move {
                debug!("on-demand client connected: {peer}");
                let lines: Vec<String> = {
                    let state = state.lock().unwrap_or_else(|e| e.into_inner());
                    state.snapshot().map(render_snapshot_entry).collect()
                };
                for line in lines {
                    if socket.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                }
                let _ = socket.shutdown().await;
                debug!("on-demand client disconnected: {peer}");
            });
        }
    }

    /// `BASE+1`/`BASE+2`: every connection receives every line published to
    /// the matching sender from the moment it connects onward, until it
    /// disconnects or falls behind.
    async fn serve_stream(self: Arc<Self>, port: u16, role: StreamRole) -> std::io::Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        tracing::info!("n2kd {role} stream listening on 0.0.0.0:{port}");
        loop {
            let (socket, peer) = listener.accept().await?;
            let mut receiver = match role {
                StreamRole::Json => self.json_sender.subscribe(),
                StreamRole::Nmea0183 => self.nmea_sender.subscribe(),
            };
            tokio::spawn(async move {
                debug!("{role} client connected: {peer}");
                let mut socket = socket;
                loop {
                    match receiver.recv().await {
                        Ok(line) => {
                            if socket.write_all(line.as_bytes()).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("{role} client {peer} lagged, dropped {skipped} messages");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                debug!("{role} client disconnected: {peer}");
            });
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

fn render_snapshot_entry((key, message): (&StateKey, &RawMessage)) -> String {
    let ctx = RenderContext::default();
    match crate::catalog::lookup::find_descriptor(key.pgn, &message.data) {
        Some(descriptor) => match crate::engine::decode::decode_pgn(descriptor, &message.data) {
            Ok(decoded) => format!("{}\n", crate::render::render(&ctx, message, &decoded)),
            Err(e) => format!("{}\n", json!({"pgn": key.pgn, "src": key.src, "error": e.to_string()})),
        },
        None => format!("{}\n", json!({"pgn": key.pgn, "src": key.src, "error": "unrecognised pgn"})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcasts_to_all_json_subscribers() {
        let server = Server::new();
        let mut a = server.json_sender().subscribe();
        let mut b = server.json_sender().subscribe();
        server.json_sender().send(Arc::from("hello\n")).unwrap();
        assert_eq!(&*a.recv().await.unwrap(), "hello\n");
        assert_eq!(&*b.recv().await.unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_messages() {
        let server = Server::new();
        server.json_sender().send(Arc::from("before\n")).unwrap();
        let mut late = server.json_sender().subscribe();
        server.json_sender().send(Arc::from("after\n")).unwrap();
        assert_eq!(&*late.recv().await.unwrap(), "after\n");
    }

    #[tokio::test]
    async fn json_and_nmea_streams_are_independent() {
        let server = Server::new();
        let mut json = server.json_sender().subscribe();
        let mut nmea = server.nmea_sender().subscribe();
        server.json_sender().send(Arc::from("{}\n")).unwrap();
        server.nmea_sender().send(Arc::from("$GPGLL\r\n")).unwrap();
        assert_eq!(&*json.recv().await.unwrap(), "{}\n");
        assert_eq!(&*nmea.recv().await.unwrap(), "$GPGLL\r\n");
    }

    #[test]
    fn snapshot_renders_state_entries_as_json_lines() {
        let state = StateMap::new();
        let key = StateKey { pgn: 127251, src: 1, secondary: None };
        let message = RawMessage {
            timestamp: "t".into(),
            priority: 2,
            pgn: 127251,
            src: 1,
            dst: 255,
            data: vec![0xFF, 0x80, 0, 0, 0, 0xFF, 0xFF, 0xFF],
        };
        let mut state = state;
        state.insert(key, message, std::time::Instant::now());
        let rendered: Vec<String> = state.snapshot().map(render_snapshot_entry).collect();
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("\"pgn\":127251"));
    }
}

//! WebSocket client for the telemetry server
//!
//! Subscribes to a key list, turns every text frame into feed events and
//! reconnects after a flat delay whenever the connection drops.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{connect, Message, WebSocket};

use super::config::ServerSettings;
use crate::core::constants::{FEED_CHANNEL_CAPACITY, READ_IDLE_SLEEP, SHUTDOWN_POLL_INTERVAL};
use crate::core::io_traits::{ConnectionStatus, FeedEvent, FeedEventReceiver};
use crate::core::protocol::{
    decode, subscription_url, Inbound, PARSE_ERROR_MESSAGE, TRANSPORT_ERROR_MESSAGE,
};

// =============================================================================
// WEBSOCKET CLIENT
// =============================================================================

/// Reconnecting telemetry client running on its own thread
pub struct TelemetryClient {
    settings: ServerSettings,
    keys: Vec<String>,
    rx: Option<Receiver<FeedEvent>>,
    thread_handle: Option<JoinHandle<()>>,
    shutdown_flag: Arc<AtomicBool>,
    current_status: ConnectionStatus,
}

impl TelemetryClient {
    pub fn new(settings: ServerSettings, keys: Vec<String>) -> Self {
        Self {
            settings,
            keys,
            rx: None,
            thread_handle: None,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            current_status: ConnectionStatus::Disconnected,
        }
    }

    pub fn url(&self) -> String {
        subscription_url(
            &ws_base(&self.settings.url),
            self.settings.preview,
            &self.keys,
        )
    }

    pub fn connect(&mut self) {
        if self.thread_handle.is_some() {
            warn!("[WS] Already running");
            return;
        }

        let (event_tx, event_rx) = bounded::<FeedEvent>(FEED_CHANNEL_CAPACITY);
        self.rx = Some(event_rx);
        self.shutdown_flag.store(false, Ordering::SeqCst);

        let shutdown_flag = Arc::clone(&self.shutdown_flag);
        let url = self.url();
        let reconnect_delay = self.settings.reconnect_delay();

        let handle = thread::spawn(move || {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                websocket_thread(&url, reconnect_delay, event_tx.clone(), shutdown_flag);
            }));

            if let Err(panic_info) = result {
                let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    format!("WS thread panic: {}", s)
                } else {
                    "WS thread panic".to_string()
                };
                error!("{}", msg);
                let _ = event_tx.send(FeedEvent::Error(msg));
                let _ = event_tx.send(FeedEvent::StatusChanged(ConnectionStatus::Error));
            }
        });

        self.thread_handle = Some(handle);
        self.current_status = ConnectionStatus::Connecting;
    }

    /// Stop the thread; no further reconnects
    pub fn disconnect(&mut self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        // Dropping the receiver unblocks a thread waiting on a full channel
        self.rx = None;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.current_status = ConnectionStatus::Disconnected;
    }

    pub fn poll(&mut self) -> Option<FeedEvent> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(event) => {
                if let FeedEvent::StatusChanged(status) = &event {
                    self.current_status = *status;
                }
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.current_status = ConnectionStatus::Disconnected;
                None
            }
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.current_status
    }

    pub fn is_connected(&self) -> bool {
        self.current_status == ConnectionStatus::Connected
    }
}

impl FeedEventReceiver for TelemetryClient {
    fn poll_event(&mut self) -> Option<FeedEvent> {
        self.poll()
    }
}

impl Drop for TelemetryClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Accept http(s) URLs for the server and map them to ws(s)
pub fn ws_base(url: &str) -> String {
    let base = url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    }
}

/// Feed event for one inbound text frame, if any
pub fn frame_event(text: &str) -> Option<FeedEvent> {
    match decode(text) {
        Ok(Inbound::Batch(pairs)) => Some(FeedEvent::Batch(pairs)),
        Ok(Inbound::ServerError(message)) => {
            warn!(error = %message, "[WS] Server error");
            Some(FeedEvent::Error(message))
        }
        Ok(Inbound::Ignored) => {
            debug!(frame = %text, "[WS] Ignoring message without data");
            None
        }
        Err(e) => {
            warn!(error = %e, "[WS] Failed to parse message");
            Some(FeedEvent::Error(PARSE_ERROR_MESSAGE.to_string()))
        }
    }
}

// =============================================================================
// WEBSOCKET THREAD
// =============================================================================

/// Why a connection ended
enum LoopEnd {
    Shutdown,
    Closed,
    Failed(String),
}

fn websocket_thread(
    url: &str,
    reconnect_delay: Duration,
    event_tx: Sender<FeedEvent>,
    shutdown_flag: Arc<AtomicBool>,
) {
    loop {
        if shutdown_flag.load(Ordering::SeqCst) {
            break;
        }

        info!(url = %url, "[WS] Connecting...");
        let _ = event_tx.send(FeedEvent::StatusChanged(ConnectionStatus::Connecting));

        match connect(url) {
            Ok((mut socket, _)) => {
                info!("[WS] Connected");
                let _ = event_tx.send(FeedEvent::StatusChanged(ConnectionStatus::Connected));
                let _ = event_tx.send(FeedEvent::Opened);

                let end = message_loop(&mut socket, &event_tx, &shutdown_flag);
                let _ = socket.close(None);

                match end {
                    LoopEnd::Shutdown => break,
                    LoopEnd::Closed => info!("[WS] Server closed the connection"),
                    LoopEnd::Failed(e) => {
                        warn!(error = %e, "[WS] Disconnected");
                        let _ = event_tx.send(FeedEvent::Error(TRANSPORT_ERROR_MESSAGE.to_string()));
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "[WS] Connection failed");
                let _ = event_tx.send(FeedEvent::Error(TRANSPORT_ERROR_MESSAGE.to_string()));
                let _ = event_tx.send(FeedEvent::StatusChanged(ConnectionStatus::Error));
            }
        }

        if shutdown_flag.load(Ordering::SeqCst) {
            break;
        }

        let _ = event_tx.send(FeedEvent::StatusChanged(ConnectionStatus::Reconnecting));
        info!(delay_ms = reconnect_delay.as_millis() as u64, "[WS] Reconnecting...");
        if !sleep_unless_shutdown(reconnect_delay, &shutdown_flag) {
            break;
        }
    }

    let _ = event_tx.send(FeedEvent::StatusChanged(ConnectionStatus::Disconnected));
}

/// Sleep in short slices; false if shutdown was requested meanwhile
fn sleep_unless_shutdown(delay: Duration, shutdown_flag: &AtomicBool) -> bool {
    let start = Instant::now();
    while start.elapsed() < delay {
        if shutdown_flag.load(Ordering::SeqCst) {
            return false;
        }
        let remaining = delay.saturating_sub(start.elapsed());
        thread::sleep(remaining.min(SHUTDOWN_POLL_INTERVAL));
    }
    !shutdown_flag.load(Ordering::SeqCst)
}

fn message_loop(
    socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
    event_tx: &Sender<FeedEvent>,
    shutdown_flag: &Arc<AtomicBool>,
) -> LoopEnd {
    // Set non-blocking
    match socket.get_ref() {
        MaybeTlsStream::Plain(tcp) => {
            let _ = tcp.set_nonblocking(true);
        }
        MaybeTlsStream::NativeTls(tls) => {
            let _ = tls.get_ref().set_nonblocking(true);
        }
        _ => {}
    }

    loop {
        if shutdown_flag.load(Ordering::SeqCst) {
            return LoopEnd::Shutdown;
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                if let Some(event) = frame_event(&text) {
                    if event_tx.send(event).is_err() {
                        // Owner went away
                        return LoopEnd::Shutdown;
                    }
                }
                continue;
            }
            Ok(Message::Close(_)) => return LoopEnd::Closed,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(tungstenite::Error::ConnectionClosed) => return LoopEnd::Closed,
            Err(e) => return LoopEnd::Failed(e.to_string()),
            _ => {}
        }

        thread::sleep(READ_IDLE_SLEEP);
    }
}

//! Live capture session: a bounded packet history, subscriber fan-out, and
//! registered sinks (§4.5).
//!
//! Grounded on the teacher's `wmbus::radio::lora::lbm` mesh fan-out
//! (`tokio::sync::{Mutex, mpsc}`-guarded shared state broadcast to multiple
//! listeners) and `mbus_protocol`'s state-machine enum, generalized from a
//! device mesh to a packet stream.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};

use crate::analyser::PacketAnalyser;
use crate::codec::Packet;
use crate::constants::{DEFAULT_HISTORY_CAPACITY, SHUTDOWN_TIMEOUT_SECS};
use crate::error::DecodeError;

/// Session lifecycle states (§4.5 "State machine").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Constructed,
    Running,
    Stopping,
    Stopped,
}

/// A diagnostic emitted alongside packet events, never interleaved with
/// them (§7 "Decode errors never reach subscribers as packet events").
#[derive(Debug, Clone)]
pub enum DiagnosticEvent {
    Resync { skipped: usize },
    Decode { kind: DecodeError, raw: Vec<u8> },
}

/// One message delivered to a subscriber.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Delivered once, immediately on attach (§4.5).
    Init { view_mode: bool, history: Vec<Packet> },
    /// One freshly decoded packet (live mode only).
    Packet(Packet),
    /// A resync or decode diagnostic, kept out of the `Packet` stream.
    Diagnostic(DiagnosticEvent),
}

/// A handle a sink can use to observe every packet without going through
/// the broadcast channel (used for the analyser and the log formatter).
pub trait Sink: Send + Sync {
    fn on_packet(&self, packet: &Packet);
}

struct SharedState {
    history: Mutex<VecDeque<Packet>>,
    capacity: usize,
    view_mode: bool,
    state: Mutex<SessionState>,
}

/// The live capture session (§4.5). Cheaply cloneable; clones share the
/// same underlying state and subscriber channel.
#[derive(Clone)]
pub struct LiveSession {
    shared: Arc<SharedState>,
    events: broadcast::Sender<SessionEvent>,
    sinks: Arc<Mutex<Vec<Arc<dyn Sink>>>>,
}

/// A live subscription to session events, backed by a `tokio::sync::broadcast`
/// receiver (§5 "each subscriber sees its own ordered projection").
pub struct Subscription {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        use broadcast::error::RecvError;
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl LiveSession {
    /// Construct a fresh live-mode session with the default history capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(1024);
        Self {
            shared: Arc::new(SharedState {
                history: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
                view_mode: false,
                state: Mutex::new(SessionState::Constructed),
            }),
            events: tx,
            sinks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Construct a view-mode session pre-populated from a replayed history
    /// (§4.5 "View mode", §6.3). No live decodes are accepted afterwards.
    pub fn from_history(packets: Vec<Packet>) -> Self {
        let capacity = packets.len().max(DEFAULT_HISTORY_CAPACITY);
        let (tx, _rx) = broadcast::channel(1024);
        Self {
            shared: Arc::new(SharedState {
                history: Mutex::new(VecDeque::from(packets)),
                capacity,
                view_mode: true,
                state: Mutex::new(SessionState::Constructed),
            }),
            events: tx,
            sinks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_view_mode(&self) -> bool {
        self.shared.view_mode
    }

    pub async fn state(&self) -> SessionState {
        *self.shared.state.lock().await
    }

    /// `Constructed -> Running`; idempotent once already `Running`.
    pub async fn start(&self) {
        let mut state = self.shared.state.lock().await;
        if *state == SessionState::Constructed {
            *state = SessionState::Running;
        }
    }

    /// Register a sink that observes every published packet (e.g. the
    /// analyser, a log formatter). No-op in `Stopping`/`Stopped` states.
    pub async fn register_sink(&self, sink: Arc<dyn Sink>) {
        if matches!(
            self.state().await,
            SessionState::Stopping | SessionState::Stopped
        ) {
            return;
        }
        self.sinks.lock().await.push(sink);
    }

    /// Subscribe for live events. Delivers an `Init` event under the same
    /// critical section that snapshots the history, so the subscriber can
    /// never double-see or miss a packet relative to the snapshot (§5).
    pub async fn subscribe(&self) -> Subscription {
        let receiver = self.events.subscribe();
        let history = self.shared.history.lock().await;
        let snapshot: Vec<Packet> = history.iter().cloned().collect();
        let _ = self.events.send(SessionEvent::Init {
            view_mode: self.shared.view_mode,
            history: snapshot,
        });
        Subscription { receiver }
    }

    /// Publish a freshly decoded packet (live mode only): append to the
    /// history ring, run every sink, then push a `Packet` event.
    pub async fn publish(&self, packet: Packet) {
        if self.shared.view_mode {
            return;
        }
        {
            let mut history = self.shared.history.lock().await;
            if history.len() >= self.shared.capacity {
                history.pop_front();
            }
            history.push_back(packet.clone());
        }
        for sink in self.sinks.lock().await.iter() {
            sink.on_packet(&packet);
        }
        let _ = self.events.send(SessionEvent::Packet(packet));
    }

    /// Report a decode error to the diagnostic stream (§7).
    pub fn report_decode_error(&self, kind: DecodeError, raw: Vec<u8>) {
        let _ = self
            .events
            .send(SessionEvent::Diagnostic(DiagnosticEvent::Decode { kind, raw }));
    }

    /// Report a reassembler resync to the diagnostic stream (§7).
    pub fn report_resync(&self, skipped: usize) {
        let _ = self
            .events
            .send(SessionEvent::Diagnostic(DiagnosticEvent::Resync { skipped }));
    }

    /// Snapshot the current history.
    pub async fn history(&self) -> Vec<Packet> {
        self.shared.history.lock().await.iter().cloned().collect()
    }

    /// `Running -> Stopping -> Stopped`. New subscribers are rejected once
    /// `Stopping` begins; a shutdown exceeding `SHUTDOWN_TIMEOUT_SECS`
    /// escalates to a forced return rather than blocking indefinitely (§5).
    pub async fn close(&self) {
        {
            let mut state = self.shared.state.lock().await;
            if *state == SessionState::Stopped {
                return;
            }
            *state = SessionState::Stopping;
        }

        let drain = async {
            self.sinks.lock().await.clear();
        };
        let _ = tokio::time::timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), drain).await;

        *self.shared.state.lock().await = SessionState::Stopped;
    }
}

impl Default for LiveSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts a shared `PacketAnalyser` into a session `Sink` (§4.5 "sinks").
///
/// Holds a `std::sync::Mutex` rather than the session's own `tokio::sync::Mutex`:
/// `Sink::on_packet` is synchronous (it cannot await), and observing every
/// packet is required for §4.4's "`count` must continue to reflect the true
/// totals" — a `try_lock` that silently drops on contention would violate
/// that under any concurrent reader. A `std::sync::Mutex` held only across
/// `observe()` (never across an await) always succeeds instead.
pub struct AnalyserSink(pub Arc<std::sync::Mutex<PacketAnalyser>>);

impl Sink for AnalyserSink {
    fn on_packet(&self, packet: &Packet) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .observe(packet.clone());
    }
}

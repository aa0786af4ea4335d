//! Socket lifecycle bookkeeping, independent of any actual socket.
//!
//! [`ConnectionManager`] is a plain state machine. The async driver in
//! [`super::client`] feeds it socket and timer events and acts on what it
//! returns, which keeps the reconnect policy and the stale-callback rules
//! testable without a network.

use log::{debug, info, warn};
use std::{collections::VecDeque, fmt, time::Duration};

use super::messages::{ClientFrame, Outbound, ServerFrame};

/// Default delay before the first reconnect attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound for any single reconnect delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Consecutive failed attempts after which reconnecting stops.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Exponential backoff schedule for reconnect attempts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt number `attempt` (zero-based), or
    /// `None` once the attempt budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self
            .base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    /// The full delay sequence this policy produces before giving up.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..).map_while(|attempt| self.delay_for(attempt))
    }
}

/// Connection state as shown to the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConnectionStatus {
    Disconnected { reason: String },
    Connecting,
    Connected,
    Reconnecting { attempt: u32, delay: Duration },
    /// Terminal: the reconnect budget is spent. Only a restart recovers.
    Failed,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { reason } => write!(f, "{reason}"),
            Self::Connecting => write!(f, "Connecting..."),
            Self::Connected => write!(f, "Connected"),
            Self::Reconnecting { attempt, delay } => write!(
                f,
                "Reconnecting in {:.1}s (attempt {attempt})",
                delay.as_secs_f32()
            ),
            Self::Failed => write!(f, "Connection Failed"),
        }
    }
}

/// Tag attached to every connect attempt and its socket callbacks.
/// Callbacks carrying an older generation are ignored.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Generation(u64);

/// A pending reconnect timer. Firing it only has an effect if nothing
/// else has happened to the connection since it was scheduled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReconnectTicket {
    generation: Generation,
    pub delay: Duration,
}

/// What the driver should do after a connection loss.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reconnect {
    /// Sleep for `ticket.delay`, then call
    /// [`ConnectionManager::on_reconnect_timer`].
    After(ReconnectTicket),
    /// Reconnect budget spent; stay disconnected.
    Exhausted,
}

/// Owns the lifecycle of the single server connection.
#[derive(Debug)]
pub struct ConnectionManager {
    policy: ReconnectPolicy,
    status: ConnectionStatus,
    attempts: u32,
    generation: u64,
    outbox: VecDeque<String>,
    torn_down: bool,
}

impl ConnectionManager {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            status: ConnectionStatus::Disconnected {
                reason: "Disconnected".to_string(),
            },
            attempts: 0,
            generation: 0,
            outbox: VecDeque::new(),
            torn_down: false,
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Consecutive failed attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Begin a connect attempt. Returns the generation the driver must tag
    /// the attempt's callbacks with, or `None` after teardown.
    pub fn connect(&mut self) -> Option<Generation> {
        if self.torn_down {
            return None;
        }
        self.generation += 1;
        self.outbox.clear();
        self.status = ConnectionStatus::Connecting;
        debug!("connect attempt, generation {}", self.generation);
        Some(Generation(self.generation))
    }

    /// The socket for `generation` opened. Returns `false` for a stale
    /// generation, in which case the driver should drop that socket.
    pub fn on_open(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) || self.status != ConnectionStatus::Connecting {
            debug!("ignoring stale open for {generation:?}");
            return false;
        }
        info!("connected after {} failed attempt(s)", self.attempts);
        self.status = ConnectionStatus::Connected;
        self.attempts = 0;
        true
    }

    /// The socket for `generation` errored or closed, or the connect
    /// attempt itself failed. Schedules a reconnect exactly once per
    /// generation; returns `None` for stale or duplicate notifications.
    pub fn on_close(&mut self, generation: Generation, reason: &str) -> Option<Reconnect> {
        if !self.is_current(generation) {
            debug!("ignoring stale close for {generation:?}");
            return None;
        }
        if !matches!(
            self.status,
            ConnectionStatus::Connecting | ConnectionStatus::Connected
        ) {
            return None;
        }
        warn!("connection lost: {reason}");
        self.outbox.clear();
        self.status = ConnectionStatus::Disconnected {
            reason: reason.to_string(),
        };
        Some(self.schedule_reconnect())
    }

    /// Compute the next reconnect delay and consume one attempt.
    pub fn schedule_reconnect(&mut self) -> Reconnect {
        if self.torn_down {
            return Reconnect::Exhausted;
        }
        match self.policy.delay_for(self.attempts) {
            Some(delay) => {
                self.attempts += 1;
                self.status = ConnectionStatus::Reconnecting {
                    attempt: self.attempts,
                    delay,
                };
                info!(
                    "reconnecting in {}ms (attempt {}/{})",
                    delay.as_millis(),
                    self.attempts,
                    self.policy.max_attempts
                );
                Reconnect::After(ReconnectTicket {
                    generation: Generation(self.generation),
                    delay,
                })
            }
            None => {
                warn!(
                    "giving up after {} reconnect attempts",
                    self.policy.max_attempts
                );
                self.status = ConnectionStatus::Failed;
                Reconnect::Exhausted
            }
        }
    }

    /// A reconnect timer fired. Starts the next attempt unless the ticket
    /// was superseded by a newer connect or by teardown.
    pub fn on_reconnect_timer(&mut self, ticket: ReconnectTicket) -> Option<Generation> {
        if !self.is_current(ticket.generation)
            || !matches!(self.status, ConnectionStatus::Reconnecting { .. })
        {
            debug!("ignoring superseded reconnect timer");
            return None;
        }
        self.connect()
    }

    /// Decode a text frame received on `generation`. Frames that do not
    /// parse are logged and dropped; the connection stays up.
    pub fn on_text(&mut self, generation: Generation, text: &str) -> Option<ServerFrame> {
        if !self.is_current(generation) || !self.status.is_connected() {
            return None;
        }
        match ServerFrame::decode(text) {
            Ok(frame) => Some(frame),
            Err(error) => {
                warn!("dropping malformed frame: {error}");
                None
            }
        }
    }

    /// Queue a frame for transmission. Silently dropped unless connected.
    pub fn send(&mut self, frame: &ClientFrame) -> bool {
        if !self.status.is_connected() {
            debug!("not connected, dropping outbound frame: {frame}");
            return false;
        }
        match frame.encode() {
            Ok(text) => {
                self.outbox.push_back(text);
                true
            }
            Err(error) => {
                warn!("{error}");
                false
            }
        }
    }

    /// Next encoded frame waiting to be written, without removing it.
    pub fn peek_outbound(&self) -> Option<&str> {
        self.outbox.front().map(String::as_str)
    }

    /// Remove the frame returned by the last [`Self::peek_outbound`].
    pub fn pop_outbound(&mut self) -> Option<String> {
        self.outbox.pop_front()
    }

    pub fn has_outbound(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Tear down. Any later callbacks, timers, and connects are no-ops.
    pub fn shutdown(&mut self) {
        self.torn_down = true;
        self.generation += 1;
        self.outbox.clear();
        self.status = ConnectionStatus::Disconnected {
            reason: "Disconnected".to_string(),
        };
    }

    fn is_current(&self, generation: Generation) -> bool {
        !self.torn_down && generation.0 == self.generation
    }
}

impl Outbound for ConnectionManager {
    fn send(&mut self, frame: &ClientFrame) -> bool {
        ConnectionManager::send(self, frame)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

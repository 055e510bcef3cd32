//! Socket session state machine.
//!
//! Manages one chat socket: connecting, fixed-interval reconnection with a
//! bounded attempt budget, outbound requests and inbound decoding. Uses the
//! action pattern: methods take time as input and return actions for the
//! driver to execute. The session never touches a socket or a timer itself.
//!
//! # State Machine
//!
//! ```text
//!          connect            on_open
//! ┌──────┐ ───────> ┌────────────┐ ───────> ┌──────┐
//! │ Idle │          │ Connecting │          │ Open │
//! └──────┘ <─┐      └────────────┘          └──────┘
//!    ^       │            │ on_close/on_error   │ on_close/on_error
//!    │       │            v                     v
//!    │       │      ┌────────┐  tick (interval elapsed, attempts left)
//!    │       └──────│ Closed │ ─────────────────────────> Connecting
//!    │   disconnect └────────┘
//!    │
//!    └── disconnect from any live phase; shutdown moves to ShutDown (terminal)
//! ```
//!
//! # Reconnection
//!
//! Every abnormal close or transport error schedules one reconnect after
//! [`SessionConfig::reconnect_interval`], up to
//! [`SessionConfig::max_reconnect_attempts`] consecutive attempts. A
//! successful open resets the counter. Once the budget is spent the session
//! stays in `Closed` until an explicit [`Session::connect`] or
//! [`Session::retry`].

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use quill_proto::{ChatMode, ChatRequest, Correlation, InboundFrame, ModelId};
use tracing::{debug, info, trace, warn};

use crate::error::SessionError;

/// Default socket endpoint.
pub const DEFAULT_WEBSOCKET_URL: &str = "ws://localhost:8000/ws/chat";

/// Consecutive reconnect attempts before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Fixed delay between a close and the next reconnect attempt.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);

/// Actions returned by the session state machine.
///
/// The driver executes these:
/// - `Open`: start a new socket to `url`, reporting the outcome via
///   [`Session::on_open`], [`Session::on_close`] or [`Session::on_error`]
/// - `Send`: write a text frame on the open socket
/// - `Close`: close the current socket and drop its handle
/// - `ScheduleReconnect`/`CancelReconnect`: informational. The session owns
///   the deadline and fires it from [`Session::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Open a socket.
    Open {
        /// Endpoint to connect to
        url: String,
    },

    /// Send a text frame.
    Send(String),

    /// Close the current socket.
    Close,

    /// A reconnect was scheduled.
    ScheduleReconnect {
        /// Delay until the attempt fires
        delay: Duration,
        /// 1-based attempt number
        attempt: u32,
    },

    /// A pending reconnect was cancelled.
    CancelReconnect,
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No socket and nothing scheduled.
    Idle,
    /// Socket requested, waiting for the open handshake.
    Connecting,
    /// Socket open.
    Open,
    /// Socket lost. A reconnect may be pending.
    Closed,
    /// Torn down. Every operation is a no-op.
    ShutDown,
}

/// Close details reported by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code, if the peer sent one.
    pub code: Option<u16>,
    /// Close reason text.
    pub reason: String,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Socket endpoint.
    pub url: String,
    /// Consecutive reconnect attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// Delay between a close and the next attempt.
    pub reconnect_interval: Duration,
    /// Identifiers attached to every request.
    pub correlation: Correlation,
    /// Send `"agent"` as the request mode when the agent flag is set.
    ///
    /// When false every request carries `"chat"`, which is what the backend
    /// currently expects.
    pub encode_agent_mode: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBSOCKET_URL.to_owned(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            correlation: Correlation::default(),
            encode_agent_mode: false,
        }
    }
}

impl SessionConfig {
    /// Default configuration pointed at `url`.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }
}

/// Observable connection status, for change detection by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current phase.
    pub phase: SessionPhase,
    /// Consecutive reconnect attempts since the last successful open.
    pub reconnect_attempts: u32,
    /// Whether a reconnect is scheduled.
    pub reconnect_pending: bool,
    /// Last error, cleared by the next connect.
    pub last_error: Option<String>,
}

/// Result of [`Session::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Request serialized and handed to the driver.
    Sent(Vec<SessionAction>),
    /// Socket was not open. The request was dropped and a connect was
    /// attempted instead.
    Deferred(Vec<SessionAction>),
}

/// Socket session state machine.
///
/// Pure: no I/O, no stored environment. Time is passed to the methods that
/// need it.
///
/// # Invariants
///
/// - At most one reconnect is pending at any time.
/// - No reconnect is pending while `Connecting` or `Open`.
/// - `reconnect_attempts <= max_reconnect_attempts`.
/// - After [`Session::shutdown`] no operation yields an `Open`, `Send` or
///   `ScheduleReconnect` action.
#[derive(Debug, Clone)]
pub struct Session<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    config: SessionConfig,
    phase: SessionPhase,
    reconnect_attempts: u32,
    /// When the pending reconnect was scheduled.
    reconnect_scheduled_at: Option<I>,
    last_error: Option<String>,
}

impl<I> Session<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            phase: SessionPhase::Idle,
            reconnect_attempts: 0,
            reconnect_scheduled_at: None,
            last_error: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True while the socket is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase == SessionPhase::Open
    }

    /// True while an open is in flight.
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.phase == SessionPhase::Connecting
    }

    /// Last error message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Consecutive reconnect attempts since the last successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Whether a reconnect is scheduled.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_scheduled_at.is_some()
    }

    /// Time left until the pending reconnect fires.
    pub fn time_until_reconnect(&self, now: I) -> Option<Duration> {
        self.reconnect_scheduled_at
            .map(|at| self.config.reconnect_interval.saturating_sub(now - at))
    }

    /// Status for change detection.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            reconnect_attempts: self.reconnect_attempts,
            reconnect_pending: self.reconnect_pending(),
            last_error: self.last_error.clone(),
        }
    }

    /// Request a connection.
    ///
    /// No-op while `Connecting` or `Open`, so repeated calls never stack
    /// sockets. Otherwise cancels any pending reconnect, clears the last
    /// error and returns `Open`.
    pub fn connect(&mut self, _now: I) -> Vec<SessionAction> {
        match self.phase {
            SessionPhase::ShutDown => {
                debug!("connect ignored: session shut down");
                return Vec::new();
            },
            SessionPhase::Connecting | SessionPhase::Open => {
                trace!(phase = ?self.phase, "connect ignored: socket already live");
                return Vec::new();
            },
            SessionPhase::Idle | SessionPhase::Closed => {},
        }

        let mut actions = Vec::new();
        if self.reconnect_scheduled_at.take().is_some() {
            actions.push(SessionAction::CancelReconnect);
        }

        self.phase = SessionPhase::Connecting;
        self.last_error = None;
        info!(url = %self.config.url, attempt = self.reconnect_attempts, "connecting");

        actions.push(SessionAction::Open { url: self.config.url.clone() });
        actions
    }

    /// User-initiated retry: restores the full reconnect budget, then
    /// connects.
    pub fn retry(&mut self, now: I) -> Vec<SessionAction> {
        if self.phase == SessionPhase::ShutDown {
            return Vec::new();
        }
        self.reconnect_attempts = 0;
        self.connect(now)
    }

    /// Driver reports the socket opened.
    ///
    /// Resets the reconnect counter. An open that arrives after the session
    /// stopped wanting a socket is answered with `Close`.
    pub fn on_open(&mut self, _now: I) -> Vec<SessionAction> {
        match self.phase {
            SessionPhase::Connecting => {
                info!(url = %self.config.url, "socket open");
                self.phase = SessionPhase::Open;
                self.reconnect_attempts = 0;
                Vec::new()
            },
            SessionPhase::Open => {
                debug!("duplicate open ignored");
                Vec::new()
            },
            SessionPhase::Idle | SessionPhase::Closed | SessionPhase::ShutDown => {
                warn!(phase = ?self.phase, "unexpected open, closing socket");
                vec![SessionAction::Close]
            },
        }
    }

    /// Driver reports the socket closed.
    ///
    /// Schedules a reconnect while the attempt budget lasts. Closes for a
    /// socket the session already released are ignored.
    pub fn on_close(&mut self, now: I, info: &CloseInfo) -> Vec<SessionAction> {
        if !self.is_live() {
            trace!(phase = ?self.phase, "stale close ignored");
            return Vec::new();
        }

        info!(code = ?info.code, reason = %info.reason, "socket closed");
        self.phase = SessionPhase::Closed;
        self.schedule_reconnect(now)
    }

    /// Driver reports a transport error.
    ///
    /// Records the message and feeds the same reconnection path as a close.
    /// The driver reports either an error or a close for a given socket,
    /// never both.
    pub fn on_error(&mut self, now: I, message: impl Into<String>) -> Vec<SessionAction> {
        if !self.is_live() {
            trace!(phase = ?self.phase, "stale error ignored");
            return Vec::new();
        }

        let message = message.into();
        warn!(error = %message, "socket error");
        self.last_error = Some(message);
        self.phase = SessionPhase::Closed;
        self.schedule_reconnect(now)
    }

    /// Process time-based events. Fires the pending reconnect once its
    /// interval has elapsed.
    pub fn tick(&mut self, now: I) -> Vec<SessionAction> {
        let Some(scheduled_at) = self.reconnect_scheduled_at else {
            return Vec::new();
        };

        if now - scheduled_at < self.config.reconnect_interval {
            return Vec::new();
        }

        self.reconnect_scheduled_at = None;
        debug!(attempt = self.reconnect_attempts, "reconnect timer fired");
        self.connect(now)
    }

    /// Close the socket and cancel any pending reconnect.
    ///
    /// The session returns to `Idle`; later closes or errors from the
    /// released socket are ignored.
    pub fn disconnect(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        if self.reconnect_scheduled_at.take().is_some() {
            actions.push(SessionAction::CancelReconnect);
        }
        if self.is_live() {
            actions.push(SessionAction::Close);
        }
        if self.phase != SessionPhase::ShutDown {
            info!("disconnected");
            self.phase = SessionPhase::Idle;
        }

        actions
    }

    /// Tear the session down for good.
    pub fn shutdown(&mut self) -> Vec<SessionAction> {
        let actions = self.disconnect();
        self.phase = SessionPhase::ShutDown;
        actions
    }

    /// Serialize a chat request and send it if the socket is open.
    ///
    /// If the socket is not open the request is dropped, a connect is
    /// attempted, and [`SendOutcome::Deferred`] is returned so the caller
    /// can tell the user.
    ///
    /// # Errors
    ///
    /// - `SessionError::InvalidState` after shutdown
    /// - `SessionError::Protocol` if the request fails to serialize
    pub fn send_message(
        &mut self,
        now: I,
        content: &str,
        model: ModelId,
        is_agent: bool,
    ) -> Result<SendOutcome, SessionError> {
        if self.phase == SessionPhase::ShutDown {
            return Err(SessionError::InvalidState {
                phase: self.phase,
                operation: "send_message".to_owned(),
            });
        }

        if self.phase != SessionPhase::Open {
            warn!(phase = ?self.phase, "send while not connected, reconnecting");
            return Ok(SendOutcome::Deferred(self.connect(now)));
        }

        let mode =
            if is_agent && self.config.encode_agent_mode { ChatMode::Agent } else { ChatMode::Chat };
        let request = ChatRequest::new(content, model, mode, self.config.correlation.clone());
        let text = request.to_json()?;

        debug!(model = %model, bytes = text.len(), "sending chat request");
        Ok(SendOutcome::Sent(vec![SessionAction::Send(text)]))
    }

    /// Decode an inbound text frame.
    ///
    /// Malformed frames are logged and dropped.
    pub fn decode(&self, text: &str) -> Option<InboundFrame> {
        match InboundFrame::decode(text) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(error = %e, "dropping malformed frame");
                None
            },
        }
    }

    fn is_live(&self) -> bool {
        matches!(self.phase, SessionPhase::Connecting | SessionPhase::Open)
    }

    fn schedule_reconnect(&mut self, now: I) -> Vec<SessionAction> {
        if self.reconnect_attempts >= self.config.max_reconnect_attempts {
            let exhausted = SessionError::ReconnectExhausted { attempts: self.reconnect_attempts };
            warn!(attempts = self.reconnect_attempts, "giving up on reconnection");
            self.last_error = Some(exhausted.to_string());
            return Vec::new();
        }

        self.reconnect_attempts += 1;

        let mut actions = Vec::new();
        if self.reconnect_scheduled_at.replace(now).is_some() {
            actions.push(SessionAction::CancelReconnect);
        }

        info!(
            attempt = self.reconnect_attempts,
            max = self.config.max_reconnect_attempts,
            delay_ms = self.config.reconnect_interval.as_millis() as u64,
            "scheduling reconnect"
        );

        actions.push(SessionAction::ScheduleReconnect {
            delay: self.config.reconnect_interval,
            attempt: self.reconnect_attempts,
        });
        actions
    }
}

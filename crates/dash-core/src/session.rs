//! Inactivity session monitor.
//!
//! # States
//!
//! ```text
//! active --(no activity for warning_timeout)--> warning --(countdown or deadline)--> expired
//!   ^                                              |
//!   +-------------------- reset() -----------------+
//! ```
//!
//! `expired` is terminal: the logout callback runs exactly once and the
//! instance ignores everything afterwards. The monitor owns no threads. The
//! host calls [`SessionMonitor::poll`] whenever [`SessionMonitor::next_deadline_ms`]
//! has passed, and every transition happens inside `poll` or an explicit call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::MonotonicClock;
use crate::timer::{Fired, TimerHandle, TimerQueue};

/// Interval between countdown ticks while warning.
const TICK_MS: u64 = 1000;

/// Timeouts for the inactivity monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity before the warning is shown.
    /// Default: 1500000 (25 minutes).
    pub warning_timeout_ms: u64,

    /// Time between the warning and automatic logout.
    /// Default: 300000 (5 minutes).
    pub logout_timeout_ms: u64,

    /// Minimum spacing between activity-driven timer resets.
    /// Default: 1000 (1 second).
    pub activity_throttle_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            warning_timeout_ms: 1_500_000, // 25 minutes
            logout_timeout_ms: 300_000,    // 5 minutes
            activity_throttle_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Active,
    Warning,
    Expired,
}

impl SessionPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Warning => "warning",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the monitor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Monotonic time of the last activity that reset the warning timer.
    pub last_activity_ms: u64,
    /// Seconds left before logout. Only set while warning.
    pub remaining_secs: Option<u64>,
}

/// User interaction signals that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerMove,
    PointerDown,
    KeyDown,
    TouchStart,
    Scroll,
    Click,
}

impl ActivityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PointerMove => "pointer_move",
            Self::PointerDown => "pointer_down",
            Self::KeyDown => "key_down",
            Self::TouchStart => "touch_start",
            Self::Scroll => "scroll",
            Self::Click => "click",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for unknown activity kind strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown activity kind: {0}")]
pub struct UnknownActivityKind(String);

impl FromStr for ActivityKind {
    type Err = UnknownActivityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pointer_move" | "mousemove" => Ok(Self::PointerMove),
            "pointer_down" | "mousedown" => Ok(Self::PointerDown),
            "key_down" | "keydown" | "keypress" => Ok(Self::KeyDown),
            "touch_start" | "touchstart" => Ok(Self::TouchStart),
            "scroll" => Ok(Self::Scroll),
            "click" => Ok(Self::Click),
            _ => Err(UnknownActivityKind(s.to_string())),
        }
    }
}

/// Failure reported by the host's logout action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("logout failed: {reason}")]
pub struct LogoutError {
    pub reason: String,
}

impl LogoutError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Something the host may want to render after a [`SessionMonitor::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    WarningStarted { remaining_secs: u64 },
    CountdownTick { remaining_secs: u64 },
    /// The session expired and logout was invoked.
    Expired { logout_error: Option<LogoutError> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTimer {
    Warning,
    Tick,
    Deadline,
}

type LogoutFn = Box<dyn FnMut() -> Result<(), LogoutError>>;

/// Two-stage inactivity timeout: warn, then log out.
pub struct SessionMonitor<C> {
    config: SessionConfig,
    clock: C,
    on_logout: LogoutFn,
    running: bool,
    phase: SessionPhase,
    last_activity_ms: u64,
    remaining_secs: Option<u64>,
    timers: TimerQueue<SessionTimer>,
    warning_timer: Option<TimerHandle>,
    logout_error: Option<LogoutError>,
    /// Fired but not yet returned from `poll`.
    undelivered: Vec<SessionEvent>,
}

impl<C> fmt::Debug for SessionMonitor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionMonitor")
            .field("config", &self.config)
            .field("running", &self.running)
            .field("phase", &self.phase)
            .field("last_activity_ms", &self.last_activity_ms)
            .field("remaining_secs", &self.remaining_secs)
            .field("pending_timers", &self.timers.len())
            .field("undelivered", &self.undelivered.len())
            .finish_non_exhaustive()
    }
}

impl<C: MonotonicClock> SessionMonitor<C> {
    pub fn new<F>(config: SessionConfig, clock: C, on_logout: F) -> Self
    where
        F: FnMut() -> Result<(), LogoutError> + 'static,
    {
        let now = clock.now_ms();
        Self {
            config,
            clock,
            on_logout: Box::new(on_logout),
            running: false,
            phase: SessionPhase::Active,
            last_activity_ms: now,
            remaining_secs: None,
            timers: TimerQueue::new(),
            warning_timer: None,
            logout_error: None,
            undelivered: Vec::new(),
        }
    }

    /// Begins watching for inactivity.
    ///
    /// With `enabled = false` the monitor stays inert: nothing is scheduled
    /// and logout never fires. Calling `start` again re-arms from now, unless
    /// the logout deadline has already passed.
    pub fn start(&mut self, enabled: bool) {
        self.fire_due(self.clock.now_ms());
        if self.phase == SessionPhase::Expired {
            tracing::debug!("session already expired, start ignored");
            return;
        }
        self.stop();
        if !enabled {
            tracing::debug!("session tracking disabled");
            return;
        }
        self.running = true;
        self.enter_active(self.clock.now_ms());
        tracing::debug!(
            warning_timeout_ms = self.config.warning_timeout_ms,
            logout_timeout_ms = self.config.logout_timeout_ms,
            "session tracking started"
        );
    }

    /// Records a user interaction.
    ///
    /// Only counts while active, and at most once per throttle window since
    /// the last reset. Timers already due fire first, so activity after the
    /// warning deadline cannot pull the session back. Returns whether the
    /// warning timer was re-armed.
    pub fn notify_activity(&mut self, kind: ActivityKind) -> bool {
        let now = self.clock.now_ms();
        self.fire_due(now);
        if !self.running || self.phase != SessionPhase::Active {
            return false;
        }
        if now.saturating_sub(self.last_activity_ms) < self.config.activity_throttle_ms {
            return false;
        }
        tracing::trace!(%kind, now, "activity re-armed warning timer");
        self.arm_warning(now);
        true
    }

    /// Explicit "stay signed in": back to active from active or warning.
    ///
    /// A reset arriving after the logout deadline is too late: the overdue
    /// timers fire first and the call returns `false`.
    pub fn reset(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.fire_due(now);
        if !self.running || self.phase == SessionPhase::Expired {
            return false;
        }
        let was_warning = self.phase == SessionPhase::Warning;
        self.timers.cancel_all();
        self.warning_timer = None;
        self.enter_active(now);
        if was_warning {
            tracing::debug!("session warning dismissed");
        }
        true
    }

    /// Cancels every pending timer. Nothing fires after this returns.
    pub fn stop(&mut self) {
        self.timers.cancel_all();
        self.warning_timer = None;
        self.running = false;
    }

    /// Fires every timer due at the clock's current time, in deadline order.
    ///
    /// Also returns events fired on behalf of an earlier `start`,
    /// `notify_activity` or `reset` call.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        self.fire_due(self.clock.now_ms());
        std::mem::take(&mut self.undelivered)
    }

    pub const fn state(&self) -> SessionState {
        SessionState {
            phase: self.phase,
            last_activity_ms: self.last_activity_ms,
            remaining_secs: self.remaining_secs,
        }
    }

    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// The error the logout callback returned, if it failed.
    pub const fn logout_error(&self) -> Option<&LogoutError> {
        self.logout_error.as_ref()
    }

    /// When the host should next call [`Self::poll`].
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    fn fire_due(&mut self, now: u64) {
        while let Some(fired) = self.timers.pop_due(now) {
            if let Some(event) = self.on_timer(&fired) {
                self.undelivered.push(event);
            }
        }
    }

    fn enter_active(&mut self, now: u64) {
        self.phase = SessionPhase::Active;
        self.remaining_secs = None;
        self.arm_warning(now);
    }

    fn arm_warning(&mut self, now: u64) {
        if let Some(handle) = self.warning_timer.take() {
            self.timers.cancel(handle);
        }
        self.last_activity_ms = now;
        let deadline = now.saturating_add(self.config.warning_timeout_ms);
        self.warning_timer = Some(self.timers.schedule(SessionTimer::Warning, deadline));
    }

    fn on_timer(&mut self, fired: &Fired<SessionTimer>) -> Option<SessionEvent> {
        match (fired.kind, self.phase) {
            (SessionTimer::Warning, SessionPhase::Active) => {
                Some(self.enter_warning(fired.deadline_ms))
            }
            (SessionTimer::Tick, SessionPhase::Warning) => Some(self.tick(fired.deadline_ms)),
            (SessionTimer::Deadline, SessionPhase::Warning) => Some(self.expire()),
            _ => None,
        }
    }

    fn enter_warning(&mut self, at: u64) -> SessionEvent {
        self.warning_timer = None;
        let remaining = self.config.logout_timeout_ms / 1000;
        self.phase = SessionPhase::Warning;
        self.remaining_secs = Some(remaining);
        let deadline = at.saturating_add(self.config.logout_timeout_ms);
        self.timers.schedule(SessionTimer::Deadline, deadline);
        self.timers.schedule(SessionTimer::Tick, at.saturating_add(TICK_MS));
        tracing::debug!(at, remaining_secs = remaining, "session inactive, warning");
        SessionEvent::WarningStarted {
            remaining_secs: remaining,
        }
    }

    fn tick(&mut self, at: u64) -> SessionEvent {
        let remaining = self.remaining_secs.unwrap_or(0).saturating_sub(1);
        if remaining == 0 {
            return self.expire();
        }
        self.remaining_secs = Some(remaining);
        self.timers.schedule(SessionTimer::Tick, at.saturating_add(TICK_MS));
        SessionEvent::CountdownTick {
            remaining_secs: remaining,
        }
    }

    /// Terminal transition. Callers have already checked the phase; the
    /// check here keeps a second expiry path from logging out twice.
    fn expire(&mut self) -> SessionEvent {
        if self.phase == SessionPhase::Expired {
            return SessionEvent::Expired {
                logout_error: self.logout_error.clone(),
            };
        }
        self.phase = SessionPhase::Expired;
        self.remaining_secs = None;
        self.stop();

        tracing::debug!("session expired, logging out");
        if let Err(err) = (self.on_logout)() {
            tracing::warn!(error = %err, "logout callback failed; not retrying");
            self.logout_error = Some(err);
        }
        SessionEvent::Expired {
            logout_error: self.logout_error.clone(),
        }
    }
}

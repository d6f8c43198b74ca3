use serde::Serialize;
use tracing::trace;

use crate::faces::FaceObservation;

pub const BLINK_CLOSE_PROBABILITY: f64 = 0.3;
pub const BLINK_OPEN_PROBABILITY: f64 = 0.6;
pub const BLINK_TIMEOUT_MS: u64 = 2500;
pub const LOOK_HOLD_MS: u64 = 400;
pub const LOOK_YAW_DEGREES: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivenessConfig {
    /// Both eyes below this probability count as closed.
    pub blink_close_probability: f64,
    /// Both eyes above this probability count as open.
    pub blink_open_probability: f64,
    /// A blink that has not reopened within this window is abandoned.
    pub blink_timeout_ms: u64,
    /// How long a head turn must be held to count.
    pub look_hold_ms: u64,
    /// Yaw magnitude, in degrees, that counts as looking to one side.
    pub look_yaw_degrees: f64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            blink_close_probability: BLINK_CLOSE_PROBABILITY,
            blink_open_probability: BLINK_OPEN_PROBABILITY,
            blink_timeout_ms: BLINK_TIMEOUT_MS,
            look_hold_ms: LOOK_HOLD_MS,
            look_yaw_degrees: LOOK_YAW_DEGREES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LivenessState {
    pub blink_detected: bool,
    pub blink_in_progress: bool,
    pub look_left: bool,
    pub look_right: bool,
}

impl LivenessState {
    pub fn is_complete(&self) -> bool {
        self.blink_detected && self.look_left && self.look_right
    }
}

/// Sustained head turn toward one side.
#[derive(Debug, Clone, Copy, Default)]
struct HoldTimer {
    started_at: Option<u64>,
    latched: bool,
}

impl HoldTimer {
    fn update(&mut self, in_zone: bool, now: u64, hold_ms: u64) {
        if !in_zone {
            self.started_at = None;
            return;
        }
        let started_at = *self.started_at.get_or_insert(now);
        if !self.latched && now.saturating_sub(started_at) >= hold_ms {
            self.latched = true;
        }
    }
}

/// Tracks blink and head-turn challenges across the frames of one capture
/// session. Detected challenges stay latched until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct LivenessTracker {
    config: LivenessConfig,
    last_eyes: (f64, f64),
    blink_started_at: Option<u64>,
    blink_detected: bool,
    look_left: HoldTimer,
    look_right: HoldTimer,
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new(LivenessConfig::default())
    }
}

impl LivenessTracker {
    pub fn new(config: LivenessConfig) -> Self {
        Self {
            config,
            last_eyes: (1.0, 1.0),
            blink_started_at: None,
            blink_detected: false,
            look_left: HoldTimer::default(),
            look_right: HoldTimer::default(),
        }
    }

    pub fn observe(&mut self, face: &FaceObservation, timestamp_ms: u64) -> LivenessState {
        if let Some((left, right)) = face.eye_open_probabilities() {
            self.track_blink(left, right, timestamp_ms);
        }

        let yaw = face.head_euler_y.unwrap_or(0.0);
        let hold_ms = self.config.look_hold_ms;
        self.look_left
            .update(yaw <= -self.config.look_yaw_degrees, timestamp_ms, hold_ms);
        self.look_right
            .update(yaw >= self.config.look_yaw_degrees, timestamp_ms, hold_ms);

        let state = self.state();
        trace!(
            target: "facematch.liveness",
            timestamp_ms,
            yaw,
            blink = state.blink_detected,
            look_left = state.look_left,
            look_right = state.look_right,
            "frame observed"
        );
        state
    }

    fn track_blink(&mut self, left: f64, right: f64, now: u64) {
        let open = self.config.blink_open_probability;
        let closed = self.config.blink_close_probability;

        let was_open = self.last_eyes.0 > open && self.last_eyes.1 > open;
        let now_closed = left < closed && right < closed;
        let now_open = left > open && right > open;

        // The timeout wins over a reopen seen after the deadline.
        match self.blink_started_at {
            None if was_open && now_closed => self.blink_started_at = Some(now),
            Some(started) if now.saturating_sub(started) > self.config.blink_timeout_ms => {
                self.blink_started_at = None;
            }
            Some(_) if now_open => {
                self.blink_detected = true;
                self.blink_started_at = None;
            }
            _ => {}
        }

        self.last_eyes = (left, right);
    }

    pub fn state(&self) -> LivenessState {
        LivenessState {
            blink_detected: self.blink_detected,
            blink_in_progress: self.blink_started_at.is_some(),
            look_left: self.look_left.latched,
            look_right: self.look_right.latched,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

//! Turns facial landmarks into vehicle controls.
//!
//! Every rule is a fixed pixel threshold evaluated on the current frame only,
//! except for the nod detector which remembers the previous nose position and
//! the time of the last recognised nod.

use std::time::{Duration, Instant};

use log::info;

use crate::face::{FaceLandmark, FaceLandmarks};
use crate::simulator::VehicleControl;

#[derive(Debug, Clone, PartialEq)]
pub struct GestureThresholds {
    /// Mouth opening (pixels) above which the throttle is pressed.
    pub mouth_open_px: f32,
    pub throttle: f32,
    /// A brow counts as lowered when it sits below `eye_y - frown_margin_px`.
    pub frown_margin_px: i32,
    pub brake: f32,
    /// Cheek height difference (pixels) above which the wheel is turned.
    pub tilt_px: i32,
    pub steer: f32,
    /// Nose displacement (pixels) between two frames that counts as a nod.
    pub nod_px: i32,
    pub nod_debounce: Duration,
    pub initial_gear: i32,
    pub min_gear: i32,
    pub max_gear: i32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            mouth_open_px: 20.0,
            throttle: 0.6,
            frown_margin_px: 5,
            brake: 0.8,
            tilt_px: 10,
            steer: 0.5,
            nod_px: 15,
            nod_debounce: Duration::from_secs(1),
            initial_gear: 1,
            min_gear: -1,
            max_gear: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nod {
    /// Nose moved up in the image; shifts down.
    Up,
    /// Nose moved down in the image; shifts up.
    Down,
}

// debounced nod detection on the nose tip's vertical pixel position
#[derive(Debug, Clone)]
pub struct NodTracker {
    threshold: i32,
    debounce: Duration,
    prev_nose_y: Option<i32>,
    last_nod: Instant,
}

impl NodTracker {
    pub fn new(threshold: i32, debounce: Duration, started_at: Instant) -> Self {
        Self {
            threshold,
            debounce,
            prev_nose_y: None,
            last_nod: started_at,
        }
    }

    /// Feed the nose position of a frame. The previous position is replaced on
    /// every call, so displacement is measured frame to frame.
    pub fn observe(&mut self, nose_y: i32, now: Instant) -> Option<Nod> {
        let nod = match self.prev_nose_y {
            Some(prev) if now.saturating_duration_since(self.last_nod) >= self.debounce => {
                let delta = nose_y - prev;
                if delta >= self.threshold {
                    Some(Nod::Down)
                } else if delta <= -self.threshold {
                    Some(Nod::Up)
                } else {
                    None
                }
            }
            _ => None,
        };

        if nod.is_some() {
            self.last_nod = now;
        }
        self.prev_nose_y = Some(nose_y);

        nod
    }
}

/// Everything recognised on one frame, plus the command derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Gestures {
    pub mouth_open: bool,
    pub frowning: bool,
    /// `right_cheek_y - left_cheek_y`
    pub head_tilt_delta: i32,
    pub nod: Option<Nod>,
    pub control: VehicleControl,
}

#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    thresholds: GestureThresholds,
    nods: NodTracker,
    gear: i32,
}

impl GestureInterpreter {
    pub fn new(thresholds: GestureThresholds, started_at: Instant) -> Self {
        let nods = NodTracker::new(thresholds.nod_px, thresholds.nod_debounce, started_at);
        let gear = thresholds.initial_gear;
        Self {
            thresholds,
            nods,
            gear,
        }
    }

    /// Internal gear, `-1` meaning reverse.
    pub fn gear(&self) -> i32 {
        self.gear
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    pub fn interpret(&mut self, landmarks: &FaceLandmarks, now: Instant) -> Gestures {
        let t = &self.thresholds;

        let mouth_open =
            landmarks.pixel_distance(FaceLandmark::MouthTop, FaceLandmark::MouthBottom) > t.mouth_open_px;

        let left_frown = landmarks.pixel(FaceLandmark::LeftBrow).y
            > landmarks.pixel(FaceLandmark::LeftEye).y - t.frown_margin_px;
        let right_frown = landmarks.pixel(FaceLandmark::RightBrow).y
            > landmarks.pixel(FaceLandmark::RightEye).y - t.frown_margin_px;
        let frowning = left_frown && right_frown;

        let head_tilt_delta =
            landmarks.pixel(FaceLandmark::RightCheek).y - landmarks.pixel(FaceLandmark::LeftCheek).y;
        let steer = if head_tilt_delta > t.tilt_px {
            -t.steer
        } else if head_tilt_delta < -t.tilt_px {
            t.steer
        } else {
            0.0
        };

        let throttle = if mouth_open { t.throttle } else { 0.0 };
        let brake = if frowning { t.brake } else { 0.0 };

        let nod = self.nods.observe(landmarks.pixel(FaceLandmark::NoseTip).y, now);
        if let Some(nod) = nod {
            self.shift(nod);
        }

        Gestures {
            mouth_open,
            frowning,
            head_tilt_delta,
            nod,
            control: VehicleControl::with_gear(throttle, steer, brake, self.gear),
        }
    }

    fn shift(&mut self, nod: Nod) {
        let previous = self.gear;
        self.gear = match nod {
            Nod::Down => (self.gear + 1).min(self.thresholds.max_gear),
            Nod::Up => (self.gear - 1).max(self.thresholds.min_gear),
        };
        info!("nod {:?}: gear {} -> {}", nod, previous, self.gear);
    }
}

//! Interaction state machine: owns the single `ViewState` and applies
//! typed events from the UI controls.
//!
//! Keeping the transitions behind an `Event` enum keeps the machine
//! testable without any rendering surface; the GUI binary just translates
//! widget interactions into events and repaints from `frame()`.

use crate::dataset::DatasetIndex;
use crate::models::{Metric, ViewState};
use crate::view::{render, RenderFrame};
use std::time::{Duration, Instant};

/// Default playback cadence: one year per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Discrete inputs from the UI controls.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Year slider moved (value clamped into the indexed range).
    SetYear(i32),
    /// Metric selector changed.
    SetMetric(Metric),
    /// Metric selector changed, raw key form. Unknown keys are ignored
    /// (the selector is a closed set; this path is purely defensive).
    SetMetricKey(String),
    /// Pointer entered a country shape.
    Hover(String),
    /// Pointer left the map.
    Unhover,
    /// Scroll-zoom around a focus point in map coordinates.
    Zoom { factor: f32, focus: (f32, f32) },
    /// Drag-pan by a pixel delta.
    Pan { dx: f32, dy: f32 },
    /// Play/pause button pressed.
    TogglePlay,
    /// One playback step: advance the year, wrapping max back to min.
    Tick,
}

/// Presentational 2D affine transform for the map group (zoom/pan).
/// Deliberately not part of [`ViewState`]: it never affects data binding
/// and is not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    pub scale: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for MapTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

impl MapTransform {
    pub fn apply(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (x * self.scale + self.tx, y * self.scale + self.ty)
    }

    fn zoom(&mut self, factor: f32, (fx, fy): (f32, f32)) {
        // Keep the focus point fixed on screen while scaling.
        self.scale *= factor;
        self.tx = fx + (self.tx - fx) * factor;
        self.ty = fy + (self.ty - fy) * factor;
    }
}

/// Single-slot playback clock. Arming always replaces the previous
/// deadline, so there is never more than one pending tick.
#[derive(Debug, Clone, Copy)]
struct Playback {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Playback {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
        }
    }

    fn arm(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
    }

    fn disarm(&mut self) {
        self.next_tick = None;
    }

    /// True when a tick is due; re-arms from `now` so intervals do not
    /// accumulate drift into a burst after a stall.
    fn poll(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(deadline) if now >= deadline => {
                self.next_tick = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Owns all mutable interaction state and the transition function.
#[derive(Debug, Clone)]
pub struct Controller {
    state: ViewState,
    hovered: Option<String>,
    transform: MapTransform,
    playback: Playback,
    min_year: Option<i32>,
    max_year: Option<i32>,
}

impl Controller {
    /// Start at the first indexed year with PM2.5 selected, paused.
    pub fn new(index: &DatasetIndex) -> Self {
        Self::with_interval(index, DEFAULT_TICK_INTERVAL)
    }

    pub fn with_interval(index: &DatasetIndex, interval: Duration) -> Self {
        let min_year = index.min_year();
        Self {
            state: ViewState::new(min_year.unwrap_or(0)),
            hovered: None,
            transform: MapTransform::default(),
            playback: Playback::new(interval),
            min_year,
            max_year: index.max_year(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn transform(&self) -> MapTransform {
        self.transform
    }

    /// Apply one event. `now` anchors the playback clock; pass
    /// `Instant::now()` from the UI loop.
    pub fn apply(&mut self, event: Event, now: Instant) {
        match event {
            Event::SetYear(y) => self.set_year(y),
            Event::SetMetric(m) => self.state.metric = m,
            Event::SetMetricKey(key) => {
                if let Some(m) = Metric::from_key(&key) {
                    self.state.metric = m;
                } else {
                    log::warn!("ignoring unknown metric key {key:?}");
                }
            }
            Event::Hover(country) => self.hovered = Some(country),
            Event::Unhover => self.hovered = None,
            Event::Zoom { factor, focus } => self.transform.zoom(factor, focus),
            Event::Pan { dx, dy } => {
                self.transform.tx += dx;
                self.transform.ty += dy;
            }
            Event::TogglePlay => {
                self.state.playing = !self.state.playing;
                if self.state.playing {
                    self.playback.arm(now);
                } else {
                    self.playback.disarm();
                }
            }
            Event::Tick => self.advance_year(),
        }
    }

    /// Clamp into the indexed year range; a no-op when nothing is indexed.
    fn set_year(&mut self, year: i32) {
        if let (Some(min), Some(max)) = (self.min_year, self.max_year) {
            self.state.year = year.clamp(min, max);
        }
    }

    /// Advance one year, wrapping from max back to min.
    fn advance_year(&mut self) {
        if let (Some(min), Some(max)) = (self.min_year, self.max_year) {
            let next = self.state.year + 1;
            self.state.year = if next > max { min } else { next };
        }
    }

    /// Check the playback clock: when playing and a tick is due, advance
    /// the year and report `true` so the caller repaints.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.state.playing {
            return false;
        }
        if self.playback.poll(now) {
            self.advance_year();
            true
        } else {
            false
        }
    }

    /// Whether a tick deadline is currently armed. Playing and armed are
    /// always in lockstep; exposed for the UI's repaint scheduling.
    pub fn playback_armed(&self) -> bool {
        self.playback.next_tick.is_some()
    }

    pub fn tick_interval(&self) -> Duration {
        self.playback.interval
    }

    /// Rebuild the visible surface from the current state.
    pub fn frame(&self, index: &DatasetIndex, countries: &[String]) -> RenderFrame {
        render(&self.state, self.hovered(), index, countries)
    }
}

//! Maps the native scrollbar's bounded pixel space onto the logical
//! content space, switching to a compressed/scaled mode when the logical
//! size would exceed the browser's max element size (spec §4.6).

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::velocity::{Velocity, VelocityTracker};

/// The effective max element size before browsers start clamping
/// scrollable dimensions (spec `MAX_VIRTUAL_SIZE`).
pub const MAX_VIRTUAL_SIZE: f64 = 16_700_000.0;

/// Samples kept by the scrollbar's own velocity tracker (spec
/// `VELOCITY_SAMPLE_COUNT` = 8 for the scrollbar controller).
pub const SCROLLBAR_VELOCITY_SAMPLES: usize = 8;
/// Minimum reliable samples for the scrollbar tracker (spec
/// `MIN_RELIABLE_SAMPLES` = 3).
pub const SCROLLBAR_MIN_RELIABLE_SAMPLES: usize = 3;

/// px/ms above which an in-flight programmatic scroll animation is
/// cancelled in favor of the user's own input (spec
/// `CANCEL_LOAD_VELOCITY_THRESHOLD`-adjacent "cancel-velocity threshold").
pub const CANCEL_VELOCITY_THRESHOLD: f64 = 5.0;

/// Whether the controller reads/writes native scrollTop 1:1, or rescales
/// an unbounded logical space onto a capped native track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// `actual_size <= MAX_VIRTUAL_SIZE`; 1:1 native scrolling.
    Native,
    /// `actual_size > MAX_VIRTUAL_SIZE`; coarse jumps are scaled, fine
    /// wheel motion advances the logical position directly.
    Compressed,
}

/// Maps native scroll events onto a (possibly much larger) logical scroll
/// space, and tracks scroll velocity for cancellation/idle decisions.
pub struct ScrollController {
    viewport: Element,
    mode: ScrollMode,
    actual_size: f64,
    /// `virtual_size / actual_size` when compressed; `1.0` otherwise.
    compression_ratio: f64,
    /// Logical scroll position; the source of truth in compressed mode.
    logical_position: f64,
    velocity: VelocityTracker,
    /// Pending programmatic write, deferred to the next frame if it would
    /// race a native write in flight (spec §4.9).
    pending_native_write: Option<f64>,
    /// Whether a coarse jump past either content edge wraps around instead
    /// of clamping (`config.scroll.wrap`).
    wrap: bool,
    /// Fine-motion rebalancing band half-width as a fraction of the native
    /// track, e.g. `0.25` re-centers within `[25%, 75%]`
    /// (`config.scroll.fine_motion_band`).
    fine_motion_band: f64,
}

impl std::fmt::Debug for ScrollController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollController")
            .field("mode", &self.mode)
            .field("actual_size", &self.actual_size)
            .field("compression_ratio", &self.compression_ratio)
            .field("logical_position", &self.logical_position)
            .finish()
    }
}

impl ScrollController {
    /// Construct a controller bound to `viewport`, with an initial content
    /// extent of `actual_size`. `wrap` and `fine_motion_band` mirror
    /// `config.scroll.wrap`/`config.scroll.fine_motion_band`.
    pub fn new(viewport: Element, actual_size: f64, wrap: bool, fine_motion_band: f64) -> Self {
        let mut controller = Self {
            viewport,
            mode: ScrollMode::Native,
            actual_size: 0.0,
            compression_ratio: 1.0,
            logical_position: 0.0,
            velocity: VelocityTracker::new(SCROLLBAR_VELOCITY_SAMPLES, SCROLLBAR_MIN_RELIABLE_SAMPLES),
            pending_native_write: None,
            wrap,
            fine_motion_band,
        };
        controller.set_actual_size(actual_size);
        controller
    }

    /// Whether the controller is currently in compressed mode.
    pub fn is_compressed(&self) -> bool {
        self.mode == ScrollMode::Compressed
    }

    /// `virtual_size / actual_size` when compressed; `1.0` otherwise.
    pub fn compression_ratio(&self) -> f64 {
        self.compression_ratio
    }

    /// The scroll size the browser should present (the virtual track
    /// length, capped at `MAX_VIRTUAL_SIZE` in compressed mode).
    pub fn virtual_size(&self) -> f64 {
        match self.mode {
            ScrollMode::Native => self.actual_size,
            ScrollMode::Compressed => MAX_VIRTUAL_SIZE,
        }
    }

    /// Update the logical content extent, switching modes if the cap is
    /// crossed.
    pub fn set_actual_size(&mut self, actual_size: f64) {
        self.actual_size = actual_size.max(0.0);
        if self.actual_size > MAX_VIRTUAL_SIZE {
            self.mode = ScrollMode::Compressed;
            self.compression_ratio = MAX_VIRTUAL_SIZE / self.actual_size;
        } else {
            self.mode = ScrollMode::Native;
            self.compression_ratio = 1.0;
        }
        self.logical_position = self.logical_position.clamp(0.0, self.actual_size);
    }

    /// Read the logical scroll position (`getScrollTop()` in spec terms).
    pub fn get_scroll_top(&self) -> f64 {
        self.logical_position
    }

    /// Programmatically set the logical scroll position and write the
    /// corresponding native value. If a native write is already pending
    /// this frame, the programmatic write yields and is retried next
    /// frame (spec §4.9 race rule).
    pub fn set_scroll_top(&mut self, logical_pos: f64) {
        self.logical_position = self.clamp_or_wrap(logical_pos);
        let native = self.logical_to_native(self.logical_position);
        if self.pending_native_write.is_some() {
            self.pending_native_write = Some(native);
            return;
        }
        self.write_native(native);
    }

    /// Called from the scroll handler with the native `scrollTop` reading.
    /// Updates the logical position and velocity tracker. Returns the new
    /// logical position.
    pub fn on_native_scroll(&mut self, native_pos: f64, time_ms: f64) -> f64 {
        self.pending_native_write = None;
        let logical = self.native_to_logical(native_pos);
        self.logical_position = self.clamp_or_wrap(logical);
        self.velocity.push(self.logical_position, time_ms);
        self.logical_position
    }

    /// Apply the edge behavior configured via `config.scroll.wrap`: clamp
    /// to `[0, actual_size]`, or wrap around when a coarse jump (only
    /// possible in compressed mode) overshoots either edge.
    fn clamp_or_wrap(&self, logical: f64) -> f64 {
        if self.wrap && self.mode == ScrollMode::Compressed && self.actual_size > 0.0 {
            logical.rem_euclid(self.actual_size)
        } else {
            logical.clamp(0.0, self.actual_size)
        }
    }

    /// **Fine motion**: advance the logical position directly by a wheel
    /// event's `delta` (in real pixels), independent of the compression
    /// ratio, then re-center the native scroll position within a safe
    /// middle band so the browser never runs out of native track to
    /// scroll against. Only meaningful in compressed mode; in native mode
    /// this is a no-op (the browser's own wheel handling applies).
    pub fn on_wheel_fine_motion(&mut self, delta: f64, time_ms: f64) {
        if self.mode != ScrollMode::Compressed {
            return;
        }
        self.logical_position = self.clamp_or_wrap(self.logical_position + delta);
        self.velocity.push(self.logical_position, time_ms);
        // Re-center within the middle band configured by `fine_motion_band`
        // (default [25%, 75%]) so subsequent wheel deltas have room to move
        // before hitting a native scroll-edge clamp.
        let native_total = self.virtual_size() - self.viewport_client_size();
        if native_total > 0.0 {
            let band_low = native_total * self.fine_motion_band;
            let band_high = native_total * (1.0 - self.fine_motion_band);
            let current_native = self.viewport.scroll_top() as f64;
            if current_native < band_low || current_native > band_high {
                let recentered = native_total / 2.0;
                self.pending_native_write = Some(recentered);
                self.write_native(recentered);
            }
        }
    }

    /// Current velocity reading from the scrollbar's own tracker.
    pub fn velocity(&self) -> Velocity {
        self.velocity.velocity()
    }

    /// Whether an in-flight animated scroll should be treated as aborted,
    /// because observed velocity exceeds `threshold` (default
    /// [`CANCEL_VELOCITY_THRESHOLD`]).
    pub fn scroll_aborts(&self, threshold: Option<f64>) -> bool {
        let threshold = threshold.unwrap_or(CANCEL_VELOCITY_THRESHOLD);
        let v = self.velocity();
        v.reliable && v.velocity.abs() > threshold
    }

    fn viewport_client_size(&self) -> f64 {
        self.viewport
            .dyn_ref::<HtmlElement>()
            .map(|el| el.client_height() as f64)
            .unwrap_or(0.0)
    }

    fn logical_to_native(&self, logical: f64) -> f64 {
        match self.mode {
            ScrollMode::Native => logical,
            ScrollMode::Compressed => logical * self.compression_ratio,
        }
    }

    fn native_to_logical(&self, native: f64) -> f64 {
        match self.mode {
            ScrollMode::Native => native,
            ScrollMode::Compressed => {
                if self.compression_ratio > 0.0 {
                    native / self.compression_ratio
                } else {
                    0.0
                }
            }
        }
    }

    fn write_native(&mut self, native_pos: f64) {
        self.viewport.set_scroll_top(native_pos as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Pure-math assertions that don't require a live `Element`/DOM; the
    // coarse-jump/compression-ratio formulas are exercised directly.

    #[test]
    fn compression_activates_above_cap() {
        // 10,000,000 items, fixed height 48 -> actualSize = 480,000,000.
        let actual_size = 480_000_000.0;
        assert!(actual_size > MAX_VIRTUAL_SIZE);
        let ratio = MAX_VIRTUAL_SIZE / actual_size;
        assert!((ratio - 0.0348).abs() < 0.001);
    }

    #[test]
    fn native_mode_below_cap_has_ratio_one() {
        let actual_size = 480_000.0;
        assert!(actual_size <= MAX_VIRTUAL_SIZE);
    }
}

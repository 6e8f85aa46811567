//! Interactive region selection
//!
//! An explicit state machine over pointer input: the selector owns the
//! current [`SelectionRegion`] and playback cursor, hit-tests pointer-down
//! against the two region handles and the playhead, and converts pixel
//! positions into timeline percentages.
//!
//! Every transition is infallible. Pointer input is noisy, so updates that
//! would violate the region invariant are ignored outright rather than
//! clamped or raised as errors.

use coda_core::SelectionRegion;

/// Dimensions of the drawing surface the selector maps pointer x against
///
/// A fixed horizontal padding strip on each side is reserved for time
/// labels; the selection and playhead live in the drawable span between
/// the strips, and every pixel conversion accounts for it. Handles at 0%
/// and 100% therefore sit `label_padding_px` in from the edges and stay
/// grabbable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMetrics {
    width_px: f32,
    label_padding_px: f32,
}

impl ViewMetrics {
    pub fn new(width_px: f32, label_padding_px: f32) -> Self {
        Self {
            width_px: width_px.max(0.0),
            label_padding_px: label_padding_px.max(0.0),
        }
    }

    #[inline]
    pub fn width_px(&self) -> f32 {
        self.width_px
    }

    #[inline]
    pub fn label_padding_px(&self) -> f32 {
        self.label_padding_px
    }

    /// Width of the span that actually maps to the timeline
    fn drawable_width(&self) -> f32 {
        (self.width_px - 2.0 * self.label_padding_px).max(1.0)
    }

    /// Convert a pointer x position into a timeline percentage
    pub fn pct_at(&self, x: f32) -> f64 {
        let ratio = (x - self.label_padding_px) / self.drawable_width();
        (ratio as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Convert a timeline percentage into an x position
    pub fn x_at(&self, pct: f64) -> f32 {
        self.label_padding_px + (pct / 100.0) as f32 * self.drawable_width()
    }
}

/// Current time position within the asset
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackCursor {
    seconds: f64,
}

impl PlaybackCursor {
    #[inline]
    pub fn seconds(&self) -> f64 {
        self.seconds
    }
}

/// Drag interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingStart,
    DraggingEnd,
    DraggingPlayhead,
}

/// One pointer event, as delivered by the host UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32 },
    Move { x: f32 },
    Up,
    Leave,
}

/// Default pointer hit tolerance around handles, in pixels
pub const DEFAULT_HIT_TOLERANCE_PX: f32 = 6.0;

/// Owns the selection bounds and playhead for one trim session
pub struct RegionSelector {
    region: SelectionRegion,
    cursor: PlaybackCursor,
    duration_secs: f64,
    metrics: ViewMetrics,
    hit_tolerance_px: f32,
    state: DragState,
}

impl RegionSelector {
    /// Create a selector over the full timeline of an asset
    pub fn new(duration_secs: f64, metrics: ViewMetrics) -> Self {
        Self {
            region: SelectionRegion::full(),
            cursor: PlaybackCursor::default(),
            duration_secs,
            metrics,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
            state: DragState::Idle,
        }
    }

    pub fn with_hit_tolerance(mut self, tolerance_px: f32) -> Self {
        self.hit_tolerance_px = tolerance_px.max(0.0);
        self
    }

    #[inline]
    pub fn region(&self) -> SelectionRegion {
        self.region
    }

    #[inline]
    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    #[inline]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[inline]
    pub fn metrics(&self) -> ViewMetrics {
        self.metrics
    }

    /// Update the drawing-surface dimensions (host layout changed)
    pub fn set_metrics(&mut self, metrics: ViewMetrics) {
        self.metrics = metrics;
    }

    /// Playback progress as a rounded percentage of the full duration
    pub fn progress_percent(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.cursor.seconds / self.duration_secs * 100.0).round()
        } else {
            0.0
        }
    }

    /// Process one pointer event, in arrival order
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x } => self.pointer_down(x),
            PointerEvent::Move { x } => self.pointer_move(x),
            // Released pointers produce no further updates
            PointerEvent::Up | PointerEvent::Leave => self.state = DragState::Idle,
        }
    }

    /// Seek to a time, clamped into the active region
    pub fn seek_seconds(&mut self, seconds: f64) {
        self.cursor.seconds = self.region.clamp_time(seconds, self.duration_secs);
    }

    /// Track the transport's reported time, clamped into the active region
    pub fn set_playback_time(&mut self, seconds: f64) {
        self.seek_seconds(seconds);
    }

    fn pointer_down(&mut self, x: f32) {
        let start_x = self.metrics.x_at(self.region.start_pct());
        let end_x = self.metrics.x_at(self.region.end_pct());
        let playhead_x = self.playhead_x();
        let tolerance = self.hit_tolerance_px;

        self.state = if (x - start_x).abs() <= tolerance {
            DragState::DraggingStart
        } else if (x - end_x).abs() <= tolerance {
            DragState::DraggingEnd
        } else if (x - playhead_x).abs() <= tolerance {
            DragState::DraggingPlayhead
        } else {
            // Miss: a direct seek, then keep following the pointer
            self.seek_seconds(self.time_at_x(x));
            DragState::DraggingPlayhead
        };
    }

    fn pointer_move(&mut self, x: f32) {
        match self.state {
            DragState::Idle => {}
            DragState::DraggingStart => {
                let pct = self.metrics.pct_at(x);
                // A start at or past the end handle is ignored, not clamped
                if let Ok(region) = SelectionRegion::new(pct, self.region.end_pct()) {
                    self.apply_region(region);
                }
            }
            DragState::DraggingEnd => {
                let pct = self.metrics.pct_at(x);
                if let Ok(region) = SelectionRegion::new(self.region.start_pct(), pct) {
                    self.apply_region(region);
                }
            }
            DragState::DraggingPlayhead => {
                self.seek_seconds(self.time_at_x(x));
            }
        }
    }

    fn apply_region(&mut self, region: SelectionRegion) {
        self.region = region;
        // Keep the cursor inside the (possibly shrunken) region
        self.cursor.seconds = region.clamp_time(self.cursor.seconds, self.duration_secs);
    }

    fn time_at_x(&self, x: f32) -> f64 {
        self.metrics.pct_at(x) / 100.0 * self.duration_secs
    }

    fn playhead_x(&self) -> f32 {
        let pct = if self.duration_secs > 0.0 {
            self.cursor.seconds / self.duration_secs * 100.0
        } else {
            0.0
        };
        self.metrics.x_at(pct)
    }
}

/// Format a time in seconds as "m:ss" for labels
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

//! Preview-surface playback synchronization
//!
//! Keeps a secondary render surface (e.g. a muted video preview) time-
//! locked to the primary media transport. Small drift is tolerated:
//! re-seeking on every tick causes visible stutter, so the secondary is
//! only corrected once the discrepancy crosses a threshold. While the host
//! page is hidden the secondary is paused outright and resynchronized the
//! moment visibility returns.

/// Seam over a host media surface (audio element, video element, ...)
///
/// The engine drives both surfaces exclusively through this trait, so the
/// synchronizer is testable without any host media machinery.
pub trait MediaTransport {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Jump to a position in seconds
    fn seek(&mut self, seconds: f64);

    fn is_playing(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);
}

/// Transport events mirrored from the primary onto the secondary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    Play,
    Pause,
    Seeking(f64),
}

/// Drift below this is left uncorrected by default, in seconds
pub const DEFAULT_DRIFT_THRESHOLD_SECS: f64 = 0.1;

/// Keeps a secondary surface matched to the primary transport
#[derive(Debug, Clone)]
pub struct PreviewSync {
    drift_threshold_secs: f64,
    page_visible: bool,
}

impl PreviewSync {
    pub fn new(drift_threshold_secs: f64) -> Self {
        Self {
            drift_threshold_secs,
            page_visible: true,
        }
    }

    #[inline]
    pub fn page_visible(&self) -> bool {
        self.page_visible
    }

    /// Mirror one primary transport event onto the secondary
    ///
    /// Play is suppressed while the page is hidden; pause and seek still
    /// apply so the secondary is parked at the right position.
    pub fn mirror_event(&self, event: TransportEvent, secondary: &mut impl MediaTransport) {
        match event {
            TransportEvent::Play => {
                if self.page_visible {
                    secondary.play();
                }
            }
            TransportEvent::Pause => secondary.pause(),
            TransportEvent::Seeking(seconds) => secondary.seek(seconds),
        }
    }

    /// Periodic correction: re-seek only past the drift threshold, and
    /// match the primary's play/pause state
    pub fn sync(&self, primary: &impl MediaTransport, secondary: &mut impl MediaTransport) {
        if !self.page_visible {
            if secondary.is_playing() {
                secondary.pause();
            }
            return;
        }

        let drift = (primary.current_time() - secondary.current_time()).abs();
        if drift > self.drift_threshold_secs {
            log::debug!("preview drift {:.3}s exceeds threshold, re-seeking", drift);
            secondary.seek(primary.current_time());
        }

        match (primary.is_playing(), secondary.is_playing()) {
            (true, false) => secondary.play(),
            (false, true) => secondary.pause(),
            _ => {}
        }
    }

    /// Handle a page visibility change
    ///
    /// Hiding pauses the secondary; restoring re-seeks unconditionally and
    /// resumes if the primary is playing.
    pub fn set_visible(
        &mut self,
        visible: bool,
        primary: &impl MediaTransport,
        secondary: &mut impl MediaTransport,
    ) {
        self.page_visible = visible;
        if visible {
            secondary.seek(primary.current_time());
            if primary.is_playing() {
                secondary.play();
            }
        } else if secondary.is_playing() {
            secondary.pause();
        }
    }
}

impl Default for PreviewSync {
    fn default() -> Self {
        Self::new(DEFAULT_DRIFT_THRESHOLD_SECS)
    }
}

//! Common types for Coda
//!
//! Fundamental audio types shared by the decode, waveform and trim stages:
//! the decoded asset with its planar PCM buffers, media kind tagging, and
//! the user-selected trim region.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Audio sample type (32-bit float for processing, quantized on export)
pub type Sample = f32;

/// Identity of one decoded asset
///
/// Process-unique and monotonic. Derived state (waveform summaries,
/// in-flight decodes) is keyed on this so stale data can never be
/// confused with data for a newer asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(u64);

impl AssetId {
    /// Allocate the next asset identity
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// Kind of an uploaded media file, resolved once from its declared MIME type
///
/// Video assets additionally get a visual preview surface from the UI; the
/// audio pipeline treats both kinds identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Resolve the media kind from a declared MIME type (e.g. "video/mp4")
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_ascii_lowercase().starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }
}

/// One decoded source file: planar PCM plus format metadata
///
/// The asset exclusively owns its sample buffers. All channels have equal
/// length, and duration always derives from the sample count rather than
/// any container-reported value.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    id: AssetId,
    /// One buffer per channel, all the same length
    channels: Vec<Vec<Sample>>,
    sample_rate: u32,
}

impl AudioAsset {
    /// Create an asset from planar channel buffers
    ///
    /// Panics if no channels are given, channel lengths differ, or the
    /// sample rate is zero; decoded output never violates these.
    pub fn from_channels(channels: Vec<Vec<Sample>>, sample_rate: u32) -> Self {
        assert!(!channels.is_empty(), "asset must have at least one channel");
        assert!(sample_rate > 0, "sample rate must be nonzero");
        let frames = channels[0].len();
        assert!(
            channels.iter().all(|c| c.len() == frames),
            "all channels must have equal length"
        );
        Self {
            id: AssetId::next(),
            channels,
            sample_rate,
        }
    }

    /// Get this asset's identity
    #[inline]
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Get the sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of channels
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Get the per-channel sample count
    #[inline]
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Get the duration in seconds (sample count / sample rate)
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Get one channel's samples
    #[inline]
    pub fn channel(&self, index: usize) -> &[Sample] {
        &self.channels[index]
    }

    /// Get all channels
    #[inline]
    pub fn channels(&self) -> &[Vec<Sample>] {
        &self.channels
    }

    /// Get the channel used for single-channel summaries (channel 0)
    #[inline]
    pub fn primary_channel(&self) -> &[Sample] {
        &self.channels[0]
    }
}

/// A region constructor was given bounds with start >= end
///
/// This is a programming-contract violation on the caller's side; the
/// interactive selector never produces such bounds.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("invalid selection region: start {start}% must be strictly below end {end}%")]
pub struct InvalidRegionError {
    pub start: f64,
    pub end: f64,
}

/// User-chosen sub-range of an asset's timeline, in percent of duration
///
/// `start_pct < end_pct` holds strictly for every value of this type; the
/// constructor is the only way in, so downstream consumers (trim, playhead
/// clamping) never re-validate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRegion {
    start_pct: f64,
    end_pct: f64,
}

impl SelectionRegion {
    /// Create a region from start/end percentages in [0, 100]
    pub fn new(start_pct: f64, end_pct: f64) -> Result<Self, InvalidRegionError> {
        let valid = start_pct.is_finite()
            && end_pct.is_finite()
            && (0.0..=100.0).contains(&start_pct)
            && (0.0..=100.0).contains(&end_pct)
            && start_pct < end_pct;
        if !valid {
            return Err(InvalidRegionError {
                start: start_pct,
                end: end_pct,
            });
        }
        Ok(Self { start_pct, end_pct })
    }

    /// The full timeline (0% to 100%)
    pub fn full() -> Self {
        Self {
            start_pct: 0.0,
            end_pct: 100.0,
        }
    }

    #[inline]
    pub fn start_pct(&self) -> f64 {
        self.start_pct
    }

    #[inline]
    pub fn end_pct(&self) -> f64 {
        self.end_pct
    }

    /// Selected span in percent
    pub fn span_pct(&self) -> f64 {
        self.end_pct - self.start_pct
    }

    /// Region start in seconds for the given duration
    pub fn start_time(&self, duration_secs: f64) -> f64 {
        self.start_pct / 100.0 * duration_secs
    }

    /// Region end in seconds for the given duration
    pub fn end_time(&self, duration_secs: f64) -> f64 {
        self.end_pct / 100.0 * duration_secs
    }

    /// First sample index covered by the region
    pub fn start_sample(&self, total_frames: usize) -> usize {
        (self.start_pct / 100.0 * total_frames as f64).floor() as usize
    }

    /// One-past-last sample index covered by the region
    pub fn end_sample(&self, total_frames: usize) -> usize {
        (self.end_pct / 100.0 * total_frames as f64).floor() as usize
    }

    /// Clamp a playback time into the region's time window
    pub fn clamp_time(&self, seconds: f64, duration_secs: f64) -> f64 {
        seconds.clamp(self.start_time(duration_secs), self.end_time(duration_secs))
    }
}

impl Default for SelectionRegion {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_ids_are_unique() {
        let a = AudioAsset::from_channels(vec![vec![0.0; 4]], 44100);
        let b = AudioAsset::from_channels(vec![vec![0.0; 4]], 44100);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_duration_derives_from_sample_count() {
        let asset = AudioAsset::from_channels(vec![vec![0.0; 22050], vec![0.0; 22050]], 44100);
        assert_eq!(asset.channel_count(), 2);
        assert_eq!(asset.frames(), 22050);
        assert!((asset.duration_seconds() - 0.5).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_unequal_channels_rejected() {
        AudioAsset::from_channels(vec![vec![0.0; 10], vec![0.0; 9]], 44100);
    }

    #[test]
    fn test_media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("audio/mpeg"), MediaKind::Audio);
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("VIDEO/webm"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("application/octet-stream"), MediaKind::Audio);
    }

    #[test]
    fn test_region_rejects_inverted_bounds() {
        assert!(SelectionRegion::new(50.0, 50.0).is_err());
        assert!(SelectionRegion::new(60.0, 40.0).is_err());
        assert!(SelectionRegion::new(-1.0, 50.0).is_err());
        assert!(SelectionRegion::new(0.0, 100.1).is_err());
        assert!(SelectionRegion::new(f64::NAN, 50.0).is_err());
        assert!(SelectionRegion::new(20.0, 50.0).is_ok());
    }

    #[test]
    fn test_region_sample_bounds() {
        let region = SelectionRegion::new(20.0, 50.0).unwrap();
        assert_eq!(region.start_sample(441_000), 88_200);
        assert_eq!(region.end_sample(441_000), 220_500);
    }

    #[test]
    fn test_region_time_clamp() {
        let region = SelectionRegion::new(25.0, 75.0).unwrap();
        assert_eq!(region.clamp_time(0.0, 10.0), 2.5);
        assert_eq!(region.clamp_time(9.9, 10.0), 7.5);
        assert_eq!(region.clamp_time(5.0, 10.0), 5.0);
    }
}

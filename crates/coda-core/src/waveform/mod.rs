//! Waveform downsampling
//!
//! Reduces one PCM channel to a fixed number of RMS amplitude bins for
//! drawing. The summary is a pure function of (samples, bin count), so it
//! is cached per asset identity and recomputed wholesale when the asset
//! changes. It is never updated incrementally and never shared across
//! assets.

use crate::types::{AssetId, AudioAsset, Sample};

/// Visual summary of one channel: RMS amplitude bins plus their maximum
///
/// `max` is the normalization reference for rendering; it equals the
/// largest bin and is 0 for silent input (renderers must not divide by it
/// blindly).
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSeries {
    bins: Vec<f32>,
    max: f32,
}

impl WaveformSeries {
    /// Get the amplitude bins, ordered by time
    #[inline]
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Get the number of bins
    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Check if the series has no bins
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Get the global maximum bin value
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }
}

/// Downsample a channel into `bin_count` RMS bins
///
/// The channel is split into `bin_count` contiguous windows of
/// `floor(len / bin_count)` samples; the last window absorbs the
/// remainder. An empty window (possible when `len < bin_count`) has an
/// RMS of 0 rather than dividing by zero.
pub fn downsample(channel: &[Sample], bin_count: usize) -> WaveformSeries {
    assert!(bin_count > 0, "bin count must be nonzero");

    let window = channel.len() / bin_count;
    let mut bins = Vec::with_capacity(bin_count);
    let mut max = 0.0f32;

    for i in 0..bin_count {
        let start = i * window;
        let end = if i + 1 == bin_count {
            channel.len()
        } else {
            start + window
        };
        let rms = window_rms(&channel[start..end]);
        max = max.max(rms);
        bins.push(rms);
    }

    WaveformSeries { bins, max }
}

/// RMS of one window; 0 for an empty window
fn window_rms(samples: &[Sample]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Memoized waveform summary, keyed strictly on asset identity
///
/// Holds at most one series. Requesting a series for a different
/// (asset, bin count) key recomputes and fully replaces the entry, so a
/// stale summary can never be observed against a newer asset.
#[derive(Debug, Default)]
pub struct WaveformCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    key: (AssetId, usize),
    series: WaveformSeries,
}

impl WaveformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the series for `asset`, recomputing if the cached entry is for
    /// a different asset or bin count
    pub fn series(&mut self, asset: &AudioAsset, bin_count: usize) -> &WaveformSeries {
        let key = (asset.id(), bin_count);
        let stale = self.entry.as_ref().map(|e| e.key) != Some(key);
        if stale {
            log::debug!("recomputing waveform for {} ({} bins)", asset.id(), bin_count);
            self.entry = Some(CacheEntry {
                key,
                series: downsample(asset.primary_channel(), bin_count),
            });
        }
        let entry = self.entry.as_ref().expect("cache entry populated above");
        &entry.series
    }

    /// Drop the cached series (on asset discard)
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

//! Engine context and trim sessions
//!
//! [`EngineContext`] is the explicitly owned root of the interactive
//! engine: it holds the spectrum tap, the visualizer color state, the
//! preview handle registry and the config, and it arbitrates decode
//! lifecycles. There is no ambient global state; the host constructs a
//! context, hands it around, and tears it down.
//!
//! A [`TrimSession`] owns one asset being trimmed: its selector, its
//! memoized waveform summary, and the preview handle for the source
//! bytes. Closing the session releases what it owns.

use coda_core::decode::DecodeError;
use coda_core::trim::{trim, TrimResult};
use coda_core::waveform::{WaveformCache, WaveformSeries};
use coda_core::{AudioAsset, MediaKind};

use crate::config::EngineConfig;
use crate::region::{RegionSelector, ViewMetrics};
use crate::resources::{HandleRegistry, MediaHandle};
use crate::spectrum::{render_bars, ColorTransition, SpectrumAnalyzer, SpectrumBars, SpectrumFrame};
use crate::sync::MediaTransport;

/// Identity of one in-flight decode
///
/// Issued by [`EngineContext::begin_load`]; only the newest ticket's
/// result is ever accepted, so a slow decode for a replaced upload can
/// never overwrite newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket(u64);

/// Everything the host renders for one tick of the visualizer
#[derive(Debug, Clone, PartialEq)]
pub struct TickFrame {
    /// Raw per-bin magnitudes, for hosts drawing their own visualization
    pub spectrum: SpectrumFrame,
    /// Bar geometry and fill color for the stock visualizer
    pub bars: SpectrumBars,
    /// Current color transition value in [0, 1]
    pub color_t: f32,
}

/// Explicitly owned engine root: spectrum tap, color state, resources
pub struct EngineContext {
    config: EngineConfig,
    analyzer: SpectrumAnalyzer,
    color: ColorTransition,
    resources: HandleRegistry,
    newest_ticket: u64,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let analyzer = SpectrumAnalyzer::new(config.validated_fft_size());
        let color = ColorTransition::with_rates(config.color_attack_rate, config.color_release_rate);
        Self {
            config,
            analyzer,
            color,
            resources: HandleRegistry::new(),
            newest_ticket: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn resources(&self) -> &HandleRegistry {
        &self.resources
    }

    #[inline]
    pub fn resources_mut(&mut self) -> &mut HandleRegistry {
        &mut self.resources
    }

    /// Start loading a new upload; supersedes any decode still in flight
    pub fn begin_load(&mut self) -> DecodeTicket {
        self.newest_ticket += 1;
        log::debug!("issued decode ticket {}", self.newest_ticket);
        DecodeTicket(self.newest_ticket)
    }

    /// Offer a finished decode to the engine
    ///
    /// Returns `None` when the ticket has been superseded: the stale
    /// result (asset or error) is dropped on arrival. For the current
    /// ticket the result passes through, and a successful decode resets
    /// the spectrum tap for the new asset.
    pub fn accept_decode(
        &mut self,
        ticket: DecodeTicket,
        decoded: Result<AudioAsset, DecodeError>,
    ) -> Option<Result<AudioAsset, DecodeError>> {
        if ticket.0 != self.newest_ticket {
            match &decoded {
                Ok(asset) => log::debug!(
                    "dropping stale decode of {} (ticket {} superseded by {})",
                    asset.id(),
                    ticket.0,
                    self.newest_ticket
                ),
                Err(e) => log::debug!("dropping stale decode error: {}", e),
            }
            return None;
        }

        if decoded.is_ok() {
            self.analyzer.reset();
        }
        Some(decoded)
    }

    /// Feed recent playback samples into the spectrum tap
    pub fn push_samples(&mut self, samples: &[f32]) {
        self.analyzer.push_samples(samples);
    }

    /// Advance one render tick
    ///
    /// Reads current state only; calling it twice with the same state
    /// differs only by one color-transition step, never by side effects on
    /// assets or sessions.
    pub fn tick(&mut self, playing: bool, width: f32, height: f32) -> TickFrame {
        let color_t = self.color.tick(playing);
        let spectrum = self.analyzer.frame();
        let bars = render_bars(&spectrum, color_t, width, height);
        TickFrame {
            spectrum,
            bars,
            color_t,
        }
    }

    /// Release every engine-owned resource (component teardown)
    pub fn teardown(&mut self) {
        self.resources.release_all();
        self.analyzer.reset();
        log::info!("engine context torn down");
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// One asset being trimmed: selector, waveform summary, preview handle
pub struct TrimSession {
    asset: AudioAsset,
    kind: MediaKind,
    selector: RegionSelector,
    waveform: WaveformCache,
    waveform_bins: usize,
    preview: Option<MediaHandle>,
}

impl TrimSession {
    /// Open a session for a decoded asset
    ///
    /// `source_bytes` are the original upload, registered as the preview
    /// handle so the host can point a media element at them. The view
    /// width starts at zero; the host reports real layout through
    /// [`set_view_width`](Self::set_view_width).
    pub fn open(
        ctx: &mut EngineContext,
        asset: AudioAsset,
        kind: MediaKind,
        source_bytes: Vec<u8>,
    ) -> Self {
        let preview = ctx.resources_mut().register(source_bytes);
        let metrics = ViewMetrics::new(0.0, ctx.config().label_padding_px);
        let selector = RegionSelector::new(asset.duration_seconds(), metrics)
            .with_hit_tolerance(ctx.config().hit_tolerance_px);

        log::info!("opened trim session for {} ({:?})", asset.id(), kind);
        Self {
            asset,
            kind,
            selector,
            waveform: WaveformCache::new(),
            waveform_bins: ctx.config().waveform_bins,
            preview: Some(preview),
        }
    }

    #[inline]
    pub fn asset(&self) -> &AudioAsset {
        &self.asset
    }

    #[inline]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    #[inline]
    pub fn preview_handle(&self) -> Option<MediaHandle> {
        self.preview
    }

    #[inline]
    pub fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    #[inline]
    pub fn selector_mut(&mut self) -> &mut RegionSelector {
        &mut self.selector
    }

    /// Report the drawing surface width from host layout
    pub fn set_view_width(&mut self, width_px: f32) {
        let padding = self.selector.metrics().label_padding_px();
        self.selector.set_metrics(ViewMetrics::new(width_px, padding));
    }

    /// Waveform summary for drawing, memoized per asset identity
    pub fn waveform(&mut self) -> &WaveformSeries {
        self.waveform.series(&self.asset, self.waveform_bins)
    }

    /// Track the preview transport and stop playback at the region end
    pub fn poll_preview(&mut self, transport: &mut impl MediaTransport) {
        self.selector.set_playback_time(transport.current_time());

        let end = self
            .selector
            .region()
            .end_time(self.selector.duration_secs());
        if transport.is_playing() && transport.current_time() >= end {
            log::debug!("preview reached region end at {:.2}s, pausing", end);
            transport.pause();
        }
    }

    /// Produce the trimmed copy for the current selection
    pub fn commit(&self) -> TrimResult {
        trim(&self.asset, self.selector.region())
    }

    /// Close the session, releasing the preview handle
    pub fn close(mut self, ctx: &mut EngineContext) {
        if let Some(handle) = self.preview.take() {
            ctx.resources_mut().release(handle);
        }
        log::info!("closed trim session for {}", self.asset.id());
    }
}

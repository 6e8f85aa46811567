//! Live frequency-spectrum visualizer
//!
//! The analyzer taps recent playback PCM through a ring buffer and turns
//! it into byte-magnitude [`SpectrumFrame`]s: Hann window, real FFT,
//! per-bin exponential smoothing, then dB mapping onto 0–255. The
//! renderer reduces a frame to a small symmetric set of rounded bars whose
//! fill color fades between an idle gray and black as playback starts and
//! stops.

use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

/// Default FFT size of the analyzer tap
pub const DEFAULT_FFT_SIZE: usize = 256;

/// Exponential smoothing factor over successive magnitude frames
const SMOOTHING: f32 = 0.8;

/// dB value mapped to byte 0
const MIN_DB: f32 = -100.0;

/// dB value mapped to byte 255
const MAX_DB: f32 = -30.0;

/// One tick of live frequency data: one byte magnitude per bin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumFrame {
    bins: Vec<u8>,
}

impl SpectrumFrame {
    #[inline]
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Frequency analyzer over the most recent `fft_size` playback samples
pub struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    /// Precomputed Hann window
    window: Vec<f32>,
    /// Ring of the newest samples; `write_pos` is the oldest slot
    ring: Vec<f32>,
    write_pos: usize,
    /// Smoothed per-bin magnitudes carried across frames
    smoothed: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer with the given FFT size (power of two)
    pub fn new(fft_size: usize) -> Self {
        assert!(
            fft_size.is_power_of_two() && fft_size >= 32,
            "FFT size must be a power of two >= 32"
        );

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);

        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / fft_size as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        let input = fft.make_input_vec();
        let spectrum = fft.make_output_vec();

        Self {
            fft,
            window,
            ring: vec![0.0; fft_size],
            write_pos: 0,
            smoothed: vec![0.0; fft_size / 2],
            input,
            spectrum,
        }
    }

    /// Number of frequency bins per frame (fft_size / 2)
    #[inline]
    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Feed recent playback samples into the tap
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.ring[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.ring.len();
        }
    }

    /// Clear the tap and smoothing history (on asset change)
    pub fn reset(&mut self) {
        self.ring.fill(0.0);
        self.smoothed.fill(0.0);
        self.write_pos = 0;
    }

    /// Produce the spectrum frame for the current tick
    pub fn frame(&mut self) -> SpectrumFrame {
        let n = self.ring.len();

        // Unroll the ring into time order and apply the window
        for (i, slot) in self.input.iter_mut().enumerate() {
            *slot = self.ring[(self.write_pos + i) % n] * self.window[i];
        }

        self.fft
            .process(&mut self.input, &mut self.spectrum)
            .expect("FFT buffers are sized to the plan");

        let mut bins = Vec::with_capacity(self.smoothed.len());
        for (k, slot) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.spectrum[k].norm() / n as f32;
            *slot = SMOOTHING * *slot + (1.0 - SMOOTHING) * magnitude;

            // log10(0) is -inf, which the clamp maps to byte 0
            let db = 20.0 * (*slot).log10();
            let scaled = ((db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0).clamp(0.0, 255.0);
            bins.push(scaled as u8);
        }

        SpectrumFrame { bins }
    }
}

// ────────────────────────────────────────────────────────────────────────
// Bar rendering
// ────────────────────────────────────────────────────────────────────────

/// Number of bars drawn: one center bar plus two symmetric pairs
pub const BAR_COUNT: usize = 5;

const BAR_WIDTH: f32 = 4.0;
const BAR_SPACING: f32 = 1.0;
const MIN_BAR_HEIGHT: f32 = 4.0;
const HEIGHT_SCALE: f32 = 0.8;

/// Bar fill while paused
const IDLE_COLOR: [u8; 3] = [128, 128, 128];
/// Bar fill while playing
const ACTIVE_COLOR: [u8; 3] = [0, 0, 0];

/// One rounded bar, in the host surface's coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
}

/// Fill color shared by all bars of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

/// Renderer output for one tick: bar geometry plus fill color
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumBars {
    pub bars: Vec<Bar>,
    pub color: Rgba,
}

/// Reduce a spectrum frame to the symmetric bar layout
///
/// Bars sample the frame at a fixed stride: the two left bars read bins
/// `0` and `step`, the center bar `2·step`, the right bars `3·step` and
/// `4·step`, so the quintet spans the low end of the spectrum where music
/// lives. Heights are floored so silent bars stay visible as dots.
pub fn render_bars(frame: &SpectrumFrame, color_t: f32, width: f32, height: f32) -> SpectrumBars {
    let step = (frame.len() / BAR_COUNT).max(1);
    let center_x = width / 2.0;

    let mut bars = Vec::with_capacity(BAR_COUNT);

    // Center bar
    bars.push(bar_at(
        center_x - BAR_WIDTH / 2.0,
        bin(frame, 2 * step),
        height,
    ));

    // Two bars marching left of center
    for i in 0..2 {
        let x = center_x - (i + 1) as f32 * (BAR_WIDTH + BAR_SPACING) - BAR_WIDTH / 2.0;
        bars.push(bar_at(x, bin(frame, i * step), height));
    }

    // Two bars marching right of center
    for i in 0..2 {
        let x = center_x + (i + 1) as f32 * (BAR_WIDTH + BAR_SPACING) - BAR_WIDTH / 2.0;
        bars.push(bar_at(x, bin(frame, (i + 3) * step), height));
    }

    SpectrumBars {
        bars,
        color: color_at(color_t),
    }
}

fn bin(frame: &SpectrumFrame, index: usize) -> u8 {
    frame.bins().get(index).copied().unwrap_or(0)
}

fn bar_at(x: f32, magnitude: u8, surface_height: f32) -> Bar {
    let height = (magnitude as f32 / 255.0 * surface_height * HEIGHT_SCALE).max(MIN_BAR_HEIGHT);
    Bar {
        x,
        y: surface_height / 2.0 - height / 2.0,
        width: BAR_WIDTH,
        height,
        corner_radius: BAR_WIDTH / 2.0,
    }
}

fn color_at(color_t: f32) -> Rgba {
    let t = color_t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Rgba {
        r: lerp(IDLE_COLOR[0], ACTIVE_COLOR[0]),
        g: lerp(IDLE_COLOR[1], ACTIVE_COLOR[1]),
        b: lerp(IDLE_COLOR[2], ACTIVE_COLOR[2]),
        alpha: 0.5 + 0.5 * t,
    }
}

// ────────────────────────────────────────────────────────────────────────
// Color transition
// ────────────────────────────────────────────────────────────────────────

/// Default per-tick approach rate toward the "playing" color
pub const DEFAULT_ATTACK_RATE: f32 = 0.2;

/// Default per-tick approach rate toward the "paused" color
pub const DEFAULT_RELEASE_RATE: f32 = 0.05;

/// Snap to the target once within this distance
const SNAP_EPSILON: f32 = 0.01;

/// Exponential warm-up/cool-down of the visualizer color
///
/// Ticks toward 1.0 while playing and 0.0 while paused, with a faster
/// attack than release, so starting playback flips the bars dark quickly
/// while pausing lets them fade back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransition {
    value: f32,
    attack_rate: f32,
    release_rate: f32,
}

impl ColorTransition {
    pub fn new() -> Self {
        Self::with_rates(DEFAULT_ATTACK_RATE, DEFAULT_RELEASE_RATE)
    }

    pub fn with_rates(attack_rate: f32, release_rate: f32) -> Self {
        Self {
            value: 0.0,
            attack_rate,
            release_rate,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance one tick toward the state's target and return the new value
    pub fn tick(&mut self, playing: bool) -> f32 {
        let target = if playing { 1.0 } else { 0.0 };
        let rate = if playing {
            self.attack_rate
        } else {
            self.release_rate
        };

        let diff = target - self.value;
        self.value = if diff.abs() < SNAP_EPSILON {
            target
        } else {
            self.value + diff * rate
        };
        self.value
    }
}

impl Default for ColorTransition {
    fn default() -> Self {
        Self::new()
    }
}

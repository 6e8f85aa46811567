//! Coda Core - decode, waveform and trim engine for the Coda media player
//!
//! This crate holds the offline half of the engine: turning uploaded media
//! bytes into PCM, summarizing PCM for waveform display, and producing
//! sample-accurate trimmed copies encoded as WAV. Interaction state and
//! per-tick rendering live in `coda-session`.

pub mod decode;
pub mod trim;
pub mod types;
pub mod waveform;

pub use types::*;

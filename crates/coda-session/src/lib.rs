//! Coda Session - interactive engine for the Coda media player
//!
//! The live half of the engine: region-selection state machine, spectrum
//! visualizer, preview-surface synchronization, and the session/context
//! lifecycle that ties them to decoded assets from `coda-core`.

pub mod config;
pub mod region;
pub mod resources;
pub mod session;
pub mod spectrum;
pub mod sync;

pub use config::EngineConfig;
pub use region::{DragState, PlaybackCursor, PointerEvent, RegionSelector, ViewMetrics};
pub use resources::{HandleRegistry, MediaHandle};
pub use session::{DecodeTicket, EngineContext, TickFrame, TrimSession};
pub use spectrum::{ColorTransition, SpectrumAnalyzer, SpectrumBars, SpectrumFrame};
pub use sync::{MediaTransport, PreviewSync, TransportEvent};

//! Resynchronizing decoder for TI-style mmWave radar frame streams.
//!
//! [`FrameDecoder`] is the push-mode engine: feed it bytes exactly as the
//! transport delivers them — serial reads, UDP payloads, whole captures —
//! and drain [`DecodeEvent`]s. [`FrameReader`] wraps any blocking
//! [`std::io::Read`] byte source around the same engine for pull-mode use.
//!
//! One decoder per connection; no shared state, no locks. A corrupt frame
//! is reported as a per-frame event and the stream resynchronizes on the
//! next magic word — decoding never stops over link noise.
//!
//! Wire-format types live in [`mmwframe_wire`], re-exported as [`wire`].

pub mod decoder;
pub mod error;
pub mod reader;

pub use decoder::{DecodeEvent, DecoderConfig, DecoderStats, FrameDecoder, RadarFrame};
pub use error::{DecodeError, Result};
pub use reader::FrameReader;

pub use mmwframe_wire as wire;

/// Errors surfaced by the decode engine itself.
///
/// Structural corruption inside the byte stream is deliberately absent:
/// it is reported per frame via [`DecodeEvent::Corrupt`] and never stops
/// the decode loop.
///
/// [`DecodeEvent::Corrupt`]: crate::decoder::DecodeEvent::Corrupt
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// An I/O error from the underlying byte source, surfaced unchanged.
    #[error("radar stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source reached end of stream.
    #[error("radar stream closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, DecodeError>;

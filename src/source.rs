//! Byte source trait for capture inputs

use crate::Result;

/// An ordered stream of raw bytes from the scorepad.
///
/// Sources hand out chunks as they arrive; chunk boundaries carry no meaning
/// and may split a frame anywhere.
#[async_trait::async_trait]
pub trait ByteSource: Send + 'static {
    /// Get the next chunk of bytes
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - more data (never empty)
    /// - `Ok(None)` - source disconnected or exhausted
    /// - `Err(e)` - read failed
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Short label for logs (peer address, file name)
    fn describe(&self) -> String;
}

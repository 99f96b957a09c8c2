//! Release of buffers allocated by the service.

use nt_port::{
    memory::{self, FreeError},
    raw::RawMemory,
};

use crate::types::ReturnBuffer;

/// Releases a buffer returned by the service.
///
/// The buffer is consumed, so it cannot be released twice. A null buffer,
/// returned when the service had nothing to hand back, is accepted and
/// ignored.
pub fn free_return_buffer<M: RawMemory + ?Sized>(
    mem: &M,
    buffer: ReturnBuffer,
) -> Result<(), FreeReturnBufferError> {
    let (address, _) = buffer.into_raw();
    if address == 0 {
        return Ok(());
    }

    memory::free_virtual_memory(mem, address).map_err(FreeReturnBufferError::Free)
}

/// Error returned by [`free_return_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FreeReturnBufferError {
    /// The memory region could not be released.
    #[error("failed to free return buffer")]
    Free(#[source] FreeError),
}

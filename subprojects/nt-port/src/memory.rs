//! Virtual memory operations of the current process.

use crate::{
    raw::RawMemory,
    status::{self, NtStatus, ToStatus},
};

/// Releases a region previously allocated in the current process.
///
/// `address` must be the base address of the region; the whole region is
/// released.
pub fn free_virtual_memory<M: RawMemory + ?Sized>(mem: &M, address: u64) -> Result<(), FreeError> {
    mem.free_virtual_memory(address)
        .into_result()
        .map_err(|rc| match rc {
            status::MEMORY_NOT_ALLOCATED => FreeError::NotAllocated,
            status::INVALID_PAGE_PROTECTION | status::INVALID_PARAMETER => {
                FreeError::InvalidAddress
            }
            _ => FreeError::Unknown(rc),
        })
}

/// Error returned by [`free_virtual_memory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FreeError {
    /// No region is allocated at the address.
    #[error("Memory not allocated")]
    NotAllocated,
    /// The address does not start a releasable region.
    #[error("Invalid address")]
    InvalidAddress,
    /// Unexpected status.
    #[error("Unknown error: {0}")]
    Unknown(NtStatus),
}

impl ToStatus for FreeError {
    fn to_status(&self) -> NtStatus {
        match self {
            Self::NotAllocated => status::MEMORY_NOT_ALLOCATED,
            Self::InvalidAddress => status::INVALID_PARAMETER,
            Self::Unknown(rc) => *rc,
        }
    }
}

//! Raw port and memory primitives.
//!
//! These traits are the seam between this workspace and the operating
//! system. An implementation issues the actual system calls; everything above
//! this module only sees [`NtStatus`] values and byte buffers.
//!
//! Implementations are expected to be blocking: a call returns only once the
//! kernel (or the server on the other side of the port) has completed it.

use crate::{handle::RawHandle, qos::SecurityQos, status::NtStatus};

/// Client-side communication port primitives.
pub trait RawPort {
    /// Connects to the named server port.
    ///
    /// `connect_info` is sent to the server with the connection request and
    /// overwritten in place with the server's connection reply.
    fn connect_port(
        &self,
        name: &str,
        qos: &SecurityQos,
        connect_info: &mut [u8],
    ) -> Result<RawHandle, NtStatus>;

    /// Sends `message` on the port and waits for the reply.
    ///
    /// The reply overwrites `message`.
    fn request_wait_reply_port(&self, port: RawHandle, message: &mut [u8]) -> NtStatus;

    /// Closes a handle.
    fn close(&self, handle: RawHandle) -> NtStatus;
}

/// Virtual memory primitives of the current process.
pub trait RawMemory {
    /// Releases the whole region starting at `address`.
    fn free_virtual_memory(&self, address: u64) -> NtStatus;
}

impl<T: RawPort + ?Sized> RawPort for &T {
    #[inline]
    fn connect_port(
        &self,
        name: &str,
        qos: &SecurityQos,
        connect_info: &mut [u8],
    ) -> Result<RawHandle, NtStatus> {
        (**self).connect_port(name, qos, connect_info)
    }

    #[inline]
    fn request_wait_reply_port(&self, port: RawHandle, message: &mut [u8]) -> NtStatus {
        (**self).request_wait_reply_port(port, message)
    }

    #[inline]
    fn close(&self, handle: RawHandle) -> NtStatus {
        (**self).close(handle)
    }
}

impl<T: RawMemory + ?Sized> RawMemory for &T {
    #[inline]
    fn free_virtual_memory(&self, address: u64) -> NtStatus {
        (**self).free_virtual_memory(address)
    }
}

//! Connection information exchanged when connecting to the LSA port.
//!
//! The client sends this block with its connection request; the server
//! overwrites it with its verdict before the connect call returns.

use nt_port::NtStatus;
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::name::{
    MAX_LOGON_PROCESS_NAME_LENGTH, NAME_BUFFER_SIZE, NameTooLong, copy_name, name_from_buffer,
};

/// Connection information block.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnectionInfo {
    /// Connection status, written by the server
    pub status: I32,
    /// Operational mode of the service, written by the server
    pub operational_mode: U32,
    /// Length of the logon process name; zero for untrusted callers
    pub length: U32,
    /// NUL-terminated logon process name
    pub logon_process_name: [u8; NAME_BUFFER_SIZE],
    /// Ask the server to create a client context for this connection
    pub create_context: U32,
    /// Whether the server treats the caller as trusted, written by the server
    pub trusted_caller: U32,
}

const_assert_eq!(size_of::<ConnectionInfo>(), 0x94);

impl ConnectionInfo {
    /// Connection info for an untrusted caller: no name, context requested.
    pub fn untrusted() -> Self {
        let mut info = Self::new_zeroed();
        info.create_context = U32::new(1);
        info
    }

    /// Connection info registering `name` as a logon process.
    ///
    /// Fails without side effects if `name` is longer than
    /// [`MAX_LOGON_PROCESS_NAME_LENGTH`].
    pub fn logon_process(name: &[u8]) -> Result<Self, NameTooLong> {
        let mut info = Self::new_zeroed();
        let len = copy_name(&mut info.logon_process_name, name, MAX_LOGON_PROCESS_NAME_LENGTH)?;
        info.length = U32::new(len);
        info.create_context = U32::new(1);
        Ok(info)
    }

    /// Returns the connection status written by the server.
    #[inline]
    pub fn status(&self) -> NtStatus {
        NtStatus::from_i32(self.status.get())
    }

    /// Returns the operational mode written by the server.
    #[inline]
    pub fn operational_mode(&self) -> u32 {
        self.operational_mode.get()
    }

    /// Returns whether the server accepted the caller as trusted.
    #[inline]
    pub fn is_trusted_caller(&self) -> bool {
        self.trusted_caller.get() != 0
    }

    /// Returns the logon process name carried in the block.
    #[inline]
    pub fn logon_process_name(&self) -> &[u8] {
        name_from_buffer(&self.logon_process_name, self.length.get())
    }
}

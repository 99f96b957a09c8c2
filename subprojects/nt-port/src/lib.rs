//! # nt-port
//!
//! Client-side primitives for talking to a server process over a
//! communication port.
//!
//! The crate is split the same way the system interface is:
//!
//! - [`raw`]: the [`RawPort`](raw::RawPort) and [`RawMemory`](raw::RawMemory)
//!   traits, implemented by whatever issues the real system calls.
//! - [`port`] and [`memory`]: safe wrappers mapping raw statuses to typed
//!   errors.
//! - [`status`]: the `NTSTATUS` encoding shared by the kernel and servers.
//! - [`handle`]: typed handle newtypes.
//!
//! Port calls are synchronous. Nothing here serialises concurrent use of one
//! connection; callers that share a [`PortHandle`](handle::PortHandle) across
//! threads must provide their own exclusion.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod handle;
pub mod memory;
pub mod port;
pub mod qos;
pub mod raw;
pub mod status;

pub use self::status::NtStatus;

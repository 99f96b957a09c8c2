//! Values exchanged with the authentication service.

use lsa_proto::ops::{LuidWire, QuotaLimitsWire, TokenSourceWire};
use nt_port::{NtStatus, handle::TokenHandle};
use zerocopy::little_endian::{I32, U32};

/// Identifier of an authentication package, as resolved by
/// [`lookup_authentication_package`](crate::LsaConnection::lookup_authentication_package).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticationPackage(pub u32);

/// Operational mode reported by the service when a connection is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationalMode(pub u32);

/// Lifecycle state of a connection.
///
/// A connection only exists once connected, so the initial unconnected state
/// is represented by not having an [`LsaConnection`](crate::LsaConnection)
/// at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Data operations are allowed.
    Connected,
    /// The connection was deregistered; every operation fails.
    Deregistered,
}

/// Kind of logon requested from [`logon_user`](crate::LsaConnection::logon_user).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LogonType {
    /// Interactive logon at the console.
    Interactive = 2,
    /// Network logon.
    Network = 3,
    /// Batch job.
    Batch = 4,
    /// Service account.
    Service = 5,
    /// Proxy logon.
    Proxy = 6,
    /// Workstation unlock.
    Unlock = 7,
    /// Network logon with cleartext credentials.
    NetworkCleartext = 8,
    /// Logon with new outbound credentials.
    NewCredentials = 9,
    /// Remote interactive logon.
    RemoteInteractive = 10,
    /// Interactive logon from cached credentials.
    CachedInteractive = 11,
    /// Remote interactive logon from cached credentials.
    CachedRemoteInteractive = 12,
    /// Workstation unlock from cached credentials.
    CachedUnlock = 13,
}

/// Locally unique identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Luid {
    /// Low 32 bits.
    pub low_part: u32,
    /// High 32 bits.
    pub high_part: i32,
}

impl Luid {
    /// Returns the identifier as a single 64-bit value.
    #[inline]
    pub const fn to_u64(self) -> u64 {
        ((self.high_part as u32 as u64) << 32) | self.low_part as u64
    }
}

impl From<LuidWire> for Luid {
    fn from(wire: LuidWire) -> Self {
        Self {
            low_part: wire.low_part.get(),
            high_part: wire.high_part.get(),
        }
    }
}

impl From<Luid> for LuidWire {
    fn from(luid: Luid) -> Self {
        Self {
            low_part: U32::new(luid.low_part),
            high_part: I32::new(luid.high_part),
        }
    }
}

/// Resource quotas assigned to a logon session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuotaLimits {
    /// Paged pool limit in bytes.
    pub paged_pool_limit: u64,
    /// Non-paged pool limit in bytes.
    pub non_paged_pool_limit: u64,
    /// Minimum working set size in bytes.
    pub minimum_working_set_size: u64,
    /// Maximum working set size in bytes.
    pub maximum_working_set_size: u64,
    /// Pagefile limit in bytes.
    pub pagefile_limit: u64,
    /// CPU time limit in 100ns units.
    pub time_limit: i64,
}

impl From<QuotaLimitsWire> for QuotaLimits {
    fn from(wire: QuotaLimitsWire) -> Self {
        Self {
            paged_pool_limit: wire.paged_pool_limit.get(),
            non_paged_pool_limit: wire.non_paged_pool_limit.get(),
            minimum_working_set_size: wire.minimum_working_set_size.get(),
            maximum_working_set_size: wire.maximum_working_set_size.get(),
            pagefile_limit: wire.pagefile_limit.get(),
            time_limit: wire.time_limit.get(),
        }
    }
}

/// Component that requested a logon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSource {
    /// Source name, at most 8 bytes, NUL padded.
    pub source_name: [u8; 8],
    /// Identifier chosen by the source.
    pub source_identifier: Luid,
}

impl TokenSource {
    /// Creates a token source, truncating `name` to 8 bytes.
    pub fn new(name: &[u8], source_identifier: Luid) -> Self {
        let mut source_name = [0u8; 8];
        let len = name.len().min(source_name.len());
        source_name[..len].copy_from_slice(&name[..len]);
        Self {
            source_name,
            source_identifier,
        }
    }
}

impl From<TokenSource> for TokenSourceWire {
    fn from(source: TokenSource) -> Self {
        Self {
            source_name: source.source_name,
            source_identifier: source.source_identifier.into(),
        }
    }
}

bitflags::bitflags! {
    /// Attributes of a group in a token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct GroupAttributes: u32 {
        /// The group cannot be disabled.
        const MANDATORY = 0x0000_0001;
        /// The group is enabled by default.
        const ENABLED_BY_DEFAULT = 0x0000_0002;
        /// The group is enabled.
        const ENABLED = 0x0000_0004;
        /// The group may be assigned as owner of new objects.
        const OWNER = 0x0000_0008;
        /// The group is used for deny-only checks.
        const USE_FOR_DENY_ONLY = 0x0000_0010;
        /// Mandatory integrity label.
        const INTEGRITY = 0x0000_0020;
        /// Integrity label is enabled.
        const INTEGRITY_ENABLED = 0x0000_0040;
        /// The group identifies a logon session.
        const LOGON_ID = 0xC000_0000;
        /// Domain-local group.
        const RESOURCE = 0x2000_0000;
    }
}

/// A group to add to the token of a new logon session.
///
/// Passed to the service by address, so the layout is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SidAndAttributes {
    /// Address of the group SID in the caller's memory.
    pub sid: u64,
    /// Group attributes.
    pub attributes: GroupAttributes,
}

/// A buffer the service allocated in the caller's address space.
///
/// Ownership moves to the caller with the reply. Release it exactly once
/// with [`free_return_buffer`](crate::free_return_buffer); the type is
/// neither `Clone` nor `Copy` so it cannot be released twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "returned buffers must be released with free_return_buffer"]
pub struct ReturnBuffer {
    address: u64,
    length: u32,
}

impl ReturnBuffer {
    /// Takes ownership of a buffer returned by the service.
    #[inline]
    pub const fn from_raw(address: u64, length: u32) -> Self {
        Self { address, length }
    }

    /// Base address of the buffer.
    #[inline]
    pub const fn address(&self) -> u64 {
        self.address
    }

    /// Length of the buffer in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.length
    }

    /// Returns `true` if the buffer holds no bytes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if the service did not return a buffer.
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.address == 0
    }

    /// Gives up ownership, returning address and length.
    #[inline]
    pub const fn into_raw(self) -> (u64, u32) {
        (self.address, self.length)
    }
}

/// Successful reply of [`call_authentication_package`](crate::LsaConnection::call_authentication_package).
///
/// The call reached the package, but the package may still have failed: check
/// [`protocol_status`](Self::protocol_status).
#[derive(Debug)]
#[must_use = "the protocol status reports the package outcome"]
pub struct CallPackageReply {
    /// Buffer returned by the package.
    pub return_buffer: ReturnBuffer,
    /// Package-level status.
    pub protocol_status: NtStatus,
}

/// Input of [`logon_user`](crate::LsaConnection::logon_user).
#[derive(Debug, Clone, Copy)]
pub struct LogonRequest<'a> {
    /// Describes the origin of the logon, e.g. the requesting service.
    pub origin_name: &'a [u8],
    /// Kind of logon.
    pub logon_type: LogonType,
    /// Package that authenticates the logon.
    pub package: AuthenticationPackage,
    /// Package-specific authentication information.
    pub authentication_information: &'a [u8],
    /// Extra groups for the new token; `None` adds none.
    pub local_groups: Option<&'a [SidAndAttributes]>,
    /// Source of the logon request.
    pub source_context: TokenSource,
}

/// Successful reply of [`logon_user`](crate::LsaConnection::logon_user).
#[derive(Debug)]
#[must_use = "the profile buffer must be released and the token closed"]
pub struct LogonReply {
    /// Package-specific profile buffer.
    pub profile_buffer: ReturnBuffer,
    /// Identifier of the new logon session.
    pub logon_id: Luid,
    /// Token of the new logon session.
    pub token: TokenHandle,
    /// Quotas assigned to the session.
    pub quotas: QuotaLimits,
    /// Refined status reported by the package.
    pub sub_status: NtStatus,
}

//! Per-operation payload layouts.
//!
//! Request and reply of one operation share the payload area of the
//! [`ApiMessage`](crate::ApiMessage): the server reads the request from it and
//! writes the reply over it. Buffer fields are addresses in the client's
//! address space; the server reads submitted buffers from there and allocates
//! returned buffers there.

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::{
    api::{ApiNumber, Request},
    name::NAME_BUFFER_SIZE,
};

/// Counted narrow string referencing client memory.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LsaStringWire {
    /// Length of the string in bytes
    pub length: U16,
    /// Size of the referenced buffer in bytes
    pub maximum_length: U16,
    _pad: [u8; 4],
    /// Address of the characters
    pub buffer: U64,
}

const_assert_eq!(size_of::<LsaStringWire>(), 0x10);

impl LsaStringWire {
    /// Describes `len` bytes at `buffer`.
    #[inline]
    pub fn new(buffer: u64, len: u16) -> Self {
        Self {
            length: U16::new(len),
            maximum_length: U16::new(len),
            _pad: [0; 4],
            buffer: U64::new(buffer),
        }
    }
}

/// Locally unique identifier.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LuidWire {
    /// Low 32 bits
    pub low_part: U32,
    /// High 32 bits
    pub high_part: I32,
}

const_assert_eq!(size_of::<LuidWire>(), 0x8);

/// Identifies the component that requested a logon.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct TokenSourceWire {
    /// Source name, NUL padded
    pub source_name: [u8; 8],
    /// Identifier chosen by the source
    pub source_identifier: LuidWire,
}

const_assert_eq!(size_of::<TokenSourceWire>(), 0x10);

/// Resource quotas assigned to a logon session.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct QuotaLimitsWire {
    /// Paged pool limit in bytes
    pub paged_pool_limit: U64,
    /// Non-paged pool limit in bytes
    pub non_paged_pool_limit: U64,
    /// Minimum working set size in bytes
    pub minimum_working_set_size: U64,
    /// Maximum working set size in bytes
    pub maximum_working_set_size: U64,
    /// Pagefile limit in bytes
    pub pagefile_limit: U64,
    /// CPU time limit in 100ns units
    pub time_limit: I64,
}

const_assert_eq!(size_of::<QuotaLimitsWire>(), 0x30);

/// `LookupAuthenticationPackage` request.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LookupAuthenticationPackageRequest {
    /// Length of the name, terminating NUL excluded
    pub package_name_length: U32,
    /// NUL-terminated copy of the package name
    pub package_name: [u8; NAME_BUFFER_SIZE],
}

const_assert_eq!(size_of::<LookupAuthenticationPackageRequest>(), 0x84);

/// `LookupAuthenticationPackage` reply.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LookupAuthenticationPackageReply {
    /// Identifier of the package
    pub package: U32,
}

const_assert_eq!(size_of::<LookupAuthenticationPackageReply>(), 0x4);

impl Request for LookupAuthenticationPackageRequest {
    const API_NUMBER: ApiNumber = ApiNumber::LookupAuthenticationPackage;
    type Reply = LookupAuthenticationPackageReply;
}

/// `CallAuthenticationPackage` request.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CallAuthenticationPackageRequest {
    /// Identifier of the target package
    pub authentication_package: U32,
    /// Length of the submit buffer in bytes
    pub submit_buffer_length: U32,
    /// Address of the package-specific submit buffer
    pub protocol_submit_buffer: U64,
}

const_assert_eq!(size_of::<CallAuthenticationPackageRequest>(), 0x10);

/// `CallAuthenticationPackage` reply.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CallAuthenticationPackageReply {
    /// Address of the buffer allocated for the caller
    pub protocol_return_buffer: U64,
    /// Length of the returned buffer in bytes
    pub return_buffer_length: U32,
    /// Package-level status
    pub protocol_status: I32,
}

const_assert_eq!(size_of::<CallAuthenticationPackageReply>(), 0x10);

impl Request for CallAuthenticationPackageRequest {
    const API_NUMBER: ApiNumber = ApiNumber::CallAuthenticationPackage;
    type Reply = CallAuthenticationPackageReply;
}

/// `LogonUser` request.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LogonUserRequest {
    /// Name describing the origin of the logon
    pub origin_name: LsaStringWire,
    /// Logon type
    pub logon_type: U32,
    /// Identifier of the package that authenticates the logon
    pub authentication_package: U32,
    /// Address of the package-specific authentication information
    pub authentication_information: U64,
    /// Length of the authentication information in bytes
    pub authentication_information_length: U32,
    /// Number of extra groups; zero when none are supplied
    pub local_groups_count: U32,
    /// Address of the extra group array; zero when none are supplied
    pub local_groups: U64,
    /// Source of the logon request
    pub source_context: TokenSourceWire,
}

const_assert_eq!(size_of::<LogonUserRequest>(), 0x40);

/// `LogonUser` reply.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LogonUserReply {
    /// Address of the profile buffer allocated for the caller
    pub profile_buffer: U64,
    /// Length of the profile buffer in bytes
    pub profile_buffer_length: U32,
    /// Refined failure reason, valid even when the logon failed
    pub sub_status: I32,
    /// Identifier of the new logon session
    pub logon_id: LuidWire,
    /// Handle to the new token, valid in the caller's handle table
    pub token: U64,
    /// Quotas assigned to the session
    pub quotas: QuotaLimitsWire,
}

const_assert_eq!(size_of::<LogonUserReply>(), 0x50);

impl Request for LogonUserRequest {
    const API_NUMBER: ApiNumber = ApiNumber::LogonUser;
    type Reply = LogonUserReply;
}

/// `DeregisterLogonProcess` request. Carries no payload.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DeregisterLogonProcessRequest {}

/// `DeregisterLogonProcess` reply. Carries no payload.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DeregisterLogonProcessReply {}

const_assert_eq!(size_of::<DeregisterLogonProcessRequest>(), 0);

impl Request for DeregisterLogonProcessRequest {
    const API_NUMBER: ApiNumber = ApiNumber::DeregisterLogonProcess;
    type Reply = DeregisterLogonProcessReply;
}

//! Data operations on a connected LSA port.
//!
//! Each operation builds one [`ApiMessage`], performs a single blocking
//! round trip on the port and decodes the reply written over the request.
//! Failures are reported in three layers:
//!
//! - local validation, before anything is sent (`NameTooLong`)
//! - the round trip itself (`Transport`, `MalformedReply`)
//! - the overall status written by the service (`ServiceStatus`)

use lsa_proto::{
    ApiMessage, DecodeError, MAX_PACKAGE_NAME_LENGTH, NameTooLong,
    name::copy_name,
    ops::{
        CallAuthenticationPackageRequest, DeregisterLogonProcessRequest, LogonUserRequest,
        LsaStringWire, LookupAuthenticationPackageRequest,
    },
};
use nt_port::{
    NtStatus,
    handle::{PortHandle, TokenHandle},
    port::{self, RequestError},
    raw::RawPort,
};
use zerocopy::{FromZeros, IntoBytes, little_endian::*};

use crate::types::{
    AuthenticationPackage, CallPackageReply, LogonReply, LogonRequest, ReturnBuffer,
};

/// Forwards `submit` to an authentication package.
///
/// A completed call returns the package's own status inside the reply; only
/// transport and service failures are errors.
pub fn call_authentication_package<P: RawPort + ?Sized>(
    port: &P,
    handle: PortHandle,
    package: AuthenticationPackage,
    submit: &[u8],
) -> Result<CallPackageReply, CallPackageError> {
    let submit_buffer_length =
        u32::try_from(submit.len()).map_err(|_| CallPackageError::BufferTooLarge)?;

    let req = CallAuthenticationPackageRequest {
        authentication_package: U32::new(package.0),
        submit_buffer_length: U32::new(submit_buffer_length),
        protocol_submit_buffer: U64::new(buffer_address(submit)),
    };

    let mut msg = ApiMessage::new(&req);
    port::request_wait_reply(port, handle, msg.as_mut_bytes())
        .map_err(CallPackageError::Transport)?;

    let reply = msg
        .reply::<CallAuthenticationPackageRequest>()
        .map_err(CallPackageError::MalformedReply)?;
    msg.status()
        .into_result()
        .map_err(CallPackageError::ServiceStatus)?;

    Ok(CallPackageReply {
        return_buffer: ReturnBuffer::from_raw(
            reply.protocol_return_buffer.get(),
            reply.return_buffer_length.get(),
        ),
        protocol_status: NtStatus::from_i32(reply.protocol_status.get()),
    })
}

/// Error returned by [`call_authentication_package`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CallPackageError {
    /// The connection was already deregistered.
    #[error("connection is deregistered")]
    InvalidState,
    /// The submit buffer length does not fit the message field.
    #[error("submit buffer too large")]
    BufferTooLarge,
    /// The round trip did not complete.
    #[error("port request failed")]
    Transport(#[source] RequestError),
    /// The reply envelope could not be decoded.
    #[error("malformed reply")]
    MalformedReply(#[source] DecodeError),
    /// The service rejected the request.
    #[error("service returned {0}")]
    ServiceStatus(NtStatus),
}

/// Resolves an authentication package name to its identifier.
pub fn lookup_authentication_package<P: RawPort + ?Sized>(
    port: &P,
    handle: PortHandle,
    name: &[u8],
) -> Result<AuthenticationPackage, LookupPackageError> {
    let mut req = LookupAuthenticationPackageRequest::new_zeroed();
    let len = copy_name(&mut req.package_name, name, MAX_PACKAGE_NAME_LENGTH)
        .map_err(LookupPackageError::NameTooLong)?;
    req.package_name_length = U32::new(len);

    let mut msg = ApiMessage::new(&req);
    port::request_wait_reply(port, handle, msg.as_mut_bytes())
        .map_err(LookupPackageError::Transport)?;

    let reply = msg
        .reply::<LookupAuthenticationPackageRequest>()
        .map_err(LookupPackageError::MalformedReply)?;
    msg.status()
        .into_result()
        .map_err(LookupPackageError::ServiceStatus)?;

    Ok(AuthenticationPackage(reply.package.get()))
}

/// Error returned by [`lookup_authentication_package`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LookupPackageError {
    /// The connection was already deregistered.
    #[error("connection is deregistered")]
    InvalidState,
    /// The package name exceeds the maximum length.
    #[error("invalid package name")]
    NameTooLong(#[source] NameTooLong),
    /// The round trip did not complete.
    #[error("port request failed")]
    Transport(#[source] RequestError),
    /// The reply envelope could not be decoded.
    #[error("malformed reply")]
    MalformedReply(#[source] DecodeError),
    /// The service rejected the request, e.g. no such package.
    #[error("service returned {0}")]
    ServiceStatus(NtStatus),
}

/// Authenticates a user and creates a logon session.
pub fn logon_user<P: RawPort + ?Sized>(
    port: &P,
    handle: PortHandle,
    request: &LogonRequest<'_>,
) -> Result<LogonReply, LogonUserError> {
    let origin_len = u16::try_from(request.origin_name.len()).map_err(|_| {
        LogonUserError::NameTooLong(NameTooLong {
            len: request.origin_name.len(),
            max: u16::MAX as usize,
        })
    })?;
    let authentication_information_length =
        u32::try_from(request.authentication_information.len())
            .map_err(|_| LogonUserError::BufferTooLarge)?;

    let (local_groups_count, local_groups) = match request.local_groups {
        Some(groups) => (
            u32::try_from(groups.len()).map_err(|_| LogonUserError::BufferTooLarge)?,
            buffer_address(groups),
        ),
        None => (0, 0),
    };

    let req = LogonUserRequest {
        origin_name: LsaStringWire::new(buffer_address(request.origin_name), origin_len),
        logon_type: U32::new(request.logon_type as u32),
        authentication_package: U32::new(request.package.0),
        authentication_information: U64::new(buffer_address(request.authentication_information)),
        authentication_information_length: U32::new(authentication_information_length),
        local_groups_count: U32::new(local_groups_count),
        local_groups: U64::new(local_groups),
        source_context: request.source_context.into(),
    };

    let mut msg = ApiMessage::new(&req);
    port::request_wait_reply(port, handle, msg.as_mut_bytes())
        .map_err(LogonUserError::Transport)?;

    let reply = msg
        .reply::<LogonUserRequest>()
        .map_err(LogonUserError::MalformedReply)?;
    let sub_status = NtStatus::from_i32(reply.sub_status.get());
    msg.status()
        .into_result()
        .map_err(|status| LogonUserError::ServiceStatus { status, sub_status })?;

    Ok(LogonReply {
        profile_buffer: ReturnBuffer::from_raw(
            reply.profile_buffer.get(),
            reply.profile_buffer_length.get(),
        ),
        logon_id: reply.logon_id.into(),
        // SAFETY: the service placed a token handle in our handle table.
        token: unsafe { TokenHandle::from_raw(reply.token.get()) },
        quotas: reply.quotas.into(),
        sub_status,
    })
}

/// Error returned by [`logon_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LogonUserError {
    /// The connection was already deregistered.
    #[error("connection is deregistered")]
    InvalidState,
    /// The origin name does not fit a counted string.
    #[error("invalid origin name")]
    NameTooLong(#[source] NameTooLong),
    /// A buffer or group count does not fit its message field.
    #[error("authentication information too large")]
    BufferTooLarge,
    /// The round trip did not complete.
    #[error("port request failed")]
    Transport(#[source] RequestError),
    /// The reply envelope could not be decoded.
    #[error("malformed reply")]
    MalformedReply(#[source] DecodeError),
    /// The logon failed. `sub_status` refines the reason.
    #[error("logon failed with {status} (sub-status {sub_status})")]
    ServiceStatus {
        /// Overall status.
        status: NtStatus,
        /// Package-specific reason.
        sub_status: NtStatus,
    },
}

impl LogonUserError {
    /// Returns the sub-status, present whenever the round trip completed.
    pub fn sub_status(&self) -> Option<NtStatus> {
        match self {
            Self::ServiceStatus { sub_status, .. } => Some(*sub_status),
            _ => None,
        }
    }
}

/// Sends the deregistration request. The port itself is left open.
pub fn deregister_logon_process<P: RawPort + ?Sized>(
    port: &P,
    handle: PortHandle,
) -> Result<(), DeregisterError> {
    let mut msg = ApiMessage::new(&DeregisterLogonProcessRequest {});
    port::request_wait_reply(port, handle, msg.as_mut_bytes())
        .map_err(DeregisterError::Transport)?;

    msg.reply::<DeregisterLogonProcessRequest>()
        .map_err(DeregisterError::MalformedReply)?;
    msg.status()
        .into_result()
        .map_err(DeregisterError::ServiceStatus)
}

/// Error returned by [`deregister_logon_process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeregisterError {
    /// The connection was already deregistered.
    #[error("connection is deregistered")]
    InvalidState,
    /// The round trip did not complete.
    #[error("port request failed")]
    Transport(#[source] RequestError),
    /// The reply envelope could not be decoded.
    #[error("malformed reply")]
    MalformedReply(#[source] DecodeError),
    /// The service reported a failure. The connection is closed regardless.
    #[error("service returned {0}")]
    ServiceStatus(NtStatus),
}

/// Address of a caller buffer as sent on the wire; zero for empty buffers.
#[inline]
fn buffer_address<T>(buf: &[T]) -> u64 {
    if buf.is_empty() {
        0
    } else {
        buf.as_ptr() as u64
    }
}

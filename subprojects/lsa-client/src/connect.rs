//! Connection establishment.

use lsa_proto::{ConnectionInfo, NameTooLong};
use nt_port::{
    NtStatus,
    handle::PortHandle,
    port,
    qos::SecurityQos,
    raw::RawPort,
};
use zerocopy::IntoBytes;

use crate::{proto::LSA_AUTHENTICATION_PORT_NAME, types::OperationalMode};

/// Identity presented to the service when connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller<'a> {
    /// No logon process name; the service applies untrusted defaults.
    Untrusted,
    /// Registers the caller as the named logon process.
    LogonProcess(&'a [u8]),
}

/// Outcome of a successful connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connected {
    /// Client end of the port connection.
    pub handle: PortHandle,
    /// Operational mode reported by the service.
    pub operational_mode: OperationalMode,
    /// Whether the service accepted the caller as trusted.
    pub trusted: bool,
}

/// Connects to the authentication port as `caller`.
///
/// Names are validated before the port is touched. If the service rejects
/// the connection in the returned connection info, the freshly opened port is
/// closed before the error is returned.
#[tracing::instrument(level = "debug", skip(port))]
pub fn connect<P: RawPort + ?Sized>(port: &P, caller: Caller<'_>) -> Result<Connected, ConnectError> {
    let mut info = match caller {
        Caller::Untrusted => ConnectionInfo::untrusted(),
        Caller::LogonProcess(name) => {
            ConnectionInfo::logon_process(name).map_err(ConnectError::NameTooLong)?
        }
    };

    let handle = port::connect_port(
        port,
        LSA_AUTHENTICATION_PORT_NAME,
        &SecurityQos::default(),
        info.as_mut_bytes(),
    )
    .map_err(ConnectError::Connect)?;

    let status = info.status();
    if !status.is_success() {
        tracing::debug!(%status, "service rejected connection");
        close_quietly(port, handle);
        return Err(ConnectError::ServiceStatus(status));
    }

    Ok(Connected {
        handle,
        operational_mode: OperationalMode(info.operational_mode()),
        trusted: info.is_trusted_caller(),
    })
}

/// Error returned by [`connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// The logon process name exceeds the maximum length.
    #[error("invalid logon process name")]
    NameTooLong(#[source] NameTooLong),
    /// The port connection could not be established.
    #[error("failed to connect to the authentication port")]
    Connect(#[source] port::ConnectError),
    /// The service refused the connection.
    #[error("service returned {0}")]
    ServiceStatus(NtStatus),
}

/// Closes the port, logging instead of failing.
pub(crate) fn close_quietly<P: RawPort + ?Sized>(port: &P, handle: PortHandle) {
    if let Err(err) = port::close_port(port, handle) {
        tracing::warn!(%err, "failed to close authentication port");
    }
}

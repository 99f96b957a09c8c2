//! Communication port operations.
//!
//! Safe wrappers around the [`RawPort`] primitives. A port connection is the
//! client end of a synchronous request/reply channel to a server process:
//!
//! - **Connect**: the client names a server port and exchanges a small
//!   connection-info block with the server.
//! - **Request/reply**: the client sends a fixed-size message and blocks until
//!   the server replies into the same buffer.
//! - **Close**: the client releases its end of the connection.

use crate::{
    handle::PortHandle,
    qos::SecurityQos,
    raw::RawPort,
    status::{self, NtStatus, ToStatus},
};

/// Connects to a named server port and returns the client port handle.
///
/// `connect_info` is overwritten with the server's connection reply.
pub fn connect_port<P: RawPort + ?Sized>(
    port: &P,
    name: &str,
    qos: &SecurityQos,
    connect_info: &mut [u8],
) -> Result<PortHandle, ConnectError> {
    match port.connect_port(name, qos, connect_info) {
        // SAFETY: the handle was just returned by a successful port connect.
        Ok(raw) => Ok(unsafe { PortHandle::from_raw(raw) }),
        Err(rc) => Err(match rc {
            status::OBJECT_NAME_NOT_FOUND => ConnectError::NotFound,
            status::PORT_CONNECTION_REFUSED => ConnectError::ConnectionRefused,
            status::INSUFFICIENT_RESOURCES | status::NO_MEMORY => {
                ConnectError::InsufficientResources
            }
            status::ACCESS_DENIED => ConnectError::AccessDenied,
            _ => ConnectError::Unknown(rc),
        }),
    }
}

/// Error returned by [`connect_port`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// No server port is registered under the given name.
    #[error("Port not found")]
    NotFound,
    /// The server refused the connection.
    #[error("Connection refused")]
    ConnectionRefused,
    /// The caller may not connect to this port.
    #[error("Access denied")]
    AccessDenied,
    /// Kernel or server resources are exhausted.
    #[error("Insufficient resources")]
    InsufficientResources,
    /// Unexpected status.
    #[error("Unknown error: {0}")]
    Unknown(NtStatus),
}

impl ToStatus for ConnectError {
    fn to_status(&self) -> NtStatus {
        match self {
            Self::NotFound => status::OBJECT_NAME_NOT_FOUND,
            Self::ConnectionRefused => status::PORT_CONNECTION_REFUSED,
            Self::AccessDenied => status::ACCESS_DENIED,
            Self::InsufficientResources => status::INSUFFICIENT_RESOURCES,
            Self::Unknown(rc) => *rc,
        }
    }
}

/// Sends `message` on the port and blocks until the server replies.
///
/// On success `message` holds the server's reply.
pub fn request_wait_reply<P: RawPort + ?Sized>(
    port: &P,
    handle: PortHandle,
    message: &mut [u8],
) -> Result<(), RequestError> {
    port.request_wait_reply_port(handle.to_raw(), message)
        .into_result()
        .map_err(|rc| match rc {
            status::PORT_DISCONNECTED => RequestError::PortDisconnected,
            status::INVALID_HANDLE => RequestError::InvalidHandle,
            status::INVALID_PARAMETER => RequestError::InvalidMessage,
            status::NO_MEMORY | status::INSUFFICIENT_RESOURCES => {
                RequestError::InsufficientResources
            }
            _ => RequestError::Unknown(rc),
        })
}

/// Error returned by [`request_wait_reply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The server closed its end of the connection.
    #[error("Port disconnected")]
    PortDisconnected,
    /// The port handle is not valid.
    #[error("Invalid handle")]
    InvalidHandle,
    /// The message header was rejected by the kernel.
    #[error("Invalid message")]
    InvalidMessage,
    /// Kernel resources are exhausted.
    #[error("Insufficient resources")]
    InsufficientResources,
    /// Unexpected status.
    #[error("Unknown error: {0}")]
    Unknown(NtStatus),
}

impl ToStatus for RequestError {
    fn to_status(&self) -> NtStatus {
        match self {
            Self::PortDisconnected => status::PORT_DISCONNECTED,
            Self::InvalidHandle => status::INVALID_HANDLE,
            Self::InvalidMessage => status::INVALID_PARAMETER,
            Self::InsufficientResources => status::INSUFFICIENT_RESOURCES,
            Self::Unknown(rc) => *rc,
        }
    }
}

/// Closes the client end of a port connection.
pub fn close_port<P: RawPort + ?Sized>(port: &P, handle: PortHandle) -> Result<(), CloseError> {
    port.close(handle.to_raw())
        .into_result()
        .map_err(|rc| match rc {
            status::INVALID_HANDLE => CloseError::InvalidHandle,
            _ => CloseError::Unknown(rc),
        })
}

/// Error returned by [`close_port`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CloseError {
    /// The handle is not valid.
    #[error("Invalid handle")]
    InvalidHandle,
    /// Unexpected status.
    #[error("Unknown error: {0}")]
    Unknown(NtStatus),
}

impl ToStatus for CloseError {
    fn to_status(&self) -> NtStatus {
        match self {
            Self::InvalidHandle => status::INVALID_HANDLE,
            Self::Unknown(rc) => *rc,
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::handle::RawHandle;

    struct FixedPort {
        connect: Result<RawHandle, NtStatus>,
        reply: NtStatus,
        closed: Cell<Option<RawHandle>>,
    }

    impl RawPort for FixedPort {
        fn connect_port(
            &self,
            _name: &str,
            _qos: &SecurityQos,
            connect_info: &mut [u8],
        ) -> Result<RawHandle, NtStatus> {
            connect_info.fill(0xAA);
            self.connect
        }

        fn request_wait_reply_port(&self, _port: RawHandle, message: &mut [u8]) -> NtStatus {
            message.fill(0x55);
            self.reply
        }

        fn close(&self, handle: RawHandle) -> NtStatus {
            self.closed.set(Some(handle));
            status::SUCCESS
        }
    }

    fn port(connect: Result<RawHandle, NtStatus>, reply: NtStatus) -> FixedPort {
        FixedPort {
            connect,
            reply,
            closed: Cell::new(None),
        }
    }

    #[test]
    fn test_connect_returns_handle_and_reply_info() {
        let port = port(Ok(0x44), status::SUCCESS);
        let mut info = [0u8; 4];

        let handle = connect_port(&port, "\\Port", &SecurityQos::default(), &mut info).unwrap();

        assert_eq!(handle, 0x44);
        assert!(handle.is_valid());
        assert_eq!(info, [0xAA; 4]);
    }

    #[test]
    fn test_connect_maps_well_known_statuses() {
        let cases = [
            (status::OBJECT_NAME_NOT_FOUND, ConnectError::NotFound),
            (status::PORT_CONNECTION_REFUSED, ConnectError::ConnectionRefused),
            (status::NO_MEMORY, ConnectError::InsufficientResources),
            (status::UNSUCCESSFUL, ConnectError::Unknown(status::UNSUCCESSFUL)),
        ];

        for (rc, expected) in cases {
            let port = port(Err(rc), status::SUCCESS);
            let err = connect_port(&port, "\\Port", &SecurityQos::default(), &mut []).unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[test]
    fn test_request_error_keeps_status() {
        let port = port(Ok(1), status::PORT_DISCONNECTED);
        // SAFETY: test handle, never dereferenced.
        let handle = unsafe { PortHandle::from_raw(1) };
        let mut msg = [0u8; 8];

        let err = request_wait_reply(&port, handle, &mut msg).unwrap_err();

        assert_eq!(err, RequestError::PortDisconnected);
        assert_eq!(err.to_status(), status::PORT_DISCONNECTED);
    }

    #[test]
    fn test_close_forwards_raw_handle() {
        let port = port(Ok(1), status::SUCCESS);
        // SAFETY: test handle, never dereferenced.
        let handle = unsafe { PortHandle::from_raw(7) };

        close_port(&port, handle).unwrap();

        assert_eq!(port.closed.get(), Some(7));
    }
}

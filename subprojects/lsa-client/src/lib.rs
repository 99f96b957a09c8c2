//! LSA Authentication Port Client.
//!
//! This crate talks to the local security authority over its authentication
//! port. All operations are methods on [`LsaConnection`], which owns the port
//! transport and the client port handle.
//!
//! ## Lifecycle
//!
//! A connection is created with [`LsaConnection::connect_untrusted`] or
//! [`LsaConnection::register_logon_process`] and ends with
//! [`LsaConnection::deregister`]. After deregistration every data operation
//! fails with `InvalidState`. Dropping a connection that is still connected
//! deregisters it on a best-effort basis.
//!
//! Buffers returned by the service belong to the caller and must be released
//! with [`free_return_buffer`].
//!
//! Operations take `&mut self`: one connection carries at most one request at
//! a time.

#![no_std]

use nt_port::{handle::PortHandle, raw::RawPort};

mod api;
mod buffer;
mod connect;
mod proto;
mod types;

pub use self::{
    api::{CallPackageError, DeregisterError, LogonUserError, LookupPackageError},
    buffer::{FreeReturnBufferError, free_return_buffer},
    connect::{Caller, ConnectError},
    proto::{LSA_AUTHENTICATION_PORT_NAME, MAX_LOGON_PROCESS_NAME_LENGTH, MAX_PACKAGE_NAME_LENGTH},
    types::{
        AuthenticationPackage, CallPackageReply, ConnectionState, GroupAttributes, LogonReply,
        LogonRequest, LogonType, Luid, OperationalMode, QuotaLimits, ReturnBuffer,
        SidAndAttributes, TokenSource,
    },
};

/// Connection to the LSA authentication port.
pub struct LsaConnection<P: RawPort> {
    port: P,
    handle: PortHandle,
    operational_mode: OperationalMode,
    trusted: bool,
    state: ConnectionState,
}

impl<P: RawPort> LsaConnection<P> {
    /// Connects without registering a logon process.
    ///
    /// The service applies its untrusted-caller defaults.
    pub fn connect_untrusted(port: P) -> Result<Self, ConnectError> {
        Self::connect(port, Caller::Untrusted)
    }

    /// Connects and registers the caller as the logon process `name`.
    ///
    /// `name` is limited to [`MAX_LOGON_PROCESS_NAME_LENGTH`] bytes; longer
    /// names fail with [`ConnectError::NameTooLong`] before the port is used.
    pub fn register_logon_process(port: P, name: &[u8]) -> Result<Self, ConnectError> {
        Self::connect(port, Caller::LogonProcess(name))
    }

    /// Connects as `caller`.
    pub fn connect(port: P, caller: Caller<'_>) -> Result<Self, ConnectError> {
        let connected = connect::connect(&port, caller)?;
        tracing::debug!(
            handle = connected.handle.to_raw(),
            mode = connected.operational_mode.0,
            trusted = connected.trusted,
            "connected to authentication port"
        );

        Ok(Self {
            port,
            handle: connected.handle,
            operational_mode: connected.operational_mode,
            trusted: connected.trusted,
            state: ConnectionState::Connected,
        })
    }

    /// Returns the connection state.
    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the client port handle.
    #[inline]
    pub fn handle(&self) -> PortHandle {
        self.handle
    }

    /// Returns the operational mode reported at connection time.
    #[inline]
    pub fn operational_mode(&self) -> OperationalMode {
        self.operational_mode
    }

    /// Returns whether the service treats this caller as trusted.
    #[inline]
    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// Returns the underlying transport.
    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Forwards `submit` to `package` and returns the package's reply.
    ///
    /// Success means the request reached the package. The package outcome is
    /// [`CallPackageReply::protocol_status`] and must be checked separately.
    pub fn call_authentication_package(
        &mut self,
        package: AuthenticationPackage,
        submit: &[u8],
    ) -> Result<CallPackageReply, CallPackageError> {
        if !self.is_connected() {
            return Err(CallPackageError::InvalidState);
        }
        api::call_authentication_package(&self.port, self.handle, package, submit)
    }

    /// Resolves an authentication package name, e.g. `b"NTLM"`.
    ///
    /// `name` is limited to [`MAX_PACKAGE_NAME_LENGTH`] bytes.
    pub fn lookup_authentication_package(
        &mut self,
        name: &[u8],
    ) -> Result<AuthenticationPackage, LookupPackageError> {
        if !self.is_connected() {
            return Err(LookupPackageError::InvalidState);
        }
        api::lookup_authentication_package(&self.port, self.handle, name)
    }

    /// Authenticates a user and creates a logon session.
    ///
    /// When the logon fails after reaching the service, the error still
    /// carries the package sub-status, see [`LogonUserError::sub_status`].
    pub fn logon_user(&mut self, request: &LogonRequest<'_>) -> Result<LogonReply, LogonUserError> {
        if !self.is_connected() {
            return Err(LogonUserError::InvalidState);
        }
        api::logon_user(&self.port, self.handle, request)
    }

    /// Deregisters from the service and closes the port.
    ///
    /// If the request never completes the connection stays connected and the
    /// call may be retried. Once the service has answered, the port is closed
    /// and the connection is deregistered even if the service reported a
    /// failure, which is still returned.
    pub fn deregister(&mut self) -> Result<(), DeregisterError> {
        if !self.is_connected() {
            return Err(DeregisterError::InvalidState);
        }

        let result = api::deregister_logon_process(&self.port, self.handle);
        if let Err(DeregisterError::Transport(err)) = result {
            tracing::debug!(%err, "deregistration did not reach the service");
            return result;
        }

        connect::close_quietly(&self.port, self.handle);
        self.state = ConnectionState::Deregistered;
        result
    }

    #[inline]
    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl<P: RawPort> Drop for LsaConnection<P> {
    fn drop(&mut self) {
        if !self.is_connected() {
            return;
        }

        if let Err(err) = self.deregister() {
            tracing::warn!(%err, "failed to deregister on drop");
        }

        // Deregistration did not complete, release the port anyway.
        if self.is_connected() {
            connect::close_quietly(&self.port, self.handle);
            self.state = ConnectionState::Deregistered;
        }
    }
}

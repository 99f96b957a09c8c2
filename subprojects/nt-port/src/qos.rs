//! Security quality of service requested when connecting to a port.

/// How far the server may impersonate the connecting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ImpersonationLevel {
    /// The server cannot obtain identification information about the client.
    Anonymous = 0,
    /// The server can identify the client but cannot impersonate it.
    #[default]
    Identification = 1,
    /// The server can impersonate the client on the local system.
    Impersonation = 2,
    /// The server can impersonate the client on remote systems.
    Delegation = 3,
}

/// Whether the server sees a snapshot or a live view of the client context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextTracking {
    /// Security context captured once at connection time.
    Static,
    /// Security context tracked for the lifetime of the connection.
    #[default]
    Dynamic,
}

/// Security quality of service for a port connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityQos {
    /// Requested impersonation level.
    pub impersonation_level: ImpersonationLevel,
    /// Context tracking mode.
    pub context_tracking: ContextTracking,
    /// Only the enabled parts of the client context are visible to the server.
    pub effective_only: bool,
}

impl Default for SecurityQos {
    /// Identification-level, dynamically tracked, effective-only.
    fn default() -> Self {
        Self {
            impersonation_level: ImpersonationLevel::Identification,
            context_tracking: ContextTracking::Dynamic,
            effective_only: true,
        }
    }
}

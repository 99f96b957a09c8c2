//! NT status codes.
//!
//! Every port and memory primitive reports its outcome as a 32-bit
//! `NTSTATUS` value. The same encoding is used by the authentication service
//! for its own per-request status fields.
//!
//! # Structure
//!
//! - **Bits 0-15:** Code
//! - **Bits 16-27:** Facility
//! - **Bit 28:** Reserved
//! - **Bit 29:** Customer flag
//! - **Bits 30-31:** Severity
//!
//! A status is considered successful when its signed value is non-negative,
//! i.e. severity is either [`Severity::Success`] or
//! [`Severity::Informational`].

/// Mask for the code field (16 bits)
const CODE_MASK: u32 = 0xFFFF;
/// Mask for the facility field (12 bits)
const FACILITY_MASK: u32 = 0x0FFF;
/// Shift amount for the facility field
const FACILITY_SHIFT: u32 = 16;
/// Customer-defined flag
const CUSTOMER_FLAG: u32 = 1 << 29;
/// Shift amount for the severity field
const SEVERITY_SHIFT: u32 = 30;

/// A raw NT status value.
///
/// ```rust
/// use nt_port::status::{self, NtStatus, Severity};
///
/// assert!(status::SUCCESS.is_success());
/// assert_eq!(status::NAME_TOO_LONG.severity(), Severity::Error);
/// assert_eq!(format!("{}", status::NAME_TOO_LONG), "0xC0000106");
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(transparent)]
pub struct NtStatus(u32);

impl NtStatus {
    /// Creates a status from its raw value.
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Creates a status from its signed wire representation.
    #[inline]
    pub const fn from_i32(value: i32) -> Self {
        Self(value as u32)
    }

    /// Returns the raw value.
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Returns the signed wire representation.
    #[inline]
    pub const fn to_i32(self) -> i32 {
        self.0 as i32
    }

    /// Returns `true` for success and informational statuses.
    #[inline]
    pub const fn is_success(self) -> bool {
        self.to_i32() >= 0
    }

    /// Returns `true` for error-severity statuses.
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self.severity(), Severity::Error)
    }

    /// Returns the severity field.
    #[inline]
    pub const fn severity(self) -> Severity {
        match self.0 >> SEVERITY_SHIFT {
            0 => Severity::Success,
            1 => Severity::Informational,
            2 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Returns the facility field.
    #[inline]
    pub const fn facility(self) -> u16 {
        ((self.0 >> FACILITY_SHIFT) & FACILITY_MASK) as u16
    }

    /// Returns the code field.
    #[inline]
    pub const fn code(self) -> u16 {
        (self.0 & CODE_MASK) as u16
    }

    /// Returns `true` if the customer flag is set.
    #[inline]
    pub const fn is_customer(self) -> bool {
        self.0 & CUSTOMER_FLAG != 0
    }

    /// Converts into a [`Result`], keeping the status as the error value.
    #[inline]
    pub const fn into_result(self) -> Result<(), NtStatus> {
        if self.is_success() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for NtStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

impl core::fmt::Debug for NtStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NtStatus")
            .field("raw", &format_args!("{:#010x}", self.0))
            .field("severity", &self.severity())
            .field("facility", &self.facility())
            .field("code", &format_args!("{:#06x}", self.code()))
            .finish()
    }
}

impl core::error::Error for NtStatus {}

impl From<u32> for NtStatus {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<NtStatus> for u32 {
    fn from(value: NtStatus) -> Self {
        value.0
    }
}

/// Conversion of a typed error back into the status it was decoded from.
pub trait ToStatus {
    /// Returns the status this error represents.
    fn to_status(&self) -> NtStatus;
}

/// Severity field of an [`NtStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation completed.
    Success,
    /// Operation completed, with extra information.
    Informational,
    /// Operation completed with a warning.
    Warning,
    /// Operation failed.
    Error,
}

/// The operation completed successfully.
pub const SUCCESS: NtStatus = NtStatus(0x0000_0000);
/// Generic failure.
pub const UNSUCCESSFUL: NtStatus = NtStatus(0xC000_0001);
/// An invalid handle was specified.
pub const INVALID_HANDLE: NtStatus = NtStatus(0xC000_0008);
/// An invalid parameter was passed.
pub const INVALID_PARAMETER: NtStatus = NtStatus(0xC000_000D);
/// Not enough virtual memory.
pub const NO_MEMORY: NtStatus = NtStatus(0xC000_0017);
/// Access was denied.
pub const ACCESS_DENIED: NtStatus = NtStatus(0xC000_0022);
/// The named object does not exist.
pub const OBJECT_NAME_NOT_FOUND: NtStatus = NtStatus(0xC000_0034);
/// The server side of the port went away.
pub const PORT_DISCONNECTED: NtStatus = NtStatus(0xC000_0037);
/// The server refused the connection request.
pub const PORT_CONNECTION_REFUSED: NtStatus = NtStatus(0xC000_0041);
/// The page protection of a mapped view is invalid.
pub const INVALID_PAGE_PROTECTION: NtStatus = NtStatus(0xC000_0045);
/// The user name or authentication information is incorrect.
pub const LOGON_FAILURE: NtStatus = NtStatus(0xC000_006D);
/// An account restriction prevented the logon.
pub const ACCOUNT_RESTRICTION: NtStatus = NtStatus(0xC000_006E);
/// The account password has expired.
pub const PASSWORD_EXPIRED: NtStatus = NtStatus(0xC000_0071);
/// The account is disabled.
pub const ACCOUNT_DISABLED: NtStatus = NtStatus(0xC000_0072);
/// System resources are exhausted.
pub const INSUFFICIENT_RESOURCES: NtStatus = NtStatus(0xC000_009A);
/// The region being freed was never allocated.
pub const MEMORY_NOT_ALLOCATED: NtStatus = NtStatus(0xC000_00A0);
/// The requested authentication package is unknown.
pub const NO_SUCH_PACKAGE: NtStatus = NtStatus(0xC000_00FE);
/// A supplied name exceeds its maximum length.
pub const NAME_TOO_LONG: NtStatus = NtStatus(0xC000_0106);

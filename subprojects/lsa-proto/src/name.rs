//! Bounded narrow-character names carried inline in messages.
//!
//! Logon process and authentication package names are copied into fixed
//! 128-byte fields: up to 127 characters plus a terminating NUL. Longer names
//! are rejected before anything is sent.

/// Maximum length of a logon process name, in bytes.
pub const MAX_LOGON_PROCESS_NAME_LENGTH: usize = 127;

/// Maximum length of an authentication package name, in bytes.
pub const MAX_PACKAGE_NAME_LENGTH: usize = 127;

/// Size of an inline name field, terminating NUL included.
pub const NAME_BUFFER_SIZE: usize = 128;

/// Checks `name` against `max` without copying it.
#[inline]
pub const fn check_name_length(name: &[u8], max: usize) -> Result<(), NameTooLong> {
    if name.len() > max {
        return Err(NameTooLong {
            len: name.len(),
            max,
        });
    }
    Ok(())
}

/// Copies `name` into an inline name field and NUL-terminates it.
///
/// Returns the name length to store in the accompanying length field.
pub fn copy_name(
    dst: &mut [u8; NAME_BUFFER_SIZE],
    name: &[u8],
    max: usize,
) -> Result<u32, NameTooLong> {
    check_name_length(name, max.min(NAME_BUFFER_SIZE - 1))?;

    dst.fill(0);
    dst[..name.len()].copy_from_slice(name);
    Ok(name.len() as u32)
}

/// Reads a name back out of an inline name field.
///
/// `len` is clamped to the field size.
#[inline]
pub fn name_from_buffer(buf: &[u8; NAME_BUFFER_SIZE], len: u32) -> &[u8] {
    let len = (len as usize).min(NAME_BUFFER_SIZE - 1);
    &buf[..len]
}

/// A name exceeded its maximum length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("name is {len} bytes long, maximum is {max}")]
pub struct NameTooLong {
    /// Length of the rejected name.
    pub len: usize,
    /// Maximum accepted length.
    pub max: usize,
}

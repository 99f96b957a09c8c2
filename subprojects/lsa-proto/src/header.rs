//! Port message header.
//!
//! Every message exchanged on a communication port starts with this header.
//! The client fills in the two length fields and zeroes the rest; the kernel
//! stamps the client identity and message id on delivery.

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

/// Largest message, header included, a port accepts.
pub const PORT_MAXIMUM_MESSAGE_LENGTH: usize = 0x148;

/// Size of [`PortMessageHeader`].
pub const PORT_MESSAGE_HEADER_SIZE: usize = 0x18;

/// Header common to all port messages.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PortMessageHeader {
    /// Bytes following the header that carry data
    pub data_length: U16,
    /// Size of the whole message, header included
    pub total_length: U16,
    /// Message type, assigned by the kernel
    pub message_type: U16,
    /// Offset of the data info block; zero for plain requests
    pub data_info_offset: U16,
    /// Sending process, assigned by the kernel
    pub client_process: U32,
    /// Sending thread, assigned by the kernel
    pub client_thread: U32,
    /// Message id, assigned by the kernel
    pub message_id: U32,
    /// Size of a section view shared with the server, if any
    pub client_view_size: U32,
}

const_assert_eq!(size_of::<PortMessageHeader>(), PORT_MESSAGE_HEADER_SIZE);

impl PortMessageHeader {
    /// Creates a request header with the given lengths and every other field
    /// zeroed.
    #[inline]
    pub fn new(data_length: u16, total_length: u16) -> Self {
        Self {
            data_length: U16::new(data_length),
            total_length: U16::new(total_length),
            ..Default::default()
        }
    }
}

//! LSA API message envelope.
//!
//! Every request after connection is a single fixed-size [`ApiMessage`]:
//!
//! ```text
//! ┌──────────────────────────┐ 0x00
//! │ PortMessageHeader        │
//! ├──────────────────────────┤ 0x18
//! │ api_number: u32          │
//! │ status: i32              │ overall status, written by the server
//! ├──────────────────────────┤ 0x20
//! │ payload                  │ request, then reply, of one operation
//! └──────────────────────────┘ LSA_PORT_MESSAGE_SIZE
//! ```
//!
//! The header's `total_length` is always [`LSA_PORT_MESSAGE_SIZE`];
//! `data_length` covers the API fields plus the larger of the operation's
//! request and reply.

use nt_port::NtStatus;
use static_assertions::{const_assert, const_assert_eq};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::{
    header::{PORT_MAXIMUM_MESSAGE_LENGTH, PORT_MESSAGE_HEADER_SIZE, PortMessageHeader},
    ops::{
        CallAuthenticationPackageRequest, DeregisterLogonProcessRequest, LogonUserRequest,
        LookupAuthenticationPackageRequest,
    },
};

/// Size of the fields following the port header and preceding the payload.
pub const API_FIELDS_SIZE: usize = 8;

/// Size of the payload area, large enough for every operation.
pub const LSA_PORT_PAYLOAD_SIZE: usize = max(
    max(
        payload_size::<LookupAuthenticationPackageRequest>(),
        payload_size::<CallAuthenticationPackageRequest>(),
    ),
    max(
        payload_size::<LogonUserRequest>(),
        payload_size::<DeregisterLogonProcessRequest>(),
    ),
);

/// Size of every LSA API message.
pub const LSA_PORT_MESSAGE_SIZE: usize =
    size_of::<ApiMessageHeader>() + LSA_PORT_PAYLOAD_SIZE;

const_assert!(LSA_PORT_MESSAGE_SIZE <= PORT_MAXIMUM_MESSAGE_LENGTH);

const fn max(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

/// Payload bytes used by request type `R` and its reply.
pub const fn payload_size<R: Request>() -> usize {
    max(size_of::<R>(), size_of::<R::Reply>())
}

/// Operation selector carried in every API message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ApiNumber {
    /// Forward a buffer to an authentication package.
    CallAuthenticationPackage = 0,
    /// Tear down the logon process registration.
    DeregisterLogonProcess = 1,
    /// Authenticate a user and create a logon session.
    LogonUser = 2,
    /// Resolve a package name to its identifier.
    LookupAuthenticationPackage = 3,
}

impl TryFrom<u32> for ApiNumber {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::CallAuthenticationPackage),
            1 => Ok(Self::DeregisterLogonProcess),
            2 => Ok(Self::LogonUser),
            3 => Ok(Self::LookupAuthenticationPackage),
            other => Err(DecodeError::UnknownApi(other)),
        }
    }
}

/// A request payload with its operation number and reply layout.
pub trait Request: FromBytes + IntoBytes + KnownLayout + Immutable + Sized {
    /// Operation selector.
    const API_NUMBER: ApiNumber;

    /// Reply payload written by the server over the request.
    type Reply: FromBytes + IntoBytes + KnownLayout + Immutable + Copy;

    /// Value of the header's `data_length` for this operation.
    const DATA_LENGTH: usize = API_FIELDS_SIZE + payload_size::<Self>();
}

/// Fixed part of every API message.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ApiMessageHeader {
    /// Port message header
    pub header: PortMessageHeader,
    /// Operation selector, see [`ApiNumber`]
    pub api_number: U32,
    /// Overall status of the request, written by the server
    pub status: I32,
}

const_assert_eq!(
    size_of::<ApiMessageHeader>(),
    PORT_MESSAGE_HEADER_SIZE + API_FIELDS_SIZE
);

/// A complete LSA API message.
#[derive(Debug, Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ApiMessage {
    /// API header
    pub header: ApiMessageHeader,
    /// Operation payload
    pub payload: [u8; LSA_PORT_PAYLOAD_SIZE],
}

const_assert_eq!(size_of::<ApiMessage>(), LSA_PORT_MESSAGE_SIZE);

impl ApiMessage {
    /// Builds the message carrying `request`.
    ///
    /// Lengths are filled in, every other header field is zero.
    pub fn new<R: Request>(request: &R) -> Self {
        const {
            assert!(R::DATA_LENGTH + PORT_MESSAGE_HEADER_SIZE <= LSA_PORT_MESSAGE_SIZE);
        }

        let mut msg = Self::new_zeroed();
        msg.header.header =
            PortMessageHeader::new(R::DATA_LENGTH as u16, LSA_PORT_MESSAGE_SIZE as u16);
        msg.header.api_number = U32::new(R::API_NUMBER as u32);
        msg.payload[..size_of::<R>()].copy_from_slice(request.as_bytes());
        msg
    }

    /// Views a message buffer received from or destined for a port.
    pub fn ref_from_message(buf: &[u8]) -> Result<&Self, DecodeError> {
        Self::ref_from_prefix(buf)
            .map(|(msg, _)| msg)
            .map_err(|_| DecodeError::Truncated {
                required: LSA_PORT_MESSAGE_SIZE,
                available: buf.len(),
            })
    }

    /// Mutable variant of [`ref_from_message`](Self::ref_from_message).
    pub fn mut_from_message(buf: &mut [u8]) -> Result<&mut Self, DecodeError> {
        let available = buf.len();
        Self::mut_from_prefix(buf)
            .map(|(msg, _)| msg)
            .map_err(|_| DecodeError::Truncated {
                required: LSA_PORT_MESSAGE_SIZE,
                available,
            })
    }

    /// Returns the operation selector.
    #[inline]
    pub fn api_number(&self) -> Result<ApiNumber, DecodeError> {
        ApiNumber::try_from(self.header.api_number.get())
    }

    /// Returns the overall status written by the server.
    #[inline]
    pub fn status(&self) -> NtStatus {
        NtStatus::from_i32(self.header.status.get())
    }

    /// Decodes the request payload, as a server does.
    pub fn request<R: Request>(&self) -> Result<R, DecodeError> {
        self.check::<R>()?;
        R::read_from_prefix(&self.payload)
            .map(|(req, _)| req)
            .map_err(|_| DecodeError::Truncated {
                required: size_of::<R>(),
                available: LSA_PORT_PAYLOAD_SIZE,
            })
    }

    /// Decodes the reply payload of operation `R`.
    ///
    /// Only the envelope is validated; the overall [`status`](Self::status)
    /// still has to be checked by the caller.
    pub fn reply<R: Request>(&self) -> Result<R::Reply, DecodeError> {
        self.check::<R>()?;
        R::Reply::read_from_prefix(&self.payload)
            .map(|(reply, _)| reply)
            .map_err(|_| DecodeError::Truncated {
                required: size_of::<R::Reply>(),
                available: LSA_PORT_PAYLOAD_SIZE,
            })
    }

    /// Writes the overall status and the reply payload, as a server does.
    pub fn set_reply<R: Request>(&mut self, status: NtStatus, reply: &R::Reply) {
        self.header.status = I32::new(status.to_i32());
        self.payload[..size_of::<R::Reply>()].copy_from_slice(reply.as_bytes());
    }

    /// Writes only the overall status, leaving the payload untouched.
    #[inline]
    pub fn set_status(&mut self, status: NtStatus) {
        self.header.status = I32::new(status.to_i32());
    }

    fn check<R: Request>(&self) -> Result<(), DecodeError> {
        let found = self.header.api_number.get();
        if found != R::API_NUMBER as u32 {
            return Err(DecodeError::ApiMismatch {
                expected: R::API_NUMBER,
                found,
            });
        }

        let data_length = self.header.header.data_length.get() as usize;
        let total_length = self.header.header.total_length.get() as usize;
        if total_length > LSA_PORT_MESSAGE_SIZE
            || data_length + PORT_MESSAGE_HEADER_SIZE > total_length
            || data_length < API_FIELDS_SIZE + size_of::<R::Reply>()
        {
            return Err(DecodeError::InvalidLength {
                data_length,
                total_length,
            });
        }

        Ok(())
    }
}

/// Error decoding an [`ApiMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer is shorter than the structure it should hold.
    #[error("buffer too small: need {required} bytes, have {available}")]
    Truncated {
        /// Bytes needed.
        required: usize,
        /// Bytes present.
        available: usize,
    },
    /// The message carries an unknown operation number.
    #[error("unknown API number {0}")]
    UnknownApi(u32),
    /// The message belongs to a different operation.
    #[error("expected API {expected:?}, found {found}")]
    ApiMismatch {
        /// Operation the caller asked for.
        expected: ApiNumber,
        /// Operation number in the message.
        found: u32,
    },
    /// The header lengths are inconsistent with the message layout.
    #[error("invalid message lengths: data {data_length}, total {total_length}")]
    InvalidLength {
        /// Header `data_length`.
        data_length: usize,
        /// Header `total_length`.
        total_length: usize,
    },
}

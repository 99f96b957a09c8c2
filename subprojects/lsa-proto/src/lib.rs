//! LSA authentication port wire format.
//!
//! This crate describes the bytes exchanged with the LSA authentication
//! service over its communication port. It does not talk to the port itself;
//! see `nt-port` for the transport and `lsa-client` for the operations.
//!
//! # Layers
//!
//! ```text
//! ┌─────────────────────────────┐
//! │  lsa-client operations      │  Logon, package calls, registration
//! ├─────────────────────────────┤
//! │  ApiMessage / ops payloads  │  This crate
//! ├─────────────────────────────┤
//! │  PortMessageHeader          │  This crate
//! ├─────────────────────────────┤
//! │  Port request/reply         │  nt-port
//! └─────────────────────────────┘
//! ```
//!
//! Connection-time data travels in a [`ConnectionInfo`] block instead of an
//! [`ApiMessage`]; registering a logon process and connecting untrusted are
//! both port connects, not API numbers.

#![no_std]


pub mod api;
pub mod connect_info;
pub mod header;
pub mod name;
pub mod ops;

pub use self::{
    api::{
        ApiMessage, ApiNumber, DecodeError, LSA_PORT_MESSAGE_SIZE, LSA_PORT_PAYLOAD_SIZE, Request,
    },
    connect_info::ConnectionInfo,
    name::{MAX_LOGON_PROCESS_NAME_LENGTH, MAX_PACKAGE_NAME_LENGTH, NameTooLong},
};

/// Name of the LSA authentication port.
pub const LSA_AUTHENTICATION_PORT_NAME: &str = "\\LsaAuthenticationPort";

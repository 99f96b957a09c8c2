//! LSA protocol constants.

/// Name of the authentication service port.
pub use lsa_proto::LSA_AUTHENTICATION_PORT_NAME;

/// Logon process name length limit, in bytes.
pub use lsa_proto::MAX_LOGON_PROCESS_NAME_LENGTH;

/// Authentication package name length limit, in bytes.
pub use lsa_proto::MAX_PACKAGE_NAME_LENGTH;

//! Handle types.

/// Raw kernel handle value.
pub type RawHandle = u64;

/// Invalid handle sentinel value.
pub const INVALID_HANDLE: RawHandle = 0;

/// Internal macro to generate [`RawHandle`] newtypes with common helpers.
macro_rules! define_handle_type {
    {
        $(#[$meta:meta])* $vis:vis struct $name:ident
    } => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        $vis struct $name($crate::handle::RawHandle);

        impl $name {
            /// Converts a raw handle to a typed handle.
            ///
            /// # Safety
            ///
            /// Caller must guarantee that the raw handle refers to an object
            /// of the matching kind.
            pub const unsafe fn from_raw(raw: $crate::handle::RawHandle) -> Self {
                Self(raw)
            }

            /// Returns `true` if the handle is valid.
            pub const fn is_valid(&self) -> bool {
                self.0 != $crate::handle::INVALID_HANDLE
            }

            /// Converts the typed handle to a raw handle.
            pub const fn to_raw(&self) -> $crate::handle::RawHandle {
                self.0
            }
        }

        impl ::core::cmp::PartialEq<$crate::handle::RawHandle> for $name {
            fn eq(&self, other: &$crate::handle::RawHandle) -> bool {
                &self.0 == other
            }
        }

        impl ::core::cmp::PartialEq<$name> for $crate::handle::RawHandle {
            fn eq(&self, other: &$name) -> bool {
                self == &other.0
            }
        }
    };
}

define_handle_type! {
    /// A handle to the client side of a connected communication port.
    ///
    /// Obtained from [`connect_port`](crate::port::connect_port) and used for
    /// every request/reply exchange on that connection.
    pub struct PortHandle
}

define_handle_type! {
    /// A handle to an access token returned by a logon.
    pub struct TokenHandle
}

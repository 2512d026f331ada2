//! Credential models exchanged during the OAuth 1.0a handshake.

pub mod token;

pub use token::{access::*, request::*, secret::*};

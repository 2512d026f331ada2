//! Request tokens, access tokens, and the redacting secret wrapper they share.

pub mod access;
pub mod request;
pub mod secret;

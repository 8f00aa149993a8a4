//! Client-side reading of access tokens.
//!
//! Decoding here is advisory and only drives UX gating. Signatures are not
//! checked; the remote API re-validates every token it receives and remains
//! the only authority on whether a session is valid.

pub mod decoder;

pub use decoder::{decode, is_expired, now_millis, Claims, DecodeError};

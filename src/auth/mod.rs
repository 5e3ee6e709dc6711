//! The account authentication state machine and its collaborators.
//!
//! Accounts move `Unverified -> Verified` exactly once, through an OTP
//! challenge. [`service`] holds the operations, [`state`] the injected
//! capabilities, and the leaf modules the primitives they are built from.

pub mod error;
pub mod otp;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod state;
pub mod token;
pub mod validate;

//! Account service for a note taking app.
//!
//! Accounts are created unverified: signup stores the account together with a
//! six digit one-time code and emails the code to the user. Verifying the code
//! flips the account to verified and issues a JWT session token. Password
//! login is only possible once the email is verified.
//!
//! The crate is split into:
//! - [`cli`]: argument parsing and server startup.
//! - [`api`]: the axum HTTP surface.
//! - [`auth`]: the account state machine and its collaborators.
//! - [`store`]: the `AccountStore` trait with Postgres and in-memory backends.
//! - [`mail`]: outbound OTP delivery.

pub mod api;
pub mod auth;
pub mod cli;
pub mod mail;
pub mod store;

//! Keyward - invitation-gated accounts and device-bound software licensing
//!
//! Registration and login with HS256 session tokens, an admin surface for
//! invitation codes, licenses, modules and devices, and the public license
//! verification endpoint used by client applications.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod services;
pub mod util;

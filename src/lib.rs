//! Webex CLI - Cisco Webex client library and command-line tool
//!
//! This library provides OAuth and SSO sign-in plus access to the Webex
//! teams, rooms and memberships REST resources.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod types;

pub use api::client::WebexClient;
pub use config::Config;
pub use error::{Result, WebexError};

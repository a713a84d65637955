//! # skyward-client
//!
//! Blocking HTTP implementation of [`skyward_core::RemoteClient`] against
//! the admin API (`<base_url>/api/admin/v3.0`).

pub mod client;
pub mod wire;

pub use client::HttpClient;

//! Remote data gateway for the tfjournal HTTP API.

pub mod client;
pub mod loader;
pub mod parser;

pub use client::{HttpRunsApi, RunsApi};

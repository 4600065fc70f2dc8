//! HTTP probe executor for fingerprint verification.
//!
//! This crate provides [`ProbeClient`], the reqwest-backed implementation of
//! the [`Executor`] trait. Network failures are never errors here: they come
//! back as [`ExecOutcome::NetworkError`](takeover_core::ExecOutcome) because a
//! failed lookup is exactly what an NXDOMAIN fingerprint is looking for.

#![doc(html_root_url = "https://docs.rs/takeover-client/0.3.0")]

mod client;
mod config;
mod executor;

pub use client::{error_chain, ProbeClient, ProbeClientBuilder};
pub use config::*;
pub use executor::Executor;
pub use takeover_core::{Result, TakeoverError};

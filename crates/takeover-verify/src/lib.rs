//! Verification of subdomain-takeover fingerprints.
//!
//! This crate turns parsed fingerprint records into probes, runs them through
//! an [`takeover_client::Executor`], and decides whether each fingerprint is
//! still observable in the wild.
//!
//! ```no_run
//! use takeover_client::ProbeClient;
//! use takeover_verify::{Verifier, VerifyConfig};
//!
//! # async fn run(records: Vec<takeover_core::FingerprintRecord>) -> takeover_core::Result<()> {
//! let verifier = Verifier::with_config(ProbeClient::new()?, VerifyConfig::new().workers(8));
//! let report = verifier.verify_all(records).await;
//! println!("{} of {} verified", report.verified_count(), report.results.len());
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod orchestrator;
pub mod planner;

pub use classifier::{classify, is_resolution_failure};
pub use orchestrator::{first_success, Race, Verifier, VerifyConfig, VerifyReport};
pub use planner::ProbePlan;

//! Data model for fingerprints, probes and verification results.

mod fingerprint;
mod probe;
mod result;

pub use fingerprint::*;
pub use probe::*;
pub use result::*;

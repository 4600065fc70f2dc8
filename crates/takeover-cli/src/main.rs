//! takeover - dangling CNAME fingerprint verifier

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    takeover_cli::run().await
}

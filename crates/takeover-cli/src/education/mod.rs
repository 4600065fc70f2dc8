//! Educational features: what a command is about to do.

use colored::Colorize;
use std::path::Path;
use takeover_core::readme::MARKER;

/// Command explanation builder.
pub struct Explain {
    description: String,
    what_happens: Vec<String>,
    network: Option<String>,
    learn_more: Option<String>,
}

impl Explain {
    fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            what_happens: Vec::new(),
            network: None,
            learn_more: None,
        }
    }

    fn step(mut self, step: &str) -> Self {
        self.what_happens.push(step.to_string());
        self
    }

    fn network(mut self, traffic: &str) -> Self {
        self.network = Some(traffic.to_string());
        self
    }

    fn learn_more(mut self, url: &str) -> Self {
        self.learn_more = Some(url.to_string());
        self
    }

    /// Print the explanation to stderr, keeping stdout for results.
    pub fn print(&self) {
        eprintln!();
        eprintln!("{}", "=== What This Does ===".bold().cyan());
        eprintln!("{}", self.description);
        eprintln!();

        if !self.what_happens.is_empty() {
            eprintln!("{}", "How it works:".bold());
            for (i, step) in self.what_happens.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, step);
            }
            eprintln!();
        }

        if let Some(traffic) = &self.network {
            eprintln!("{} {}", "Network:".bold(), traffic.dimmed());
        }

        if let Some(url) = &self.learn_more {
            eprintln!();
            eprintln!("{} {}", "Learn more:".bold(), url.cyan().underline());
        }

        eprintln!();
        eprintln!("{}", "=== Results ===".bold().cyan());
        eprintln!();
    }

    // ========================================================================
    // Factory methods for each command
    // ========================================================================

    pub fn parse(readme: &Path) -> Self {
        Self::new(&format!(
            "Reads the fingerprint table from {} and exports it as JSON keyed by engine.",
            readme.display()
        ))
        .step(&format!("Finds the table that follows the {MARKER} marker"))
        .step("Splits each row into Engine, Status, Domains, Fingerprint and links")
        .step("Skips the header and separator rows, warns about malformed rows")
        .step("Later rows for the same engine replace earlier ones")
        .network("None - nothing leaves this machine")
    }

    pub fn verify(readme: &Path, workers: usize) -> Self {
        Self::new(&format!(
            "Checks every vulnerable fingerprint in {} against the live provider.",
            readme.display()
        ))
        .step("Skips rows that are not vulnerable or lack a domain or fingerprint")
        .step("Requests a random subdomain of each provider domain over http and https")
        .step("Repeats against the bare domain with a random Host header")
        .step("A fingerprint is verified as soon as one probe shows it")
        .step("NXDOMAIN fingerprints match a failed name lookup")
        .step("http_status=N fingerprints match the status code without following redirects")
        .network(&format!(
            "Up to {workers} fingerprints at a time, 4 GET requests per provider domain"
        ))
        .learn_more("https://github.com/EdOverflow/can-i-take-over-xyz")
    }

    pub fn config() -> Self {
        Self::new("Shows or changes the defaults used by parse and verify.")
            .step("Command-line flags win over environment variables")
            .step("Environment variables win over the config file")
            .network("None")
    }
}

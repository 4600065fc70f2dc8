//! `takeover verify` - Probe fingerprints and report the verdicts.

use anyhow::{Context as _, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use takeover_client::{ClientConfig, ProbeClient};
use takeover_core::readme::splice_table;
use takeover_core::table::{render_table, RowError};
use takeover_core::{service_records, FingerprintRecord, VerificationResult};
use takeover_verify::{Verifier, VerifyConfig, VerifyReport};
use tracing::{info, warn};

use super::{load_document, parse_document, Context};
use crate::cli::args::VerifyArgs;
use crate::education::Explain;
use crate::output::{pretty_table, progress_line, summary, OutputFormat};

pub async fn execute(ctx: &Context, args: VerifyArgs) -> Result<()> {
    let readme = ctx.config.readme_or(args.readme.clone());
    let settings = verify_config(ctx, &args);

    if ctx.explain {
        Explain::verify(&readme, settings.workers).print();
    }

    let document = load_document(&readme)?;
    let parsed = parse_document(&document)?;
    if args.write {
        ensure_writable(&args.engines, &parsed.errors)?;
    }
    let records = select(parsed.records, &args.engines)?;

    let timeout = args
        .timeout
        .or(ctx.config.timeout_secs)
        .map_or(takeover_client::DEFAULT_TIMEOUT, Duration::from_secs);
    let client = ProbeClient::builder()
        .config(ClientConfig::new().timeout(timeout))
        .build()?;
    let verifier = Verifier::with_config(client, settings);

    let report = run(ctx, &verifier, records, settings.reason_limit).await;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&service_records(&report.results))?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&service_records(&report.results))?);
        }
        OutputFormat::Markdown => print!("{}", render_table(&report.results)),
        OutputFormat::Pretty => print_pretty(&report, settings.reason_limit),
    }

    if args.write {
        write_back(&readme, &document, &report.results)?;
        if !ctx.quiet {
            eprintln!("{} {}", "Updated".green().bold(), readme.display());
        }
    }

    Ok(())
}

/// Flags first, then the config file, then library defaults
fn verify_config(ctx: &Context, args: &VerifyArgs) -> VerifyConfig {
    let mut config = VerifyConfig::new();
    if let Some(workers) = args.workers.or(ctx.config.workers) {
        config = config.workers(workers);
    }
    config.deadline(
        args.deadline
            .or(ctx.config.deadline_secs)
            .map(Duration::from_secs),
    )
}

/// `--write` replaces the whole table, so every row must be rendered back
fn ensure_writable(engines: &[String], errors: &[RowError]) -> Result<()> {
    if !engines.is_empty() {
        anyhow::bail!(
            "--write rewrites the whole table and cannot be combined with --engine\n\
             Run without --engine to regenerate every row"
        );
    }
    if !errors.is_empty() {
        let rows: Vec<String> = errors
            .iter()
            .map(|e| format!("  row {}: {}", e.line, e.message))
            .collect();
        anyhow::bail!(
            "Refusing to --write: malformed rows would be dropped from the table\n{}",
            rows.join("\n")
        );
    }
    Ok(())
}

/// Keep only the requested engines, or everything when none are named
fn select(records: Vec<FingerprintRecord>, engines: &[String]) -> Result<Vec<FingerprintRecord>> {
    if engines.is_empty() {
        return Ok(records);
    }

    let selected: Vec<FingerprintRecord> = records
        .into_iter()
        .filter(|r| engines.iter().any(|e| e.eq_ignore_ascii_case(&r.engine)))
        .collect();

    for engine in engines {
        if !selected.iter().any(|r| r.engine.eq_ignore_ascii_case(engine)) {
            warn!(engine = %engine, "no such engine in the table");
        }
    }
    if selected.is_empty() {
        anyhow::bail!("None of the requested engines are in the table: {}", engines.join(", "));
    }
    Ok(selected)
}

async fn run<E>(
    ctx: &Context,
    verifier: &Verifier<E>,
    records: Vec<FingerprintRecord>,
    reason_limit: usize,
) -> VerifyReport
where
    E: takeover_client::Executor + 'static,
{
    if !ctx.progress_bar {
        return verifier.verify_all(records).await;
    }

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let report = verifier
        .verify_all_with(records, |result: &VerificationResult| {
            pb.println(progress_line(result, reason_limit));
            pb.set_message(result.record.engine.clone());
            pb.inc(1);
        })
        .await;

    pb.finish_and_clear();
    report
}

fn print_pretty(report: &VerifyReport, reason_limit: usize) {
    println!("{}", pretty_table(&report.results, reason_limit));
    println!();
    println!(
        "{}",
        summary(
            report.verified_count(),
            report.results.len(),
            report.elapsed().to_std().unwrap_or_default()
        )
    );
}

fn write_back(readme: &Path, document: &str, results: &[VerificationResult]) -> Result<()> {
    let updated = splice_table(document, &render_table(results))?;
    std::fs::write(readme, updated).with_context(|| format!("writing {}", readme.display()))?;
    info!(path = %readme.display(), rows = results.len(), "rewrote fingerprint table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use takeover_core::readme::extract_table;
    use takeover_core::Status;

    fn record(engine: &str) -> FingerprintRecord {
        FingerprintRecord::new(
            engine,
            Status::Vulnerable,
            vec![format!("{}.example", engine.to_lowercase())],
            "NXDOMAIN",
            "",
            "",
        )
    }

    #[test]
    fn select_is_case_insensitive() {
        let records = vec![record("Heroku"), record("Surge.sh"), record("Tilda")];
        let selected = select(records, &["heroku".to_string(), "TILDA".to_string()]).unwrap();
        let engines: Vec<&str> = selected.iter().map(|r| r.engine.as_str()).collect();
        assert_eq!(engines, ["Heroku", "Tilda"]);
    }

    #[test]
    fn select_without_matches_fails() {
        assert!(select(vec![record("Heroku")], &["Ghost".to_string()]).is_err());
        assert_eq!(select(vec![record("Heroku")], &[]).unwrap().len(), 1);
    }

    #[test]
    fn write_needs_every_row() {
        assert!(ensure_writable(&[], &[]).is_ok());

        let err = ensure_writable(&["Heroku".to_string()], &[]).unwrap_err();
        assert!(err.to_string().contains("--engine"));

        let broken = RowError {
            line: 4,
            message: "expected 7 columns, found 9".to_string(),
        };
        let err = ensure_writable(&[], &[broken]).unwrap_err();
        assert!(err.to_string().contains("row 4: expected 7 columns, found 9"));
    }

    #[test]
    fn write_back_replaces_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        let document = "# Fingerprints\n\n<!--FINGERPRINTS-->\n\
| Engine | Status |\n\
|---|---|\n\
| Old | Vulnerable |\n\
\n\
Footer\n";
        std::fs::write(&path, document).unwrap();

        let results = vec![VerificationResult::verified(
            record("Heroku"),
            "NXDOMAIN - http://abc.heroku.example",
            1,
        )];
        write_back(&path, document, &results).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Fingerprints\n"));
        assert!(written.ends_with("\nFooter\n"));
        assert!(!written.contains("| Old |"));

        let rows = extract_table(&written).unwrap();
        assert!(rows.iter().any(|row| row.starts_with("| Heroku |")));
    }
}

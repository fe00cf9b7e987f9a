use anyhow::Context;
use clap::Parser;
use update_records::config::Command;
use update_records::core::codec;
use update_records::utils::{logger, validation::Validate};
use update_records::{CheckReport, CliConfig, RecordError, ShapeChecker};

fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    let exit_code = match run(&config) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => report_error(&e),
    };

    std::process::exit(exit_code);
}

/// Returns whether the document conformed.
fn run(config: &CliConfig) -> anyhow::Result<bool> {
    config.validate()?;
    let check_config = config.load_check_config()?;
    let checker = ShapeChecker::new(check_config);

    let kind = config.command.kind();
    let file = config.command.file();

    match &config.command {
        Command::Check { .. } => {
            let report = checker
                .check_file(kind, file)
                .with_context(|| format!("checking {} as {}", file.display(), kind))?;
            print_report(&report, config.json)?;
            Ok(report.is_conforming())
        }
        Command::Show { .. } => {
            let document = checker
                .decode_file(kind, file)
                .with_context(|| format!("reading {} as {}", file.display(), kind))?;
            println!("{}", codec::to_json_pretty(&document)?);
            Ok(true)
        }
    }
}

fn print_report(report: &CheckReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", codec::to_json_pretty(report)?);
        return Ok(());
    }

    if report.is_conforming() {
        println!("✅ {} {} record(s) conform", report.records, report.kind);
    } else {
        println!(
            "❌ {} violation(s) in {} {} record(s)",
            report.violations.len(),
            report.records,
            report.kind
        );
        for violation in &report.violations {
            println!(
                "  record {}: {}: {}",
                violation.index, violation.field, violation.message
            );
        }
    }

    if let Some(totals) = report.totals {
        println!(
            "📊 Total changes: +{} ~{} -{} ({})",
            totals.added,
            totals.modified,
            totals.removed,
            totals.total()
        );
    }

    Ok(())
}

fn report_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<RecordError>() {
        Some(e) => {
            tracing::error!(
                "❌ {:#} (Category: {:?}, Severity: {:?})",
                error,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
        None => {
            eprintln!("❌ {:#}", error);
            1
        }
    }
}

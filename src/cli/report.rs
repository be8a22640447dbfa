//! CLI command for the ledger report

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, ValueEnum};
use tracing::info;

use crate::config::{Settings, TallyPaths};
use crate::error::{TallyError, TallyResult};
use crate::export::LedgerExport;
use crate::load::scan_dir;
use crate::models::{Budget, BudgetBuilder, Month};
use crate::reports::Ledger;

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Arguments of `tally report`
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Directory of record files (defaults to the configured one)
    pub dir: Option<PathBuf>,

    /// First month of the period, e.g. Jan2024
    #[arg(short, long)]
    pub start: Option<String>,

    /// Last month of the period, e.g. Dec2024
    #[arg(short, long)]
    pub end: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Only show accounts and summaries whose name contains this
    #[arg(short, long)]
    pub account: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ReportArgs {
    /// Period requested on the command line, if any
    fn period(&self) -> TallyResult<Option<(Month, Month)>> {
        match (&self.start, &self.end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = Month::parse(start)?;
                let end = Month::parse(end)?;
                if start > end {
                    return Err(TallyError::Validation(format!(
                        "Requested period ends {} before it starts {}",
                        end, start
                    )));
                }
                Ok(Some((start, end)))
            }
            _ => Err(TallyError::Validation(
                "Both --start and --end are required to set a period".into(),
            )),
        }
    }
}

/// Load the records, apply the period and derive the ledger
pub fn compute_ledger(
    paths: &TallyPaths,
    settings: &Settings,
    args: &ReportArgs,
) -> TallyResult<Ledger> {
    let period = args.period()?;
    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| settings.records_dir(paths));

    let mut builder = BudgetBuilder::default();
    let files = scan_dir(&dir, &settings.file_suffix, &mut builder)?;
    info!("Loaded {} record files from {}", files, dir.display());

    if let Some((start, end)) = period {
        builder.clear_period().set_period(start, end)?;
    } else if !builder.has_period() {
        if let Some(default) = settings.default_period {
            builder.set_period(default.start, default.end)?;
        }
    }

    let budget: Budget = builder.build()?;
    Ledger::compute(&budget)
}

/// Handle `tally report`
pub fn handle_report_command(
    paths: &TallyPaths,
    settings: &Settings,
    args: ReportArgs,
) -> TallyResult<()> {
    let started = Instant::now();
    let result = compute_ledger(paths, settings, &args);
    info!(
        "Loaded and constructed in {} ms",
        started.elapsed().as_millis()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => {
            let mut export = LedgerExport::from_result(&result);
            if let (Some(filter), Some(data)) = (args.account.as_deref(), export.data.as_mut()) {
                let filter = filter.to_lowercase();
                let keep = |name: &String| name.to_lowercase().contains(&filter);
                data.account_name_to_account.retain(|name, _| keep(name));
                data.statements.retain(|name, _| keep(name));
                data.summaries.retain(|name, _| keep(name));
            }
            export.write(&mut out, args.pretty)?;
        }
        OutputFormat::Text => {
            if let Ok(ledger) = &result {
                let text = ledger.format_terminal(args.account.as_deref(), &settings.currency_symbol);
                out.write_all(text.as_bytes())?;
            }
        }
    }

    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_requires_both_bounds() {
        let args = ReportArgs {
            start: Some("Jan2024".into()),
            ..Default::default()
        };
        assert!(args.period().unwrap_err().is_validation());

        let args = ReportArgs {
            start: Some("Mar2024".into()),
            end: Some("Jan2024".into()),
            ..Default::default()
        };
        assert!(args.period().unwrap_err().is_validation());

        let args = ReportArgs {
            start: Some("Jan2024".into()),
            end: Some("Mar2024".into()),
            ..Default::default()
        };
        assert_eq!(
            args.period().unwrap(),
            Some((Month::parse("Jan2024").unwrap(), Month::parse("Mar2024").unwrap()))
        );
    }
}

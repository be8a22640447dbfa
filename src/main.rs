use anyhow::Result;
use clap::{Parser, Subcommand};

use tally::cli::{handle_report_command, ReportArgs};
use tally::config::{paths::TallyPaths, settings::Settings};
use tally::logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Monthly account statements from budget records",
    long_about = "tally loads account, balance and transfer records, reconciles every \
                  account month by month and rolls the statements up per owner."
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build statements from a record directory and print them
    Report(ReportArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = TallyPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    init_tracing(if cli.verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    });

    match cli.command {
        Some(Commands::Report(args)) => {
            handle_report_command(&paths, &settings, args)?;
        }
        Some(Commands::Config) => {
            println!("tally Configuration");
            println!("===================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Records directory: {}", settings.records_dir(&paths).display());
            println!();
            println!("Settings:");
            println!("  File suffix:     {}", settings.file_suffix);
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Log level:       {}", settings.log_level);
            match settings.default_period {
                Some(period) => println!("  Default period:  {} - {}", period.start, period.end),
                None => println!("  Default period:  (none)"),
            }
        }
        None => {
            println!("tally - monthly statements from budget records");
            println!();
            println!("Run 'tally --help' for usage information.");
            println!("Run 'tally report <DIR>' to build statements.");
        }
    }

    Ok(())
}

use clap::{CommandFactory, Parser, Subcommand};
use etf_helper::cli::ui::error_report;
use etf_helper::core::log::init_logging;
use etf_helper::core::types::{EtfListQuery, PricePeriod};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging and detailed error output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List ETFs with optional filters
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        manager: Option<String>,
        /// Free-text search on name or code
        #[arg(short, long)]
        search: Option<String>,
        /// Sort key, prefix with '-' for descending (e.g. -return_1y)
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show details and holdings of an ETF
    Show { code: String },
    /// Display price history of an ETF
    Prices {
        code: String,
        /// One of 1m, 3m, 6m, 1y
        #[arg(short, long, default_value = "1y")]
        period: PricePeriod,
    },
    /// Display holdings of an ETF
    Holdings { code: String },
    /// Display configured portfolio with current prices
    Portfolio,
    /// Check that the API is reachable
    Health,
}

impl From<Commands> for etf_helper::AppCommand {
    fn from(cmd: Commands) -> etf_helper::AppCommand {
        match cmd {
            Commands::List {
                category,
                manager,
                search,
                sort,
                page,
                limit,
            } => etf_helper::AppCommand::List(EtfListQuery {
                category,
                manager,
                search,
                sort,
                page,
                limit,
            }),
            Commands::Show { code } => etf_helper::AppCommand::Show { code },
            Commands::Prices { code, period } => etf_helper::AppCommand::Prices { code, period },
            Commands::Holdings { code } => etf_helper::AppCommand::Holdings { code },
            Commands::Portfolio => etf_helper::AppCommand::Portfolio,
            Commands::Health => etf_helper::AppCommand::Health,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => etf_helper::cli::setup::setup(),
        Some(cmd) => etf_helper::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => Cli::command().print_help().map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_report(&e, cli.verbose));
            ExitCode::FAILURE
        }
    }
}

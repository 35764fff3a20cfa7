use crate::demo::{run_demo, run_shortlist_preview, DemoArgs, ShortlistPreviewArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use quickstaff::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Quick Search Dispatcher",
    about = "Run and demonstrate the Quick Search offer dispatch service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect Quick Search shortlists without dispatching offers
    Shortlist {
        #[command(subcommand)]
        command: ShortlistCommand,
    },
    /// Run an end-to-end CLI demo covering matching, dispatch and tracking
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ShortlistCommand {
    /// Rank a roster CSV export against an ad-hoc job and print the shortlist
    Preview(ShortlistPreviewArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Shortlist {
            command: ShortlistCommand::Preview(args),
        } => run_shortlist_preview(args),
        Command::Demo(args) => run_demo(args),
    }
}

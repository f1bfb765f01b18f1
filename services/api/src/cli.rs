use crate::render::{run_render, RenderArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use distribution_hub::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Distribution Hub",
    about = "Serve distributor records and render terms-and-conditions documents",
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
    /// Work with terms-and-conditions templates offline
    Terms {
        #[command(subcommand)]
        command: TermsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TermsCommand {
    /// Render a template file with variables from a JSON file
    Render(RenderArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load a demo distributor network and terms template on startup
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Terms {
            command: TermsCommand::Render(args),
        } => run_render(args),
    }
}

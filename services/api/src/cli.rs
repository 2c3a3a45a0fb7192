use crate::demo::{run_demo, DemoArgs};
use crate::report::{run_export, run_quality, ExportArgs, QualityArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rubric_studio::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rubric Studio",
    about = "Serve, score and export grading rubrics from the command line",
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
    /// Score a rubric JSON file against the quality checklist
    Quality(QualityArgs),
    /// Render a rubric JSON file for students, graders or both
    Export(ExportArgs),
    /// Build, score, share and export a sample rubric end to end
    Demo(DemoArgs),
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
        Command::Quality(args) => run_quality(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}

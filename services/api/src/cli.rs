use crate::commands::{
    run_importance, run_predict, run_safety_check, run_train, PredictArgs, SafetyCheckArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use emr_core::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "EMR Clinical Decision Support",
    about = "Score chronic-disease risk and check prescriptions from the command line",
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
    /// Score patients and manage the persisted risk model
    Risk {
        #[command(subcommand)]
        command: RiskCommand,
    },
    /// Run prescription safety checks
    Safety {
        #[command(subcommand)]
        command: SafetyCommand,
    },
    /// Walk through intake, scoring and a prescription review for a sample patient
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RiskCommand {
    /// Score one patient, training a model first if none is persisted
    Predict(PredictArgs),
    /// Retrain the model on the synthetic cohort and persist it
    Train,
    /// Print the fitted coefficient of each feature
    Importance,
}

#[derive(Subcommand, Debug)]
enum SafetyCommand {
    /// Check a new medication against allergies and current prescriptions
    Check(SafetyCheckArgs),
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
        Command::Risk {
            command: RiskCommand::Predict(args),
        } => run_predict(args),
        Command::Risk {
            command: RiskCommand::Train,
        } => run_train(),
        Command::Risk {
            command: RiskCommand::Importance,
        } => run_importance(),
        Command::Safety {
            command: SafetyCommand::Check(args),
        } => run_safety_check(args),
        Command::Demo(args) => run_demo(args),
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "netstage",
    about = "netstage — staged control-plane/node rollouts for network changes",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass over a set of rendered manifests.
    ///
    /// Marks the control-plane or node manifest as the staged transition
    /// requires. Exits 0 whether or not another pass is needed.
    Reconcile {
        /// Desired network configuration (TOML).
        #[arg(long)]
        desired: PathBuf,
        /// Previously applied network configuration (TOML). Omit on first run.
        #[arg(long)]
        previous: Option<PathBuf>,
        /// Live workload objects (JSON array or List). Omit for an empty cluster.
        #[arg(long)]
        live: Option<PathBuf>,
        /// Rendered manifests (JSON array or List).
        #[arg(long)]
        manifests: PathBuf,
        /// Staging configuration.
        #[arg(short, long, default_value = "netstage.toml")]
        config: PathBuf,
        /// Where to write the mutated manifests.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Report whether a live workload has finished rolling out.
    Converged {
        /// Live workload objects (JSON array or List).
        #[arg(long)]
        live: PathBuf,
        #[arg(short, long)]
        namespace: String,
        #[arg(long)]
        name: String,
    },
    /// Write a default netstage.toml.
    Init {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("netstage=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reconcile {
            desired,
            previous,
            live,
            manifests,
            config,
            output,
            format,
        } => commands::reconcile::run(&commands::reconcile::ReconcileArgs {
            desired,
            previous,
            live,
            manifests,
            config,
            output,
            format,
        }),
        Commands::Converged { live, namespace, name } => {
            commands::converged::run(&live, &namespace, &name)
        }
        Commands::Init { path } => commands::init::run(&path),
    }
}

mod args;
mod commands;

use args::PipelineArgs;
use clap::{Parser, Subcommand};
use feedship_build::dockerfile::{DEFAULT_BUILDER_IMAGE, DEFAULT_RUNTIME_IMAGE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "feedship")]
#[command(about = "Build, tag and publish the feed bot's Lambda and test images", long_about = None)]
struct Cli {
    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: login, build both targets, login, push all tags
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Log every command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the image tag derived from a revision
    Tag {
        /// Revision identifier (commit SHA)
        #[arg(env = "CODEBUILD_RESOLVED_SOURCE_VERSION")]
        revision: String,
    },
    /// Show the ordered steps and the commands each one runs
    Plan {
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the multi-stage build description (Dockerfile)
    Dockerfile {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Image used to compile the binaries
        #[arg(long, default_value = DEFAULT_BUILDER_IMAGE)]
        builder_image: String,
        /// Runtime base image shared by both targets
        #[arg(long, default_value = DEFAULT_RUNTIME_IMAGE)]
        runtime_image: String,
    },
    /// Render a CodeBuild buildspec that invokes `feedship run`
    Buildspec {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Secrets Manager reference for DOCKER_TOKEN (secret-id:json-key)
        #[arg(long)]
        docker_token_secret: Option<String>,
        /// Install phase command (repeatable, replaces the default)
        #[arg(long = "install")]
        install: Vec<String>,
    },
    /// Show version information
    Version,
}

/// RUST_LOG wins when set; otherwise `info`, or `debug` with `--verbose`
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { pipeline, dry_run } => commands::run::handle(pipeline, dry_run).await,
        Commands::Tag { revision } => commands::tag::handle(&revision),
        Commands::Plan { pipeline, json } => commands::plan::handle(pipeline, json),
        Commands::Dockerfile {
            output,
            builder_image,
            runtime_image,
        } => commands::render::dockerfile(output.as_deref(), builder_image, runtime_image),
        Commands::Buildspec {
            output,
            docker_token_secret,
            install,
        } => commands::render::buildspec(output.as_deref(), docker_token_secret, install),
        Commands::Version => {
            println!("feedship {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

use crate::args::PipelineArgs;
use colored::Colorize;
use feedship_build::{DryRunRunner, Pipeline, ProcessRunner, ToolRunner};

pub async fn handle(args: PipelineArgs, dry_run: bool) -> anyhow::Result<()> {
    let config = args.into_config()?;

    if dry_run {
        println!("{}", "Dry run: commands are logged, nothing is executed".yellow());
    }
    println!("{}", "Building and publishing images...".green());
    println!("Registry: {}", config.registry().to_string().cyan());
    println!("Revision: {}", config.revision().to_string().cyan());
    println!("Build file: {}", config.build_file().display().to_string().cyan());

    let runner: Box<dyn ToolRunner> = if dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(ProcessRunner::new())
    };

    match Pipeline::new(config, runner).run().await {
        Ok(report) => {
            println!();
            println!("{}", "✓ Pipeline completed".green().bold());
            println!("Tag: {}", report.tag.to_string().cyan());
            for record in &report.steps {
                println!(
                    "  {} {} ({}) {}ms",
                    "✓".green(),
                    record.step,
                    record.summary,
                    record.duration_ms
                );
            }
            println!("Pushed:");
            for image in &report.pushed {
                println!("  - {}", image.cyan());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", format!("✗ {} failed", e.step()).red().bold());
            eprintln!("  {}", e.user_message());
            std::process::exit(1);
        }
    }
}

use crate::args::PipelineArgs;
use colored::Colorize;
use feedship_build::{DryRunRunner, Pipeline, Step, StepName};
use serde::Serialize;

#[derive(Serialize)]
struct PlannedStep {
    step: StepName,
    summary: String,
    commands: Vec<PlannedCommand>,
}

#[derive(Serialize)]
struct PlannedCommand {
    command: String,
    secret_stdin: bool,
}

impl From<&Step> for PlannedStep {
    fn from(step: &Step) -> Self {
        Self {
            step: step.name(),
            summary: step.summary(),
            commands: step
                .invocations()
                .iter()
                .map(|invocation| PlannedCommand {
                    command: invocation.to_string(),
                    secret_stdin: invocation.secret_stdin().is_some(),
                })
                .collect(),
        }
    }
}

pub fn handle(args: PipelineArgs, json: bool) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(args.into_config()?, DryRunRunner);
    let tag = pipeline.tag()?;
    let steps: Vec<PlannedStep> = pipeline.steps()?.iter().map(PlannedStep::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    println!("Tag: {}", tag.to_string().cyan());
    for (i, step) in steps.iter().enumerate() {
        println!(
            "{:>2}. {} {}",
            i + 1,
            step.step.to_string().bold(),
            format!("({})", step.summary).dimmed()
        );
        for command in &step.commands {
            let stdin = if command.secret_stdin {
                " < <redacted>"
            } else {
                ""
            };
            println!("      $ {}{}", command.command, stdin);
        }
    }

    Ok(())
}

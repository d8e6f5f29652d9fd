//! Build & publish driver
//!
//! Evaluates the planned steps strictly in order and stops at the first
//! failure. Nothing is retried and nothing already pushed is rolled back.

use crate::docker;
use crate::ecr;
use crate::error::{AuthFailure, PipelineError, Result};
use crate::runner::ToolRunner;
use crate::step::{Build, Login, Publish, Step, StepName, plan};
use feedship_core::{ImageTag, PipelineConfig, RevisionIdentifier, Secret, resolve};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info};

/// One completed step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: StepName,
    pub summary: String,
    pub duration_ms: u64,
}

/// Outcome of a successful pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub revision: RevisionIdentifier,
    pub tag: ImageTag,
    pub steps: Vec<StepRecord>,
    /// Image coordinates in the order they were pushed
    pub pushed: Vec<String>,
    pub duration_ms: u64,
}

pub struct Pipeline<R> {
    config: PipelineConfig,
    runner: R,
}

impl<R: ToolRunner> Pipeline<R> {
    pub fn new(config: PipelineConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Resolve the image tag for the configured revision
    pub fn tag(&self) -> Result<ImageTag> {
        let revision = self.config.revision();
        resolve(revision).map_err(|_| PipelineError::InvalidRevision {
            revision: revision.to_string(),
        })
    }

    /// The ordered steps a run would execute
    pub fn steps(&self) -> Result<Vec<Step>> {
        Ok(plan(&self.config, &self.tag()?))
    }

    /// Execute every step, fail-fast
    pub async fn run(&self) -> Result<PipelineReport> {
        let started = Instant::now();
        let tag = self.tag()?;
        let steps = plan(&self.config, &tag);

        info!(
            revision = %self.config.revision(),
            tag = %tag,
            registry = %self.config.registry(),
            steps = steps.len(),
            "Starting build & publish pipeline"
        );

        let mut report = PipelineReport {
            revision: self.config.revision().clone(),
            tag,
            steps: Vec::with_capacity(steps.len()),
            pushed: Vec::new(),
            duration_ms: 0,
        };

        for step in &steps {
            let step_started = Instant::now();
            info!(step = %step.name(), "→ {}", step.summary());

            if let Err(e) = self.execute(step).await {
                error!(
                    step = %step.name(),
                    completed = report.steps.len(),
                    pushed = report.pushed.len(),
                    error = %e,
                    "Pipeline failed"
                );
                return Err(e);
            }

            if let Step::Publish(publish) = step {
                report.pushed.push(publish.image.to_string());
            }
            report.steps.push(StepRecord {
                step: step.name(),
                summary: step.summary(),
                duration_ms: step_started.elapsed().as_millis() as u64,
            });
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            tag = %report.tag,
            pushed = report.pushed.len(),
            duration_ms = report.duration_ms,
            "Pipeline completed"
        );
        Ok(report)
    }

    async fn execute(&self, step: &Step) -> Result<()> {
        match step {
            Step::Login(login) => self.login(step.name(), login).await,
            Step::Build(build) => self.build(step.name(), build).await,
            Step::Publish(publish) => self.publish(step.name(), publish).await,
        }
    }

    async fn login(&self, name: StepName, login: &Login) -> Result<()> {
        match login {
            Login::Source { credentials } => {
                let auth_error = |cause| PipelineError::Auth {
                    step: name,
                    registry: feedship_core::registry::DEFAULT_REGISTRY_HOST.to_string(),
                    cause,
                };

                let credentials = credentials
                    .as_ref()
                    .ok_or_else(|| auth_error(AuthFailure::MissingCredentials))?;

                self.runner
                    .run(&docker::login_with(None, credentials))
                    .await
                    .map_err(|e| auth_error(e.into()))?;
            }
            Login::Destination { region, server } => {
                let auth_error = |cause| PipelineError::Auth {
                    step: name,
                    registry: server.clone(),
                    cause,
                };

                let vended = self
                    .runner
                    .run(&ecr::get_login_password(region))
                    .await
                    .map_err(|e| auth_error(e.into()))?;
                let token = Secret::new(vended.stdout.trim());

                self.runner
                    .run(&docker::login(Some(server.as_str()), ecr::ECR_USERNAME, token))
                    .await
                    .map_err(|e| auth_error(e.into()))?;
            }
        }
        Ok(())
    }

    async fn build(&self, name: StepName, build: &Build) -> Result<()> {
        let invocation = docker::build(
            &build.build_file,
            &build.context,
            build.target,
            &build.images,
        );

        self.runner
            .run(&invocation)
            .await
            .map_err(|source| PipelineError::Build {
                step: name,
                target: build.target,
                source,
            })?;
        Ok(())
    }

    async fn publish(&self, name: StepName, publish: &Publish) -> Result<()> {
        self.runner
            .run(&docker::push(&publish.image))
            .await
            .map_err(|source| PipelineError::Publish {
                step: name,
                image: publish.image.to_string(),
                source,
            })?;
        Ok(())
    }
}

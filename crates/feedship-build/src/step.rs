//! Pipeline steps
//!
//! The pipeline is a flat, ordered list of [`Step`] values evaluated by a
//! single driver loop. [`plan`] is the only place that decides the order.

use crate::docker;
use crate::ecr;
use crate::runner::Invocation;
use feedship_core::{
    Credentials, ImageRef, ImageTag, ImageTarget, PipelineConfig, Secret,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Step identity as it appears in logs and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StepName {
    SourceLogin,
    BuildPrimary,
    BuildTest,
    DestinationLogin,
    PublishAll,
}

impl StepName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StepName::SourceLogin => "SourceLogin",
            StepName::BuildPrimary => "BuildPrimary",
            StepName::BuildTest => "BuildTest",
            StepName::DestinationLogin => "DestinationLogin",
            StepName::PublishAll => "PublishAll",
        }
    }

    fn build(target: ImageTarget) -> Self {
        match target {
            ImageTarget::Primary => StepName::BuildPrimary,
            ImageTarget::Test => StepName::BuildTest,
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Login {
    /// Registry the base images are pulled from (Docker Hub)
    Source { credentials: Option<Credentials> },
    /// Registry the images are pushed to, via a vended token
    Destination { region: String, server: String },
}

#[derive(Debug, Clone)]
pub struct Build {
    pub target: ImageTarget,
    pub build_file: PathBuf,
    pub context: PathBuf,
    pub images: [ImageRef; 2],
}

#[derive(Debug, Clone)]
pub struct Publish {
    pub image: ImageRef,
}

#[derive(Debug, Clone)]
pub enum Step {
    Login(Login),
    Build(Build),
    Publish(Publish),
}

impl Step {
    pub fn name(&self) -> StepName {
        match self {
            Step::Login(Login::Source { .. }) => StepName::SourceLogin,
            Step::Login(Login::Destination { .. }) => StepName::DestinationLogin,
            Step::Build(build) => StepName::build(build.target),
            Step::Publish(_) => StepName::PublishAll,
        }
    }

    /// One-line description for progress output
    pub fn summary(&self) -> String {
        match self {
            Step::Login(Login::Source { .. }) => "log in to the source registry".to_string(),
            Step::Login(Login::Destination { server, .. }) => format!("log in to {}", server),
            Step::Build(build) => format!("build {} image", build.target),
            Step::Publish(publish) => format!("push {}", publish.image),
        }
    }

    /// Commands this step will run, in order
    ///
    /// Secrets stay on stdin. The destination login token is only known at
    /// run time, so its placeholder stdin is empty here.
    pub fn invocations(&self) -> Vec<Invocation> {
        match self {
            Step::Login(Login::Source { credentials }) => {
                let username = credentials
                    .as_ref()
                    .map(|c| c.username.as_str())
                    .unwrap_or("<unset>");
                let secret = credentials
                    .as_ref()
                    .map(|c| c.secret.clone())
                    .unwrap_or_else(|| Secret::new(""));
                vec![docker::login(None, username, secret)]
            }
            Step::Login(Login::Destination { region, server }) => vec![
                ecr::get_login_password(region),
                docker::login(Some(server.as_str()), ecr::ECR_USERNAME, Secret::new("")),
            ],
            Step::Build(build) => vec![docker::build(
                &build.build_file,
                &build.context,
                build.target,
                &build.images,
            )],
            Step::Publish(publish) => vec![docker::push(&publish.image)],
        }
    }
}

/// Lay out the full step sequence for one revision tag
///
/// `SourceLogin → BuildPrimary → BuildTest → DestinationLogin →
/// PublishAll (primary:latest, primary:{tag}, test:latest, test:{tag})`
pub fn plan(config: &PipelineConfig, tag: &ImageTag) -> Vec<Step> {
    let registry = config.registry();
    let mut steps = Vec::with_capacity(4 + 2 * ImageTarget::ALL.len());

    steps.push(Step::Login(Login::Source {
        credentials: config.source_credentials().cloned(),
    }));

    for target in ImageTarget::ALL {
        steps.push(Step::Build(Build {
            target,
            build_file: config.build_file().to_path_buf(),
            context: config.context().to_path_buf(),
            images: registry.images(target, tag),
        }));
    }

    steps.push(Step::Login(Login::Destination {
        region: config.region().to_string(),
        server: registry.host().to_string(),
    }));

    for target in ImageTarget::ALL {
        for image in registry.images(target, tag) {
            steps.push(Step::Publish(Publish { image }));
        }
    }

    steps
}

use crate::step::StepName;
use feedship_core::ImageTarget;
use thiserror::Error;

/// Failure of a single external tool invocation
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("`{program}` not found. Please install it and make sure it is on PATH")]
    NotFound { program: String },

    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}{}", describe_status(.status), describe_stderr(.stderr))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

impl ToolError {
    /// Exit code of the tool, when it ran and reported one
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            ToolError::Failed { status, .. } => *status,
            _ => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr)
    }
}

/// Why a registry login did not succeed
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("no credentials configured")]
    MissingCredentials,

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Pipeline failure, identifying the step that stopped the run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid revision {revision:?}: a non-empty revision identifier is required")]
    InvalidRevision { revision: String },

    #[error("{step} failed: could not log in to {registry}: {cause}")]
    Auth {
        step: StepName,
        registry: String,
        #[source]
        cause: AuthFailure,
    },

    #[error("{step} failed: could not build the {target} image: {source}")]
    Build {
        step: StepName,
        target: ImageTarget,
        #[source]
        source: ToolError,
    },

    #[error("{step} failed: could not push {image}: {source}")]
    Publish {
        step: StepName,
        image: String,
        #[source]
        source: ToolError,
    },
}

impl PipelineError {
    /// Name of the step that failed
    pub fn step(&self) -> &'static str {
        match self {
            PipelineError::InvalidRevision { .. } => "ResolveTag",
            PipelineError::Auth { step, .. }
            | PipelineError::Build { step, .. }
            | PipelineError::Publish { step, .. } => step.as_str(),
        }
    }

    /// Exit status reported by the external tool, if any
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            PipelineError::InvalidRevision { .. } => None,
            PipelineError::Auth { cause, .. } => match cause {
                AuthFailure::Tool(e) => e.exit_status(),
                AuthFailure::MissingCredentials => None,
            },
            PipelineError::Build { source, .. } | PipelineError::Publish { source, .. } => {
                source.exit_status()
            }
        }
    }

    /// Error message with a hint for the person reading the CI log
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::InvalidRevision { .. } => format!(
                "{}\n\
                 \n\
                 Make sure CODEBUILD_RESOLVED_SOURCE_VERSION (or --revision) is set.",
                self
            ),
            PipelineError::Auth {
                step: StepName::SourceLogin,
                cause: AuthFailure::MissingCredentials,
                ..
            } => format!(
                "{}\n\
                 \n\
                 Set DOCKER_USERNAME and DOCKER_TOKEN (or --docker-username / --docker-token).",
                self
            ),
            PipelineError::Auth {
                step: StepName::DestinationLogin,
                ..
            } => format!(
                "{}\n\
                 \n\
                 Check the AWS credentials of the build and that AWS_DEFAULT_REGION\n\
                 matches the region of ECR_NAME.",
                self
            ),
            PipelineError::Build { target, .. } => format!(
                "{}\n\
                 \n\
                 Check that the build description declares a `{}` stage.",
                self,
                target.stage()
            ),
            PipelineError::Publish { .. } => format!(
                "{}\n\
                 \n\
                 Images pushed before this failure remain in the registry.",
                self
            ),
            _ => self.to_string(),
        }
    }
}

/// Failure while rendering a build description or buildspec
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

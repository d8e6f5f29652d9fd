//! Pipeline configuration
//!
//! All inputs are read once at pipeline start into an immutable
//! [`PipelineConfig`]. Steps only ever see this struct, never the process
//! environment.

use crate::error::{CoreError, Result};
use crate::registry::RegistryReference;
use crate::tag::RevisionIdentifier;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable names
pub mod env {
    pub const ECR_NAME: &str = "ECR_NAME";
    pub const DOCKER_USERNAME: &str = "DOCKER_USERNAME";
    pub const DOCKER_TOKEN: &str = "DOCKER_TOKEN";
    pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
    pub const REVISION: &str = "CODEBUILD_RESOLVED_SOURCE_VERSION";
}

pub const DEFAULT_BUILD_FILE: &str = "Dockerfile";
pub const DEFAULT_CONTEXT: &str = ".";

/// A secret value that never shows up in `Debug` or `Display` output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value, only for handing to an external tool's stdin
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Username and secret for one registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: Secret,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Secret::new(secret),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    registry: RegistryReference,
    source_credentials: Option<Credentials>,
    region: String,
    revision: RevisionIdentifier,
    build_file: PathBuf,
    context: PathBuf,
}

impl PipelineConfig {
    pub fn new(
        registry: RegistryReference,
        source_credentials: Option<Credentials>,
        region: impl Into<String>,
        revision: RevisionIdentifier,
    ) -> Self {
        Self {
            registry,
            source_credentials,
            region: region.into(),
            revision,
            build_file: PathBuf::from(DEFAULT_BUILD_FILE),
            context: PathBuf::from(DEFAULT_CONTEXT),
        }
    }

    /// Populate from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate from an arbitrary variable source
    ///
    /// This is the one place inputs are validated; the CLI feeds its parsed
    /// flags through here too. `ECR_NAME`, `AWS_DEFAULT_REGION` and the
    /// revision are required, and blank values count as missing. The region
    /// is trimmed; the revision is kept verbatim. Source registry credentials
    /// are optional here; their absence is reported by the login step that
    /// needs them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let registry = non_empty(env::ECR_NAME).ok_or(CoreError::MissingVariable(env::ECR_NAME))?;
        let region = non_empty(env::AWS_DEFAULT_REGION)
            .ok_or(CoreError::MissingVariable(env::AWS_DEFAULT_REGION))?
            .trim()
            .to_string();
        // an empty revision is kept so tag resolution can reject it
        let revision = lookup(env::REVISION).ok_or(CoreError::MissingVariable(env::REVISION))?;

        let source_credentials = match (
            non_empty(env::DOCKER_USERNAME),
            non_empty(env::DOCKER_TOKEN),
        ) {
            (Some(username), Some(token)) => Some(Credentials::new(username, token)),
            _ => None,
        };

        tracing::debug!(
            registry = %registry,
            region = %region,
            has_source_credentials = source_credentials.is_some(),
            "Loaded pipeline configuration"
        );

        Ok(Self::new(
            RegistryReference::new(registry)?,
            source_credentials,
            region,
            RevisionIdentifier::new(revision),
        ))
    }

    pub fn with_build_file(mut self, build_file: impl Into<PathBuf>) -> Self {
        self.build_file = build_file.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<PathBuf>) -> Self {
        self.context = context.into();
        self
    }

    pub fn registry(&self) -> &RegistryReference {
        &self.registry
    }

    pub fn source_credentials(&self) -> Option<&Credentials> {
        self.source_credentials.as_ref()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn revision(&self) -> &RevisionIdentifier {
        &self.revision
    }

    pub fn build_file(&self) -> &Path {
        &self.build_file
    }

    pub fn context(&self) -> &Path {
        &self.context
    }
}

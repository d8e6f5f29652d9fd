//! CI build specification rendering
//!
//! Emits an AWS CodeBuild `buildspec.yml` whose build phase hands the whole
//! sequence to `feedship run`.

use crate::error::RenderError;
use feedship_core::config::env;
use serde::Serialize;
use std::collections::BTreeMap;

pub const BUILDSPEC_VERSION: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct BuildspecOptions {
    /// Commands that put `feedship` on PATH
    pub install: Vec<String>,
    /// Extra arguments appended to `feedship run`
    pub run_args: Vec<String>,
    /// Plain environment variables set by the buildspec
    pub variables: BTreeMap<String, String>,
    /// Secrets Manager references (`secret-id:json-key`) keyed by variable
    pub secrets: BTreeMap<String, String>,
}

impl Default for BuildspecOptions {
    fn default() -> Self {
        Self {
            install: vec!["cargo install --locked feedship".to_string()],
            run_args: Vec::new(),
            variables: BTreeMap::new(),
            secrets: BTreeMap::new(),
        }
    }
}

impl BuildspecOptions {
    /// Read `DOCKER_TOKEN` from Secrets Manager instead of plaintext env
    pub fn with_docker_token_secret(mut self, reference: impl Into<String>) -> Self {
        self.secrets
            .insert(env::DOCKER_TOKEN.to_string(), reference.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Buildspec {
    pub version: f64,
    #[serde(skip_serializing_if = "BuildspecEnv::is_empty")]
    pub env: BuildspecEnv,
    pub phases: Phases,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildspecEnv {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    #[serde(rename = "secrets-manager", skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets_manager: BTreeMap<String, String>,
}

impl BuildspecEnv {
    fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.secrets_manager.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Phases {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<Phase>,
    pub build: Phase,
}

#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub commands: Vec<String>,
}

impl Buildspec {
    pub fn new(options: BuildspecOptions) -> Self {
        let mut run = String::from("feedship run");
        for arg in &options.run_args {
            run.push(' ');
            run.push_str(arg);
        }

        Self {
            version: BUILDSPEC_VERSION,
            env: BuildspecEnv {
                variables: options.variables,
                secrets_manager: options.secrets,
            },
            phases: Phases {
                install: (!options.install.is_empty()).then(|| Phase {
                    commands: options.install,
                }),
                build: Phase {
                    commands: vec![run],
                },
            },
        }
    }

    pub fn to_yaml(&self) -> Result<String, RenderError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

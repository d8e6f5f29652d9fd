use clap::Args;
use feedship_core::PipelineConfig;
use feedship_core::config::{DEFAULT_BUILD_FILE, DEFAULT_CONTEXT, env};
use std::path::PathBuf;

/// Pipeline inputs; every flag falls back to the CI environment
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Registry namespace the images are published under
    #[arg(long, env = "ECR_NAME")]
    pub ecr_name: String,

    /// Source registry user
    #[arg(long, env = "DOCKER_USERNAME")]
    pub docker_username: Option<String>,

    /// Source registry access token
    #[arg(long, env = "DOCKER_TOKEN", hide_env_values = true)]
    pub docker_token: Option<String>,

    /// Region the destination registry token is vended for
    #[arg(long, env = "AWS_DEFAULT_REGION")]
    pub region: String,

    /// Source revision the images are built from
    #[arg(long, env = "CODEBUILD_RESOLVED_SOURCE_VERSION")]
    pub revision: String,

    /// Build description with the `primary` and `test` stages
    #[arg(long, default_value = DEFAULT_BUILD_FILE)]
    pub build_file: PathBuf,

    /// Build context directory
    #[arg(long, default_value = DEFAULT_CONTEXT)]
    pub context: PathBuf,
}

impl PipelineArgs {
    /// Freeze the arguments into the immutable pipeline configuration
    ///
    /// Validation is shared with [`PipelineConfig::from_lookup`], so flags
    /// and environment variables are held to the same rules.
    pub fn into_config(self) -> anyhow::Result<PipelineConfig> {
        let config = PipelineConfig::from_lookup(|key| match key {
            env::ECR_NAME => Some(self.ecr_name.clone()),
            env::DOCKER_USERNAME => self.docker_username.clone(),
            env::DOCKER_TOKEN => self.docker_token.clone(),
            env::AWS_DEFAULT_REGION => Some(self.region.clone()),
            env::REVISION => Some(self.revision.clone()),
            _ => None,
        })?;

        Ok(config
            .with_build_file(self.build_file)
            .with_context(self.context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedship_core::CoreError;

    fn args() -> PipelineArgs {
        PipelineArgs {
            ecr_name: "123456789012.dkr.ecr.us-east-1.amazonaws.com".to_string(),
            docker_username: Some("bot".to_string()),
            docker_token: Some("token".to_string()),
            region: "us-east-1".to_string(),
            revision: "deadbeefcafe".to_string(),
            build_file: PathBuf::from(DEFAULT_BUILD_FILE),
            context: PathBuf::from(DEFAULT_CONTEXT),
        }
    }

    #[test]
    fn test_into_config_matches_lookup_for_padded_region() {
        let config = PipelineArgs {
            region: " us-east-1 ".to_string(),
            ..args()
        }
        .into_config()
        .unwrap();
        assert_eq!(config.region(), "us-east-1");
    }

    #[test]
    fn test_into_config_blank_registry_is_missing_variable() {
        let err = PipelineArgs {
            ecr_name: "  ".to_string(),
            ..args()
        }
        .into_config()
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CoreError>(),
            Some(&CoreError::MissingVariable(env::ECR_NAME))
        );
    }

    #[test]
    fn test_into_config_drops_partial_credentials() {
        let config = PipelineArgs {
            docker_token: Some(String::new()),
            ..args()
        }
        .into_config()
        .unwrap();
        assert!(config.source_credentials().is_none());
    }

    #[test]
    fn test_into_config_keeps_overrides() {
        let config = PipelineArgs {
            build_file: PathBuf::from("docker/Dockerfile.lambda"),
            ..args()
        }
        .into_config()
        .unwrap();
        assert_eq!(config.build_file(), std::path::Path::new("docker/Dockerfile.lambda"));
        assert_eq!(config.revision().as_str(), "deadbeefcafe");
    }
}

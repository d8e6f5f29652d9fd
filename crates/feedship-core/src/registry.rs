//! Registry coordinates
//!
//! `ECR_NAME` names the registry namespace. Every target is published under
//! it twice: once as `latest` and once with the revision tag.

use crate::error::{CoreError, Result};
use crate::tag::ImageTag;
use crate::target::ImageTarget;
use serde::Serialize;
use std::fmt;

/// Registry host used when the namespace carries no explicit host
pub const DEFAULT_REGISTRY_HOST: &str = "docker.io";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegistryReference {
    namespace: String,
}

impl RegistryReference {
    /// Parse a registry namespace such as
    /// `123456789012.dkr.ecr.ap-northeast-1.amazonaws.com`
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        let raw = namespace.into();
        let namespace = raw.trim().trim_end_matches('/');

        if namespace.is_empty() || namespace.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidRegistry(raw));
        }

        Ok(Self {
            namespace: namespace.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Server address handed to `docker login`
    ///
    /// # Examples
    /// - `123456.dkr.ecr.region.amazonaws.com` -> `123456.dkr.ecr.region.amazonaws.com`
    /// - `ghcr.io/org` -> `ghcr.io`
    /// - `localhost:5000/team` -> `localhost:5000`
    /// - `myuser` -> `docker.io`
    pub fn host(&self) -> &str {
        let first = self
            .namespace
            .split('/')
            .next()
            .unwrap_or(self.namespace.as_str());

        if first.contains('.') || first.contains(':') || first == "localhost" {
            first
        } else {
            DEFAULT_REGISTRY_HOST
        }
    }

    /// `{namespace}/{image}` for a target, without a tag
    pub fn repository(&self, target: ImageTarget) -> String {
        format!("{}/{}", self.namespace, target.image_name())
    }

    pub fn image(&self, target: ImageTarget, tag: ImageTag) -> ImageRef {
        ImageRef {
            target,
            repository: self.repository(target),
            tag,
        }
    }

    /// Both coordinates of a target, `latest` first
    pub fn images(&self, target: ImageTarget, tag: &ImageTag) -> [ImageRef; 2] {
        [
            self.image(target, ImageTag::latest()),
            self.image(target, tag.clone()),
        ]
    }
}

impl fmt::Display for RegistryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)
    }
}

/// Fully qualified image coordinate: `{repository}:{tag}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub target: ImageTarget,
    pub repository: String,
    pub tag: ImageTag,
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

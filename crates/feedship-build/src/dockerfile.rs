//! Build description rendering
//!
//! Produces the multi-stage Dockerfile the pipeline builds from: one compile
//! stage and one runtime stage per [`ImageTarget`], each installing its
//! binary as the runtime's `bootstrap` entry point. Stage names come from
//! [`ImageTarget::stage`], so `docker build --target` always matches.

use crate::error::RenderError;
use feedship_core::ImageTarget;
use serde::Serialize;
use tera::{Context, Tera};

pub const DEFAULT_BUILDER_IMAGE: &str = "rust:1-bullseye";
pub const DEFAULT_RUNTIME_IMAGE: &str = "public.ecr.aws/lambda/provided:al2023";

const TEMPLATE: &str = r#"# syntax=docker/dockerfile:1
# Generated by feedship. Targets: {% for t in targets %}{{ t.stage }}{% if not loop.last %}, {% endif %}{% endfor %}

FROM {{ builder_image }} AS builder
WORKDIR {{ workdir }}
COPY . .
RUN cargo build --release --locked{% for t in targets %} --bin {{ t.binary }}{% endfor %}
{% for t in targets %}
FROM {{ runtime_image }} AS {{ t.stage }}
COPY --from=builder {{ workdir }}/target/release/{{ t.binary }} ${LAMBDA_RUNTIME_DIR}/bootstrap
CMD [ "bootstrap" ]
{% endfor %}"#;

#[derive(Debug, Serialize)]
struct TargetContext {
    stage: &'static str,
    binary: &'static str,
}

#[derive(Debug, Clone)]
pub struct BuildDescription {
    builder_image: String,
    runtime_image: String,
    workdir: String,
}

impl Default for BuildDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildDescription {
    pub fn new() -> Self {
        Self {
            builder_image: DEFAULT_BUILDER_IMAGE.to_string(),
            runtime_image: DEFAULT_RUNTIME_IMAGE.to_string(),
            workdir: "/usr/src/app".to_string(),
        }
    }

    pub fn with_builder_image(mut self, image: impl Into<String>) -> Self {
        self.builder_image = image.into();
        self
    }

    pub fn with_runtime_image(mut self, image: impl Into<String>) -> Self {
        self.runtime_image = image.into();
        self
    }

    /// Render the Dockerfile text
    pub fn render(&self) -> Result<String, RenderError> {
        let targets: Vec<TargetContext> = ImageTarget::ALL
            .iter()
            .map(|t| TargetContext {
                stage: t.stage(),
                binary: t.binary(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("builder_image", &self.builder_image);
        context.insert("runtime_image", &self.runtime_image);
        context.insert("workdir", &self.workdir);
        context.insert("targets", &targets);

        let rendered = Tera::default().render_str(TEMPLATE, &context)?;
        tracing::debug!(bytes = rendered.len(), "Rendered build description");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_declares_both_stages() {
        let dockerfile = BuildDescription::new().render().unwrap();

        assert!(dockerfile.contains("FROM rust:1-bullseye AS builder"));
        assert!(dockerfile.contains("FROM public.ecr.aws/lambda/provided:al2023 AS primary"));
        assert!(dockerfile.contains("FROM public.ecr.aws/lambda/provided:al2023 AS test"));
        assert!(dockerfile.contains("--bin bsky-feed-bot --bin test"));
    }

    #[test]
    fn test_each_stage_installs_bootstrap() {
        let dockerfile = BuildDescription::new().render().unwrap();

        assert!(dockerfile.contains(
            "COPY --from=builder /usr/src/app/target/release/bsky-feed-bot ${LAMBDA_RUNTIME_DIR}/bootstrap"
        ));
        assert!(dockerfile.contains(
            "COPY --from=builder /usr/src/app/target/release/test ${LAMBDA_RUNTIME_DIR}/bootstrap"
        ));
        assert_eq!(dockerfile.matches("CMD [ \"bootstrap\" ]").count(), 2);
    }

    #[test]
    fn test_primary_stage_comes_first() {
        let dockerfile = BuildDescription::new().render().unwrap();
        let primary = dockerfile.find("AS primary").unwrap();
        let test = dockerfile.find("AS test").unwrap();
        assert!(primary < test);
    }

    #[test]
    fn test_custom_images() {
        let dockerfile = BuildDescription::new()
            .with_builder_image("rust:1.85-bookworm")
            .with_runtime_image("public.ecr.aws/lambda/provided:al2")
            .render()
            .unwrap();

        assert!(dockerfile.contains("FROM rust:1.85-bookworm AS builder"));
        assert!(dockerfile.contains("FROM public.ecr.aws/lambda/provided:al2 AS primary"));
    }
}

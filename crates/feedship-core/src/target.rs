//! Build targets
//!
//! A single build description produces exactly two images. The set is
//! closed: there are no dynamic targets.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageTarget {
    /// Deployable bot binary behind the Lambda runtime
    Primary,
    /// Test-running binary
    Test,
}

impl ImageTarget {
    /// Build order used by the pipeline
    pub const ALL: [ImageTarget; 2] = [ImageTarget::Primary, ImageTarget::Test];

    /// Stage name selected with `docker build --target`
    pub fn stage(&self) -> &'static str {
        match self {
            ImageTarget::Primary => "primary",
            ImageTarget::Test => "test",
        }
    }

    /// Repository name under the registry namespace
    pub fn image_name(&self) -> &'static str {
        match self {
            ImageTarget::Primary => "bsky-feed-bot-lambda",
            ImageTarget::Test => "test",
        }
    }

    /// Compiled binary installed as the runtime `bootstrap`
    pub fn binary(&self) -> &'static str {
        match self {
            ImageTarget::Primary => "bsky-feed-bot",
            ImageTarget::Test => "test",
        }
    }
}

impl fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_order_is_primary_then_test() {
        assert_eq!(ImageTarget::ALL, [ImageTarget::Primary, ImageTarget::Test]);
    }

    #[test]
    fn test_image_names() {
        assert_eq!(ImageTarget::Primary.image_name(), "bsky-feed-bot-lambda");
        assert_eq!(ImageTarget::Test.image_name(), "test");
    }

    #[test]
    fn test_display_uses_stage_name() {
        assert_eq!(ImageTarget::Primary.to_string(), "primary");
        assert_eq!(ImageTarget::Test.to_string(), "test");
    }
}

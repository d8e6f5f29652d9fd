//! docker CLI invocations

use crate::runner::Invocation;
use feedship_core::{Credentials, ImageRef, ImageTarget, Secret};
use std::path::Path;

pub const DOCKER: &str = "docker";

/// `docker login [--username U] --password-stdin [SERVER]`
///
/// Without a server docker logs in to Docker Hub.
pub fn login(server: Option<&str>, username: &str, password: Secret) -> Invocation {
    let invocation = Invocation::new(DOCKER)
        .args(["login", "--username", username, "--password-stdin"])
        .stdin(password);

    match server {
        Some(server) => invocation.arg(server),
        None => invocation,
    }
}

/// Source registry login from configured credentials
pub fn login_with(server: Option<&str>, credentials: &Credentials) -> Invocation {
    login(server, &credentials.username, credentials.secret.clone())
}

/// `docker build --file F --target T --tag I1 --tag I2 CONTEXT`
pub fn build(
    build_file: &Path,
    context: &Path,
    target: ImageTarget,
    images: &[ImageRef],
) -> Invocation {
    let mut invocation = Invocation::new(DOCKER)
        .arg("build")
        .arg("--file")
        .arg(build_file.display().to_string())
        .arg("--target")
        .arg(target.stage());

    for image in images {
        invocation = invocation.arg("--tag").arg(image.to_string());
    }

    invocation.arg(context.display().to_string()).streamed()
}

/// `docker push IMAGE`
pub fn push(image: &ImageRef) -> Invocation {
    Invocation::new(DOCKER)
        .arg("push")
        .arg(image.to_string())
        .streamed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedship_core::{ImageTag, RegistryReference, RevisionIdentifier, resolve};

    fn tag() -> ImageTag {
        resolve(&RevisionIdentifier::new("deadbeef0123")).unwrap()
    }

    #[test]
    fn test_login_docker_hub() {
        let invocation = login(None, "bot", Secret::new("t0ken"));
        assert_eq!(
            invocation.to_string(),
            "docker login --username bot --password-stdin"
        );
        assert_eq!(invocation.secret_stdin().unwrap().expose(), "t0ken");
    }

    #[test]
    fn test_login_with_server() {
        let invocation = login_with(
            Some("123.dkr.ecr.us-east-1.amazonaws.com"),
            &Credentials::new("AWS", "ecr-token"),
        );
        assert_eq!(
            invocation.to_string(),
            "docker login --username AWS --password-stdin 123.dkr.ecr.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_build_selects_target_and_both_tags() {
        let registry = RegistryReference::new("reg.example.com").unwrap();
        let images = registry.images(ImageTarget::Primary, &tag());
        let invocation = build(
            Path::new("Dockerfile"),
            Path::new("."),
            ImageTarget::Primary,
            &images,
        );

        assert_eq!(
            invocation.to_string(),
            "docker build --file Dockerfile --target primary \
             --tag reg.example.com/bsky-feed-bot-lambda:latest \
             --tag reg.example.com/bsky-feed-bot-lambda:deadbee ."
        );
        assert!(invocation.is_streamed());
        assert!(invocation.secret_stdin().is_none());
    }

    #[test]
    fn test_push() {
        let registry = RegistryReference::new("reg.example.com").unwrap();
        let image = registry.image(ImageTarget::Test, tag());
        assert_eq!(
            push(&image).to_string(),
            "docker push reg.example.com/test:deadbee"
        );
    }
}

use colored::Colorize;
use feedship_build::{BuildDescription, Buildspec, BuildspecOptions};
use std::path::Path;

fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            eprintln!("{} {}", "✓ Wrote".green(), path.display().to_string().cyan());
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub fn dockerfile(
    output: Option<&Path>,
    builder_image: String,
    runtime_image: String,
) -> anyhow::Result<()> {
    let rendered = BuildDescription::new()
        .with_builder_image(builder_image)
        .with_runtime_image(runtime_image)
        .render()?;
    emit(&rendered, output)
}

pub fn buildspec(
    output: Option<&Path>,
    docker_token_secret: Option<String>,
    install: Vec<String>,
) -> anyhow::Result<()> {
    let mut options = BuildspecOptions::default();
    if !install.is_empty() {
        options.install = install;
    }
    if let Some(reference) = docker_token_secret {
        options = options.with_docker_token_secret(reference);
    }

    let rendered = Buildspec::new(options).to_yaml()?;
    emit(&rendered, output)
}

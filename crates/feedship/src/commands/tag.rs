use feedship_core::{RevisionIdentifier, resolve};

pub fn handle(revision: &str) -> anyhow::Result<()> {
    let tag = resolve(&RevisionIdentifier::new(revision))?;
    println!("{}", tag);
    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse an output path that resolves to one of the inputs.
pub fn ensure_distinct_output(output: &Path, inputs: &[&Path]) -> Result<()> {
    let target = resolve(output)
        .with_context(|| format!("failed to resolve output path {}", output.display()))?;

    for input in inputs {
        let source = resolve(input)
            .with_context(|| format!("failed to resolve input path {}", input.display()))?;
        if target == source {
            bail!(
                "refusing to overwrite input: output {} is the same file as {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // `..` is left unresolved for paths not yet on disk.
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir().context("current_dir")?.join(path))
    }
}

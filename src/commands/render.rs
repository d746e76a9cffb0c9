use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::{
    definition::{Catalog, PackageDefinition},
    render,
    runtime::Runtime,
};

/// Render definitions as Homebrew Ruby files.
///
/// With no ids every definition is rendered. Without an output directory
/// the files are printed to stdout; otherwise they are written in tap
/// layout (`Casks/`, `Formula/`) under `output`.
#[tracing::instrument(skip(runtime, catalog))]
pub fn render<R: Runtime>(
    runtime: &R,
    catalog: &Catalog,
    ids: &[String],
    output: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let defs = select(catalog, ids)?;

    let Some(root) = output else {
        for (i, def) in defs.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", render::render(def));
        }
        return Ok(Vec::new());
    };

    let mut written = Vec::with_capacity(defs.len());
    for def in defs {
        let path = root.join(render::tap_path(def));
        if let Some(parent) = path.parent() {
            runtime.create_dir_all(parent)?;
        }
        runtime
            .write(&path, render::render(def).as_bytes())
            .with_context(|| format!("Failed to write {} for {}", path.display(), def.id))?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn select<'a>(catalog: &'a Catalog, ids: &[String]) -> Result<Vec<&'a PackageDefinition>> {
    if ids.is_empty() {
        return Ok(catalog.iter().collect());
    }
    ids.iter().map(|id| catalog.require(id)).collect()
}

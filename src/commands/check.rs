use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::{definition::Catalog, platform::Host, runtime::Runtime, smoke::run_smoke_test};

/// Run the post-install check for an installed definition
#[tracing::instrument(skip(runtime, catalog))]
pub fn check<R: Runtime>(
    runtime: &R,
    catalog: &Catalog,
    id: &str,
    host: &Host,
    bin_dir: &Path,
) -> Result<()> {
    let def = catalog.require(id)?;
    debug!("Checking {} in {}", def.id, bin_dir.display());

    let output = run_smoke_test(runtime, def, host, bin_dir)?;
    let reported = output.stdout.lines().next().unwrap_or("").trim();
    if reported.is_empty() {
        println!("{}: ok", def.id);
    } else {
        println!("{}: ok ({})", def.id, reported);
    }
    Ok(())
}

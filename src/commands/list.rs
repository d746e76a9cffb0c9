use anyhow::Result;
use log::debug;

use crate::definition::{Catalog, PackageDefinition};

/// List all known definitions
#[tracing::instrument(skip(catalog))]
pub fn list(catalog: &Catalog) -> Result<()> {
    debug!("Listing {} definition(s)", catalog.len());
    if catalog.is_empty() {
        println!("No definitions.");
        return Ok(());
    }
    for def in catalog.iter() {
        println!("{}", summary_line(def));
    }
    Ok(())
}

pub(crate) fn summary_line(def: &PackageDefinition) -> String {
    let platforms: Vec<String> = def.platforms().iter().map(|os| os.to_string()).collect();
    format!(
        "{} ({}) {} [{}]",
        def.id,
        def.kind,
        def.version,
        platforms.join(", ")
    )
}

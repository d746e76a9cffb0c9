use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::{definition::Catalog, runtime::Runtime};

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub catalog: Catalog,
}

impl<R: Runtime> Config<R> {
    /// Build the catalog from the built-in definitions plus, when given, a
    /// JSON file of extra definitions.
    pub fn new(runtime: R, definitions: Option<PathBuf>) -> Result<Self> {
        let mut catalog = Catalog::builtin();
        if let Some(path) = definitions {
            let count = catalog.load_file(&runtime, &path)?;
            debug!("Loaded {} definition(s) from {}", count, path.display());
        }
        Ok(Self { runtime, catalog })
    }
}

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::Path;

use super::{
    Arch, Checksum, DefinitionKind, Os, PackageDefinition, ReleaseArtifact, ReleaseSource, Version,
};
use crate::runtime::Runtime;

/// Release currently published by the v2 alpha channel
pub const AURL_V2_ALPHA_VERSION: &str = "2.0.0-alpha20251205";

const AURL_DESC: &str = "URL Command Line Tool with Authentication Support (v2 alpha build)";
const AURL_LINUX_DESC: &str =
    "URL Command Line Tool with Authentication Support (v2 alpha build, Linux only)";

const DARWIN_ARM64_SHA256: &str = "24ea04015fce314299450900bb4ff72a45ce18f02892be7780213853212f37f1";
const DARWIN_X86_64_SHA256: &str =
    "a77ac9dd0c6c057475b3acbf1245d9f4a681b4a2e9458b95987e5d3fac908d68";
const LINUX_ARM64_SHA256: &str = "de1023e52412ca7486d2aa1a465464e31f9b0d5f56cde194c0f16878256f4cec";
const LINUX_X86_64_SHA256: &str = "c083efe1922e0ebde9f9e02e17dac4b92f0d8efeacffc75353d7300c77304379";
const LINUX_I386_SHA256: &str = "c6147577f79bf49fc8e6981148cd6936c5c329146154e49672cd65c4236d730a";

/// All known package definitions, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: BTreeMap<String, PackageDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The definitions shipped with the tap
    pub fn builtin() -> Self {
        let source = ReleaseSource::github("classmethod", "aurl", "aurl");
        let mut definitions = BTreeMap::new();
        for def in [
            aurl_cask(&source),
            aurl_formula(&source),
            aurl_linux_formula(&source),
        ] {
            definitions.insert(def.id.clone(), def);
        }
        Self { definitions }
    }

    pub fn get(&self, id: &str) -> Option<&PackageDefinition> {
        self.definitions.get(id)
    }

    /// Look up a definition, failing with the list of known ids
    pub fn require(&self, id: &str) -> Result<&PackageDefinition> {
        self.get(id).ok_or_else(|| {
            let known: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
            anyhow!(
                "Unknown definition '{}'. Available: {}",
                id,
                known.join(", ")
            )
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Validate and add a definition, replacing any with the same id
    pub fn insert(&mut self, def: PackageDefinition) -> Result<Option<PackageDefinition>> {
        def.validate()?;
        Ok(self.definitions.insert(def.id.clone(), def))
    }

    /// Merge definitions from a JSON file (an array of definitions).
    ///
    /// Every entry is validated before any is merged; returns the number of
    /// definitions loaded.
    #[tracing::instrument(skip(self, runtime))]
    pub fn load_file<R: Runtime>(&mut self, runtime: &R, path: &Path) -> Result<usize> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read definitions from {}", path.display()))?;
        let defs: Vec<PackageDefinition> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse definitions in {}", path.display()))?;

        for def in &defs {
            def.validate()
                .with_context(|| format!("Invalid definition in {}", path.display()))?;
        }

        let count = defs.len();
        for def in defs {
            debug!("Loaded definition {} from {:?}", def.id, path);
            if self.definitions.insert(def.id.clone(), def).is_some() {
                info!("A definition from {} replaced a built-in one", path.display());
            }
        }
        Ok(count)
    }
}

fn aurl_cask(source: &ReleaseSource) -> PackageDefinition {
    // Points at the current alpha release; bumped by hand on every publish.
    let url = source.asset_url(AURL_V2_ALPHA_VERSION, Os::MacOs, Arch::X86_64);
    PackageDefinition {
        id: "aurl@v2-alpha".to_string(),
        kind: DefinitionKind::Cask,
        name: Some("aurl (v2 alpha)".to_string()),
        desc: AURL_DESC.to_string(),
        homepage: source.homepage(),
        version: Version::Latest,
        binary: "aurl".to_string(),
        test_args: vec!["--version".to_string()],
        linux_only: false,
        artifacts: vec![ReleaseArtifact::new(Os::MacOs, None, url, Checksum::NoCheck)],
    }
}

fn linux_artifacts(source: &ReleaseSource) -> Vec<ReleaseArtifact> {
    [
        (Arch::Arm64, LINUX_ARM64_SHA256),
        (Arch::X86_64, LINUX_X86_64_SHA256),
        (Arch::I386, LINUX_I386_SHA256),
    ]
    .into_iter()
    .map(|(arch, sha)| {
        ReleaseArtifact::new(
            Os::Linux,
            Some(arch),
            source.asset_url(AURL_V2_ALPHA_VERSION, Os::Linux, arch),
            Checksum::sha256(sha),
        )
    })
    .collect()
}

fn aurl_formula(source: &ReleaseSource) -> PackageDefinition {
    let mut artifacts: Vec<ReleaseArtifact> = [
        (Arch::Arm64, DARWIN_ARM64_SHA256),
        (Arch::X86_64, DARWIN_X86_64_SHA256),
    ]
    .into_iter()
    .map(|(arch, sha)| {
        ReleaseArtifact::new(
            Os::MacOs,
            Some(arch),
            source.asset_url(AURL_V2_ALPHA_VERSION, Os::MacOs, arch),
            Checksum::sha256(sha),
        )
    })
    .collect();
    artifacts.extend(linux_artifacts(source));

    PackageDefinition {
        id: "aurl-v2-alpha".to_string(),
        kind: DefinitionKind::Formula,
        name: None,
        desc: AURL_DESC.to_string(),
        homepage: source.homepage(),
        version: Version::Literal(AURL_V2_ALPHA_VERSION.to_string()),
        binary: "aurl".to_string(),
        test_args: vec!["--version".to_string()],
        linux_only: false,
        artifacts,
    }
}

fn aurl_linux_formula(source: &ReleaseSource) -> PackageDefinition {
    PackageDefinition {
        id: "aurl-v2-alpha-linux".to_string(),
        kind: DefinitionKind::Formula,
        name: None,
        desc: AURL_LINUX_DESC.to_string(),
        homepage: source.homepage(),
        version: Version::Literal(AURL_V2_ALPHA_VERSION.to_string()),
        binary: "aurl".to_string(),
        test_args: vec!["--version".to_string()],
        linux_only: true,
        artifacts: linux_artifacts(source),
    }
}

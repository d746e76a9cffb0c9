//! Package definitions
//!
//! A definition is the typed form of one Homebrew Cask or Formula: its
//! metadata, the binary it installs, the post-install check, and a flat
//! table of release artifacts keyed by (os, arch).

mod artifact;
mod catalog;
mod source;

pub use artifact::{Arch, Checksum, Os, ReleaseArtifact};
pub use catalog::Catalog;
pub use source::ReleaseSource;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Cask,
    Formula,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Cask => write!(f, "cask"),
            DefinitionKind::Formula => write!(f, "formula"),
        }
    }
}

/// Either a literal release version or the rolling "latest" marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Version {
    Literal(String),
    Latest,
}

impl Version {
    pub const LATEST: &'static str = "latest";

    pub fn literal(&self) -> Option<&str> {
        match self {
            Version::Literal(v) => Some(v),
            Version::Latest => None,
        }
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        if value == Self::LATEST {
            Version::Latest
        } else {
            Version::Literal(value)
        }
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        match value {
            Version::Literal(v) => v,
            Version::Latest => Version::LATEST.to_string(),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Literal(v) => write!(f, "{}", v),
            Version::Latest => write!(f, "{}", Version::LATEST),
        }
    }
}

fn default_test_args() -> Vec<String> {
    vec!["--version".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDefinition {
    pub id: String,
    pub kind: DefinitionKind,
    /// Display name (casks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub desc: String,
    pub homepage: String,
    pub version: Version,
    pub binary: String,
    #[serde(default = "default_test_args")]
    pub test_args: Vec<String>,
    #[serde(default)]
    pub linux_only: bool,
    pub artifacts: Vec<ReleaseArtifact>,
}

impl PackageDefinition {
    /// Operating systems this definition provides artifacts for
    pub fn platforms(&self) -> Vec<Os> {
        let mut platforms: Vec<Os> = self.artifacts.iter().map(|a| a.os).collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }

    /// Whether the definition declares support for `os` at all
    pub fn supports(&self, os: Os) -> bool {
        match (self.kind, os) {
            (DefinitionKind::Cask, Os::Linux) => false,
            (_, Os::MacOs) if self.linux_only => false,
            _ => true,
        }
    }

    /// Check the invariants every definition must hold
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (field, value) in [
            ("id", &self.id),
            ("desc", &self.desc),
            ("homepage", &self.homepage),
            ("binary", &self.binary),
        ] {
            if value.trim().is_empty() {
                return Err(DefinitionError::EmptyField {
                    id: self.id.clone(),
                    field,
                });
            }
        }

        if !is_valid_id(&self.id) {
            return Err(DefinitionError::InvalidId {
                id: self.id.clone(),
            });
        }

        if self.version.literal().is_some_and(|v| v.trim().is_empty()) {
            return Err(DefinitionError::EmptyField {
                id: self.id.clone(),
                field: "version",
            });
        }

        if self.kind == DefinitionKind::Formula && self.version == Version::Latest {
            return Err(DefinitionError::LatestFormula {
                id: self.id.clone(),
            });
        }

        if self.artifacts.is_empty() {
            return Err(DefinitionError::NoArtifacts {
                id: self.id.clone(),
            });
        }

        let rolling_cask = self.kind == DefinitionKind::Cask && self.version == Version::Latest;
        let mut seen = HashSet::new();

        for artifact in &self.artifacts {
            if !self.supports(artifact.os) {
                return Err(DefinitionError::PlatformNotCovered {
                    id: self.id.clone(),
                    os: artifact.os,
                });
            }

            // Every non-ARM Mac resolves to x86_64, so this entry could never be picked.
            if artifact.os == Os::MacOs && artifact.arch == Some(Arch::I386) {
                return Err(DefinitionError::UnreachableArtifact {
                    id: self.id.clone(),
                    url: artifact.url.clone(),
                });
            }

            // Linux hosts outside ARM and Intel must stay unresolved.
            if artifact.os == Os::Linux && artifact.arch.is_none() {
                return Err(DefinitionError::UnpinnedArtifact {
                    id: self.id.clone(),
                    url: artifact.url.clone(),
                });
            }

            if !artifact.url.starts_with("https://") {
                return Err(DefinitionError::InsecureUrl {
                    id: self.id.clone(),
                    url: artifact.url.clone(),
                });
            }

            match &artifact.checksum {
                Checksum::NoCheck if !rolling_cask => {
                    return Err(DefinitionError::UncheckedArtifact {
                        id: self.id.clone(),
                        url: artifact.url.clone(),
                    });
                }
                Checksum::Sha256(_) if rolling_cask => {
                    return Err(DefinitionError::PinnedLatestCask {
                        id: self.id.clone(),
                        url: artifact.url.clone(),
                    });
                }
                checksum if !checksum.is_well_formed() => {
                    return Err(DefinitionError::InvalidChecksum {
                        id: self.id.clone(),
                        url: artifact.url.clone(),
                    });
                }
                _ => {}
            }

            // A wildcard entry overlaps every concrete entry for the same OS.
            let overlaps = seen.iter().any(|(os, arch): &(Os, Option<Arch>)| {
                *os == artifact.os
                    && (arch.is_none() || artifact.arch.is_none() || *arch == artifact.arch)
            });
            if overlaps {
                return Err(DefinitionError::DuplicateArtifact {
                    id: self.id.clone(),
                    os: artifact.os,
                    arch: artifact.arch,
                });
            }
            seen.insert((artifact.os, artifact.arch));
        }

        Ok(())
    }
}

/// Homebrew token grammar: `[a-z0-9][a-z0-9@._+-]*`, without `..`.
/// The id becomes both a file name in the tap and a Ruby class name.
fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "@._+-".contains(c))
        && !id.contains("..")
}

/// Invariant violations found while building or loading a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    EmptyField { id: String, field: &'static str },
    InvalidId { id: String },
    LatestFormula { id: String },
    NoArtifacts { id: String },
    UnreachableArtifact { id: String, url: String },
    PlatformNotCovered { id: String, os: Os },
    InsecureUrl { id: String, url: String },
    InvalidChecksum { id: String, url: String },
    UncheckedArtifact { id: String, url: String },
    PinnedLatestCask { id: String, url: String },
    UnpinnedArtifact { id: String, url: String },
    DuplicateArtifact { id: String, os: Os, arch: Option<Arch> },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::EmptyField { id, field } => {
                write!(f, "{}: field '{}' cannot be empty", id, field)
            }
            DefinitionError::InvalidId { id } => write!(
                f,
                "'{}' is not a valid id (lowercase letters, digits and @._+- only)",
                id
            ),
            DefinitionError::LatestFormula { id } => {
                write!(f, "{}: a formula needs a literal version, not 'latest'", id)
            }
            DefinitionError::NoArtifacts { id } => {
                write!(f, "{}: no release artifacts defined", id)
            }
            DefinitionError::PlatformNotCovered { id, os } => {
                write!(f, "{}: {} artifacts are not allowed in this definition", id, os)
            }
            DefinitionError::UnreachableArtifact { id, url } => {
                write!(f, "{}: {} targets 32-bit macOS, which is never resolved", id, url)
            }
            DefinitionError::InsecureUrl { id, url } => {
                write!(f, "{}: artifact URL must use https: {}", id, url)
            }
            DefinitionError::InvalidChecksum { id, url } => {
                write!(
                    f,
                    "{}: checksum for {} is not a 64 character lowercase sha256",
                    id, url
                )
            }
            DefinitionError::UncheckedArtifact { id, url } => {
                write!(
                    f,
                    "{}: {} has no checksum; only a cask tracking 'latest' may skip verification",
                    id, url
                )
            }
            DefinitionError::PinnedLatestCask { id, url } => write!(
                f,
                "{}: a cask tracking 'latest' cannot pin a checksum for {}",
                id, url
            ),
            DefinitionError::UnpinnedArtifact { id, url } => {
                write!(f, "{}: Linux artifact {} must name an architecture", id, url)
            }
            DefinitionError::DuplicateArtifact { id, os, arch } => match arch {
                Some(arch) => write!(f, "{}: more than one artifact for {}/{}", id, os, arch),
                None => write!(f, "{}: wildcard artifact for {} overlaps another entry", id, os),
            },
        }
    }
}

impl std::error::Error for DefinitionError {}

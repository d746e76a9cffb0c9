use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system an artifact is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    #[serde(alias = "darwin")]
    MacOs,
    Linux,
}

impl Os {
    /// Name used in release asset file names (`aurl_Darwin_arm64.tar.gz`)
    pub fn asset_name(&self) -> &'static str {
        match self {
            Os::MacOs => "Darwin",
            Os::Linux => "Linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::MacOs => write!(f, "macos"),
            Os::Linux => write!(f, "linux"),
        }
    }
}

/// CPU architecture an artifact is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "arm64", alias = "aarch64")]
    Arm64,
    #[serde(rename = "x86_64", alias = "amd64")]
    X86_64,
    #[serde(rename = "i386", alias = "i686")]
    I386,
}

impl Arch {
    pub fn asset_name(&self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::X86_64 => "x86_64",
            Arch::I386 => "i386",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_name())
    }
}

/// Expected content hash of an artifact.
///
/// `NoCheck` is only accepted on a rolling ("latest") cask; definition
/// validation rejects it anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Checksum {
    Sha256(String),
    NoCheck,
}

impl Checksum {
    pub const NO_CHECK: &'static str = "no_check";

    pub fn sha256(hex: impl Into<String>) -> Self {
        Checksum::Sha256(hex.into())
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Checksum::Sha256(_))
    }

    /// A sha256 must be exactly 64 lowercase hex characters
    pub fn is_well_formed(&self) -> bool {
        match self {
            Checksum::Sha256(hex) => {
                hex.len() == 64
                    && hex
                        .chars()
                        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
            }
            Checksum::NoCheck => true,
        }
    }
}

impl From<String> for Checksum {
    fn from(value: String) -> Self {
        if value == Self::NO_CHECK {
            Checksum::NoCheck
        } else {
            Checksum::Sha256(value)
        }
    }
}

impl From<Checksum> for String {
    fn from(value: Checksum) -> Self {
        match value {
            Checksum::Sha256(hex) => hex,
            Checksum::NoCheck => Checksum::NO_CHECK.to_string(),
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checksum::Sha256(hex) => write!(f, "sha256:{}", hex),
            Checksum::NoCheck => write!(f, "(unchecked)"),
        }
    }
}

/// One downloadable release file.
///
/// `arch = None` means the artifact serves every architecture of `os`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArtifact {
    pub os: Os,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<Arch>,
    pub url: String,
    #[serde(rename = "sha256")]
    pub checksum: Checksum,
}

impl ReleaseArtifact {
    pub fn new(os: Os, arch: Option<Arch>, url: impl Into<String>, checksum: Checksum) -> Self {
        Self {
            os,
            arch,
            url: url.into(),
            checksum,
        }
    }

    /// Whether this artifact can serve the given platform
    pub fn matches(&self, os: Os, arch: Arch) -> bool {
        self.os == os && self.arch.is_none_or(|a| a == arch)
    }
}

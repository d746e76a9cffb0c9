//! Platform resolution
//!
//! Maps a host to the single release artifact a definition provides for it.
//! The host is first normalised to an (os, arch) key, which is then looked up
//! in the definition's flat artifact table. Resolution is pure: the same
//! inputs always yield the same artifact.

use serde::Serialize;
use std::fmt;

use crate::definition::{Arch, Os, PackageDefinition, ReleaseArtifact};
use crate::platform::{BitWidth, CpuFamily, Host, HostOs};

/// The outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution<'a> {
    pub id: &'a str,
    pub os: Os,
    pub arch: Arch,
    pub artifact: &'a ReleaseArtifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The host cannot be mapped to any artifact platform, or the
    /// definition does not cover the host's operating system
    UnsupportedPlatform { id: String, host: Host },
    /// The host maps to a platform the definition has no artifact for
    NoArtifact { id: String, os: Os, arch: Arch },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnsupportedPlatform { id, host } => {
                write!(f, "{} does not support this platform: {}", id, host)
            }
            ResolveError::NoArtifact { id, os, arch } => {
                write!(f, "{} has no release artifact for {}/{}", id, os, arch)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Map a host onto the (os, arch) key used by artifact tables.
///
/// - macOS: ARM is `arm64`, anything else is `x86_64`
/// - Linux: ARM is `arm64`; Intel is `x86_64` or `i386` by bit width;
///   other CPU families have no key
/// - any other OS has no key
pub fn platform_key(host: &Host) -> Option<(Os, Arch)> {
    match (&host.os, &host.cpu) {
        (HostOs::MacOs, CpuFamily::Arm) => Some((Os::MacOs, Arch::Arm64)),
        (HostOs::MacOs, _) => Some((Os::MacOs, Arch::X86_64)),
        (HostOs::Linux, CpuFamily::Arm) => Some((Os::Linux, Arch::Arm64)),
        (HostOs::Linux, CpuFamily::Intel) => match host.bits {
            BitWidth::Bits64 => Some((Os::Linux, Arch::X86_64)),
            BitWidth::Bits32 => Some((Os::Linux, Arch::I386)),
        },
        (HostOs::Linux, CpuFamily::Other(_)) => None,
        (HostOs::Other(_), _) => None,
    }
}

/// Resolve the artifact `def` provides for `host`.
///
/// An artifact for the exact architecture wins over one that serves every
/// architecture of the OS.
pub fn resolve<'a>(
    def: &'a PackageDefinition,
    host: &Host,
) -> Result<Resolution<'a>, ResolveError> {
    let unsupported = || ResolveError::UnsupportedPlatform {
        id: def.id.clone(),
        host: host.clone(),
    };

    let (os, arch) = platform_key(host).ok_or_else(unsupported)?;
    if !def.supports(os) {
        return Err(unsupported());
    }

    let exact = def
        .artifacts
        .iter()
        .find(|a| a.os == os && a.arch == Some(arch));
    let artifact = exact
        .or_else(|| def.artifacts.iter().find(|a| a.matches(os, arch)))
        .ok_or_else(|| ResolveError::NoArtifact {
            id: def.id.clone(),
            os,
            arch,
        })?;

    tracing::debug!("Resolved {} for {} to {}", def.id, host, artifact.url);

    Ok(Resolution {
        id: &def.id,
        os,
        arch,
        artifact,
    })
}

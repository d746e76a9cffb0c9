use super::artifact::{Arch, Os};

/// Where release artifacts are published.
///
/// Assets follow the `<prefix>_<Os>_<arch>.tar.gz` naming used by the
/// project's release pipeline and live under the `v<version>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    pub owner: String,
    pub repo: String,
    pub asset_prefix: String,
}

impl ReleaseSource {
    pub fn github(
        owner: impl Into<String>,
        repo: impl Into<String>,
        asset_prefix: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            asset_prefix: asset_prefix.into(),
        }
    }

    pub fn homepage(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    pub fn tag(version: &str) -> String {
        format!("v{}", version)
    }

    pub fn asset_name(&self, os: Os, arch: Arch) -> String {
        format!(
            "{}_{}_{}.tar.gz",
            self.asset_prefix,
            os.asset_name(),
            arch.asset_name()
        )
    }

    pub fn asset_url(&self, version: &str, os: Os, arch: Arch) -> String {
        format!(
            "{}/releases/download/{}/{}",
            self.homepage(),
            Self::tag(version),
            self.asset_name(os, arch)
        )
    }
}

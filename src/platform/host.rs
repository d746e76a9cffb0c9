use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system of the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HostOs {
    MacOs,
    Linux,
    Other(String),
}

impl HostOs {
    /// Detect the current operating system
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            HostOs::MacOs
        }
        #[cfg(target_os = "linux")]
        {
            HostOs::Linux
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            HostOs::Other(std::env::consts::OS.to_string())
        }
    }
}

impl FromStr for HostOs {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name.is_empty() {
            return Err(anyhow!("Operating system name cannot be empty"));
        }
        Ok(match name.as_str() {
            "macos" | "darwin" | "osx" | "mac" => HostOs::MacOs,
            "linux" => HostOs::Linux,
            _ => HostOs::Other(name),
        })
    }
}

impl TryFrom<String> for HostOs {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HostOs> for String {
    fn from(value: HostOs) -> Self {
        value.to_string()
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::MacOs => write!(f, "macos"),
            HostOs::Linux => write!(f, "linux"),
            HostOs::Other(name) => write!(f, "{}", name),
        }
    }
}

/// CPU family, as the package manager's `Hardware::CPU` distinguishes it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CpuFamily {
    Arm,
    Intel,
    Other(String),
}

impl From<String> for CpuFamily {
    fn from(value: String) -> Self {
        match value.as_str() {
            "arm" => CpuFamily::Arm,
            "intel" => CpuFamily::Intel,
            _ => CpuFamily::Other(value),
        }
    }
}

impl From<CpuFamily> for String {
    fn from(value: CpuFamily) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CpuFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuFamily::Arm => write!(f, "arm"),
            CpuFamily::Intel => write!(f, "intel"),
            CpuFamily::Other(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitWidth {
    #[serde(rename = "32")]
    Bits32,
    #[serde(rename = "64")]
    Bits64,
}

impl FromStr for BitWidth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "32" => Ok(BitWidth::Bits32),
            "64" => Ok(BitWidth::Bits64),
            other => Err(anyhow!(
                "Invalid bit width '{}'. Expected '32' or '64'.",
                other
            )),
        }
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitWidth::Bits32 => write!(f, "32-bit"),
            BitWidth::Bits64 => write!(f, "64-bit"),
        }
    }
}

/// The machine an artifact is resolved for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Host {
    pub os: HostOs,
    pub cpu: CpuFamily,
    pub bits: BitWidth,
}

impl Host {
    pub fn new(os: HostOs, cpu: CpuFamily, bits: BitWidth) -> Self {
        Self { os, cpu, bits }
    }

    /// Detect the current host
    pub fn detect() -> Self {
        Self {
            os: HostOs::detect(),
            cpu: Self::detect_cpu(),
            bits: Self::detect_bits(),
        }
    }

    fn detect_cpu() -> CpuFamily {
        #[cfg(any(target_arch = "aarch64", target_arch = "arm"))]
        {
            CpuFamily::Arm
        }
        #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
        {
            CpuFamily::Intel
        }
        #[cfg(not(any(
            target_arch = "aarch64",
            target_arch = "arm",
            target_arch = "x86_64",
            target_arch = "x86"
        )))]
        {
            CpuFamily::Other(std::env::consts::ARCH.to_string())
        }
    }

    fn detect_bits() -> BitWidth {
        if cfg!(target_pointer_width = "64") {
            BitWidth::Bits64
        } else {
            BitWidth::Bits32
        }
    }

    /// Build a host from an OS name and an architecture name such as
    /// `aarch64`, `x86_64` or `i686`.
    ///
    /// The bit width is taken from the architecture name unless `bits` is
    /// given explicitly.
    pub fn from_names(os: &str, arch: &str, bits: Option<BitWidth>) -> Result<Self> {
        let os = os.parse::<HostOs>()?;
        let (cpu, implied_bits) = parse_arch(arch)?;
        Ok(Self {
            os,
            cpu,
            bits: bits.unwrap_or(implied_bits),
        })
    }

    /// Start from the detected host and replace whichever parts were given.
    pub fn detect_with_overrides(
        os: Option<&str>,
        arch: Option<&str>,
        bits: Option<BitWidth>,
    ) -> Result<Self> {
        let mut host = Self::detect();
        if let Some(os) = os {
            host.os = os.parse()?;
        }
        if let Some(arch) = arch {
            let (cpu, implied_bits) = parse_arch(arch)?;
            host.cpu = cpu;
            host.bits = implied_bits;
        }
        if let Some(bits) = bits {
            host.bits = bits;
        }
        Ok(host)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.os, self.cpu, self.bits)
    }
}

fn parse_arch(arch: &str) -> Result<(CpuFamily, BitWidth)> {
    let name = arch.trim().to_lowercase();
    if name.is_empty() {
        return Err(anyhow!("Architecture name cannot be empty"));
    }
    Ok(match name.as_str() {
        "arm64" | "aarch64" => (CpuFamily::Arm, BitWidth::Bits64),
        "arm" | "armv7" | "armv7l" | "armhf" => (CpuFamily::Arm, BitWidth::Bits32),
        "x86_64" | "amd64" | "x64" => (CpuFamily::Intel, BitWidth::Bits64),
        "i386" | "i486" | "i586" | "i686" | "x86" => (CpuFamily::Intel, BitWidth::Bits32),
        _ => (CpuFamily::Other(name), BitWidth::Bits64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_detect() {
        let host = Host::detect();

        #[cfg(target_os = "macos")]
        assert_eq!(host.os, HostOs::MacOs);

        #[cfg(target_os = "linux")]
        assert_eq!(host.os, HostOs::Linux);

        #[cfg(target_arch = "x86_64")]
        {
            assert_eq!(host.cpu, CpuFamily::Intel);
            assert_eq!(host.bits, BitWidth::Bits64);
        }

        #[cfg(target_arch = "aarch64")]
        {
            assert_eq!(host.cpu, CpuFamily::Arm);
            assert_eq!(host.bits, BitWidth::Bits64);
        }
    }

    #[test]
    fn test_parse_os_aliases() {
        assert_eq!("darwin".parse::<HostOs>().unwrap(), HostOs::MacOs);
        assert_eq!("macOS".parse::<HostOs>().unwrap(), HostOs::MacOs);
        assert_eq!("Linux".parse::<HostOs>().unwrap(), HostOs::Linux);
        assert_eq!(
            "freebsd".parse::<HostOs>().unwrap(),
            HostOs::Other("freebsd".to_string())
        );
        assert!("".parse::<HostOs>().is_err());
    }

    #[test]
    fn test_from_names_implied_bits() {
        let host = Host::from_names("linux", "i686", None).unwrap();
        assert_eq!(host.cpu, CpuFamily::Intel);
        assert_eq!(host.bits, BitWidth::Bits32);

        let host = Host::from_names("linux", "amd64", None).unwrap();
        assert_eq!(host.cpu, CpuFamily::Intel);
        assert_eq!(host.bits, BitWidth::Bits64);

        let host = Host::from_names("darwin", "arm64", None).unwrap();
        assert_eq!(host.os, HostOs::MacOs);
        assert_eq!(host.cpu, CpuFamily::Arm);
    }

    #[test]
    fn test_from_names_explicit_bits_override() {
        let host = Host::from_names("linux", "x86_64", Some(BitWidth::Bits32)).unwrap();
        assert_eq!(host.bits, BitWidth::Bits32);
    }

    #[test]
    fn test_from_names_unknown_arch() {
        let host = Host::from_names("linux", "riscv64", None).unwrap();
        assert_eq!(host.cpu, CpuFamily::Other("riscv64".to_string()));
    }

    #[test]
    fn test_detect_with_overrides() {
        let host = Host::detect_with_overrides(Some("linux"), Some("i386"), None).unwrap();
        assert_eq!(host.os, HostOs::Linux);
        assert_eq!(host.cpu, CpuFamily::Intel);
        assert_eq!(host.bits, BitWidth::Bits32);

        let host = Host::detect_with_overrides(None, None, Some(BitWidth::Bits32)).unwrap();
        assert_eq!(host.bits, BitWidth::Bits32);
    }

    #[test]
    fn test_bit_width_parse() {
        assert_eq!("64".parse::<BitWidth>().unwrap(), BitWidth::Bits64);
        assert_eq!("32".parse::<BitWidth>().unwrap(), BitWidth::Bits32);
        let err = "16".parse::<BitWidth>().unwrap_err();
        assert!(err.to_string().contains("Invalid bit width"));
    }

    #[test]
    fn test_host_display() {
        let host = Host::new(HostOs::Linux, CpuFamily::Intel, BitWidth::Bits32);
        assert_eq!(host.to_string(), "linux/intel (32-bit)");
    }

    #[test]
    fn test_host_serializes_with_display_names() {
        let host = Host::from_names("darwin", "x86_64", None).unwrap();
        let value = serde_json::to_value(&host).unwrap();
        assert_eq!(value, serde_json::json!({"os": "macos", "cpu": "intel", "bits": "64"}));

        let other: Host =
            serde_json::from_str(r#"{"os": "FreeBSD", "cpu": "riscv64", "bits": "32"}"#).unwrap();
        assert_eq!(other.os, HostOs::Other("freebsd".to_string()));
        assert_eq!(other.cpu, CpuFamily::Other("riscv64".to_string()));
        assert_eq!(other.bits, BitWidth::Bits32);
    }
}

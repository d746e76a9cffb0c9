use anyhow::Result;
use log::debug;
use serde::Serialize;

use crate::{
    definition::{Catalog, Checksum},
    platform::Host,
    resolver::{self, Resolution},
};

#[derive(Serialize)]
struct ResolveReport<'a> {
    host: &'a Host,
    #[serde(flatten)]
    resolution: &'a Resolution<'a>,
}

/// Print the artifact a definition provides for `host`
#[tracing::instrument(skip(catalog))]
pub fn resolve(catalog: &Catalog, id: &str, host: &Host, json: bool) -> Result<()> {
    let def = catalog.require(id)?;
    debug!("Resolving {} for {}", def.id, host);

    let resolution = resolver::resolve(def, host)?;
    if json {
        let report = ResolveReport {
            host,
            resolution: &resolution,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_resolution(&resolution));
    }
    Ok(())
}

pub(crate) fn format_resolution(resolution: &Resolution<'_>) -> String {
    let checksum = match &resolution.artifact.checksum {
        Checksum::Sha256(hex) => hex.clone(),
        Checksum::NoCheck => "(not verified)".to_string(),
    };
    format!(
        "Definition: {}\nPlatform: {}/{}\nURL: {}\nSHA256: {}\n",
        resolution.id, resolution.os, resolution.arch, resolution.artifact.url, checksum
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::BitWidth;
    use crate::resolver::ResolveError;

    #[test]
    fn test_format_resolution() {
        let catalog = Catalog::builtin();
        let host = Host::from_names("linux", "i686", None).unwrap();
        let resolution = resolver::resolve(catalog.get("aurl-v2-alpha").unwrap(), &host).unwrap();

        assert_eq!(
            format_resolution(&resolution),
            "Definition: aurl-v2-alpha\n\
             Platform: linux/i386\n\
             URL: https://github.com/classmethod/aurl/releases/download/v2.0.0-alpha20251205/aurl_Linux_i386.tar.gz\n\
             SHA256: c6147577f79bf49fc8e6981148cd6936c5c329146154e49672cd65c4236d730a\n"
        );
    }

    #[test]
    fn test_format_unchecked_resolution() {
        let catalog = Catalog::builtin();
        let host = Host::from_names("macos", "arm64", None).unwrap();
        let resolution = resolver::resolve(catalog.get("aurl@v2-alpha").unwrap(), &host).unwrap();
        assert!(format_resolution(&resolution).contains("SHA256: (not verified)"));
    }

    #[test]
    fn test_resolve_report_json() {
        let catalog = Catalog::builtin();
        let host = Host::from_names("linux", "x86_64", Some(BitWidth::Bits64)).unwrap();
        let resolution = resolver::resolve(catalog.get("aurl-v2-alpha").unwrap(), &host).unwrap();
        let report = ResolveReport {
            host: &host,
            resolution: &resolution,
        };

        let value: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["id"], "aurl-v2-alpha");
        assert_eq!(value["os"], "linux");
        assert_eq!(value["arch"], "x86_64");
        assert_eq!(
            value["artifact"]["sha256"],
            "c083efe1922e0ebde9f9e02e17dac4b92f0d8efeacffc75353d7300c77304379"
        );
        assert_eq!(value["host"]["os"], "linux");
        assert_eq!(value["host"]["cpu"], "intel");
        assert_eq!(value["host"]["bits"], "64");
    }

    #[test]
    fn test_resolve_unsupported_platform() {
        let catalog = Catalog::builtin();
        let host = Host::from_names("linux", "riscv64", None).unwrap();
        let err = resolve(&catalog, "aurl-v2-alpha-linux", &host, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::UnsupportedPlatform { .. })
        ));
    }

    #[test]
    fn test_resolve_unknown_definition() {
        let host = Host::detect();
        let err = resolve(&Catalog::builtin(), "missing", &host, false).unwrap_err();
        assert!(err.to_string().contains("Unknown definition"));
    }
}

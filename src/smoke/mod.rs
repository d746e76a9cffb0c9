//! Post-install smoke test
//!
//! After the package manager has placed the binary, it is run once with the
//! definition's test arguments (`--version`) and must exit successfully.
//! Before running it, the file is inspected to make sure it is a native
//! executable for the host, so a wrong-platform artifact is reported as such
//! instead of as an obscure exec failure.

use log::{debug, info};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::definition::PackageDefinition;
use crate::platform::{Host, HostOs};
use crate::runtime::{CommandOutput, Runtime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Elf,
    MachO,
}

impl BinaryFormat {
    /// The format native executables use on `os`, if known
    pub fn native_for(os: &HostOs) -> Option<Self> {
        match os {
            HostOs::Linux => Some(BinaryFormat::Elf),
            HostOs::MacOs => Some(BinaryFormat::MachO),
            HostOs::Other(_) => None,
        }
    }

    /// Detect the executable format of `bytes`.
    /// Universal (fat) Mach-O files count as Mach-O.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match goblin::Object::parse(bytes) {
            Ok(goblin::Object::Elf(_)) => Some(BinaryFormat::Elf),
            Ok(goblin::Object::Mach(_)) => Some(BinaryFormat::MachO),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryFormat::Elf => write!(f, "ELF"),
            BinaryFormat::MachO => write!(f, "Mach-O"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmokeTestError {
    MissingBinary {
        path: PathBuf,
    },
    NotNativeExecutable {
        path: PathBuf,
        expected: BinaryFormat,
        found: Option<BinaryFormat>,
    },
    Spawn {
        path: PathBuf,
        reason: String,
    },
    Failed {
        path: PathBuf,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },
}

impl fmt::Display for SmokeTestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmokeTestError::MissingBinary { path } => {
                write!(f, "Installed binary not found at {}", path.display())
            }
            SmokeTestError::NotNativeExecutable {
                path,
                expected,
                found,
            } => match found {
                Some(found) => write!(
                    f,
                    "{} is a {} executable, expected {} for this platform",
                    path.display(),
                    found,
                    expected
                ),
                None => write!(
                    f,
                    "{} is not an executable (expected {})",
                    path.display(),
                    expected
                ),
            },
            SmokeTestError::Spawn { path, reason } => {
                write!(f, "Could not run {}: {}", path.display(), reason)
            }
            SmokeTestError::Failed {
                path,
                args,
                code,
                stderr,
            } => {
                let status = match code {
                    Some(code) => format!("exit code {}", code),
                    None => "a signal".to_string(),
                };
                write!(
                    f,
                    "`{} {}` terminated with {}",
                    path.display(),
                    args.join(" "),
                    status
                )?;
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SmokeTestError {}

fn inspect<R: Runtime>(runtime: &R, path: &Path) -> anyhow::Result<Option<BinaryFormat>> {
    let mut file = runtime.open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(BinaryFormat::detect(&buffer))
}

/// Run the post-install check for `def` against the binary installed in
/// `bin_dir`. No retry is attempted.
#[tracing::instrument(skip(runtime, def, host))]
pub fn run_smoke_test<R: Runtime>(
    runtime: &R,
    def: &PackageDefinition,
    host: &Host,
    bin_dir: &Path,
) -> anyhow::Result<CommandOutput> {
    let path = bin_dir.join(&def.binary);
    if !runtime.exists(&path) || runtime.is_dir(&path) {
        return Err(SmokeTestError::MissingBinary { path }.into());
    }

    match BinaryFormat::native_for(&host.os) {
        Some(expected) => {
            let found = inspect(runtime, &path)?;
            debug!("{:?} detected as {:?}", path, found);
            if found != Some(expected) {
                return Err(SmokeTestError::NotNativeExecutable {
                    path,
                    expected,
                    found,
                }
                .into());
            }
        }
        None => debug!("No native format known for {}, skipping inspection", host.os),
    }

    info!("Running {} {}", path.display(), def.test_args.join(" "));
    let output = runtime
        .run_command(&path, &def.test_args)
        .map_err(|e| SmokeTestError::Spawn {
            path: path.clone(),
            reason: format!("{:#}", e),
        })?;
    if !output.success() {
        return Err(SmokeTestError::Failed {
            path,
            args: def.test_args.clone(),
            code: output.code,
            stderr: output.stderr,
        }
        .into());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Catalog;
    use crate::platform::{BitWidth, CpuFamily};
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn definition() -> PackageDefinition {
        Catalog::builtin().get("aurl-v2-alpha").unwrap().clone()
    }

    fn other_host() -> Host {
        Host::new(
            HostOs::Other("plan9".to_string()),
            CpuFamily::Intel,
            BitWidth::Bits64,
        )
    }

    fn linux_host() -> Host {
        Host::new(HostOs::Linux, CpuFamily::Intel, BitWidth::Bits64)
    }

    fn present(runtime: &mut MockRuntime, path: &Path) {
        runtime
            .expect_exists()
            .with(eq(path.to_path_buf()))
            .returning(|_| true);
        runtime
            .expect_is_dir()
            .with(eq(path.to_path_buf()))
            .returning(|_| false);
    }

    #[test_log::test]
    fn test_smoke_test_success() {
        let bin_dir = Path::new("/usr/local/bin");
        let binary = bin_dir.join("aurl");
        let mut runtime = MockRuntime::new();
        present(&mut runtime, &binary);

        let expected_path = binary.clone();
        runtime
            .expect_run_command()
            .withf(move |program, args| {
                program == expected_path.as_path() && args == ["--version".to_string()]
            })
            .times(1)
            .returning(|_, _| {
                Ok(CommandOutput {
                    code: Some(0),
                    stdout: "aurl 2.0.0-alpha20251205\n".to_string(),
                    stderr: String::new(),
                })
            });

        let output = run_smoke_test(&runtime, &definition(), &other_host(), bin_dir).unwrap();
        assert!(output.stdout.contains("2.0.0-alpha20251205"));
    }

    #[test]
    fn test_smoke_test_non_zero_exit_is_failure() {
        let bin_dir = Path::new("/usr/local/bin");
        let binary = bin_dir.join("aurl");
        let mut runtime = MockRuntime::new();
        present(&mut runtime, &binary);
        runtime.expect_run_command().times(1).returning(|_, _| {
            Ok(CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "dyld: Library not loaded\n".to_string(),
            })
        });

        let err = run_smoke_test(&runtime, &definition(), &other_host(), bin_dir).unwrap_err();
        let smoke = err.downcast_ref::<SmokeTestError>().unwrap();
        assert!(matches!(smoke, SmokeTestError::Failed { code: Some(1), .. }));
        assert_eq!(
            err.to_string(),
            "`/usr/local/bin/aurl --version` terminated with exit code 1: dyld: Library not loaded"
        );
    }

    #[test]
    fn test_smoke_test_killed_by_signal() {
        let bin_dir = Path::new("/usr/local/bin");
        let mut runtime = MockRuntime::new();
        present(&mut runtime, &bin_dir.join("aurl"));
        runtime
            .expect_run_command()
            .returning(|_, _| Ok(CommandOutput::default()));

        let err = run_smoke_test(&runtime, &definition(), &other_host(), bin_dir).unwrap_err();
        assert!(err.to_string().contains("terminated with a signal"));
    }

    #[test]
    fn test_smoke_test_spawn_failure() {
        let bin_dir = Path::new("/usr/local/bin");
        let mut runtime = MockRuntime::new();
        present(&mut runtime, &bin_dir.join("aurl"));
        runtime
            .expect_run_command()
            .returning(|_, _| Err(anyhow::anyhow!("Permission denied (os error 13)")));

        let err = run_smoke_test(&runtime, &definition(), &other_host(), bin_dir).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SmokeTestError>(),
            Some(&SmokeTestError::Spawn {
                path: bin_dir.join("aurl"),
                reason: "Permission denied (os error 13)".to_string(),
            })
        );
        assert_eq!(
            err.to_string(),
            "Could not run /usr/local/bin/aurl: Permission denied (os error 13)"
        );
    }

    #[test]
    fn test_smoke_test_missing_binary() {
        let bin_dir = Path::new("/usr/local/bin");
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        let err = run_smoke_test(&runtime, &definition(), &other_host(), bin_dir).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SmokeTestError>(),
            Some(&SmokeTestError::MissingBinary {
                path: bin_dir.join("aurl")
            })
        );
    }

    #[test]
    fn test_smoke_test_rejects_script() {
        let bin_dir = Path::new("/usr/local/bin");
        let mut runtime = MockRuntime::new();
        present(&mut runtime, &bin_dir.join("aurl"));
        runtime
            .expect_open()
            .returning(|_| Ok(Box::new(std::io::Cursor::new(b"#!/bin/sh\necho 2.0.0\n".to_vec()))));
        // run_command must not be reached

        let err = run_smoke_test(&runtime, &definition(), &linux_host(), bin_dir).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SmokeTestError>(),
            Some(SmokeTestError::NotNativeExecutable {
                expected: BinaryFormat::Elf,
                found: None,
                ..
            })
        ));
    }

    #[test]
    fn test_detect_current_executable() {
        let exe = std::env::current_exe().unwrap();
        let bytes = std::fs::read(exe).unwrap();
        let format = BinaryFormat::detect(&bytes);

        #[cfg(target_os = "linux")]
        assert_eq!(format, Some(BinaryFormat::Elf));

        #[cfg(target_os = "macos")]
        assert_eq!(format, Some(BinaryFormat::MachO));

        let _ = format;
    }

    #[test]
    fn test_detect_rejects_text() {
        assert_eq!(BinaryFormat::detect(b"not a binary at all"), None);
    }
}

//! Rebuild `Hardware::CPU` conditionals from a flat artifact table.
//!
//! The decision order mirrors the resolver: ARM first, then Intel split by
//! bit width on Linux; every other Mac falls into the Intel build.

use super::writer::RubyWriter;
use crate::definition::{Arch, Os, ReleaseArtifact};

pub(super) const ARM: &str = "Hardware::CPU.arm?";
pub(super) const INTEL: &str = "Hardware::CPU.intel?";
pub(super) const IS_64_BIT: &str = "Hardware::CPU.is_64_bit?";

#[derive(Debug, PartialEq)]
pub(super) enum Branch<'a> {
    Leaf(&'a ReleaseArtifact),
    Cond {
        /// `(condition, body)`; the first is `if`, the rest `elsif`
        clauses: Vec<(String, Branch<'a>)>,
        otherwise: Option<Box<Branch<'a>>>,
    },
}

impl<'a> Branch<'a> {
    fn when(condition: &str, body: Branch<'a>) -> Self {
        Branch::Cond {
            clauses: vec![(condition.to_string(), body)],
            otherwise: None,
        }
    }

    fn if_else(condition: &str, then: Branch<'a>, otherwise: Branch<'a>) -> Self {
        Branch::Cond {
            clauses: vec![(condition.to_string(), then)],
            otherwise: Some(Box::new(otherwise)),
        }
    }
}

/// Build the branch serving `os`, or `None` if no artifact targets it
pub(super) fn for_os(os: Os, artifacts: &[ReleaseArtifact]) -> Option<Branch<'_>> {
    let find = |arch: Option<Arch>| artifacts.iter().find(|a| a.os == os && a.arch == arch);

    // Only macOS serves every CPU from one artifact; a Linux entry always
    // sits behind an ARM or Intel condition.
    if os == Os::MacOs {
        if let Some(any) = find(None) {
            return Some(Branch::Leaf(any));
        }
    }

    let arm = find(Some(Arch::Arm64)).map(Branch::Leaf);
    let x86_64 = find(Some(Arch::X86_64)).map(Branch::Leaf);

    match os {
        Os::MacOs => match (arm, x86_64) {
            (Some(arm), Some(intel)) => Some(Branch::if_else(ARM, arm, intel)),
            (Some(arm), None) => Some(Branch::when(ARM, arm)),
            (None, Some(intel)) => Some(Branch::when(INTEL, intel)),
            (None, None) => None,
        },
        Os::Linux => {
            let i386 = find(Some(Arch::I386)).map(Branch::Leaf);
            let intel = match (x86_64, i386) {
                (Some(wide), Some(narrow)) => Some(Branch::if_else(IS_64_BIT, wide, narrow)),
                (Some(wide), None) => Some(Branch::when(IS_64_BIT, wide)),
                (None, Some(narrow)) => Some(Branch::when(&format!("!{}", IS_64_BIT), narrow)),
                (None, None) => None,
            };

            let mut clauses = Vec::new();
            if let Some(arm) = arm {
                clauses.push((ARM.to_string(), arm));
            }
            if let Some(intel) = intel {
                clauses.push((INTEL.to_string(), intel));
            }
            if clauses.is_empty() {
                None
            } else {
                Some(Branch::Cond {
                    clauses,
                    otherwise: None,
                })
            }
        }
    }
}

/// Write `branch`, emitting each artifact with `leaf`
pub(super) fn write(
    w: &mut RubyWriter,
    branch: &Branch<'_>,
    leaf: &dyn Fn(&mut RubyWriter, &ReleaseArtifact),
) {
    match branch {
        Branch::Leaf(artifact) => leaf(w, artifact),
        Branch::Cond { clauses, otherwise } => {
            for (i, (condition, body)) in clauses.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "elsif" };
                w.line(&format!("{} {}", keyword, condition));
                w.indented(|w| write(w, body, leaf));
            }
            if let Some(otherwise) = otherwise {
                w.line("else");
                w.indented(|w| write(w, otherwise, leaf));
            }
            w.line("end");
        }
    }
}

use super::branch::{self, Branch};
use super::writer::RubyWriter;
use super::{class_name, ruby_str, ruby_url};
use crate::definition::{Checksum, Os, PackageDefinition, ReleaseArtifact};

pub(super) fn render(def: &PackageDefinition) -> String {
    let mut w = RubyWriter::new();
    let header = format!("class {} < Formula", class_name(&def.id));

    w.block(&header, |w| {
        w.line(&format!("desc {}", ruby_str(&def.desc)));
        w.line(&format!("homepage {}", ruby_str(&def.homepage)));
        w.line(&format!("version {}", ruby_str(&def.version.to_string())));
        w.blank();

        let leaf = |w: &mut RubyWriter, artifact: &ReleaseArtifact| {
            w.line(&format!("url {}", ruby_url(&artifact.url, &def.version)));
            if let Checksum::Sha256(hex) = &artifact.checksum {
                w.line(&format!("sha256 {}", ruby_str(hex)));
            }
        };

        if def.linux_only {
            w.line("# This formula is for Linux only. macOS users should use the Cask instead.");
            w.line("depends_on :linux");
            w.blank();
            if let Some(linux) = branch::for_os(Os::Linux, &def.artifacts) {
                branch::write(w, &linux, &leaf);
                w.blank();
            }
        } else {
            for (os, block) in [(Os::MacOs, "on_macos do"), (Os::Linux, "on_linux do")] {
                if let Some(tree) = branch::for_os(os, &def.artifacts) {
                    write_os_block(w, block, &tree, &leaf);
                    w.blank();
                }
            }
        }

        w.block("def install", |w| {
            w.line(&format!("bin.install {}", ruby_str(&def.binary)));
        });
        w.blank();

        let mut command = vec![format!("\"#{{bin}}/{}\"", escape_inner(&def.binary))];
        command.extend(def.test_args.iter().map(|a| ruby_str(a)));
        w.block("test do", |w| {
            w.line(&format!("system {}", command.join(", ")));
        });
    });

    w.finish()
}

fn write_os_block(
    w: &mut RubyWriter,
    header: &str,
    tree: &Branch<'_>,
    leaf: &dyn Fn(&mut RubyWriter, &ReleaseArtifact),
) {
    w.block(header, |w| branch::write(w, tree, leaf));
}

/// Escape a value placed inside an interpolating literal
pub(super) fn escape_inner(s: &str) -> String {
    let quoted = ruby_str(s);
    quoted[1..quoted.len() - 1].to_string()
}

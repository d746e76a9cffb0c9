use super::branch::{self, Branch};
use super::formula::escape_inner;
use super::writer::RubyWriter;
use super::{ruby_str, ruby_url};
use crate::definition::{Arch, Checksum, Os, PackageDefinition, ReleaseArtifact, Version};

const SYSTEM_COMMAND: &str = "system_command ";

pub(super) fn render(def: &PackageDefinition) -> String {
    let mut w = RubyWriter::new();
    let header = format!("cask {} do", ruby_str(&def.id));

    w.block(&header, |w| {
        match &def.version {
            Version::Latest => w.line("version :latest"),
            Version::Literal(v) => w.line(&format!("version {}", ruby_str(v))),
        }

        let leaf = |w: &mut RubyWriter, artifact: &ReleaseArtifact| {
            match &artifact.checksum {
                Checksum::Sha256(hex) => w.line(&format!("sha256 {}", ruby_str(hex))),
                Checksum::NoCheck => w.line("sha256 :no_check"),
            }
            w.blank();
            w.line(&format!("url {}", ruby_url(&artifact.url, &def.version)));
        };

        // Casks switch on CPU with on_arm / on_intel blocks rather than
        // Hardware::CPU conditionals.
        match branch::for_os(Os::MacOs, &def.artifacts) {
            Some(Branch::Leaf(artifact)) => leaf(w, artifact),
            Some(_) => {
                w.blank();
                for (arch, block) in [
                    (Arch::Arm64, "on_arm do"),
                    (Arch::X86_64, "on_intel do"),
                ] {
                    if let Some(artifact) = def
                        .artifacts
                        .iter()
                        .find(|a| a.os == Os::MacOs && a.arch == Some(arch))
                    {
                        w.block(block, |w| leaf(w, artifact));
                    }
                }
                w.blank();
            }
            None => {}
        }

        if let Some(name) = &def.name {
            w.line(&format!("name {}", ruby_str(name)));
        }
        w.line(&format!("desc {}", ruby_str(&def.desc)));
        w.line(&format!("homepage {}", ruby_str(&def.homepage)));
        w.blank();

        w.line(&format!("binary {}", ruby_str(&def.binary)));
        w.blank();

        w.block("postflight do", |w| {
            let program = format!("\"#{{staged_path}}/{}\"", escape_inner(&def.binary));
            let args: Vec<String> = def.test_args.iter().map(|a| ruby_str(a)).collect();
            w.line(&format!("{}{},", SYSTEM_COMMAND, program));
            let pad = " ".repeat(w.column() + SYSTEM_COMMAND.len());
            w.raw(&format!("{}args: [{}]", pad, args.join(", ")));
        });
    });

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Catalog;

    const CASK: &str = r##"cask "aurl@v2-alpha" do
  version :latest
  sha256 :no_check

  url "https://github.com/classmethod/aurl/releases/download/v2.0.0-alpha20251205/aurl_Darwin_x86_64.tar.gz"
  name "aurl (v2 alpha)"
  desc "URL Command Line Tool with Authentication Support (v2 alpha build)"
  homepage "https://github.com/classmethod/aurl"

  binary "aurl"

  postflight do
    system_command "#{staged_path}/aurl",
                   args: ["--version"]
  end
end
"##;

    #[test]
    fn test_render_rolling_cask() {
        let catalog = Catalog::builtin();
        assert_eq!(render(catalog.get("aurl@v2-alpha").unwrap()), CASK);
    }

    #[test]
    fn test_render_per_arch_cask() {
        let mut def = Catalog::builtin().get("aurl@v2-alpha").unwrap().clone();
        def.version = Version::Literal("2.0.0".to_string());
        def.artifacts = vec![
            ReleaseArtifact::new(
                Os::MacOs,
                Some(Arch::X86_64),
                "https://example.com/v2.0.0/aurl_Darwin_x86_64.tar.gz",
                Checksum::sha256("a".repeat(64)),
            ),
            ReleaseArtifact::new(
                Os::MacOs,
                Some(Arch::Arm64),
                "https://example.com/v2.0.0/aurl_Darwin_arm64.tar.gz",
                Checksum::sha256("b".repeat(64)),
            ),
        ];

        let rendered = render(&def);
        assert!(rendered.contains("  version \"2.0.0\"\n\n  on_arm do\n"));
        assert!(rendered.contains(&format!(
            "  on_arm do\n    sha256 \"{}\"\n\n    url \"https://example.com/v#{{version}}/aurl_Darwin_arm64.tar.gz\"\n  end\n",
            "b".repeat(64)
        )));
        assert!(rendered.contains("  on_intel do\n"));
        let arm = rendered.find("on_arm").unwrap();
        let intel = rendered.find("on_intel").unwrap();
        assert!(arm < intel);
    }
}

//! Homebrew DSL rendering
//!
//! Turns a [`PackageDefinition`] back into the Ruby file Homebrew reads.
//! The flat artifact table is rebuilt into the nested `Hardware::CPU`
//! conditionals Homebrew expects (see [`branch`]).

mod branch;
mod cask;
mod formula;
mod writer;

use std::path::PathBuf;

use crate::definition::{DefinitionKind, PackageDefinition, Version};

/// Render the Ruby source for `def`
pub fn render(def: &PackageDefinition) -> String {
    match def.kind {
        DefinitionKind::Cask => cask::render(def),
        DefinitionKind::Formula => formula::render(def),
    }
}

/// Path of the rendered file relative to the tap root
pub fn tap_path(def: &PackageDefinition) -> PathBuf {
    let dir = match def.kind {
        DefinitionKind::Cask => "Casks",
        DefinitionKind::Formula => "Formula",
    };
    PathBuf::from(dir).join(format!("{}.rb", def.id))
}

/// Ruby class name Homebrew derives from a formula name:
/// `aurl-v2-alpha` becomes `AurlV2Alpha`, `foo@2` becomes `FooAT2`.
pub fn class_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut upcase_next = true;

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '_' | '.') || c.is_whitespace() {
            if chars.get(i + 1).is_some_and(|n| n.is_ascii_alphanumeric()) {
                upcase_next = true;
                continue;
            }
            out.push(c);
            continue;
        }
        if c == '@' && i > 0 && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
            out.push_str("AT");
            continue;
        }
        if c == '+' {
            out.push('x');
            continue;
        }
        if upcase_next {
            out.extend(c.to_uppercase());
            upcase_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Quote `s` as a Ruby double-quoted string literal with no interpolation
pub(crate) fn ruby_str(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("#{", "\\#{");
    format!("\"{}\"", escaped)
}

/// Quote a URL, interpolating `#{version}` back in where the literal
/// release tag appears.
pub(crate) fn ruby_url(url: &str, version: &Version) -> String {
    let quoted = ruby_str(url);
    match version.literal() {
        Some(v) => {
            let tag = ruby_str(&format!("/v{}/", v));
            let tag = tag.trim_matches('"');
            quoted.replace(tag, "/v#{version}/")
        }
        None => quoted,
    }
}

// skiff: A Carthage-compatible dependency manager.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

//! Reading and writing `Cartfile` and `Cartfile.resolved`.
//!
//! The format is line oriented:
//!
//! ```text
//! # comment
//! github "ReactiveX/RxSwift" ~> 6.0
//! git "file:///src/Example" "develop"
//! ```

use std::{collections::HashMap, path::Path};

use thiserror::Error;

use crate::{
    identity::{Identity, IdentityError},
    predicate::{PredicateParseError, VersionPredicate},
    specification::Specification,
};

pub const CARTFILE: &str = "Cartfile";
pub const CARTFILE_RESOLVED: &str = "Cartfile.resolved";

#[derive(Debug, Error)]
pub enum CartfileError {
    #[error("line {line}: unknown dependency source `{keyword}`")]
    UnknownSource { line: usize, keyword: String },
    #[error("line {line}: expected a quoted address after `{keyword}`")]
    MissingAddress { line: usize, keyword: String },
    #[error("line {line}: {source}")]
    Identity {
        line: usize,
        #[source]
        source: IdentityError,
    },
    #[error("line {line}: malformed version predicate")]
    Predicate {
        line: usize,
        #[source]
        source: PredicateParseError,
    },
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Settings that influence how addresses become identities.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Use `git@github.com:` remotes instead of https for `github` sources.
    pub use_ssh: bool,
    /// Project name to replacement remote URL.
    pub overrides: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cartfile {
    pub specifications: Vec<Specification>,
}

impl Cartfile {
    pub fn new(specifications: Vec<Specification>) -> Self {
        Cartfile { specifications }
    }

    pub fn parse(source: &str, options: &ParseOptions) -> Result<Self, CartfileError> {
        let mut specifications = vec![];
        for (idx, raw) in source.lines().enumerate() {
            if let Some(spec) = parse_line(raw, idx + 1, options)? {
                specifications.push(spec);
            }
        }
        Ok(Cartfile { specifications })
    }

    pub fn read(path: &Path, options: &ParseOptions) -> Result<Self, CartfileError> {
        let source = std::fs::read_to_string(path).map_err(|source| CartfileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&source, options)
    }

    /// Renders one specification per line, sorted, each ending in a newline.
    pub fn render(&self) -> String {
        let mut lines = self
            .specifications
            .iter()
            .map(|s| format!("{s}\n"))
            .collect::<Vec<_>>();
        lines.sort();
        lines.concat()
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render())
    }
}

/// Drops a trailing `#` comment that is not inside quotes.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_line(
    raw: &str,
    line: usize,
    options: &ParseOptions,
) -> Result<Option<Specification>, CartfileError> {
    let text = strip_comment(raw).trim();
    if text.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    if keyword != "github" && keyword != "git" {
        return Err(CartfileError::UnknownSource {
            line,
            keyword: keyword.to_owned(),
        });
    }

    let missing_address = || CartfileError::MissingAddress {
        line,
        keyword: keyword.to_owned(),
    };
    let rest = rest.trim_start().strip_prefix('"').ok_or_else(missing_address)?;
    let (address, predicate) = rest.split_once('"').ok_or_else(missing_address)?;

    let identity = match keyword {
        "github" => Identity::github(address, options.use_ssh),
        _ => Identity::git(address),
    }
    .map_err(|source| CartfileError::Identity { line, source })?;
    let identity = match options.overrides.get(identity.project_name()) {
        Some(url) => {
            log::info!("Overriding {} with git URL {}", identity.project_name(), url);
            identity.with_override(url.clone())
        }
        None => identity,
    };

    let predicate = predicate
        .parse::<VersionPredicate>()
        .map_err(|source| CartfileError::Predicate { line, source })?;
    Ok(Some(Specification::new(identity, predicate)))
}

#[cfg(test)]
mod test {
    use expect_test::expect;

    use super::*;

    fn parse(s: &str) -> Result<Cartfile, CartfileError> {
        Cartfile::parse(s, &ParseOptions::default())
    }

    #[test]
    fn test_parse_cartfile() {
        let cartfile = parse(
            r#"
# Networking
github "ReactiveX/RxSwift" ~> 6.0
github "schwa/SwiftUtilities" "jwight/swift2"   # tracking a branch

git "file:///Users/example/Project" >= 1.0
github "foo/bar"
"#,
        )
        .unwrap();
        expect![[r#"
            [
                (
                    "ReactiveX/RxSwift",
                    "~> 6.0.0",
                ),
                (
                    "schwa/SwiftUtilities",
                    "\"jwight/swift2\"",
                ),
                (
                    "file:///Users/example/Project",
                    ">= 1.0.0",
                ),
                (
                    "foo/bar",
                    "",
                ),
            ]
        "#]]
        .assert_debug_eq(
            &cartfile
                .specifications
                .iter()
                .map(|s| (s.identity.canonical().to_owned(), s.predicate.to_string()))
                .collect::<Vec<_>>(),
        );
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        expect!["line 2: unknown dependency source `binary`"].assert_eq(
            &parse("github \"a/b\"\nbinary \"https://x/y.json\"")
                .unwrap_err()
                .to_string(),
        );
        expect!["line 1: expected a quoted address after `github`"]
            .assert_eq(&parse("github a/b").unwrap_err().to_string());
        expect!["line 1: malformed github repository `ab`, expected `team/project`"]
            .assert_eq(&parse("github \"ab\"").unwrap_err().to_string());
        expect!["line 3: malformed version predicate"]
            .assert_eq(&parse("\n\ngithub \"a/b\" >= x.y").unwrap_err().to_string());
    }

    #[test]
    fn test_overrides_and_ssh() {
        let options = ParseOptions {
            use_ssh: true,
            overrides: [("bar".to_owned(), "file:///src/bar".to_owned())].into(),
        };
        let cartfile =
            Cartfile::parse("github \"foo/bar\"\ngithub \"foo/baz\"", &options).unwrap();
        let urls = cartfile
            .specifications
            .iter()
            .map(|s| s.identity.remote_url())
            .collect::<Vec<_>>();
        expect![[r#"
            [
                "file:///src/bar",
                "git@github.com:foo/baz.git",
            ]
        "#]]
        .assert_debug_eq(&urls);
        assert_eq!(cartfile.specifications[0].identity.canonical(), "foo/bar");
    }

    #[test]
    fn test_render_is_sorted_with_trailing_newline() {
        let cartfile = parse(
            "github \"z/last\" \"0123abc\"\ngit \"file:///a\" \"fedcba9\"\ngithub \"a/first\" \"deadbeef\"",
        )
        .unwrap();
        expect![[r#"
            git "file:///a" "fedcba9"
            github "a/first" "deadbeef"
            github "z/last" "0123abc"
        "#]]
        .assert_eq(&cartfile.render());
        assert_eq!(parse(&cartfile.render()).unwrap().specifications.len(), 3);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(Cartfile::default().render(), "");
        assert_eq!(parse("# nothing yet\n").unwrap().render(), "");
    }

    #[test]
    fn test_read_and_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CARTFILE_RESOLVED);
        let cartfile = parse("github \"foo/bar\" \"abc\"").unwrap();
        cartfile.write(&path).unwrap();
        let read = Cartfile::read(&path, &ParseOptions::default()).unwrap();
        assert_eq!(read, cartfile);
        assert!(matches!(
            Cartfile::read(&dir.path().join(CARTFILE), &ParseOptions::default()),
            Err(CartfileError::Io { .. })
        ));
    }
}

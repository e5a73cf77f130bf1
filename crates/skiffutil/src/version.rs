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

//! Semantic versions as they appear in git tags and Cartfile predicates.
//!
//! Tags in the wild are looser than semver proper: a leading `v` is allowed
//! and the minor and patch components may be omitted (`v2`, `1.4`). Missing
//! components are zero, so `1` and `1.0.0` are the same version. Build
//! metadata is dropped. Precedence is that of [`semver::Version`].

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use thiserror::Error;

static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?([0-9]+)(?:\.([0-9]+)(?:\.([0-9]+))?)?(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("valid semantic version regex")
});

#[derive(Debug, Error)]
pub enum VersionParseError {
    #[error("\"{0}\" is not a semantic version")]
    Malformed(String),
    #[error("version component in \"{0}\" is out of range")]
    Overflow(String),
    #[error("invalid pre-release in \"{version}\"")]
    Prerelease {
        version: String,
        #[source]
        source: semver::Error,
    },
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticVersion(Version);

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion(Version::new(major, minor, patch))
    }

    pub fn parse(s: &str) -> Result<Self, VersionParseError> {
        let caps = SEMVER_RE
            .captures(s.trim())
            .ok_or_else(|| VersionParseError::Malformed(s.to_owned()))?;
        let component = |idx: usize| -> Result<u64, VersionParseError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| VersionParseError::Overflow(s.to_owned())),
                None => Ok(0),
            }
        };
        let pre = match caps.get(4) {
            Some(m) => {
                Prerelease::new(m.as_str()).map_err(|source| VersionParseError::Prerelease {
                    version: s.to_owned(),
                    source,
                })?
            }
            None => Prerelease::EMPTY,
        };
        Ok(SemanticVersion(Version {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            pre,
            build: BuildMetadata::EMPTY,
        }))
    }

    /// Whether `s` is a version. Used to filter git tags.
    pub fn is_semantic(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// `(major + 1).0.0`, or `None` when the major component is at its limit.
    pub fn next_major(&self) -> Option<Self> {
        let major = self.0.major.checked_add(1)?;
        Some(SemanticVersion::new(major, 0, 0))
    }

    /// `major.(minor + 1).0`, or `None` when the minor component is at its
    /// limit.
    pub fn next_minor(&self) -> Option<Self> {
        let minor = self.0.minor.checked_add(1)?;
        Some(SemanticVersion::new(self.0.major, minor, 0))
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticVersion::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

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

//! Version constraints attached to a declared dependency.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::version::{SemanticVersion, VersionParseError};

/// Where the exclusive upper end of a `~>` range lies.
///
/// With [`CompatibleUpperBound::NextMajor`] `~> 1.2` accepts `1.2 <= v < 2.0`;
/// with [`CompatibleUpperBound::NextMinor`] it accepts `1.2 <= v < 1.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatibleUpperBound {
    #[default]
    NextMajor,
    NextMinor,
}

impl CompatibleUpperBound {
    /// The exclusive upper end for `~> base`. `None` means unbounded, which
    /// only happens when the major component is at its limit.
    pub fn upper(self, base: &SemanticVersion) -> Option<SemanticVersion> {
        match self {
            CompatibleUpperBound::NextMajor => base.next_major(),
            CompatibleUpperBound::NextMinor => base.next_minor().or_else(|| base.next_major()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionPredicate {
    /// No constraint; every tag qualifies.
    Any,
    /// A literal branch, tag or commit name.
    Commitish(String),
    Equals(SemanticVersion),
    GreaterOrEqual(SemanticVersion),
    CompatibleWith(SemanticVersion),
}

#[derive(Debug, Error)]
pub enum PredicateParseError {
    #[error("unknown version operator `{0}`")]
    UnknownOperator(String),
    #[error("missing version after `{0}`")]
    MissingVersion(String),
    #[error("unterminated quote in `{0}`")]
    UnterminatedQuote(String),
    #[error(transparent)]
    Version(#[from] VersionParseError),
}

impl VersionPredicate {
    pub fn test(&self, version: &SemanticVersion) -> bool {
        self.test_with(version, CompatibleUpperBound::default())
    }

    pub fn test_with(&self, version: &SemanticVersion, bound: CompatibleUpperBound) -> bool {
        match self {
            VersionPredicate::Any => true,
            VersionPredicate::Commitish(_) => false,
            VersionPredicate::Equals(v) => version == v,
            VersionPredicate::GreaterOrEqual(v) => version >= v,
            VersionPredicate::CompatibleWith(v) => {
                v <= version && bound.upper(v).is_none_or(|upper| *version < upper)
            }
        }
    }
}

impl FromStr for VersionPredicate {
    type Err = PredicateParseError;

    /// Parses the predicate part of a Cartfile line, e.g. `~> 1.0` or `"master"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(VersionPredicate::Any);
        }
        if let Some(rest) = s.strip_prefix('"') {
            let literal = rest
                .strip_suffix('"')
                .filter(|lit| !lit.is_empty() && !lit.contains('"'))
                .ok_or_else(|| PredicateParseError::UnterminatedQuote(s.to_owned()))?;
            return Ok(VersionPredicate::Commitish(literal.to_owned()));
        }

        let (op, operand) = s.split_at(s.find(|c: char| c.is_whitespace()).unwrap_or(s.len()));
        let operand = operand.trim();
        let operand = operand
            .strip_prefix('"')
            .and_then(|o| o.strip_suffix('"'))
            .unwrap_or(operand);
        let make: fn(SemanticVersion) -> VersionPredicate = match op {
            "==" => VersionPredicate::Equals,
            ">=" => VersionPredicate::GreaterOrEqual,
            "~>" => VersionPredicate::CompatibleWith,
            // Carthage also accepts a bare, unquoted ref name.
            _ if operand.is_empty() && !op.starts_with(['=', '>', '<', '~']) => {
                return Ok(VersionPredicate::Commitish(op.to_owned()));
            }
            _ => return Err(PredicateParseError::UnknownOperator(op.to_owned())),
        };
        if operand.is_empty() {
            return Err(PredicateParseError::MissingVersion(op.to_owned()));
        }
        Ok(make(SemanticVersion::parse(operand)?))
    }
}

impl fmt::Display for VersionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPredicate::Any => Ok(()),
            VersionPredicate::Commitish(r) => write!(f, "\"{r}\""),
            VersionPredicate::Equals(v) => write!(f, "== {v}"),
            VersionPredicate::GreaterOrEqual(v) => write!(f, ">= {v}"),
            VersionPredicate::CompatibleWith(v) => write!(f, "~> {v}"),
        }
    }
}

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

use std::fmt;

use crate::{identity::Identity, predicate::VersionPredicate};

/// One declared dependency line of a Cartfile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specification {
    pub identity: Identity,
    pub predicate: VersionPredicate,
}

impl Specification {
    pub fn new(identity: Identity, predicate: VersionPredicate) -> Self {
        Specification {
            identity,
            predicate,
        }
    }

    /// A specification pinned to a literal commit-ish, as written to
    /// `Cartfile.resolved`.
    pub fn pinned(identity: Identity, commitish: impl Into<String>) -> Self {
        Specification::new(identity, VersionPredicate::Commitish(commitish.into()))
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity.cartfile_address())?;
        if self.predicate != VersionPredicate::Any {
            write!(f, " {}", self.predicate)?;
        }
        Ok(())
    }
}

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

//! The seam between the resolver and whatever knows about repositories.

#[cfg(test)]
pub mod mock;

use std::fmt;

use skiffutil::{
    cartfile::CartfileError, identity::Identity, revision::Revision,
    revision::RevisionHistory, specification::Specification,
};
use thiserror::Error;

/// A vertex of the resolution graph.
///
/// A node without a revision is the project being resolved.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub identity: Identity,
    pub revision: Option<Revision>,
}

impl Node {
    pub fn new(identity: Identity, revision: Revision) -> Self {
        Node {
            identity,
            revision: Some(revision),
        }
    }

    pub fn root(identity: Identity) -> Self {
        Node {
            identity,
            revision: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.revision.is_none()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(revision) => write!(f, "{}@{}", self.identity, revision),
            None => write!(f, "{}", self.identity),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A declared dependency together with every revision that satisfies it.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub specification: Specification,
    /// Ascending. Empty when nothing satisfies the predicate.
    pub candidates: Vec<Revision>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("repository {0} has not been fetched")]
    RepositoryMissing(Identity),
    #[error("no such revision \"{revision}\" in {identity}; did you fetch the latest data?")]
    NoSuchRevision { identity: Identity, revision: String },
    #[error("failed to read the Cartfile of {node}")]
    Manifest {
        node: Box<Node>,
        #[source]
        source: CartfileError,
    },
    #[error("git operation on {identity} failed")]
    Git {
        identity: Identity,
        #[source]
        source: anyhow::Error,
    },
}

/// Everything the resolver needs to know about repositories.
///
/// Implementations are expected to memoize: within one resolution the same
/// question must get the same answer.
pub trait DependencyProvider: RevisionHistory<Error = ProviderError> {
    /// The dependencies declared by `node`.
    ///
    /// For the root this is the project's own Cartfile; for other nodes it is
    /// the Cartfile committed at the node's revision, where a missing file
    /// means no dependencies. A commit-ish predicate yields exactly one
    /// candidate wrapping the literal ref.
    fn dependencies(&mut self, node: &Node) -> Result<Vec<Dependency>, ProviderError>;
}

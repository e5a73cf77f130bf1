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

//! A mock provider for testing purposes; currently only available in tests

use std::collections::HashMap;

use skiffutil::{
    identity::Identity,
    predicate::{CompatibleUpperBound, VersionPredicate},
    revision::{Revision, RevisionHistory},
    specification::Specification,
};

use super::{Dependency, DependencyProvider, Node, ProviderError};

#[derive(Default)]
struct MockRepository {
    /// Tag names in insertion order.
    tags: Vec<String>,
    /// Token to (commit index, declared dependencies).
    revisions: HashMap<String, (usize, Vec<Specification>)>,
}

/// An in-memory set of repositories.
///
/// Every repository has a linear history: a revision with a smaller commit
/// index is an ancestor of one with a larger index. Names are short project
/// names, `"A"` stands for `github "t/A"`.
pub struct MockProvider {
    root: Identity,
    root_dependencies: Vec<Specification>,
    repositories: HashMap<Identity, MockRepository>,
    bound: CompatibleUpperBound,
    calls: HashMap<Node, usize>,
}

pub fn id(name: &str) -> Identity {
    Identity::github(&format!("t/{name}"), false).unwrap()
}

fn specs(deps: &[(&str, &str)]) -> Vec<Specification> {
    deps.iter()
        .map(|(name, predicate)| Specification::new(id(name), predicate.parse().unwrap()))
        .collect()
}

impl MockProvider {
    pub fn new() -> Self {
        MockProvider {
            root: Identity::root("root"),
            root_dependencies: vec![],
            repositories: HashMap::new(),
            bound: CompatibleUpperBound::default(),
            calls: HashMap::new(),
        }
    }

    pub fn root(&self) -> Identity {
        self.root.clone()
    }

    pub fn with_bound(mut self, bound: CompatibleUpperBound) -> Self {
        self.bound = bound;
        self
    }

    /// Declares the root's dependencies as `(name, predicate)` pairs.
    pub fn root_deps(&mut self, deps: &[(&str, &str)]) -> &mut Self {
        self.root_dependencies = specs(deps);
        self
    }

    /// Adds a tag whose commit comes after every revision already in the
    /// repository.
    pub fn add_tag(&mut self, name: &str, tag: &str, deps: &[(&str, &str)]) -> &mut Self {
        let repo = self.repositories.entry(id(name)).or_default();
        let index = repo.revisions.len();
        repo.tags.push(tag.to_owned());
        repo.revisions.insert(tag.to_owned(), (index, specs(deps)));
        self
    }

    /// Adds a branch or commit hash pointing at an explicit commit index.
    pub fn add_commit(
        &mut self,
        name: &str,
        token: &str,
        index: usize,
        deps: &[(&str, &str)],
    ) -> &mut Self {
        let repo = self.repositories.entry(id(name)).or_default();
        repo.revisions.insert(token.to_owned(), (index, specs(deps)));
        self
    }

    /// How many times the dependencies of `name` at `token` were requested.
    pub fn calls(&self, name: &str, token: &str) -> usize {
        let node = Node::new(id(name), Revision::tag(id(name), token));
        let commitish = Node::new(id(name), Revision::commitish(id(name), token));
        self.calls.get(&node).copied().unwrap_or(0)
            + self.calls.get(&commitish).copied().unwrap_or(0)
    }

    pub fn max_calls(&self) -> usize {
        self.calls.values().copied().max().unwrap_or(0)
    }

    fn repository(&self, identity: &Identity) -> Result<&MockRepository, ProviderError> {
        self.repositories
            .get(identity)
            .ok_or_else(|| ProviderError::RepositoryMissing(identity.clone()))
    }

    fn commit_index(&self, revision: &Revision) -> Result<usize, ProviderError> {
        self.repository(revision.identity())?
            .revisions
            .get(revision.token())
            .map(|(index, _)| *index)
            .ok_or_else(|| ProviderError::NoSuchRevision {
                identity: revision.identity().clone(),
                revision: revision.token().to_owned(),
            })
    }

    fn candidates(&self, spec: &Specification) -> Result<Vec<Revision>, ProviderError> {
        if let VersionPredicate::Commitish(token) = &spec.predicate {
            return Ok(vec![Revision::commitish(spec.identity.clone(), token)]);
        }
        let repo = self.repository(&spec.identity)?;
        let mut tags = repo
            .tags
            .iter()
            .map(|tag| Revision::tag(spec.identity.clone(), tag))
            .filter(|r| {
                r.semantic_version()
                    .is_some_and(|v| spec.predicate.test_with(v, self.bound))
            })
            .collect::<Vec<_>>();
        tags.sort_by(|a, b| a.semantic_version().cmp(&b.semantic_version()));
        Ok(tags)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionHistory for MockProvider {
    type Error = ProviderError;

    fn commit_of(&mut self, revision: &Revision) -> Result<String, ProviderError> {
        Ok(format!("c{}", self.commit_index(revision)?))
    }

    fn is_ancestor(
        &mut self,
        ancestor: &Revision,
        descendant: &Revision,
    ) -> Result<bool, ProviderError> {
        Ok(self.commit_index(ancestor)? <= self.commit_index(descendant)?)
    }
}

impl DependencyProvider for MockProvider {
    fn dependencies(&mut self, node: &Node) -> Result<Vec<Dependency>, ProviderError> {
        *self.calls.entry(node.clone()).or_default() += 1;
        let declared = match &node.revision {
            None => self.root_dependencies.clone(),
            Some(revision) => {
                self.commit_index(revision)?;
                self.repository(&node.identity)?.revisions[revision.token()]
                    .1
                    .clone()
            }
        };
        declared
            .into_iter()
            .map(|specification| {
                let candidates = self.candidates(&specification)?;
                Ok(Dependency {
                    specification,
                    candidates,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use expect_test::expect;

    use super::*;

    #[test]
    fn test_mock_provider_candidates() {
        let mut provider = MockProvider::new();
        provider
            .root_deps(&[("A", "~> 1.0"), ("B", "\"develop\"")])
            .add_tag("A", "2.0", &[])
            .add_tag("A", "1.0", &[])
            .add_tag("A", "1.4", &[])
            .add_tag("A", "nightly", &[])
            .add_commit("B", "develop", 3, &[]);
        let deps = provider.dependencies(&Node::root(provider.root())).unwrap();
        expect![[r#"
            [
                [
                    t/A@1.0,
                    t/A@1.4,
                ],
                [
                    t/B@"develop",
                ],
            ]
        "#]]
        .assert_debug_eq(&deps.iter().map(|d| &d.candidates).collect::<Vec<_>>());
        assert_eq!(provider.max_calls(), 1);
    }

    #[test]
    fn test_mock_provider_history() {
        let mut provider = MockProvider::new();
        provider
            .add_tag("A", "1.0", &[])
            .add_commit("A", "main", 0, &[])
            .add_commit("A", "feature", 5, &[]);
        let tag = Revision::tag(id("A"), "1.0");
        let main = Revision::commitish(id("A"), "main");
        let feature = Revision::commitish(id("A"), "feature");
        assert_eq!(provider.commit_of(&tag).unwrap(), provider.commit_of(&main).unwrap());
        assert!(provider.is_ancestor(&tag, &feature).unwrap());
        assert!(!provider.is_ancestor(&feature, &main).unwrap());
        assert!(matches!(
            provider.commit_of(&Revision::commitish(id("A"), "gone")),
            Err(ProviderError::NoSuchRevision { .. })
        ));
        assert!(matches!(
            provider.commit_of(&Revision::commitish(id("Z"), "main")),
            Err(ProviderError::RepositoryMissing(_))
        ));
    }
}

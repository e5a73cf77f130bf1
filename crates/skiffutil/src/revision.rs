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

//! Concrete, resolvable points in a repository's history.

use std::{cmp::Ordering, fmt};

use crate::{identity::Identity, version::SemanticVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RevisionKind {
    Tag,
    /// A branch name or commit hash taken literally from a Cartfile.
    Commitish,
}

/// Answers questions about commits that cannot be decided from revision
/// names alone. Implementations usually shell out to git and may block.
pub trait RevisionHistory {
    type Error;

    /// The full commit hash a revision points to.
    fn commit_of(&mut self, revision: &Revision) -> Result<String, Self::Error>;

    /// Whether `ancestor` is reachable from `descendant`.
    fn is_ancestor(
        &mut self,
        ancestor: &Revision,
        descendant: &Revision,
    ) -> Result<bool, Self::Error>;
}

/// A tag or commit-ish in the repository of [`Revision::identity`].
///
/// `Eq` and `Hash` are structural so revisions can key graph nodes. Use
/// [`Revision::compare`] for the resolution ordering, which understands
/// semantic versions and git ancestry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Revision {
    identity: Identity,
    token: String,
    kind: RevisionKind,
    semantic_version: Option<SemanticVersion>,
}

impl Revision {
    /// A git tag. Tags that do not parse as versions carry no semantic version.
    pub fn tag(identity: Identity, token: impl Into<String>) -> Self {
        let token = token.into();
        let semantic_version = SemanticVersion::parse(&token).ok();
        Revision {
            identity,
            token,
            kind: RevisionKind::Tag,
            semantic_version,
        }
    }

    pub fn commitish(identity: Identity, token: impl Into<String>) -> Self {
        Revision {
            identity,
            token: token.into(),
            kind: RevisionKind::Commitish,
            semantic_version: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn kind(&self) -> RevisionKind {
        self.kind
    }

    pub fn semantic_version(&self) -> Option<&SemanticVersion> {
        self.semantic_version.as_ref()
    }

    /// Orders two revisions of the same repository.
    ///
    /// Semantic versions are compared when both sides have one. Otherwise the
    /// revisions are equal if they point to the same commit, and `self` is
    /// greater if `other` is one of its ancestors.
    pub fn compare<H>(&self, other: &Revision, history: &mut H) -> Result<Ordering, H::Error>
    where
        H: RevisionHistory + ?Sized,
    {
        if let (Some(a), Some(b)) = (&self.semantic_version, &other.semantic_version) {
            return Ok(a.cmp(b));
        }
        if self.token == other.token {
            return Ok(Ordering::Equal);
        }
        if history.commit_of(self)? == history.commit_of(other)? {
            return Ok(Ordering::Equal);
        }
        // Divergent histories also land on `Less`; neither is "newer".
        if history.is_ancestor(other, self)? {
            Ok(Ordering::Greater)
        } else {
            Ok(Ordering::Less)
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RevisionKind::Tag => write!(f, "{}@{}", self.identity, self.token),
            RevisionKind::Commitish => write!(f, "{}@\"{}\"", self.identity, self.token),
        }
    }
}

/// Sorts revisions ascending with a fallible comparison.
///
/// Ancestry is not a total order, so this uses a stable insertion sort that
/// tolerates inconsistent answers instead of `slice::sort_by`.
pub fn sort_revisions<H>(revisions: &mut [Revision], history: &mut H) -> Result<(), H::Error>
where
    H: RevisionHistory + ?Sized,
{
    for i in 1..revisions.len() {
        let mut j = i;
        while j > 0 && revisions[j - 1].compare(&revisions[j], history)? == Ordering::Greater {
            revisions.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(())
}

/// The greatest revision, keeping the first one among equals.
pub fn max_revision<'a, H>(
    revisions: impl IntoIterator<Item = &'a Revision>,
    history: &mut H,
) -> Result<Option<&'a Revision>, H::Error>
where
    H: RevisionHistory + ?Sized,
{
    let mut best: Option<&Revision> = None;
    for revision in revisions {
        best = match best {
            Some(b) if revision.compare(b, history)? != Ordering::Greater => Some(b),
            _ => Some(revision),
        };
    }
    Ok(best)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use expect_test::expect;

    use super::*;

    /// A linear history `c0 <- c1 <- c2 ...` where each name maps to a commit index.
    struct LinearHistory {
        commits: HashMap<String, usize>,
        queries: usize,
    }

    impl LinearHistory {
        fn new(names: &[(&str, usize)]) -> Self {
            LinearHistory {
                commits: names.iter().map(|(n, c)| (n.to_string(), *c)).collect(),
                queries: 0,
            }
        }
    }

    impl RevisionHistory for LinearHistory {
        type Error = String;

        fn commit_of(&mut self, revision: &Revision) -> Result<String, String> {
            self.queries += 1;
            self.commits
                .get(revision.token())
                .map(|c| format!("c{c}"))
                .ok_or_else(|| format!("no such revision {}", revision.token()))
        }

        fn is_ancestor(&mut self, ancestor: &Revision, descendant: &Revision) -> Result<bool, String> {
            self.queries += 1;
            Ok(self.commits[ancestor.token()] <= self.commits[descendant.token()])
        }
    }

    fn repo() -> Identity {
        Identity::github("schwa/SwiftUtilities", false).unwrap()
    }

    #[test]
    fn test_tag_semantic_version() {
        let tag = Revision::tag(repo(), "v1.2");
        assert_eq!(tag.kind(), RevisionKind::Tag);
        assert_eq!(tag.semantic_version(), Some(&SemanticVersion::new(1, 2, 0)));
        assert!(Revision::tag(repo(), "nightly").semantic_version().is_none());
        let pin = Revision::commitish(repo(), "1.0");
        assert!(pin.semantic_version().is_none());
        expect![[r#"schwa/SwiftUtilities@"1.0""#]].assert_eq(&format!("{pin:?}"));
    }

    #[test]
    fn test_semantic_comparison_needs_no_history() {
        let mut history = LinearHistory::new(&[]);
        let a = Revision::tag(repo(), "1.0.0");
        let b = Revision::tag(repo(), "v1.1");
        assert_eq!(a.compare(&b, &mut history), Ok(Ordering::Less));
        assert_eq!(
            Revision::tag(repo(), "v1").compare(&a, &mut history),
            Ok(Ordering::Equal)
        );
        assert_eq!(history.queries, 0);
    }

    #[test]
    fn test_ancestry_fallback() {
        let mut history = LinearHistory::new(&[("1.0", 0), ("develop", 3), ("abc123", 3)]);
        let tag = Revision::tag(repo(), "1.0");
        let branch = Revision::commitish(repo(), "develop");
        let hash = Revision::commitish(repo(), "abc123");
        assert_eq!(branch.compare(&tag, &mut history), Ok(Ordering::Greater));
        assert_eq!(tag.compare(&branch, &mut history), Ok(Ordering::Less));
        assert_eq!(branch.compare(&hash, &mut history), Ok(Ordering::Equal));
        let unknown = Revision::commitish(repo(), "gone");
        assert!(unknown.compare(&tag, &mut history).is_err());
    }

    #[test]
    fn test_sort_and_max() {
        let mut history = LinearHistory::new(&[("feature", 5)]);
        let mut revisions = vec![
            Revision::tag(repo(), "2.0"),
            Revision::tag(repo(), "1.0"),
            Revision::tag(repo(), "1.5-beta"),
            Revision::tag(repo(), "1.5"),
        ];
        sort_revisions(&mut revisions, &mut history).unwrap();
        expect!["1.0 1.5-beta 1.5 2.0"].assert_eq(
            &revisions
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        );
        let max = max_revision(&revisions, &mut history).unwrap().unwrap();
        assert_eq!(max.token(), "2.0");
        assert_eq!(max_revision([], &mut history), Ok(None));
    }
}

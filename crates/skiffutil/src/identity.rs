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

//! Identities of dependency sources.

use std::{cmp::Ordering, fmt, hash::Hash, path::Path};

use thiserror::Error;

/// How a dependency's address was written in the Cartfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// `github "team/project"`
    GitHub,
    /// `git "<url>"`
    Git,
    /// The project being resolved. Never written in a Cartfile.
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("malformed github repository `{0}`, expected `team/project`")]
    MalformedGitHub(String),
    #[error("git source url is empty")]
    EmptyUrl,
}

/// Canonical reference to a dependency's source repository.
///
/// Equality, hashing and ordering only look at [`Identity::canonical`], so
/// the same repository spelled differently in two manifests (for instance
/// once over ssh and once overridden to a local path) is one dependency.
#[derive(Clone)]
pub struct Identity {
    source: SourceKind,
    team_name: Option<String>,
    project_name: String,
    remote_url: String,
    canonical: String,
}

impl Identity {
    pub fn github(link: &str, use_ssh: bool) -> Result<Self, IdentityError> {
        let (team, project) = link
            .split_once('/')
            .filter(|(t, p)| !t.is_empty() && !p.is_empty() && !p.contains('/'))
            .ok_or_else(|| IdentityError::MalformedGitHub(link.to_owned()))?;
        let remote_url = if use_ssh {
            format!("git@github.com:{team}/{project}.git")
        } else {
            format!("https://github.com/{team}/{project}.git")
        };
        Ok(Identity {
            source: SourceKind::GitHub,
            team_name: Some(team.to_owned()),
            project_name: project.to_owned(),
            remote_url,
            canonical: format!("{team}/{project}"),
        })
    }

    pub fn git(url: &str) -> Result<Self, IdentityError> {
        if url.is_empty() {
            return Err(IdentityError::EmptyUrl);
        }
        Ok(Identity {
            source: SourceKind::Git,
            team_name: None,
            project_name: project_name_of_url(url),
            remote_url: url.to_owned(),
            canonical: url.to_owned(),
        })
    }

    /// The identity of the project whose Cartfile is being resolved.
    pub fn root(project_name: impl Into<String>) -> Self {
        let project_name = project_name.into();
        Identity {
            source: SourceKind::Root,
            team_name: None,
            remote_url: String::new(),
            canonical: project_name.clone(),
            project_name,
        }
    }

    /// Returns the same identity fetched from another location.
    pub fn with_override(mut self, remote_url: impl Into<String>) -> Self {
        self.remote_url = remote_url.into();
        self
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn team_name(&self) -> Option<&str> {
        self.team_name.as_deref()
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn is_root(&self) -> bool {
        self.source == SourceKind::Root
    }

    /// Whether this identity is selected by a list of project names. An
    /// empty filter selects everything.
    pub fn matches<S: AsRef<str>>(&self, name_filter: &[S]) -> bool {
        name_filter.is_empty()
            || name_filter
                .iter()
                .any(|name| name.as_ref() == self.project_name)
    }

    /// The address as it appears in a Cartfile, e.g. `github "team/project"`.
    pub fn cartfile_address(&self) -> String {
        match self.source {
            SourceKind::GitHub => format!("github \"{}\"", self.canonical),
            SourceKind::Git | SourceKind::Root => format!("git \"{}\"", self.canonical),
        }
    }
}

/// `file:///src/Example-Project` and `git@host:team/Example-Project.git` both
/// name `Example-Project`.
fn project_name_of_url(url: &str) -> String {
    let path = url.rsplit_once(':').map_or(url, |(_, rest)| rest);
    Path::new(path.trim_end_matches('/'))
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| url.to_owned())
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl Ord for Identity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl PartialOrd for Identity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

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

//! A [`DependencyProvider`] backed by local clones, driven through the `git`
//! command line tool.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, bail};
use skiffutil::{
    cartfile::{CARTFILE, Cartfile, ParseOptions},
    identity::Identity,
    predicate::{CompatibleUpperBound, VersionPredicate},
    revision::{Revision, RevisionHistory},
    specification::Specification,
    version::SemanticVersion,
};

use crate::provider::{Dependency, DependencyProvider, Node, ProviderError};

fn git_in(path: &Path) -> Command {
    let mut command = Command::new("git");
    command.arg("-C").arg(path);
    command
}

fn run(command: &mut Command) -> anyhow::Result<()> {
    let output = command
        .output()
        .with_context(|| format!("failed to spawn {:?}", command))?;
    if !output.status.success() {
        bail!(
            "Command {:?} failed with status: {}\nstderr: {}",
            command,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

fn run_stdout(command: &mut Command) -> anyhow::Result<String> {
    let output = command
        .output()
        .with_context(|| format!("failed to spawn {:?}", command))?;
    if !output.status.success() {
        bail!(
            "Command {:?} failed with status: {}\nstderr: {}",
            command,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8(output.stdout)
        .with_context(|| format!("failed to parse stdout of command {:?}", command))
}

pub struct GitProvider {
    root: Identity,
    root_path: PathBuf,
    cache_dir: PathBuf,
    fetch: bool,
    options: ParseOptions,
    bound: CompatibleUpperBound,

    fetched: HashSet<Identity>,
    specifications: HashMap<Node, Vec<Specification>>,
    tags: HashMap<Identity, Vec<Revision>>,
    commits: HashMap<Revision, String>,
}

impl GitProvider {
    /// `root_path` holds the project's own `Cartfile`; dependencies are
    /// cloned into `cache_dir`, one directory per project name.
    pub fn new(
        root: Identity,
        root_path: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        options: ParseOptions,
        bound: CompatibleUpperBound,
    ) -> Self {
        GitProvider {
            root,
            root_path: root_path.into(),
            cache_dir: cache_dir.into(),
            fetch: true,
            options,
            bound,
            fetched: HashSet::new(),
            specifications: HashMap::new(),
            tags: HashMap::new(),
            commits: HashMap::new(),
        }
    }

    /// Whether repositories are cloned and fetched. When disabled, only
    /// existing clones are used.
    pub fn with_fetch(mut self, fetch: bool) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn root(&self) -> &Identity {
        &self.root
    }

    pub fn repository_path(&self, identity: &Identity) -> PathBuf {
        if identity.is_root() {
            self.root_path.clone()
        } else {
            self.cache_dir.join(identity.project_name())
        }
    }

    /// Makes sure a clone of `identity` exists, updating it once per run.
    fn repository(&mut self, identity: &Identity) -> Result<PathBuf, ProviderError> {
        let path = self.repository_path(identity);
        if identity.is_root() || self.fetched.contains(identity) {
            return Ok(path);
        }

        let git_error = |source| ProviderError::Git {
            identity: identity.clone(),
            source,
        };
        if !self.fetch {
            if !path.exists() {
                return Err(ProviderError::RepositoryMissing(identity.clone()));
            }
        } else if path.exists() {
            log::info!("Fetching {}", identity);
            run(git_in(&path).args(["fetch", "--tags", "--quiet"])).map_err(git_error)?;
        } else {
            log::info!("Cloning {} from {}", identity, identity.remote_url());
            std::fs::create_dir_all(&self.cache_dir)
                .with_context(|| format!("failed to create {}", self.cache_dir.display()))
                .map_err(git_error)?;
            run(Command::new("git")
                .args(["clone", "--recursive", "--quiet"])
                .arg(identity.remote_url())
                .arg(&path))
            .map_err(git_error)?;
        }
        self.fetched.insert(identity.clone());
        Ok(path)
    }

    /// The semantic version tags of `identity`, ascending.
    pub fn tags(&mut self, identity: &Identity) -> Result<Vec<Revision>, ProviderError> {
        if let Some(tags) = self.tags.get(identity) {
            return Ok(tags.clone());
        }
        let path = self.repository(identity)?;
        let output = run_stdout(git_in(&path).arg("tag")).map_err(|source| ProviderError::Git {
            identity: identity.clone(),
            source,
        })?;
        let mut tags = vec![];
        for tag in output.lines().map(str::trim).filter(|t| !t.is_empty()) {
            if SemanticVersion::is_semantic(tag) {
                tags.push(Revision::tag(identity.clone(), tag));
            } else {
                log::debug!("Skipping non-semantic tag {} of {}", tag, identity);
            }
        }
        tags.sort_by(|a, b| a.semantic_version().cmp(&b.semantic_version()));
        self.tags.insert(identity.clone(), tags.clone());
        Ok(tags)
    }

    fn specifications(&mut self, node: &Node) -> Result<Vec<Specification>, ProviderError> {
        if let Some(specs) = self.specifications.get(node) {
            return Ok(specs.clone());
        }
        let manifest_error = |source| ProviderError::Manifest {
            node: Box::new(node.clone()),
            source,
        };

        let cartfile = match &node.revision {
            None => Cartfile::read(&self.root_path.join(CARTFILE), &self.options)
                .map_err(manifest_error)?,
            Some(revision) => {
                let path = self.repository(&node.identity)?;
                let commit = self.commit_of(revision)?;
                let output = git_in(&path)
                    .arg("show")
                    .arg(format!("{commit}:{CARTFILE}"))
                    .output()
                    .map_err(|e| ProviderError::Git {
                        identity: node.identity.clone(),
                        source: e.into(),
                    })?;
                if output.status.success() {
                    let text = String::from_utf8_lossy(&output.stdout);
                    Cartfile::parse(&text, &self.options).map_err(manifest_error)?
                } else {
                    log::debug!("{} has no {}", node, CARTFILE);
                    Cartfile::default()
                }
            }
        };
        self.specifications
            .insert(node.clone(), cartfile.specifications.clone());
        Ok(cartfile.specifications)
    }

    fn candidates(&mut self, spec: &Specification) -> Result<Vec<Revision>, ProviderError> {
        if let VersionPredicate::Commitish(token) = &spec.predicate {
            return Ok(vec![Revision::commitish(spec.identity.clone(), token)]);
        }
        let bound = self.bound;
        Ok(self
            .tags(&spec.identity)?
            .into_iter()
            .filter(|tag| {
                tag.semantic_version()
                    .is_some_and(|v| spec.predicate.test_with(v, bound))
            })
            .collect())
    }

    fn rev_parse(path: &Path, name: &str) -> Option<String> {
        run_stdout(
            git_in(path)
                .args(["rev-parse", "--verify", "--quiet"])
                .arg(format!("{name}^{{commit}}")),
        )
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
    }
}

impl RevisionHistory for GitProvider {
    type Error = ProviderError;

    fn commit_of(&mut self, revision: &Revision) -> Result<String, ProviderError> {
        if let Some(commit) = self.commits.get(revision) {
            return Ok(commit.clone());
        }
        let path = self.repository(revision.identity())?;
        // Fetching only moves remote tracking refs, so a branch is looked up
        // there before any local ref of the same name.
        let commit = Self::rev_parse(&path, &format!("origin/{}", revision.token()))
            .or_else(|| Self::rev_parse(&path, revision.token()))
            .ok_or_else(|| ProviderError::NoSuchRevision {
                identity: revision.identity().clone(),
                revision: revision.token().to_owned(),
            })?;
        self.commits.insert(revision.clone(), commit.clone());
        Ok(commit)
    }

    fn is_ancestor(
        &mut self,
        ancestor: &Revision,
        descendant: &Revision,
    ) -> Result<bool, ProviderError> {
        let a = self.commit_of(ancestor)?;
        let d = self.commit_of(descendant)?;
        let identity = descendant.identity();
        let path = self.repository(identity)?;
        let status = git_in(&path)
            .args(["merge-base", "--is-ancestor", a.as_str(), d.as_str()])
            .status()
            .map_err(|e| ProviderError::Git {
                identity: identity.clone(),
                source: e.into(),
            })?;
        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(ProviderError::Git {
                identity: identity.clone(),
                source: anyhow::anyhow!("git merge-base --is-ancestor {a} {d} failed: {status}"),
            }),
        }
    }
}

impl DependencyProvider for GitProvider {
    fn dependencies(&mut self, node: &Node) -> Result<Vec<Dependency>, ProviderError> {
        let specs = self.specifications(node)?;
        let mut deps = Vec::with_capacity(specs.len());
        for specification in specs {
            let candidates = self.candidates(&specification)?;
            log::debug!(
                "{} -> {}: {} candidates",
                node,
                specification,
                candidates.len()
            );
            deps.push(Dependency {
                specification,
                candidates,
            });
        }
        Ok(deps)
    }
}

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

//! Picks one revision per dependency by building the graph of every
//! candidate and pruning it down.
//!
//! Resolution runs in six steps:
//!
//! 1. Build the universal graph: every candidate revision of every declared
//!    dependency, transitively.
//! 2. Collect the candidate revisions of each identity.
//! 3. Drop candidates that at most one node asks for, lowest first, until a
//!    single one is left.
//! 4. Walk the graph and drop candidates that no live path requires.
//! 5. Select the greatest surviving revision of each identity.
//! 6. Rebuild the graph keeping only the selected revisions.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use indexmap::{IndexMap, IndexSet};
use petgraph::graphmap::DiGraphMap;
use skiffutil::{
    identity::Identity,
    predicate::VersionPredicate,
    revision::{Revision, RevisionKind, max_revision, sort_revisions},
};
use thiserror::Error;

use crate::provider::{DependencyProvider, Node, ProviderError};

/// Any error that may occur during dependency resolution.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("no version of {identity} satisfies the requirement `{predicate}`")]
    Unsatisfiable {
        identity: Identity,
        predicate: VersionPredicate,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("dependency cycle detected: {}", display_cycle(.0))]
    Cycle(Vec<Identity>),
    #[error("{dependent} requires {identity} {predicate}, but {selected} was selected")]
    Conflict {
        dependent: Node,
        identity: Identity,
        predicate: VersionPredicate,
        selected: Revision,
    },
    #[error("{0} is not pinned in Cartfile.resolved")]
    NotPinned(Identity),
}

fn display_cycle(path: &[Identity]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new_usize(id: usize) -> Self {
        Self(id as u32)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// A graph of nodes keyed by [`NodeId`]. Edges point from a dependent to
/// its dependency.
///
/// Ids stay valid after a node is removed; removed nodes are simply no
/// longer part of the graph.
pub struct DependencyGraph {
    mapping: IndexSet<Node>,
    graph: DiGraphMap<NodeId, ()>,
    root: NodeId,
}

impl DependencyGraph {
    pub fn new(root: Node) -> Self {
        let mut this = DependencyGraph {
            mapping: IndexSet::new(),
            graph: DiGraphMap::new(),
            root: NodeId::new_usize(0),
        };
        this.root = this.intern(root);
        this
    }

    /// Adds `node` if it is not known yet and returns its id.
    pub fn intern(&mut self, node: Node) -> NodeId {
        let (idx, _) = self.mapping.insert_full(node);
        let id = NodeId::new_usize(idx);
        self.graph.add_node(id);
        id
    }

    pub fn add_dependency(&mut self, from: NodeId, to: NodeId) {
        self.graph.add_edge(from, to, ());
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.mapping[id.as_usize()]
    }

    /// The id of `node` if it is still part of the graph.
    pub fn id_of(&self, node: &Node) -> Option<NodeId> {
        self.mapping
            .get_index_of(node)
            .map(NodeId::new_usize)
            .filter(|id| self.graph.contains_node(*id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn dependencies(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .neighbors_directed(id, petgraph::Direction::Outgoing)
    }

    pub fn dependents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .neighbors_directed(id, petgraph::Direction::Incoming)
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.dependents(id).count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.graph.nodes().map(|id| (id, self.node(id)))
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph.all_edges().map(|(from, to, _)| (from, to))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &DiGraphMap<NodeId, ()> {
        &self.graph
    }

    fn remove(&mut self, id: NodeId) {
        log::trace!("Removing {}", self.node(id));
        self.graph.remove_node(id);
    }
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (id, node) in self.nodes() {
            map.entry(
                node,
                &self
                    .dependencies(id)
                    .map(|dep| self.node(dep))
                    .collect::<Vec<_>>(),
            );
        }
        map.finish()
    }
}

/// The outcome of a successful resolution.
#[derive(Debug)]
pub struct Resolution {
    /// Every reachable dependency at its selected revision.
    pub graph: DependencyGraph,
    /// The selected revision of every identity in [`Resolution::graph`], in
    /// graph order.
    pub selected: IndexMap<Identity, Revision>,
}

type Candidates = IndexMap<Identity, IndexSet<Revision>>;

#[derive(Default)]
struct Walk {
    expanded: HashSet<NodeId>,
    stack: IndexSet<NodeId>,
}

/// Resolves the dependencies of one root project. Consumed by a single
/// resolution.
pub struct Resolver<'a> {
    provider: &'a mut dyn DependencyProvider,
    root: Node,
}

impl<'a> Resolver<'a> {
    pub fn new(root: Identity, provider: &'a mut dyn DependencyProvider) -> Self {
        Resolver {
            provider,
            root: Node::root(root),
        }
    }

    /// The graph of every candidate revision, before any pruning.
    pub fn universal_graph(mut self) -> Result<DependencyGraph, ResolverError> {
        self.build(None)
    }

    pub fn resolve(mut self) -> Result<Resolution, ResolverError> {
        let mut graph = self.build(None)?;
        log::debug!(
            "Universal graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let mut candidates = inventory(&graph);
        self.prune_orphans(&mut graph, &mut candidates)?;
        log::debug!(
            "{} nodes left after removing singly required candidates",
            graph.node_count()
        );

        let root = graph.root();
        prune_inconsistent(&mut graph, &mut candidates, root, &mut HashSet::new());
        log::debug!(
            "{} nodes left after removing candidates no path requires",
            graph.node_count()
        );

        let mut chosen = HashMap::new();
        for (identity, revisions) in &candidates {
            if let Some(max) = max_revision(revisions, &mut *self.provider)? {
                log::debug!("Selected {:?}", max);
                chosen.insert(identity.clone(), max.clone());
            }
        }

        let graph = self.build(Some(&chosen))?;
        log::debug!(
            "Resolved graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let selected = graph
            .nodes()
            .filter_map(|(_, node)| Some((node.identity.clone(), node.revision.clone()?)))
            .collect();
        Ok(Resolution { graph, selected })
    }

    /// Walks the declared dependencies from the root. With a selection, only
    /// edges to the selected revision of each identity are kept.
    fn build(
        &mut self,
        selection: Option<&HashMap<Identity, Revision>>,
    ) -> Result<DependencyGraph, ResolverError> {
        let mut graph = DependencyGraph::new(self.root.clone());
        let mut walk = Walk::default();
        let root = graph.root();
        walk.expanded.insert(root);
        self.populate(&mut graph, root, &mut walk, selection)?;
        Ok(graph)
    }

    fn populate(
        &mut self,
        graph: &mut DependencyGraph,
        id: NodeId,
        walk: &mut Walk,
        selection: Option<&HashMap<Identity, Revision>>,
    ) -> Result<(), ResolverError> {
        walk.stack.insert(id);
        let current = graph.node(id).clone();
        for dependency in self.provider.dependencies(&current)? {
            let spec = dependency.specification;
            if dependency.candidates.is_empty() {
                return Err(ResolverError::Unsatisfiable {
                    identity: spec.identity,
                    predicate: spec.predicate,
                });
            }

            let candidates = match selection {
                None => dependency.candidates,
                Some(selection) => {
                    let Some(selected) = selection.get(&spec.identity) else {
                        continue;
                    };
                    if dependency.candidates.contains(selected) {
                        vec![selected.clone()]
                    } else if selected.kind() == RevisionKind::Commitish {
                        // The pin wins, but the edge stays so the pinned
                        // project is still built before `current`.
                        log::warn!(
                            "{} requires {} {}, which is overridden by the pin {}",
                            current,
                            spec.identity,
                            spec.predicate,
                            selected
                        );
                        vec![selected.clone()]
                    } else {
                        return Err(ResolverError::Conflict {
                            dependent: current,
                            identity: spec.identity,
                            predicate: spec.predicate,
                            selected: selected.clone(),
                        });
                    }
                }
            };

            for candidate in candidates {
                let child = graph.intern(Node::new(spec.identity.clone(), candidate));
                graph.add_dependency(id, child);
                if let Some(start) = walk.stack.get_index_of(&child) {
                    let mut path = walk
                        .stack
                        .iter()
                        .skip(start)
                        .map(|id| graph.node(*id).identity.clone())
                        .collect::<Vec<_>>();
                    path.push(spec.identity.clone());
                    return Err(ResolverError::Cycle(path));
                }
                if walk.expanded.insert(child) {
                    self.populate(graph, child, walk, selection)?;
                }
            }
        }
        walk.stack.pop();
        Ok(())
    }

    fn prune_orphans(
        &mut self,
        graph: &mut DependencyGraph,
        candidates: &mut Candidates,
    ) -> Result<(), ResolverError> {
        for (identity, revisions) in candidates.iter_mut() {
            if revisions.len() < 2 {
                continue;
            }
            let mut ascending = revisions.iter().cloned().collect::<Vec<_>>();
            sort_revisions(&mut ascending, &mut *self.provider)?;
            for revision in ascending {
                if revisions.len() == 1 {
                    break;
                }
                let Some(id) = graph.id_of(&Node::new(identity.clone(), revision.clone())) else {
                    continue;
                };
                if graph.in_degree(id) <= 1 {
                    graph.remove(id);
                    revisions.shift_remove(&revision);
                }
            }
        }
        Ok(())
    }
}

/// Pre-order collection of the revisions of every non-root identity.
fn inventory(graph: &DependencyGraph) -> Candidates {
    fn visit(
        graph: &DependencyGraph,
        id: NodeId,
        seen: &mut HashSet<NodeId>,
        out: &mut Candidates,
    ) {
        if !seen.insert(id) {
            return;
        }
        let node = graph.node(id);
        if let Some(revision) = &node.revision {
            out.entry(node.identity.clone())
                .or_default()
                .insert(revision.clone());
        }
        for child in graph.dependencies(id) {
            visit(graph, child, seen, out);
        }
    }

    let mut out = Candidates::new();
    visit(graph, graph.root(), &mut HashSet::new(), &mut out);
    out
}

/// Removes every remaining candidate of a child identity that the node at
/// `id` does not ask for, then descends.
fn prune_inconsistent(
    graph: &mut DependencyGraph,
    candidates: &mut Candidates,
    id: NodeId,
    visited: &mut HashSet<NodeId>,
) {
    if !visited.insert(id) {
        return;
    }

    let mut required: IndexMap<Identity, HashSet<Revision>> = IndexMap::new();
    for child in graph.dependencies(id) {
        let node = graph.node(child);
        if let Some(revision) = &node.revision {
            required
                .entry(node.identity.clone())
                .or_default()
                .insert(revision.clone());
        }
    }

    for (identity, wanted) in &required {
        let Some(remaining) = candidates.get_mut(identity) else {
            continue;
        };
        let unwanted = remaining
            .iter()
            .filter(|r| !wanted.contains(*r))
            .cloned()
            .collect::<Vec<_>>();
        for revision in unwanted {
            if let Some(node) = graph.id_of(&Node::new(identity.clone(), revision.clone())) {
                graph.remove(node);
            }
            remaining.shift_remove(&revision);
        }
    }

    let children = graph.dependencies(id).collect::<Vec<_>>();
    for child in children {
        if graph.contains(child) {
            prune_inconsistent(graph, candidates, child, visited);
        }
    }
}

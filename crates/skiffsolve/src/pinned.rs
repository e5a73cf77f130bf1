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

//! `Cartfile.resolved`: writing a resolution out and ordering the pins it
//! records.

use indexmap::IndexMap;
use skiffutil::{
    cartfile::Cartfile,
    identity::Identity,
    predicate::VersionPredicate,
    revision::Revision,
    specification::Specification,
};

use crate::{
    build_order::build_order,
    provider::{DependencyProvider, Node},
    resolver::{DependencyGraph, ResolverError},
};

/// Pins every non-root node of a build order to its revision.
pub fn resolved_cartfile(order: &[Node]) -> Cartfile {
    Cartfile::new(
        order
            .iter()
            .filter_map(|node| {
                let revision = node.revision.as_ref()?;
                Some(Specification::pinned(
                    node.identity.clone(),
                    revision.token(),
                ))
            })
            .collect(),
    )
}

/// The build order of the dependencies pinned in `pins`, restricted to the
/// projects named in `name_filter` (all of them when empty).
///
/// Edges come from the manifests at the pinned revisions, with every
/// declared dependency mapped to its own pin.
pub fn ordered_dependencies<S: AsRef<str>>(
    root: Identity,
    pins: &Cartfile,
    provider: &mut dyn DependencyProvider,
    name_filter: &[S],
) -> Result<Vec<Node>, ResolverError> {
    let mut pinned = IndexMap::new();
    for spec in &pins.specifications {
        let VersionPredicate::Commitish(token) = &spec.predicate else {
            return Err(ResolverError::NotPinned(spec.identity.clone()));
        };
        pinned.insert(
            spec.identity.clone(),
            Revision::commitish(spec.identity.clone(), token),
        );
    }

    let mut graph = DependencyGraph::new(Node::root(root));
    let root = graph.root();
    let mut ids = vec![];
    for (identity, revision) in &pinned {
        let id = graph.intern(Node::new(identity.clone(), revision.clone()));
        graph.add_dependency(root, id);
        ids.push(id);
    }

    for id in ids {
        let node = graph.node(id).clone();
        for dependency in provider.dependencies(&node)? {
            let identity = dependency.specification.identity;
            let revision = pinned
                .get(&identity)
                .ok_or_else(|| ResolverError::NotPinned(identity.clone()))?;
            let child = graph.intern(Node::new(identity, revision.clone()));
            graph.add_dependency(id, child);
        }
    }
    log::debug!(
        "Pinned graph has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(build_order(&graph)?
        .into_iter()
        .filter(|node| !node.is_root() && node.identity.matches(name_filter))
        .collect())
}

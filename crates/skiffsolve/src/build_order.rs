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

use std::collections::HashMap;

use petgraph::{
    graphmap::DiGraphMap,
    visit::{Control, DfsEvent, depth_first_search},
};

use crate::{
    provider::Node,
    resolver::{DependencyGraph, NodeId, ResolverError},
};

/// Orders the nodes of `graph` so that every dependency comes before its
/// dependents. The root, depending on everything, comes last.
pub fn build_order(graph: &DependencyGraph) -> Result<Vec<Node>, ResolverError> {
    match petgraph::algo::toposort(graph.graph(), None) {
        Ok(ids) => Ok(ids
            .into_iter()
            .rev()
            .map(|id| graph.node(id).clone())
            .collect()),
        Err(cycle) => {
            let cycle = example_cycle(graph.graph(), cycle.node_id());
            Err(ResolverError::Cycle(
                cycle
                    .into_iter()
                    .map(|id| graph.node(id).identity.clone())
                    .collect(),
            ))
        }
    }
}

fn example_cycle(graph: &DiGraphMap<NodeId, ()>, start: NodeId) -> Vec<NodeId> {
    // the parent of each node in the spanning tree
    let mut parents = HashMap::new();
    let res = depth_first_search(graph, [start], |event| match event {
        DfsEvent::TreeEdge(parent, n) => {
            parents.insert(n, parent);
            Control::Continue
        }
        DfsEvent::BackEdge(u, v) if v == start => Control::Break(u),
        _ => Control::Continue,
    });

    let mut cycle = vec![start];
    let Some(mut curr) = res.break_value() else {
        return cycle;
    };
    loop {
        cycle.push(curr);
        if curr == start {
            break;
        }
        match parents.get(&curr) {
            Some(parent) => curr = *parent,
            None => break,
        }
    }
    cycle.reverse();
    cycle
}

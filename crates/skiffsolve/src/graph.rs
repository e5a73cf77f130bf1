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

//! Graphviz export of dependency graphs, for inspection only.

use std::collections::HashMap;

use petgraph::{
    dot::{Config, Dot},
    graph::DiGraph,
};

use crate::resolver::DependencyGraph;

/// Renders `graph` in DOT format with `identity@revision` labels.
pub fn to_dot(graph: &DependencyGraph) -> String {
    let mut out = DiGraph::<String, &str>::new();
    let mut indices = HashMap::new();
    for (id, node) in graph.nodes() {
        indices.insert(id, out.add_node(node.to_string()));
    }
    for (from, to) in graph.edges() {
        out.add_edge(indices[&from], indices[&to], "");
    }
    format!("{}", Dot::with_config(&out, &[Config::EdgeNoLabel]))
}

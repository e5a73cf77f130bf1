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

use std::path::Path;

use anyhow::Context;

use super::Project;
use crate::{graph::to_dot, resolver::Resolver};

/// Prints the resolved graph, or with `universal` the graph of every
/// candidate, in DOT format.
pub fn graph(
    project_dir: &Path,
    cache_dir: &Path,
    fetch: bool,
    universal: bool,
    output: Option<&Path>,
) -> anyhow::Result<i32> {
    let project = Project::load(project_dir)?;
    let mut provider = project.provider(cache_dir, fetch);
    let resolver = Resolver::new(project.identity.clone(), &mut provider);
    let dot = if universal {
        to_dot(&resolver.universal_graph()?)
    } else {
        to_dot(&resolver.resolve()?.graph)
    };

    match output {
        Some(path) => std::fs::write(path, dot)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{dot}"),
    }
    Ok(0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::{diamond, has_git};

    #[test]
    fn test_graph_to_file() {
        if !has_git() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        diamond(base);
        let cache = base.join("cache");
        let out = base.join("graph.dot");

        graph(&base.join("root"), &cache, true, true, Some(&out)).unwrap();
        let universal = std::fs::read_to_string(&out).unwrap();
        assert_eq!(universal.matches(" -> ").count(), 7);

        graph(&base.join("root"), &cache, false, false, Some(&out)).unwrap();
        let resolved = std::fs::read_to_string(&out).unwrap();
        assert_eq!(resolved.matches(" -> ").count(), 4);
        assert!(resolved.contains("/C@3.0\""));
    }
}

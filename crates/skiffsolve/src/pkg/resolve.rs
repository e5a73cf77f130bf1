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
use skiffutil::cartfile::CARTFILE_RESOLVED;

use super::{Project, print_order};
use crate::{build_order::build_order, pinned::resolved_cartfile, resolver::Resolver};

/// Resolves the project's Cartfile, writes `Cartfile.resolved` and prints
/// the build order.
pub fn resolve(project_dir: &Path, cache_dir: &Path, fetch: bool) -> anyhow::Result<i32> {
    let project = Project::load(project_dir)?;
    let mut provider = project.provider(cache_dir, fetch);
    let resolution = Resolver::new(project.identity.clone(), &mut provider)
        .resolve()
        .context("failed to resolve dependencies")?;
    let order = build_order(&resolution.graph)?;

    let path = project_dir.join(CARTFILE_RESOLVED);
    resolved_cartfile(&order)
        .write(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());

    print_order(&order);
    Ok(0)
}

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

use anyhow::{Context, bail};
use skiffutil::cartfile::{CARTFILE_RESOLVED, Cartfile};

use super::{Project, print_order};
use crate::pinned::ordered_dependencies;

/// Prints the build order of the pins in `Cartfile.resolved`, limited to
/// `names` when given.
pub fn order(
    project_dir: &Path,
    cache_dir: &Path,
    fetch: bool,
    names: &[String],
) -> anyhow::Result<i32> {
    let project = Project::load(project_dir)?;
    let path = project_dir.join(CARTFILE_RESOLVED);
    if !path.exists() {
        bail!(
            "{} not found, run `skiff resolve` first",
            path.display()
        );
    }
    let pins = Cartfile::read(&path, &project.config.parse_options())
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut provider = project.provider(cache_dir, fetch);
    let order = ordered_dependencies(project.identity.clone(), &pins, &mut provider, names)?;
    print_order(&order);
    Ok(0)
}

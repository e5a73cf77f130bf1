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

use std::path::PathBuf;

use anyhow::Context;

/// The root of skiff's per-user cache. `SKIFF_HOME` takes precedence over
/// `~/.skiff`.
pub fn home() -> anyhow::Result<PathBuf> {
    if let Ok(skiff_home) = std::env::var("SKIFF_HOME") {
        return Ok(PathBuf::from(skiff_home));
    }
    let home = home::home_dir().context("failed to get home directory")?;
    Ok(home.join(".skiff"))
}

/// Clones of every dependency, one directory per project name.
pub fn repo_cache() -> anyhow::Result<PathBuf> {
    let dir = home()?.join("repo_cache");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir)
}

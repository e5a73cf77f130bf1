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

//! The bodies of the `skiff` subcommands.

pub mod graph;
pub mod order;
pub mod resolve;

use std::path::{Path, PathBuf};

use colored::Colorize;
use skiffutil::{config::Config, identity::Identity};

use crate::{git::GitProvider, provider::Node};

/// The project whose `Cartfile` is being worked on.
pub struct Project {
    pub dir: PathBuf,
    pub identity: Identity,
    pub config: Config,
}

impl Project {
    /// Loads the project at `dir`, which is named after the directory.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_owned());
        let config = Config::load(dir)?;
        Ok(Project {
            dir: dir.to_path_buf(),
            identity: Identity::root(name),
            config,
        })
    }

    pub fn provider(&self, cache_dir: &Path, fetch: bool) -> GitProvider {
        GitProvider::new(
            self.identity.clone(),
            &self.dir,
            cache_dir,
            self.config.parse_options(),
            self.config.defaults.compatible_upper_bound,
        )
        .with_fetch(fetch)
    }
}

fn print_order(order: &[Node]) {
    for node in order {
        if let Some(revision) = &node.revision {
            println!("{} {}", node.identity.project_name().bold(), revision);
        }
    }
}

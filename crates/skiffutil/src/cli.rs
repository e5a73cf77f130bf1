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

#[derive(Debug, Clone, clap::Parser)]
pub struct UniversalFlags {
    /// Run as if skiff was started in DIR
    #[clap(long = "directory", short = 'C', global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Increase verbosity
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl UniversalFlags {
    /// The absolute path of the project directory.
    pub fn project_dir(&self) -> anyhow::Result<PathBuf> {
        let dir = match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("failed to get current directory")?,
        };
        std::path::absolute(&dir).with_context(|| format!("invalid directory {}", dir.display()))
    }
}

/// Resolve the Cartfile and write Cartfile.resolved
#[derive(Debug, Clone, clap::Parser)]
pub struct ResolveSubcommand {
    /// Only use repositories that are already cloned, without fetching
    #[clap(long)]
    pub no_fetch: bool,
}

/// Print the dependency graph in Graphviz DOT format
#[derive(Debug, Clone, clap::Parser)]
pub struct GraphSubcommand {
    /// Only use repositories that are already cloned, without fetching
    #[clap(long)]
    pub no_fetch: bool,

    /// Show every candidate revision instead of the resolved graph
    #[clap(long)]
    pub universal: bool,

    /// Write the graph to a file instead of stdout
    #[clap(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Print the build order of the dependencies pinned in Cartfile.resolved
#[derive(Debug, Clone, clap::Parser)]
pub struct OrderSubcommand {
    /// Only list these projects
    #[clap(value_name = "NAME")]
    pub names: Vec<String>,

    /// Only use repositories that are already cloned, without fetching
    #[clap(long)]
    pub no_fetch: bool,
}

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

use skiffsolve::pkg;
use skiffutil::{
    cli::{GraphSubcommand, OrderSubcommand, ResolveSubcommand, UniversalFlags},
    dirs,
};

#[derive(Debug, clap::Parser)]
#[clap(name = "skiff", about = "A Carthage-compatible dependency manager.")]
pub struct SkiffCli {
    #[clap(subcommand)]
    pub subcommand: SkiffSubcommands,

    #[clap(flatten)]
    pub flags: UniversalFlags,
}

#[derive(Debug, clap::Parser)]
pub enum SkiffSubcommands {
    Resolve(ResolveSubcommand),
    Graph(GraphSubcommand),
    Order(OrderSubcommand),
}

pub fn resolve_cli(flags: &UniversalFlags, cmd: ResolveSubcommand) -> anyhow::Result<i32> {
    let project_dir = flags.project_dir()?;
    let cache_dir = dirs::repo_cache()?;
    let _span = tracing::info_span!("resolve", project = %project_dir.display()).entered();
    pkg::resolve::resolve(&project_dir, &cache_dir, !cmd.no_fetch)
}

pub fn graph_cli(flags: &UniversalFlags, cmd: GraphSubcommand) -> anyhow::Result<i32> {
    let project_dir = flags.project_dir()?;
    let cache_dir = dirs::repo_cache()?;
    let _span = tracing::info_span!("graph", project = %project_dir.display()).entered();
    pkg::graph::graph(
        &project_dir,
        &cache_dir,
        !cmd.no_fetch,
        cmd.universal,
        cmd.output.as_deref(),
    )
}

pub fn order_cli(flags: &UniversalFlags, cmd: OrderSubcommand) -> anyhow::Result<i32> {
    let project_dir = flags.project_dir()?;
    let cache_dir = dirs::repo_cache()?;
    pkg::order::order(&project_dir, &cache_dir, !cmd.no_fetch, &cmd.names)
}

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

use std::io::IsTerminal;

use clap::Parser;
use cli::SkiffSubcommands;

mod cli;

use colored::*;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging.
///
/// `RUST_LOG` filters the output printed to stderr; without it only warnings
/// are shown, or debug output with `--verbose`. Records emitted through the
/// `log` facade by the library crates end up here too.
fn init_tracing(verbose: bool) {
    // usage example: only show resolver progress
    // env RUST_LOG=skiffsolve::resolver=debug cargo run -- resolve

    let log_env_set = std::env::var("RUST_LOG").is_ok();
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::stderr().is_terminal())
        .with_line_number(log_env_set)
        .with_level(true)
        .with_writer(std::io::stderr);
    let fmt = if !log_env_set {
        fmt.with_target(false).without_time().boxed()
    } else {
        fmt.compact().boxed()
    };

    tracing_subscriber::registry()
        .with(fmt.with_filter(filter))
        .init();
}

pub fn main() {
    let cli = cli::SkiffCli::parse();
    let flags = cli.flags;

    init_tracing(flags.verbose);

    use SkiffSubcommands::*;
    let res = match cli.subcommand {
        Resolve(r) => cli::resolve_cli(&flags, r),
        Graph(g) => cli::graph_cli(&flags, g),
        Order(o) => cli::order_cli(&flags, o),
    };

    match res {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:?}", "error".red().bold(), e);
            std::process::exit(-1);
        }
    }
}

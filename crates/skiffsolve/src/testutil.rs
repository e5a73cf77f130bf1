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

//! Scratch git repositories for tests.

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use skiffutil::cartfile::CARTFILE;

/// Tests that need a real `git` return early without one.
pub fn has_git() -> bool {
    which::which("git").is_ok()
}

fn git_output(dir: &Path, args: &[&str]) -> Output {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=skiff",
            "-c",
            "user.email=skiff@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

pub fn git(dir: &Path, args: &[&str]) {
    git_output(dir, args);
}

pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    String::from_utf8(git_output(dir, args).stdout)
        .unwrap()
        .trim()
        .to_owned()
}

/// Creates a repository on branch `main` with one commit per tag,
/// optionally committing a Cartfile with the first one.
pub fn repo(dir: &Path, cartfile: Option<&str>, tags: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "--quiet"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    if let Some(cartfile) = cartfile {
        fs::write(dir.join(CARTFILE), cartfile).unwrap();
        git(dir, &["add", CARTFILE]);
    }
    for tag in tags {
        git(dir, &["commit", "--allow-empty", "--quiet", "-m", tag]);
        git(dir, &["tag", tag]);
    }
}

pub fn url(dir: &Path) -> String {
    format!("file://{}", dir.display())
}

/// `base/root` requires A ~> 1.0 and B ~> 1.0; A requires C >= 1.0 and B
/// requires C >= 2.0. C is tagged 1.0, 2.0 and 3.0 and has a `develop`
/// branch at 3.0.
pub fn diamond(base: &Path) {
    let c = base.join("C");
    repo(&c, None, &["1.0", "2.0", "not-a-version", "3.0"]);
    git(&c, &["branch", "develop"]);
    repo(
        &base.join("A"),
        Some(&format!("git \"{}\" >= 1.0\n", url(&c))),
        &["1.0"],
    );
    repo(
        &base.join("B"),
        Some(&format!("git \"{}\" >= 2.0\n", url(&c))),
        &["1.0"],
    );
    let root = base.join("root");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join(CARTFILE),
        format!(
            "git \"{}\" ~> 1.0\ngit \"{}\" ~> 1.0\n",
            url(&base.join("A")),
            url(&base.join("B"))
        ),
    )
    .unwrap();
}

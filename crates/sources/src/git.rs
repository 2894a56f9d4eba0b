//! Git status via the `git` command line.
//!
//! Runs `git status --porcelain=v1 --branch` in the project root and parses
//! the stable porcelain format. The child is killed if the caller's future
//! is dropped (for example on timeout).

use async_trait::async_trait;
use ctxpack_core::collaborator::{GitStatus, GitStatusProvider};
use ctxpack_core::error::CollaboratorError;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Two-letter porcelain codes that mean an unresolved merge.
const CONFLICT_CODES: &[&str] = &["DD", "AU", "UD", "UA", "DU", "AA", "UU"];

pub struct GitCliStatus {
    program: String,
}

impl Default for GitCliStatus {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCliStatus {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl GitStatusProvider for GitCliStatus {
    async fn status(&self, root: &Path) -> Result<GitStatus, CollaboratorError> {
        debug!(root = %root.display(), "Running git status");

        let output = Command::new(&self.program)
            .args(["status", "--porcelain=v1", "--branch"])
            .current_dir(root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CollaboratorError::Backend(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.to_lowercase().contains("not a git repository") {
                return Err(CollaboratorError::NotARepository(root.display().to_string()));
            }
            return Err(CollaboratorError::Backend(format!(
                "git status exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(parse_porcelain(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `git status --porcelain=v1 --branch` output.
pub fn parse_porcelain(output: &str) -> GitStatus {
    let mut status = GitStatus::default();

    for line in output.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            parse_branch_header(header, &mut status);
            continue;
        }
        if line.len() < 4 {
            continue;
        }
        let (code, path) = line.split_at(2);
        let path = unquote(rename_target(path.trim_start()));

        if code == "??" {
            status.untracked.push(path);
            continue;
        }
        if code == "!!" {
            continue;
        }
        if CONFLICT_CODES.contains(&code) {
            status.has_conflicts = true;
            status.unstaged.push(path);
            continue;
        }

        let mut chars = code.chars();
        let index = chars.next().unwrap_or(' ');
        let worktree = chars.next().unwrap_or(' ');
        if index != ' ' {
            status.staged.push(path.clone());
        }
        if worktree != ' ' {
            status.unstaged.push(path);
        }
    }
    status
}

/// `main...origin/main [ahead 1, behind 2]`, `main`, `No commits yet on main`,
/// or `HEAD (no branch)`.
fn parse_branch_header(header: &str, status: &mut GitStatus) {
    let (names, tracking) = match header.split_once(" [") {
        Some((names, rest)) => (names, rest.trim_end_matches(']')),
        None => (header, ""),
    };

    let names = names
        .strip_prefix("No commits yet on ")
        .or_else(|| names.strip_prefix("Initial commit on "))
        .unwrap_or(names);
    status.branch = names
        .split_once("...")
        .map_or(names, |(local, _)| local)
        .to_string();

    for part in tracking.split(", ") {
        if let Some(n) = part.strip_prefix("ahead ") {
            status.ahead = n.trim().parse().unwrap_or(0);
        } else if let Some(n) = part.strip_prefix("behind ") {
            status.behind = n.trim().parse().unwrap_or(0);
        }
    }
}

/// For renames and copies (`old -> new`), the new path.
fn rename_target(path: &str) -> &str {
    path.rsplit_once(" -> ").map_or(path, |(_, new)| new)
}

fn unquote(path: &str) -> String {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .map(|p| p.replace("\\\"", "\"").replace("\\\\", "\\"))
        .unwrap_or_else(|| path.to_string())
}

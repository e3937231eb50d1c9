//! Server configuration and projects-root resolution.

use clap::Parser;
use std::path::PathBuf;

/// Environment override for the projects directory.
pub const PROJECTS_DIR_ENV: &str = "CLAUDE_PROJECTS_DIR";

#[derive(Debug, Parser)]
#[command(
    name = "hindsight-mcp",
    version,
    about = "MCP server for recalling past Claude Code sessions"
)]
pub struct Cli {
    /// Directory holding Claude Code project transcripts
    /// (default: $CLAUDE_PROJECTS_DIR, then ~/.claude/projects)
    #[arg(long, value_name = "DIR")]
    pub projects_dir: Option<String>,
}

/// Resolve the projects root: CLI flag, then environment, then the
/// standard location under the home directory.
pub fn resolve_projects_root(flag: Option<&str>) -> PathBuf {
    if let Some(dir) = flag {
        return PathBuf::from(shellexpand::tilde(dir).into_owned());
    }
    match std::env::var(PROJECTS_DIR_ENV) {
        Ok(value) if !value.trim().is_empty() => {
            PathBuf::from(shellexpand::tilde(value.trim()).into_owned())
        }
        _ => dirs_home().join(".claude").join("projects"),
    }
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_takes_precedence() {
        let root = resolve_projects_root(Some("/srv/claude-projects"));
        assert_eq!(root, PathBuf::from("/srv/claude-projects"));
    }

    #[test]
    fn flag_tilde_expands() {
        let root = resolve_projects_root(Some("~/sessions"));
        assert!(!root.to_string_lossy().starts_with('~'));
        assert!(root.ends_with("sessions"));
    }

    #[test]
    fn home_is_never_empty() {
        assert!(!dirs_home().as_os_str().is_empty());
    }
}

//! Repository loading and ignore-aware directory walking.
//!
//! Assembles an [`IgnoreStack`] from the sources git consults, in priority
//! order: the user's global excludes file, `.git/info/exclude`, the root
//! `.gitignore`, then nested `.gitignore` files discovered while walking
//! (each scoped to its containing directory). Loading is best-effort:
//! missing or unreadable sources are skipped, matching git's tolerance.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use bstr::{BStr, BString, ByteSlice};

use crate::{IgnoreError, IgnoreStack};

impl IgnoreStack {
    /// Build a stack from the repository's standard ignore sources: the
    /// global excludes file (lowest priority), `.git/info/exclude`, and the
    /// root `.gitignore` (highest priority). `root` is the working
    /// directory containing `.git`.
    pub fn from_repository(root: &Path) -> Self {
        let mut stack = Self::new();
        if let Some(global) = global_excludes_file() {
            let _ = stack.add_file(&global, BStr::new(""));
        }
        let _ = stack.add_file(
            &root.join(".git").join("info").join("exclude"),
            BStr::new(""),
        );
        let _ = stack.add_file(&root.join(".gitignore"), BStr::new(""));
        stack
    }

    /// Build a stack by walking the tree under `root`, loading every nested
    /// `.gitignore` scoped to its containing directory. Ignored directories
    /// are not descended into, so their ignore files never take effect.
    pub fn from_directory(root: &Path) -> Self {
        let mut stack = Self::from_repository(root);
        let _ = walk_recursive(root, Path::new(""), BStr::new(""), &mut stack, &mut |_, _| {
            Ok(())
        });
        stack
    }
}

/// Walk the tree rooted at `root`, calling `visit` for each file and
/// directory that is not ignored. Nested `.gitignore` files are loaded as
/// the walk descends, so deeper patterns take effect for their subtrees.
/// The `.git` directory is always skipped, as is everything beneath an
/// ignored directory. Paths passed to `visit` are relative to `root`; the
/// root itself is not visited.
pub fn walk<F>(root: &Path, mut visit: F) -> Result<(), IgnoreError>
where
    F: FnMut(&Path, &fs::DirEntry) -> Result<(), IgnoreError>,
{
    let mut stack = IgnoreStack::from_repository(root);
    walk_recursive(root, Path::new(""), BStr::new(""), &mut stack, &mut visit)
}

fn walk_recursive<F>(
    root: &Path,
    rel: &Path,
    rel_slash: &BStr,
    stack: &mut IgnoreStack,
    visit: &mut F,
) -> Result<(), IgnoreError>
where
    F: FnMut(&Path, &fs::DirEntry) -> Result<(), IgnoreError>,
{
    let dir = root.join(rel);

    // Load this directory's ignore file before looking at its entries.
    if !rel_slash.is_empty() {
        stack.add_file(&dir.join(".gitignore"), rel_slash)?;
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir)? {
        entries.push(entry?);
    }
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let is_dir = entry.file_type()?.is_dir();

        if is_dir && name == ".git" {
            continue;
        }

        let mut entry_slash = BString::from(rel_slash.as_bytes());
        if !entry_slash.is_empty() {
            entry_slash.push(b'/');
        }
        entry_slash.extend_from_slice(name.to_string_lossy().as_bytes());

        if stack.is_ignored_path(entry_slash.as_bstr(), is_dir) {
            continue;
        }

        let entry_rel = rel.join(&name);
        visit(&entry_rel, &entry)?;

        if is_dir {
            walk_recursive(root, &entry_rel, entry_slash.as_bstr(), stack, visit)?;
        }
    }

    Ok(())
}

/// Resolve the user's global gitignore file: `git config --global
/// core.excludesfile` first, then `$XDG_CONFIG_HOME/git/ignore`, then
/// `~/.config/git/ignore`.
fn global_excludes_file() -> Option<PathBuf> {
    if let Ok(out) = Command::new("git")
        .args(["config", "--global", "core.excludesfile"])
        .output()
    {
        if out.status.success() {
            let configured = String::from_utf8_lossy(out.stdout.trim());
            if !configured.is_empty() {
                return Some(expand_tilde(&configured));
            }
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            let path = PathBuf::from(xdg).join("git").join("ignore");
            if path.exists() {
                return Some(path);
            }
        }
    }

    let home = std::env::var_os("HOME")?;
    let path = PathBuf::from(home).join(".config").join("git").join("ignore");
    path.exists().then_some(path)
}

/// Replace a leading `~` with the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    let Some(rest) = path.strip_prefix('~') else {
        return PathBuf::from(path);
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

//! In-memory directory tree of the files a run may parse.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::config::WalkConfig;
use crate::error::FactError;

/// One directory: sub-directories and matching files, both sorted by name.
#[derive(Debug, Default)]
pub struct DirNode {
    pub dirs: BTreeMap<String, DirNode>,
    pub files: BTreeMap<String, PathBuf>,
}

impl DirNode {
    /// Number of files in this subtree.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.values().map(DirNode::file_count).sum::<usize>()
    }

    fn entry(&mut self, components: &[String]) -> &mut DirNode {
        components
            .iter()
            .fold(self, |dir, name| dir.dirs.entry(name.clone()).or_default())
    }
}

/// Enumerate `base_dir`, keeping files whose extension is in `extensions`.
///
/// Every directory is kept, empty or not; pruning happens when facts are
/// emitted. Enumeration errors are fatal.
pub fn scan(base_dir: &Path, extensions: &[String], walk: &WalkConfig) -> Result<DirNode, FactError> {
    let respect = walk.respect_gitignore;
    let excluded = walk.exclude_dirs.clone();

    let mut builder = WalkBuilder::new(base_dir);
    builder
        .standard_filters(false)
        .hidden(walk.skip_hidden)
        .git_ignore(respect)
        .git_exclude(respect)
        .git_global(respect)
        .ignore(respect)
        .parents(respect)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let name = entry.file_name().to_string_lossy();
            !(entry.depth() > 0 && is_dir && excluded.iter().any(|d| *d == name))
        });

    let mut root = DirNode::default();
    for result in builder.build() {
        let entry = result?;
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry.path().strip_prefix(base_dir).unwrap_or(entry.path());
        let mut components: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let Some(name) = components.pop() else {
            continue;
        };

        let file_type = entry.file_type();
        if file_type.is_some_and(|t| t.is_dir()) {
            root.entry(&components).dirs.entry(name).or_default();
        } else if file_type.is_some_and(|t| t.is_file()) {
            if has_extension(entry.path(), extensions) {
                root.entry(&components)
                    .files
                    .insert(name, entry.path().to_path_buf());
            } else {
                debug!(path = %entry.path().display(), "Extension not handled");
            }
        }
    }

    Ok(root)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        vec!["php".to_string()]
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/empty")).unwrap();
        fs::write(temp.path().join("src/b.php"), "<?php").unwrap();
        fs::write(temp.path().join("src/a.php"), "<?php").unwrap();
        fs::write(temp.path().join("README.md"), "# x").unwrap();

        let root = scan(temp.path(), &extensions(), &WalkConfig::default()).unwrap();
        assert!(root.files.is_empty());
        let src = &root.dirs["src"];
        let names: Vec<&String> = src.files.keys().collect();
        assert_eq!(names, vec!["a.php", "b.php"]);
        assert!(src.dirs.contains_key("empty"));
        assert_eq!(root.file_count(), 2);
    }

    #[test]
    fn test_scan_excludes_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("vendor/lib")).unwrap();
        fs::write(temp.path().join("vendor/lib/x.php"), "<?php").unwrap();
        fs::write(temp.path().join("index.php"), "<?php").unwrap();

        let walk = WalkConfig {
            exclude_dirs: vec!["vendor".to_string()],
            ..WalkConfig::default()
        };
        let root = scan(temp.path(), &extensions(), &walk).unwrap();
        assert!(!root.dirs.contains_key("vendor"));
        assert_eq!(root.file_count(), 1);
    }

    #[test]
    fn test_hidden_files_kept_by_default() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".hidden")).unwrap();
        fs::write(temp.path().join(".hidden/x.php"), "<?php").unwrap();

        let root = scan(temp.path(), &extensions(), &WalkConfig::default()).unwrap();
        assert_eq!(root.file_count(), 1);

        let walk = WalkConfig {
            skip_hidden: true,
            ..WalkConfig::default()
        };
        let root = scan(temp.path(), &extensions(), &walk).unwrap();
        assert_eq!(root.file_count(), 0);
    }
}

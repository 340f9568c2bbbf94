//! Project driver: walks a directory, emits the project, directory and
//! file framing facts, and hands every parsed file to the tree walker.
//!
//! Directory keys are allocated when a directory is entered, but a
//! directory's fact is only emitted, just before its first descendant,
//! once some file below it has actually been parsed.

mod tree;

pub use tree::{scan, DirNode};

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{Config, SyntaxErrorPolicy};
use crate::error::{FactError, WalkError};
use crate::facts::{make_common_properties, Emitter, Fact, KeyManager, Kind, Span};
use crate::parser::{diagnose, parse_tree, FrontEnd, SiblingFrame, TreeWalker};

/// Why a file produced no facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not in the explicit file selector.
    NotSelected,
    /// Larger than `walk.max_file_size`.
    TooLarge { size: u64 },
    /// Content is not valid UTF-8.
    NotUtf8,
    /// The tree contains `ERROR` nodes (0-based position of the first).
    SyntaxError { line: usize, column: usize },
    /// The parser returned no tree.
    NoTree,
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Parsed,
    Skipped(SkipReason),
}

/// Totals for one project run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub files_parsed: usize,
    pub files_skipped: usize,
    /// Files whose walk stopped early; their earlier facts were kept.
    pub files_incomplete: usize,
    pub dirs_emitted: usize,
    pub facts: usize,
    pub unhandled_nodes: usize,
}

/// Parse every matching file under `base_dir` and emit the fact stream.
///
/// `files` restricts the run to the given paths, relative to `base_dir`;
/// an empty list parses everything. Fails before emitting anything when
/// `trunk_key` is malformed.
pub fn parse_project(
    front_end: &dyn FrontEnd,
    trunk_key: &str,
    base_dir: &Path,
    files: &[String],
    config: &Config,
    emitter: &mut dyn Emitter,
) -> Result<ProjectStats, FactError> {
    let keys = KeyManager::new(trunk_key)?;

    let metadata = fs::metadata(base_dir).map_err(|e| FactError::io(base_dir, e))?;
    if !metadata.is_dir() {
        return Err(FactError::io(
            base_dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let extensions: Vec<String> = match config.extensions_for(front_end.namespace()) {
        Some(extensions) => extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect(),
        None => front_end
            .supported_extensions()
            .iter()
            .map(|e| e.to_string())
            .collect(),
    };
    let root = scan(base_dir, &extensions, &config.walk)?;
    debug!(
        base_dir = %base_dir.display(),
        candidates = root.file_count(),
        "Scanned project"
    );

    let mut driver = ProjectDriver {
        front_end,
        config,
        keys,
        emitter,
        selector: normalize_selector(files),
        stack: Vec::new(),
        stats: ProjectStats::default(),
    };
    driver.run(trunk_key, &root)?;

    let stats = driver.stats;
    info!(
        language = front_end.namespace(),
        parsed = stats.files_parsed,
        skipped = stats.files_skipped,
        incomplete = stats.files_incomplete,
        facts = stats.facts,
        "Project parsed"
    );
    Ok(stats)
}

/// `a/b.php`, `./a/b.php` and `a\b.php` all select `./a/b.php`.
fn normalize_selector(files: &[String]) -> HashSet<String> {
    files.iter().map(|f| relative_filename(&f.replace('\\', "/"))).collect()
}

/// `./`-prefixed form of a path relative to the base directory.
fn relative_filename(relative: &str) -> String {
    let trimmed = relative.trim_start_matches("./");
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        format!("./{}", trimmed)
    }
}

/// A framing fact whose emission may still be pending.
struct Frame {
    siblings: SiblingFrame,
    filename: String,
    emitted: bool,
}

struct ProjectDriver<'a> {
    front_end: &'a dyn FrontEnd,
    config: &'a Config,
    keys: KeyManager,
    emitter: &'a mut dyn Emitter,
    selector: HashSet<String>,
    /// Project frame followed by the directories being visited.
    stack: Vec<Frame>,
    stats: ProjectStats,
}

impl<'a> ProjectDriver<'a> {
    fn run(&mut self, trunk_key: &str, root: &DirNode) -> Result<(), FactError> {
        self.emit_framing("project", trunk_key, "", Vec::new(), ".", false)?;
        self.stack.push(Frame {
            siblings: SiblingFrame::new(trunk_key),
            filename: ".".to_string(),
            emitted: true,
        });

        self.visit_dir(root, "")
    }

    fn visit_dir(&mut self, dir: &DirNode, relative: &str) -> Result<(), FactError> {
        let key = self.keys.next_key();
        self.stack.push(Frame {
            siblings: SiblingFrame::new(key),
            filename: relative_filename(relative),
            emitted: false,
        });

        for (name, child) in &dir.dirs {
            self.visit_dir(child, &join(relative, name))?;
        }
        for (name, path) in &dir.files {
            let filename = relative_filename(&join(relative, name));
            match self.parse_file(path, &filename)? {
                FileOutcome::Parsed => self.stats.files_parsed += 1,
                FileOutcome::Skipped(SkipReason::NotSelected) => {}
                FileOutcome::Skipped(_) => self.stats.files_skipped += 1,
            }
        }

        if let Some(frame) = self.stack.pop() {
            if !frame.emitted {
                debug!(dir = %frame.filename, "No parsed files, directory pruned");
            }
        }
        Ok(())
    }

    fn parse_file(&mut self, path: &Path, filename: &str) -> Result<FileOutcome, FactError> {
        if !self.selector.is_empty() && !self.selector.contains(filename) {
            return Ok(FileOutcome::Skipped(SkipReason::NotSelected));
        }

        if let Some(limit) = self.config.walk.max_file_size {
            let size = fs::metadata(path).map_err(|e| FactError::io(path, e))?.len();
            if size > limit {
                warn!(file = filename, size, limit, "File too large, skipped");
                return Ok(FileOutcome::Skipped(SkipReason::TooLarge { size }));
            }
        }

        let bytes = fs::read(path).map_err(|e| FactError::io(path, e))?;
        let Ok(source) = String::from_utf8(bytes) else {
            warn!(file = filename, "File is not valid UTF-8, skipped");
            return Ok(FileOutcome::Skipped(SkipReason::NotUtf8));
        };

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let grammar = self.front_end.grammar_for(extension);
        let Some(tree) = parse_tree(&grammar, self.front_end.language_name(), &source)? else {
            warn!(file = filename, "Parser produced no tree, skipped");
            return Ok(FileOutcome::Skipped(SkipReason::NoTree));
        };

        let diagnostics = diagnose(&tree);
        if let Some((line, column)) = diagnostics.first_error {
            if self.config.parse.syntax_errors == SyntaxErrorPolicy::Skip {
                warn!(
                    file = filename,
                    line = line + 1,
                    column = column + 1,
                    errors = diagnostics.errors,
                    "Syntax error, file skipped"
                );
                return Ok(FileOutcome::Skipped(SkipReason::SyntaxError { line, column }));
            }
            warn!(
                file = filename,
                line = line + 1,
                column = column + 1,
                errors = diagnostics.errors,
                "Syntax error, walking the recovered tree"
            );
        } else if diagnostics.missing > 0 {
            warn!(
                file = filename,
                missing = diagnostics.missing,
                "Parser recovered from missing tokens"
            );
        }

        self.flush_pending()?;
        let file_key = self.keys.next_key();
        let (parent, older) = self.adopt(&file_key);
        self.emit_framing("file", &file_key, &parent, older, filename, true)?;

        let walker = TreeWalker::new(
            self.front_end,
            &source,
            filename,
            &mut self.keys,
            &mut *self.emitter,
        )
        .with_max_depth(self.config.parse.max_depth);

        match walker.walk(tree.root_node(), &file_key) {
            Ok(walked) => {
                self.stats.facts += walked.facts;
                self.stats.unhandled_nodes += walked.unhandled;
            }
            Err(WalkError::TooDeep { depth, stats }) => {
                warn!(file = filename, depth, "Syntax tree too deep, remaining nodes skipped");
                self.stats.facts += stats.facts;
                self.stats.unhandled_nodes += stats.unhandled;
                self.stats.files_incomplete += 1;
            }
            Err(WalkError::Fatal(e)) => return Err(e),
        }
        Ok(FileOutcome::Parsed)
    }

    /// Emit every directory on the stack that has not been emitted yet.
    fn flush_pending(&mut self) -> Result<(), FactError> {
        for index in 1..self.stack.len() {
            if self.stack[index].emitted {
                continue;
            }
            let key = self.stack[index].siblings.key().to_string();
            let filename = self.stack[index].filename.clone();
            let parent = self.stack[index - 1].siblings.key().to_string();
            let older = self.stack[index - 1].siblings.adopt(&key);

            self.emit_framing("dir", &key, &parent, older, &filename, false)?;
            self.stack[index].emitted = true;
            self.stats.dirs_emitted += 1;
        }
        Ok(())
    }

    /// Record `key` under the innermost frame; returns its parent key and elder siblings.
    fn adopt(&mut self, key: &str) -> (String, Vec<String>) {
        match self.stack.last_mut() {
            Some(frame) => (frame.siblings.key().to_string(), frame.siblings.adopt(key)),
            None => (String::new(), Vec::new()),
        }
    }

    fn emit_framing(
        &mut self,
        kind: &str,
        key: &str,
        parent_key: &str,
        older_siblings: Vec<String>,
        filename: &str,
        orderable: bool,
    ) -> Result<(), FactError> {
        let naming = self.front_end.type_naming();
        let properties: BTreeMap<_, _> = make_common_properties(naming, filename, Span::zero());
        let fact = Fact {
            common_kind: self.front_end.normalizer().common_kind(kind).as_str().to_string(),
            kind: Kind::new(kind, self.front_end.namespace(), orderable),
            key: key.to_string(),
            parent_key: parent_key.to_string(),
            older_siblings,
            properties,
        };
        self.emitter.emit(fact)?;
        self.stats.facts += 1;
        Ok(())
    }
}

fn join(relative: &str, name: &str) -> String {
    if relative.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", relative, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_normalisation() {
        let selector = normalize_selector(&[
            "a.php".to_string(),
            "./b.php".to_string(),
            "sub\\c.php".to_string(),
        ]);
        assert!(selector.contains("./a.php"));
        assert!(selector.contains("./b.php"));
        assert!(selector.contains("./sub/c.php"));
    }

    #[test]
    fn test_relative_filename() {
        assert_eq!(relative_filename(""), ".");
        assert_eq!(relative_filename("src"), "./src");
        assert_eq!(relative_filename("./src/a.ts"), "./src/a.ts");
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a", "b"), "a/b");
    }
}

//! Source scanning for the layering rules in `architecture_contract_tests`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One offending source line.
pub struct Hit {
    pub file: String,
    pub line: usize,
    pub text: String,
}

impl fmt::Debug for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.text.trim())
    }
}

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn display_path(path: &Path) -> String {
    let root = crate_root();
    path.strip_prefix(&root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// All `.rs` files under `dir` (relative to the crate root), sorted.
fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let mut pending = vec![crate_root().join(dir)];
    let mut files = Vec::new();

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()));
        for entry in entries {
            let path = entry.expect("directory entry").path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

fn lines_of(path: &Path) -> Vec<(usize, String)> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.to_string()))
        .collect()
}

/// Code lines under `dir` mentioning any of `needles`. Comment lines are
/// skipped so docs may name the layers they stay away from.
pub fn code_mentioning(dir: &str, needles: &[&str]) -> Vec<Hit> {
    code_mentioning_outside(dir, needles, &[])
}

/// Like [`code_mentioning`], ignoring the files listed in `allowed`.
pub fn code_mentioning_outside(dir: &str, needles: &[&str], allowed: &[&str]) -> Vec<Hit> {
    let mut hits = Vec::new();
    for path in rust_sources(dir) {
        let file = display_path(&path);
        if allowed.contains(&file.as_str()) {
            continue;
        }
        for (line, text) in lines_of(&path) {
            if text.trim_start().starts_with("//") {
                continue;
            }
            if needles.iter().any(|needle| text.contains(needle)) {
                hits.push(Hit {
                    file: file.clone(),
                    line,
                    text,
                });
            }
        }
    }
    hits
}

/// Lines in `mod.rs` files that are neither module declarations, `#[cfg]`
/// gates, comments nor blank.
pub fn mod_rs_with_code(dir: &str) -> Vec<Hit> {
    rust_sources(dir)
        .into_iter()
        .filter(|path| path.file_name().is_some_and(|name| name == "mod.rs"))
        .flat_map(|path| {
            let file = display_path(&path);
            lines_of(&path)
                .into_iter()
                .filter(|(_, text)| {
                    let text = text.trim();
                    !(text.is_empty()
                        || text.starts_with("//")
                        || text.starts_with("pub mod ")
                        || text.starts_with("mod ")
                        || text.starts_with("#[cfg"))
                })
                .map(move |(line, text)| Hit {
                    file: file.clone(),
                    line,
                    text,
                })
        })
        .collect()
}

/// Contents of a file relative to the crate root.
pub fn source(relative: &str) -> String {
    fs::read_to_string(crate_root().join(relative))
        .unwrap_or_else(|e| panic!("cannot read {relative}: {e}"))
}

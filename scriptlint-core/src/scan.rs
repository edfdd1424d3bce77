//! Parallel, deterministic discovery of JavaScript sources with early
//! directory pruning.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories to exclude by default.
const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "coverage"];

/// Extensions accepted as lintable JavaScript.
const JS_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Checks if a directory entry should be pruned (excluded from traversal).
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn is_js_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| JS_EXTENSIONS.contains(&ext))
}

/// Gathers all JavaScript files recursively starting from the root path.
///
/// `filter_entry` prunes excluded subtrees before iteration; the
/// remaining entries are processed in parallel.
pub fn gather_js_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_js_files_with_excludes(root, &[])
}

/// Gathers JavaScript files with custom exclusion patterns combined with
/// the defaults.
pub fn gather_js_files_with_excludes(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if is_js_file(path) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .context(format!(
            "Failed to gather JavaScript files from {}",
            root.display()
        ))?;

    // par_bridge yields in nondeterministic order.
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn setup_tree(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("scriptlint_scan_test")
            .join(format!("{name}_{id}"));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_gathers_js_extensions_only() {
        let dir = setup_tree("extensions");
        write_file(&dir.join("app.js"), "let a = 1;");
        write_file(&dir.join("lib.mjs"), "let b = 2;");
        write_file(&dir.join("notes.txt"), "not code");

        let files = gather_js_files(&dir).unwrap();
        assert_eq!(files.len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_node_modules_pruned() {
        let dir = setup_tree("pruning");
        write_file(&dir.join("index.js"), "let a = 1;");
        write_file(&dir.join("node_modules/dep/index.js"), "let b = 2;");

        let files = gather_js_files(&dir).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("index.js"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_custom_excludes() {
        let dir = setup_tree("custom");
        write_file(&dir.join("src/a.js"), "");
        write_file(&dir.join("vendor/b.js"), "");

        let files = gather_js_files_with_excludes(&dir, &["vendor"]).unwrap();
        assert_eq!(files.len(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_output_is_sorted() {
        let dir = setup_tree("sorted");
        write_file(&dir.join("z.js"), "");
        write_file(&dir.join("a.js"), "");
        write_file(&dir.join("m/n.js"), "");

        let files = gather_js_files(&dir).unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);

        fs::remove_dir_all(&dir).ok();
    }
}

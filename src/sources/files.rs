//! Producer that indexes the files below a directory.

use crate::index::{IndexEntry, StandardItem};
use ignore::WalkBuilder;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-directory file of gitignore-style patterns excluded from the index.
pub const IGNORE_FILE: &str = ".catalogueignore";

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~` component, or systems without a home
/// directory, are returned unchanged.
pub fn expand_tilde(path: &Path) -> Cow<'_, Path> {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        if stripped.as_os_str().is_empty() {
            return Cow::Owned(home);
        }
        return Cow::Owned(home.join(stripped));
    }
    Cow::Borrowed(path)
}

/// Indexes every regular file below `root`.
///
/// Each file becomes one item whose id is its path relative to `root`. The
/// item is reachable by its file name and, when it has an extension, by its
/// stem too, so `notes.txt` also matches the query `notes`.
///
/// `.gitignore` and `.ignore` files are not consulted; only hidden entries and
/// patterns listed in an [`IGNORE_FILE`] are skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    max_depth: Option<usize>,
    include_hidden: bool,
}

impl FileSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: expand_tilde(root.as_ref()).into_owned(),
            max_depth: None,
            include_hidden: false,
        }
    }

    /// Limit recursion; depth 1 only looks at the direct children of `root`.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    #[must_use]
    pub const fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and build the entries.
    ///
    /// `cancel` is checked once per directory entry; once it is set the walk
    /// stops and whatever was collected so far is returned. Entries that cannot
    /// be read are skipped.
    pub fn scan(&self, cancel: &AtomicBool) -> Vec<IndexEntry> {
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .hidden(!self.include_hidden)
            .add_custom_ignore_filename(IGNORE_FILE)
            .max_depth(self.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut entries = Vec::new();
        for result in walker {
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!(
                    "Scan of {} cancelled after {} entries",
                    self.root.display(),
                    entries.len()
                );
                break;
            }

            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(name) = path.file_name().and_then(OsStr::to_str) else {
                tracing::debug!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            };

            let item = StandardItem::new(relative_id(&self.root, path), name)
                .with_subtext(path.display().to_string())
                .into_ref();
            entries.push(IndexEntry::new(Arc::clone(&item), name));

            if let Some(stem) = path.file_stem().and_then(OsStr::to_str)
                && !stem.is_empty()
                && stem != name
            {
                entries.push(IndexEntry::new(item, stem));
            }
        }
        entries
    }

    /// Turn this source into a producer closure for a background executor.
    pub fn into_producer(self) -> impl Fn(&AtomicBool) -> Vec<IndexEntry> + Send + Sync + 'static {
        move |cancel| self.scan(cancel)
    }
}

/// `/`-separated path of `path` below `root`.
fn relative_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Item;
    use assert2::check;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("notes.txt"), "").unwrap();
        std::fs::write(root.join("Makefile"), "").unwrap();
        std::fs::write(root.join(".hidden"), "").unwrap();
        std::fs::create_dir_all(root.join("sub/deep")).unwrap();
        std::fs::write(root.join("sub/deep/readme.md"), "").unwrap();
        dir
    }

    fn ids(entries: &[IndexEntry]) -> Vec<&str> {
        let mut ids: Vec<&str> = entries.iter().map(|e| e.item().id()).collect();
        ids.dedup();
        ids
    }

    #[rstest]
    fn test_scan_indexes_files(tree: TempDir) {
        let source = FileSource::new(tree.path());
        let entries = source.scan(&AtomicBool::new(false));

        check!(ids(&entries) == ["Makefile", "notes.txt", "sub/deep/readme.md"]);
        let strings: Vec<&str> = entries.iter().map(IndexEntry::string).collect();
        check!(strings == ["Makefile", "notes.txt", "notes", "readme.md", "readme"]);
    }

    #[rstest]
    fn test_stem_entry_shares_item(tree: TempDir) {
        let entries = FileSource::new(tree.path()).scan(&AtomicBool::new(false));
        let notes: Vec<&IndexEntry> = entries
            .iter()
            .filter(|e| e.item().id() == "notes.txt")
            .collect();

        check!(notes.len() == 2);
        check!(Arc::ptr_eq(notes[0].item(), notes[1].item()));
        check!(notes[0].item().text() == "notes.txt");
    }

    #[rstest]
    fn test_max_depth_and_hidden(tree: TempDir) {
        let shallow = FileSource::new(tree.path()).with_max_depth(1);
        check!(ids(&shallow.scan(&AtomicBool::new(false))) == ["Makefile", "notes.txt"]);

        let hidden = FileSource::new(tree.path())
            .with_max_depth(1)
            .with_hidden(true);
        check!(ids(&hidden.scan(&AtomicBool::new(false))) == [".hidden", "Makefile", "notes.txt"]);
    }

    #[rstest]
    fn test_only_own_ignore_file_applies(tree: TempDir) {
        let root = tree.path();
        std::fs::write(root.join(".ignore"), "notes.txt\n").unwrap();
        std::fs::write(root.join(".gitignore"), "Makefile\n").unwrap();
        std::fs::write(root.join("sub").join(IGNORE_FILE), "*.md\n").unwrap();
        std::fs::write(root.join("sub/deep/todo.txt"), "").unwrap();

        let entries = FileSource::new(root).scan(&AtomicBool::new(false));
        check!(ids(&entries) == ["Makefile", "notes.txt", "sub/deep/todo.txt"]);
    }

    #[rstest]
    fn test_cancelled_scan_stops_early(tree: TempDir) {
        let entries = FileSource::new(tree.path()).scan(&AtomicBool::new(true));
        check!(entries.is_empty());
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let source = FileSource::new(dir.path().join("does-not-exist"));
        check!(source.scan(&AtomicBool::new(false)).is_empty());
    }

    #[test]
    fn test_expand_tilde() {
        let plain = Path::new("/tmp/x");
        check!(expand_tilde(plain) == Path::new("/tmp/x"));
        check!(expand_tilde(Path::new("~user/x")) == Path::new("~user/x"));

        if let Some(home) = dirs::home_dir() {
            check!(expand_tilde(Path::new("~")) == home.as_path());
            check!(expand_tilde(Path::new("~/docs")) == home.join("docs").as_path());
        }
    }

    #[test]
    fn test_relative_id() {
        check!(relative_id(Path::new("/a"), Path::new("/a/b/c.txt")) == "b/c.txt");
        check!(relative_id(Path::new("/a"), Path::new("/elsewhere/c.txt")) == "elsewhere/c.txt");
    }
}

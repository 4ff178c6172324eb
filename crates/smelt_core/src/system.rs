//! Filesystem capability used for addon discovery, root-file enumeration and
//! writing outputs.
//!
//! Everything the pipeline touches on disk goes through [`System`], so tests
//! and in-memory hosts can swap in [`MemorySystem`].

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// One entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    /// The entry's file name.
    pub name: String,
    /// The entry's full path.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// File existence, read, write and directory-listing capability.
pub trait System: Send + Sync {
    /// Returns `true` if `path` is an existing file.
    fn file_exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is an existing directory.
    fn directory_exists(&self, path: &Path) -> bool;

    /// Reads a UTF-8 file.
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Writes a file, creating missing parent directories.
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Creates a directory and all missing ancestors.
    fn create_directory(&self, path: &Path) -> io::Result<()>;

    /// Lists a directory, sorted by entry name.
    fn read_directory(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Returns the working directory relative paths are resolved against.
    fn current_directory(&self) -> PathBuf;

    /// Resolves `path` against the working directory and normalizes it lexically.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.current_directory().join(path))
        }
    }
}

/// Normalizes `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root; a leading `..` of a relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Recursively collects every file below `dir` accepted by `filter`, sorted.
///
/// A missing or unreadable directory yields no files.
pub fn recursive_find_by_filter(
    system: &dyn System,
    dir: &Path,
    filter: impl Fn(&Path) -> bool,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_files(system, dir, &filter, &mut files);
    files.sort();
    files
}

fn collect_files(
    system: &dyn System,
    dir: &Path,
    filter: &dyn Fn(&Path) -> bool,
    out: &mut Vec<PathBuf>,
) {
    let entries = match system.read_directory(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries {
        if entry.is_dir {
            collect_files(system, &entry.path, filter, out);
        } else if filter(&entry.path) {
            out.push(entry.path);
        }
    }
}

/// The real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSystem;

impl System for OsSystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_directory(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn current_directory(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

#[derive(Clone, Debug)]
enum Node {
    File(String),
    Dir,
}

/// An in-memory filesystem rooted at `/`.
///
/// Paths are resolved against the working directory and normalized, so
/// `./addons/zip` and `/addons/zip` name the same entry.
pub struct MemorySystem {
    cwd: PathBuf,
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
}

impl MemorySystem {
    /// Creates an empty filesystem whose working directory is `/`.
    pub fn new() -> Self {
        Self::with_cwd("/")
    }

    /// Creates an empty filesystem with the given absolute working directory.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        let cwd = normalize_path(&Path::new("/").join(cwd.into()));
        let system = Self {
            cwd: cwd.clone(),
            nodes: RwLock::new(BTreeMap::new()),
        };
        system.insert_dirs(&cwd);
        system
    }

    fn insert_dirs(&self, dir: &Path) {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    fn node(&self, path: &Path) -> Option<Node> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes.get(&self.resolve_path(path)).cloned()
    }
}

impl Default for MemorySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MemorySystem {
    fn file_exists(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::File(_)))
    }

    fn directory_exists(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::Dir))
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        match self.node(path) {
            Some(Node::File(content)) => Ok(content),
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )),
        }
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        let path = self.resolve_path(path);
        if matches!(self.node(&path), Some(Node::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        nodes.insert(path, Node::File(content.to_string()));
        Ok(())
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        let path = self.resolve_path(path);
        if matches!(self.node(&path), Some(Node::File(_))) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ));
        }
        self.insert_dirs(&path);
        Ok(())
    }

    fn read_directory(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let dir = self.resolve_path(path);
        if !self.directory_exists(&dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            ));
        }
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        // BTreeMap order keeps the listing sorted by name.
        let entries = nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(dir.as_path()))
            .map(|(p, node)| DirEntry {
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: p.clone(),
                is_dir: matches!(node, Node::Dir),
            })
            .collect();
        Ok(entries)
    }

    fn current_directory(&self) -> PathBuf {
        self.cwd.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_dots() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_path(Path::new("./addons")), PathBuf::from("addons"));
    }

    #[test]
    fn memory_write_then_read() {
        let sys = MemorySystem::new();
        sys.write_file(Path::new("./addons/zip/addon.toml"), "banner = \"x\"")
            .unwrap();

        assert!(sys.file_exists(Path::new("/addons/zip/addon.toml")));
        assert!(sys.directory_exists(Path::new("/addons/zip")));
        assert!(sys.directory_exists(Path::new("addons")));
        assert_eq!(
            sys.read_file(Path::new("addons/zip/addon.toml")).unwrap(),
            "banner = \"x\""
        );
    }

    #[test]
    fn memory_missing_file_is_not_found() {
        let sys = MemorySystem::new();
        let err = sys.read_file(Path::new("nope.ts")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_listing_is_sorted_and_shallow() {
        let sys = MemorySystem::new();
        sys.write_file(Path::new("/d/zeta.ts"), "").unwrap();
        sys.write_file(Path::new("/d/alpha.ts"), "").unwrap();
        sys.write_file(Path::new("/d/sub/deep.ts"), "").unwrap();

        let entries = sys.read_directory(Path::new("/d")).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.ts", "sub", "zeta.ts"]);
        assert!(entries[1].is_dir);
    }

    #[test]
    fn memory_cwd_resolution() {
        let sys = MemorySystem::with_cwd("/work");
        sys.write_file(Path::new("src/one.ts"), "1").unwrap();
        assert!(sys.file_exists(Path::new("/work/src/one.ts")));
        assert_eq!(sys.resolve_path(Path::new("../x")), PathBuf::from("/x"));
    }

    #[test]
    fn memory_cannot_write_over_directory() {
        let sys = MemorySystem::new();
        sys.create_directory(Path::new("/out")).unwrap();
        assert!(sys.write_file(Path::new("/out"), "x").is_err());
    }

    #[test]
    fn recursive_find_filters_and_sorts() {
        let sys = MemorySystem::new();
        sys.write_file(Path::new("/p/src/b.ts"), "").unwrap();
        sys.write_file(Path::new("/p/src/nested/a.tsx"), "").unwrap();
        sys.write_file(Path::new("/p/src/readme.md"), "").unwrap();

        let found = recursive_find_by_filter(&sys, Path::new("/p/src"), |p| {
            p.extension().is_some_and(|e| e == "ts" || e == "tsx")
        });
        assert_eq!(
            found,
            vec![
                PathBuf::from("/p/src/b.ts"),
                PathBuf::from("/p/src/nested/a.tsx"),
            ]
        );
    }

    #[test]
    fn recursive_find_missing_dir_is_empty() {
        let sys = MemorySystem::new();
        assert!(recursive_find_by_filter(&sys, Path::new("/none"), |_| true).is_empty());
    }

    #[test]
    fn os_system_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sys = OsSystem;
        let file = dir.path().join("nested/out.ts");

        sys.write_file(&file, "export {};").unwrap();
        assert!(sys.file_exists(&file));
        assert!(sys.directory_exists(&dir.path().join("nested")));
        assert_eq!(sys.read_file(&file).unwrap(), "export {};");

        let entries = sys.read_directory(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "nested");
        assert!(entries[0].is_dir);
    }
}

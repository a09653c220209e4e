//! The virtual filesystem trait and an in-memory reference implementation
//! (`spec.md` §6 "Filesystem adapter"; Non-goal: this crate does not ship a
//! real-OS-backed implementation, only the trait and the in-memory one used
//! for hermetic execution and tests).

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// File permission bits. Default is `0o644` for regular files, `0o755` for
/// directories (set by [`InMemoryFileSystem::mkdir`]), matching the
/// teacher's `Mode` default.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Mode(pub u32);

impl Default for Mode {
    fn default() -> Self {
        Mode(0o644)
    }
}

/// What kind of node a path names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
}

/// Result of `stat`/`lstat`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Metadata {
    pub file_type: FileType,
    pub mode: Mode,
    pub len: u64,
    /// Modification time, as a caller-supplied opaque timestamp (this
    /// interpreter has no wall clock of its own — see `spec.md` §5 on
    /// determinism); `utimes` is how callers set it.
    pub mtime: u64,
}

/// Errors a filesystem operation can report, mapped to POSIX-like exit
/// statuses by the executor (`spec.md` §7).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FsError {
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("is a directory: {}", .0.display())]
    IsDir(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotDir(PathBuf),
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("directory not empty: {}", .0.display())]
    NotEmpty(PathBuf),
    #[error("too many levels of symbolic links: {}", .0.display())]
    LoopDetected(PathBuf),
    #[error("invalid argument for {}", .0.display())]
    InvalidArgument(PathBuf),
}

pub type FsResult<T> = Result<T, FsError>;

/// Options controlling [`FileSystem::write_file`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WriteOptions {
    pub append: bool,
    pub truncate: bool,
    pub create_new: bool,
}

/// Options controlling [`FileSystem::rm`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RmOptions {
    pub recursive: bool,
    pub force: bool,
}

/// The trait the interpreter core consumes for all filesystem access
/// (`spec.md` §6). External implementers (a sandboxed real-OS adapter, a
/// network-backed one, …) are out of this crate's scope; only the trait and
/// the in-memory reference implementation live here.
pub trait FileSystem: std::fmt::Debug {
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>>;
    fn write_file(&self, path: &Path, bytes: &[u8], options: WriteOptions) -> FsResult<()>;
    fn stat(&self, path: &Path) -> FsResult<Metadata>;
    fn lstat(&self, path: &Path) -> FsResult<Metadata>;
    fn readdir(&self, path: &Path) -> FsResult<Vec<String>>;
    fn symlink(&self, target: &Path, link: &Path) -> FsResult<()>;
    fn readlink(&self, path: &Path) -> FsResult<PathBuf>;
    fn realpath(&self, path: &Path) -> FsResult<PathBuf>;
    fn mkdir(&self, path: &Path, recursive: bool) -> FsResult<()>;
    fn rm(&self, path: &Path, options: RmOptions) -> FsResult<()>;
    fn chmod(&self, path: &Path, mode: Mode) -> FsResult<()>;
    fn utimes(&self, path: &Path, mtime: u64) -> FsResult<()>;
    fn exists(&self, path: &Path) -> bool;

    /// Default implementation in terms of `read_file`/`write_file`; override
    /// for a more efficient in-place copy.
    fn cp(&self, src: &Path, dst: &Path, recursive: bool) -> FsResult<()> {
        let meta = self.lstat(src)?;
        if meta.file_type == FileType::Directory {
            if !recursive {
                return Err(FsError::IsDir(src.to_path_buf()));
            }
            self.mkdir(dst, true)?;
            for name in self.readdir(src)? {
                self.cp(&src.join(&name), &dst.join(&name), true)?;
            }
            return Ok(());
        }
        let bytes = self.read_file(src)?;
        self.write_file(
            dst,
            &bytes,
            WriteOptions {
                truncate: true,
                ..Default::default()
            },
        )
    }

    /// Default implementation as copy-then-remove; override for an atomic
    /// rename.
    fn mv(&self, src: &Path, dst: &Path) -> FsResult<()> {
        self.cp(src, dst, true)?;
        self.rm(
            src,
            RmOptions {
                recursive: true,
                force: true,
            },
        )
    }
}

#[derive(Clone, Debug)]
struct Node {
    file_type: FileType,
    content: Vec<u8>,
    mode: Mode,
    mtime: u64,
    /// For `FileType::Symlink` nodes, the link target.
    link_target: Option<PathBuf>,
}

impl Node {
    fn new_regular() -> Self {
        Node {
            file_type: FileType::Regular,
            content: Vec::new(),
            mode: Mode::default(),
            mtime: 0,
            link_target: None,
        }
    }

    fn new_directory() -> Self {
        Node {
            file_type: FileType::Directory,
            content: Vec::new(),
            mode: Mode(0o755),
            mtime: 0,
            link_target: None,
        }
    }
}

/// A flat-namespace, `HashMap`-backed in-memory filesystem: paths are keys,
/// not nodes in a real tree, matching the teacher's `virtual_system`
/// approach (`file_system.rs`'s `FileSystem(HashMap<PathBuf, Rc<RefCell<
/// INode>>>)`) except that directory entries are tracked explicitly so
/// `readdir` has something to enumerate.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFileSystem {
    nodes: RefCell<HashMap<PathBuf, Rc<RefCell<Node>>>>,
}

impl InMemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        let fs = InMemoryFileSystem::default();
        fs.nodes
            .borrow_mut()
            .insert(PathBuf::from("/"), Rc::new(RefCell::new(Node::new_directory())));
        fs
    }

    fn parent_must_be_dir(&self, path: &Path) -> FsResult<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        let nodes = self.nodes.borrow();
        match nodes.get(parent) {
            Some(node) if node.borrow().file_type == FileType::Directory => Ok(()),
            Some(_) => Err(FsError::NotDir(parent.to_path_buf())),
            None => Err(FsError::NotFound(parent.to_path_buf())),
        }
    }

    fn get(&self, path: &Path) -> FsResult<Rc<RefCell<Node>>> {
        self.nodes
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
    }

    fn metadata_of(node: &Node) -> Metadata {
        Metadata {
            file_type: node.file_type,
            mode: node.mode,
            len: node.content.len() as u64,
            mtime: node.mtime,
        }
    }

    /// Follows symlinks (bounded, to avoid an infinite loop on a cycle).
    fn resolve(&self, path: &Path) -> FsResult<(PathBuf, Rc<RefCell<Node>>)> {
        let mut current = path.to_path_buf();
        for _ in 0..40 {
            let node = self.get(&current)?;
            let target = {
                let borrowed = node.borrow();
                if borrowed.file_type != FileType::Symlink {
                    return Ok((current, node.clone()));
                }
                borrowed.link_target.clone().expect("symlink has a target")
            };
            current = if target.is_absolute() {
                target
            } else {
                current.parent().unwrap_or(Path::new("/")).join(target)
            };
        }
        Err(FsError::LoopDetected(path.to_path_buf()))
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        let (_, node) = self.resolve(path)?;
        let node = node.borrow();
        if node.file_type == FileType::Directory {
            return Err(FsError::IsDir(path.to_path_buf()));
        }
        Ok(node.content.clone())
    }

    fn write_file(&self, path: &Path, bytes: &[u8], options: WriteOptions) -> FsResult<()> {
        if options.create_new && self.exists(path) {
            return Err(FsError::AlreadyExists(path.to_path_buf()));
        }
        self.parent_must_be_dir(path)?;
        let mut nodes = self.nodes.borrow_mut();
        let entry = nodes
            .entry(path.to_path_buf())
            .or_insert_with(|| Rc::new(RefCell::new(Node::new_regular())));
        let mut node = entry.borrow_mut();
        if node.file_type == FileType::Directory {
            return Err(FsError::IsDir(path.to_path_buf()));
        }
        if options.append {
            node.content.extend_from_slice(bytes);
        } else {
            node.content = bytes.to_vec();
        }
        Ok(())
    }

    fn stat(&self, path: &Path) -> FsResult<Metadata> {
        let (_, node) = self.resolve(path)?;
        Ok(Self::metadata_of(&node.borrow()))
    }

    fn lstat(&self, path: &Path) -> FsResult<Metadata> {
        let node = self.get(path)?;
        Ok(Self::metadata_of(&node.borrow()))
    }

    fn readdir(&self, path: &Path) -> FsResult<Vec<String>> {
        let (resolved, node) = self.resolve(path)?;
        if node.borrow().file_type != FileType::Directory {
            return Err(FsError::NotDir(path.to_path_buf()));
        }
        let nodes = self.nodes.borrow();
        let mut names: Vec<String> = nodes
            .keys()
            .filter_map(|candidate| {
                let parent = candidate.parent()?;
                if parent != resolved.as_path() || candidate.as_path() == resolved.as_path() {
                    return None;
                }
                candidate.file_name().map(|name| name.to_string_lossy().into_owned())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn symlink(&self, target: &Path, link: &Path) -> FsResult<()> {
        if self.exists(link) {
            return Err(FsError::AlreadyExists(link.to_path_buf()));
        }
        self.parent_must_be_dir(link)?;
        let mut node = Node::new_regular();
        node.file_type = FileType::Symlink;
        node.link_target = Some(target.to_path_buf());
        self.nodes.borrow_mut().insert(link.to_path_buf(), Rc::new(RefCell::new(node)));
        Ok(())
    }

    fn readlink(&self, path: &Path) -> FsResult<PathBuf> {
        let node = self.get(path)?;
        let node = node.borrow();
        node.link_target
            .clone()
            .ok_or_else(|| FsError::InvalidArgument(path.to_path_buf()))
    }

    fn realpath(&self, path: &Path) -> FsResult<PathBuf> {
        let (resolved, _) = self.resolve(path)?;
        Ok(resolved)
    }

    fn mkdir(&self, path: &Path, recursive: bool) -> FsResult<()> {
        if self.exists(path) {
            return if recursive {
                Ok(())
            } else {
                Err(FsError::AlreadyExists(path.to_path_buf()))
            };
        }
        if recursive {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !self.exists(parent) {
                    self.mkdir(parent, true)?;
                }
            }
        } else {
            self.parent_must_be_dir(path)?;
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::new(RefCell::new(Node::new_directory())));
        Ok(())
    }

    fn rm(&self, path: &Path, options: RmOptions) -> FsResult<()> {
        let node = match self.get(path) {
            Ok(node) => node,
            Err(e) if options.force => return if matches!(&e, FsError::NotFound(_)) { Ok(()) } else { Err(e) },
            Err(e) => return Err(e),
        };
        if node.borrow().file_type == FileType::Directory {
            let children = self.readdir(path)?;
            if !children.is_empty() && !options.recursive {
                return Err(FsError::NotEmpty(path.to_path_buf()));
            }
            for child in children {
                self.rm(&path.join(child), options)?;
            }
        }
        self.nodes.borrow_mut().remove(path);
        Ok(())
    }

    fn chmod(&self, path: &Path, mode: Mode) -> FsResult<()> {
        let node = self.get(path)?;
        node.borrow_mut().mode = mode;
        Ok(())
    }

    fn utimes(&self, path: &Path, mtime: u64) -> FsResult<()> {
        let node = self.get(path)?;
        node.borrow_mut().mtime = mtime;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/foo"), b"hello", WriteOptions { truncate: true, ..Default::default() })
            .unwrap();
        assert_eq!(fs.read_file(Path::new("/foo")).unwrap(), b"hello");
    }

    #[test]
    fn reading_a_missing_file_is_not_found() {
        let fs = InMemoryFileSystem::new();
        assert_eq!(fs.read_file(Path::new("/nope")), Err(FsError::NotFound(PathBuf::from("/nope"))));
    }

    #[test]
    fn mkdir_then_readdir_lists_children() {
        let fs = InMemoryFileSystem::new();
        fs.mkdir(Path::new("/dir"), false).unwrap();
        fs.write_file(Path::new("/dir/a"), b"1", WriteOptions { truncate: true, ..Default::default() }).unwrap();
        fs.write_file(Path::new("/dir/b"), b"2", WriteOptions { truncate: true, ..Default::default() }).unwrap();
        assert_eq!(fs.readdir(Path::new("/dir")).unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn rm_non_empty_dir_without_recursive_fails() {
        let fs = InMemoryFileSystem::new();
        fs.mkdir(Path::new("/dir"), false).unwrap();
        fs.write_file(Path::new("/dir/a"), b"1", WriteOptions { truncate: true, ..Default::default() }).unwrap();
        assert!(fs.rm(Path::new("/dir"), RmOptions::default()).is_err());
        fs.rm(Path::new("/dir"), RmOptions { recursive: true, ..Default::default() }).unwrap();
        assert!(!fs.exists(Path::new("/dir")));
    }

    #[test]
    fn symlink_resolves_through_readlink_and_read_file() {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/target"), b"data", WriteOptions { truncate: true, ..Default::default() }).unwrap();
        fs.symlink(Path::new("/target"), Path::new("/link")).unwrap();
        assert_eq!(fs.readlink(Path::new("/link")).unwrap(), PathBuf::from("/target"));
        assert_eq!(fs.read_file(Path::new("/link")).unwrap(), b"data");
    }

    #[test]
    fn cp_recursive_copies_a_directory_tree() {
        let fs = InMemoryFileSystem::new();
        fs.mkdir(Path::new("/src"), false).unwrap();
        fs.write_file(Path::new("/src/a"), b"1", WriteOptions { truncate: true, ..Default::default() }).unwrap();
        fs.cp(Path::new("/src"), Path::new("/dst"), true).unwrap();
        assert_eq!(fs.read_file(Path::new("/dst/a")).unwrap(), b"1");
    }

    #[test]
    fn mv_moves_a_file() {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/a"), b"1", WriteOptions { truncate: true, ..Default::default() }).unwrap();
        fs.mv(Path::new("/a"), Path::new("/b")).unwrap();
        assert!(!fs.exists(Path::new("/a")));
        assert_eq!(fs.read_file(Path::new("/b")).unwrap(), b"1");
    }

    #[test]
    fn create_new_on_an_existing_file_fails() {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/a"), b"1", WriteOptions { truncate: true, ..Default::default() }).unwrap();
        let result = fs.write_file(Path::new("/a"), b"2", WriteOptions { create_new: true, ..Default::default() });
        assert_eq!(result, Err(FsError::AlreadyExists(PathBuf::from("/a"))));
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Filesystem primitives the manifest writer needs.
///
/// Bundlers may write to disk or to an in-memory volume (dev servers), so the writer never
/// touches `std::fs` directly.
pub trait OutputFileSystem: Send + Sync {
  /// Create `path` and all missing parents.
  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Read a UTF-8 file.
  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  /// Replace the contents of a file.
  fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

  /// Join a directory and a file name.
  fn join(&self, dir: &Path, file_name: &str) -> PathBuf {
    dir.join(file_name)
  }
}

/// Filesystem handle shared between the build hook and the write queue.
pub type SharedFileSystem = Arc<dyn OutputFileSystem>;

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl OutputFileSystem for DiskFileSystem {
  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    std::fs::write(path, contents)
  }
}

/// Volatile filesystem holding files in a map.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
  files: Mutex<BTreeMap<PathBuf, String>>,
  dirs: Mutex<BTreeSet<PathBuf>>,
}

impl MemoryFileSystem {
  /// Empty volume.
  pub fn new() -> Self {
    Self::default()
  }

  /// Contents of `path`, if written.
  pub fn contents(&self, path: &Path) -> Option<String> {
    self
      .files
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(path)
      .cloned()
  }

  /// Paths of every stored file.
  pub fn paths(&self) -> Vec<PathBuf> {
    self
      .files
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .keys()
      .cloned()
      .collect()
  }
}

impl OutputFileSystem for MemoryFileSystem {
  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    let mut dirs = self.dirs.lock().unwrap_or_else(PoisonError::into_inner);
    for ancestor in path.ancestors() {
      if ancestor.as_os_str().is_empty() {
        continue;
      }
      dirs.insert(ancestor.to_path_buf());
    }
    Ok(())
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    self.contents(path).ok_or_else(|| {
      io::Error::new(
        ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
      )
    })
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    let parent_exists = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => self
        .dirs
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(parent),
      _ => true,
    };
    if !parent_exists {
      return Err(io::Error::new(
        ErrorKind::NotFound,
        format!("parent directory of {} does not exist", path.display()),
      ));
    }

    self
      .files
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(path.to_path_buf(), contents.to_string());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn memory_write_requires_parent_directory() {
    let fs = MemoryFileSystem::new();
    let path = Path::new("/out/assets/manifest.json");

    let err = fs.write(path, "{}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    fs.create_dir_all(Path::new("/out/assets")).unwrap();
    fs.write(path, "{}").unwrap();
    assert_eq!(fs.read_to_string(path).unwrap(), "{}");
    assert_eq!(fs.paths(), vec![path.to_path_buf()]);
  }

  #[test]
  fn memory_read_of_missing_file_is_not_found() {
    let fs = MemoryFileSystem::new();
    let err = fs.read_to_string(Path::new("missing.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[test]
  fn disk_round_trips_through_nested_directories() {
    let temp = tempdir().unwrap();
    let fs = DiskFileSystem;
    let dir = temp.path().join("a/b");
    fs.create_dir_all(&dir).unwrap();

    let path = fs.join(&dir, "manifest.json");
    fs.write(&path, "{\"main\":{}}").unwrap();
    assert_eq!(fs.read_to_string(&path).unwrap(), "{\"main\":{}}");
  }
}

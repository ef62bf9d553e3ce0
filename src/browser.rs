use std::fs;
use std::path::{Path, PathBuf};

/// Picks the program image to run, or nothing if there is none.
pub trait ProgramSelector {
    fn select(&mut self) -> Option<PathBuf>;

    /// what to tell the user when `select` comes back empty
    fn empty_message(&self) -> String {
        "Program list is empty.".to_string()
    }
}

/// Chooses from a directory of images: the path given on the command line if
/// there is one, otherwise the first matching file by name.
pub struct DirectorySelector {
    dir: PathBuf,
    extension: String,
    explicit: Option<PathBuf>,
}

impl DirectorySelector {
    pub fn new(dir: impl Into<PathBuf>, extension: &str, explicit: Option<PathBuf>) -> Self {
        DirectorySelector {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
            explicit,
        }
    }

    /// every image in the directory, sorted by file name
    pub fn list(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), "cannot list program directory: {}", e);
                return Vec::new();
            }
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.matches(path))
            .collect();
        found.sort();
        found
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl ProgramSelector for DirectorySelector {
    fn select(&mut self) -> Option<PathBuf> {
        if let Some(path) = self.explicit.take() {
            return Some(path);
        }
        let found = self.list();
        tracing::debug!(count = found.len(), dir = %self.dir.display(), "program images found");
        found.into_iter().next()
    }

    fn empty_message(&self) -> String {
        format!(
            "Program list is empty. Please put *.{} files in {}.",
            self.extension,
            self.dir.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"image").unwrap();
    }

    #[test]
    fn test_first_match_by_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "zelda.nds");
        touch(dir.path(), "README.txt");
        touch(dir.path(), "Mario.NDS");
        fs::create_dir(dir.path().join("folder.nds")).unwrap();

        let mut sel = DirectorySelector::new(dir.path(), ".nds", None);
        assert_eq!(sel.list().len(), 2);
        assert_eq!(sel.select(), Some(dir.path().join("Mario.NDS")));
    }

    #[test]
    fn test_empty_or_missing_dir_selects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        let mut sel = DirectorySelector::new(dir.path(), "nds", None);
        assert_eq!(sel.select(), None);

        let mut missing = DirectorySelector::new(dir.path().join("nope"), "nds", None);
        assert_eq!(missing.select(), None);
        assert!(missing.empty_message().contains("*.nds"));
    }

    #[test]
    fn test_explicit_path_wins_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.nds");
        let mut sel = DirectorySelector::new(dir.path(), "nds", Some(PathBuf::from("other.bin")));
        assert_eq!(sel.select(), Some(PathBuf::from("other.bin")));
        assert_eq!(sel.select(), Some(dir.path().join("a.nds")));
    }
}

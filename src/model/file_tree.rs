use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileNode {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// What the cursor is on: an entry, or the empty space after the last entry.
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    Entry(&'a FileNode),
    Background,
}

/// One directory level, listed the way a file browser window shows it.
pub struct FileTree {
    dir: PathBuf,
    show_hidden: bool,
    pub nodes: Vec<FileNode>,
    /// `nodes.len()` selects the background row.
    pub selected: usize,
}

impl FileTree {
    pub fn new(dir: PathBuf, show_hidden: bool) -> Result<Self> {
        let mut tree = Self {
            dir,
            show_hidden,
            nodes: Vec::new(),
            selected: 0,
        };

        tree.refresh()?;
        Ok(tree)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn refresh(&mut self) -> Result<()> {
        let mut entries: Vec<FileNode> = WalkBuilder::new(&self.dir)
            .max_depth(Some(1))
            .standard_filters(false)
            .hidden(!self.show_hidden)
            .build()
            .flatten()
            .filter_map(|entry| {
                let path = entry.path().to_path_buf();
                if path == self.dir {
                    return None;
                }

                let metadata = entry.metadata().ok()?;
                let name = entry.file_name().to_str()?.to_string();
                if is_staging_file(&name) {
                    return None;
                }

                Some(FileNode {
                    path,
                    name,
                    is_dir: metadata.is_dir(),
                })
            })
            .collect();

        entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });

        self.nodes = entries;
        self.selected = self.selected.min(self.nodes.len());
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.nodes.len() + 1
    }

    pub fn move_selection(&mut self, delta: isize) {
        let max = self.nodes.len() as isize;
        let next = (self.selected as isize + delta).clamp(0, max);
        self.selected = next as usize;
    }

    pub fn selected_row(&self) -> Row<'_> {
        match self.nodes.get(self.selected) {
            Some(node) => Row::Entry(node),
            None => Row::Background,
        }
    }

    pub fn select_background(&mut self) {
        self.selected = self.nodes.len();
    }

    /// Move the cursor onto `path` if it is listed here. Returns whether it was.
    pub fn select_path(&mut self, path: &Path) -> bool {
        match self.nodes.iter().position(|node| node.path == path) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    /// Open the selected directory. Files and the background row are left alone.
    pub fn enter_selected(&mut self) -> Result<bool> {
        let Row::Entry(node) = self.selected_row() else {
            return Ok(false);
        };

        if !node.is_dir {
            return Ok(false);
        }

        self.change_dir(node.path.clone())?;
        Ok(true)
    }

    /// Go to the parent directory, keeping the cursor on the one we left.
    pub fn go_up(&mut self) -> Result<()> {
        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return Ok(());
        };

        let previous = std::mem::replace(&mut self.dir, parent);
        self.selected = 0;
        self.refresh()?;
        self.select_path(&previous);
        Ok(())
    }

    /// Show `dir` instead, e.g. after a reveal in another directory.
    pub fn change_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.dir = dir;
        self.selected = 0;
        self.refresh()
    }
}

fn is_staging_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn tree_with_files() -> (tempfile::TempDir, FileTree) {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("b.txt"), "").unwrap();
        fs::write(temp.path().join("A.md"), "").unwrap();
        fs::write(temp.path().join(".hidden"), "").unwrap();
        let tree = FileTree::new(temp.path().to_path_buf(), false).unwrap();
        (temp, tree)
    }

    #[test]
    fn lists_directories_first_then_case_insensitive() {
        let (_temp, tree) = tree_with_files();
        let names: Vec<_> = tree.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["src", "A.md", "b.txt"]);
        assert_eq!(tree.row_count(), 4);
    }

    #[test]
    fn hidden_files_follow_setting() {
        let (temp, _) = tree_with_files();
        let tree = FileTree::new(temp.path().to_path_buf(), true).unwrap();
        assert!(tree.nodes.iter().any(|n| n.name == ".hidden"));
    }

    #[test]
    fn last_row_is_background() {
        let (_temp, mut tree) = tree_with_files();
        assert!(matches!(tree.selected_row(), Row::Entry(n) if n.name == "src"));

        tree.move_selection(10);
        assert!(matches!(tree.selected_row(), Row::Background));

        tree.move_selection(-10);
        tree.select_background();
        assert!(matches!(tree.selected_row(), Row::Background));
    }

    #[test]
    fn empty_directory_has_only_background() {
        let temp = tempdir().unwrap();
        let tree = FileTree::new(temp.path().to_path_buf(), false).unwrap();
        assert_eq!(tree.row_count(), 1);
        assert!(matches!(tree.selected_row(), Row::Background));
    }

    #[test]
    fn enter_and_go_up_round_trip() {
        let (temp, mut tree) = tree_with_files();
        assert!(tree.enter_selected().unwrap());
        assert_eq!(tree.dir(), temp.path().join("src"));

        tree.go_up().unwrap();
        assert_eq!(tree.dir(), temp.path());
        assert!(matches!(tree.selected_row(), Row::Entry(n) if n.name == "src"));
    }

    #[test]
    fn entering_a_file_does_nothing() {
        let (temp, mut tree) = tree_with_files();
        tree.move_selection(1);
        assert!(!tree.enter_selected().unwrap());
        assert_eq!(tree.dir(), temp.path());
    }

    #[test]
    fn select_path_after_refresh() {
        let (temp, mut tree) = tree_with_files();
        let created = temp.path().join("New File.swift");
        fs::write(&created, "").unwrap();
        fs::write(temp.path().join(".New File.swift.1.tmp"), "").unwrap();

        tree.refresh().unwrap();
        assert!(tree.select_path(&created));
        assert!(matches!(tree.selected_row(), Row::Entry(n) if n.path == created));
        assert!(!tree.nodes.iter().any(|n| n.name.ends_with(".tmp")));
    }
}

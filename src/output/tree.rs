//! The set of source files in a bundle

use std::collections::BTreeSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, fs::read_failed};

/// Normalize a bundle-relative path: `/` separators, no leading `./`, no trailing `/`
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut trimmed = unified.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    let trimmed = trimmed.trim_start_matches('/').trim_end_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Bundle-relative file paths, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    files: BTreeSet<String>,
}

impl SourceTree {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            files: paths
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Walk `root` and collect every regular file, skipping `.git`
    pub fn scan(root: &Path) -> Result<Self> {
        let mut files = BTreeSet::new();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() != 1 || entry.file_name() != ".git");
        for entry in walker {
            let entry = entry.map_err(|e| read_failed(root.display().to_string(), e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let path = normalize(&relative.to_string_lossy());
            if !path.is_empty() {
                files.insert(path);
            }
        }
        Ok(Self { files })
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.files.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    /// Whether any file lives under `dir`
    pub fn contains_dir(&self, dir: &str) -> bool {
        let prefix = format!("{dir}/");
        self.files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|f| f.starts_with(&prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_bundle;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./commands/"), "commands");
        assert_eq!(normalize("commands\\a.md"), "commands/a.md");
        assert_eq!(normalize("."), "");
        assert_eq!(normalize("./"), "");
        assert_eq!(normalize("./././x"), "x");
    }

    #[test]
    fn test_contains_dir_requires_separator() {
        let tree = SourceTree::from_paths(["commands/a.md", "commandsx.md"]);
        assert!(tree.contains_dir("commands"));
        assert!(!tree.contains_dir("command"));
        assert!(!tree.contains_dir("commands/a.md"));
    }

    #[test]
    fn test_scan_skips_git_and_sorts() {
        let bundle = create_bundle(&[
            ("forge.yaml", "name: x"),
            ("skills/z.md", "z"),
            ("commands/a.md", "a"),
            (".git/HEAD", "ref"),
        ]);
        let tree = SourceTree::scan(bundle.path()).unwrap();
        let files: Vec<&String> = tree.iter().collect();
        assert_eq!(files, vec!["commands/a.md", "forge.yaml", "skills/z.md"]);
        assert_eq!(tree.len(), 3);
        assert!(!tree.is_empty());
        assert!(SourceTree::default().is_empty());
    }
}

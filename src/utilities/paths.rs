// Path Utilities
// Helper functions for path inspection

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                components.pop();
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Check if a path is inside a directory
pub fn is_inside(path: &Path, directory: &Path) -> bool {
    let path = normalize_path(path);
    let directory = normalize_path(directory);

    path.starts_with(&directory)
}

/// Check whether a file name ends in the given extension, ignoring case
/// `extension` includes the leading dot, e.g. ".zip"
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();
    let extension = extension.to_lowercase();

    name.len() > extension.len() && name.ends_with(&extension)
}

/// A directory counts as populated when it exists and has at least one entry
pub fn is_populated_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

// Pattern Matching Utilities
// Glob-like pattern matching for mirror exclusions

use std::path::Path;

/// Check if a relative path matches a pattern
/// Patterns without a wildcard match any whole path component
pub fn matches_pattern(path: &Path, pattern: &str) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let pattern = pattern.to_lowercase();

    if let Some(suffix) = pattern.strip_prefix('*') {
        // Wildcard at start: match suffix
        path_str.ends_with(suffix)
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        // Wildcard at end: match the start of any component
        path.components()
            .any(|c| c.as_os_str().to_string_lossy().to_lowercase().starts_with(prefix))
    } else {
        path.components()
            .any(|c| c.as_os_str().to_string_lossy().to_lowercase() == pattern)
    }
}

/// Pattern matcher for mirror exclusions
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    patterns: Vec<String>,
}

impl PatternMatcher {
    /// Create a new pattern matcher with the given patterns
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Check if a path should be excluded
    pub fn should_exclude(&self, path: &Path) -> bool {
        self.patterns.iter().any(|p| matches_pattern(path, p))
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_pattern() {
        assert!(matches_pattern(Path::new("pkg/mod.pyc"), "*.pyc"));
        assert!(!matches_pattern(Path::new("pkg/mod.py"), "*.pyc"));
    }

    #[test]
    fn test_prefix_pattern() {
        assert!(matches_pattern(Path::new("data/tmp_cache/x"), "tmp_*"));
        assert!(!matches_pattern(Path::new("data/cache_tmp/x"), "tmp_*"));
    }

    #[test]
    fn test_component_pattern() {
        assert!(matches_pattern(Path::new("src/__pycache__/m.pyc"), "__pycache__"));
        assert!(!matches_pattern(Path::new("src/not__pycache__x/m.py"), "__pycache__"));
    }

    #[test]
    fn test_pattern_matcher() {
        let matcher = PatternMatcher::new(vec![
            "__pycache__".to_string(),
            ".ipynb_checkpoints".to_string(),
            "*.pyc".to_string(),
        ]);

        assert!(matcher.should_exclude(Path::new("notebooks/.ipynb_checkpoints/a.ipynb")));
        assert!(matcher.should_exclude(Path::new("lib/a.pyc")));
        assert!(!matcher.should_exclude(Path::new("src/main.py")));
    }
}

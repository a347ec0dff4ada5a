// Utilities module
// Helper functions and tools

pub mod paths;
pub mod patterns;

pub use paths::{has_extension, is_inside, is_populated_dir, normalize_path};
pub use patterns::{matches_pattern, PatternMatcher};

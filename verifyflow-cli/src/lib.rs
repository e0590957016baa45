// All checking functionality is in verifyflow-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod profile_dirs;

// Re-export core types for convenience
pub use verifyflow_core::*;

// Re-export CLI utilities
pub use profile_dirs::{resolve_search_dirs, user_profile_dir};

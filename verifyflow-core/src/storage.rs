use crate::config::Profile;
use crate::error::ProfileError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of named rule profiles
pub trait ProfileSource: Send + Sync {
    fn load_profile(&self, name: &str) -> Result<Profile, ProfileError>;

    /// Profile names this source can serve, sorted
    fn available(&self) -> Vec<String>;
}

/// Looks up `<name>.yaml` (then `<name>.yml`) in an ordered list of
/// directories, falling back to the built-in profiles.
pub struct DirectoryProfileSource {
    search_dirs: Vec<PathBuf>,
}

impl DirectoryProfileSource {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    fn profile_path(&self, name: &str) -> Option<PathBuf> {
        self.search_dirs.iter().find_map(|dir| {
            ["yaml", "yml"]
                .iter()
                .map(|ext| dir.join(format!("{name}.{ext}")))
                .find(|path| path.is_file())
        })
    }
}

impl ProfileSource for DirectoryProfileSource {
    fn load_profile(&self, name: &str) -> Result<Profile, ProfileError> {
        if !is_valid_profile_name(name) {
            return Err(ProfileError::NotFound(name.to_string()));
        }

        if let Some(path) = self.profile_path(name) {
            debug!("Loading profile '{}' from {}", name, path.display());
            return Profile::load_from_file(&path);
        }

        BuiltinProfileSource.load_profile(name)
    }

    fn available(&self) -> Vec<String> {
        let mut names = BuiltinProfileSource.available();
        for dir in &self.search_dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if let Some(name) = profile_name_of(&path) {
                    names.push(name);
                }
            }
        }
        names.sort();
        names.dedup();
        names
    }
}

/// Serves only the profiles compiled into the library
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProfileSource;

impl ProfileSource for BuiltinProfileSource {
    fn load_profile(&self, name: &str) -> Result<Profile, ProfileError> {
        Profile::builtin(name).unwrap_or_else(|| Err(ProfileError::NotFound(name.to_string())))
    }

    fn available(&self) -> Vec<String> {
        Profile::builtin_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Profile names are bare file stems: no separators, no parent references
fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.starts_with('.')
}

fn profile_name_of(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !matches!(ext, "yaml" | "yml") {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

/// SHA-256 of the submitted bytes, lowercase hex
pub fn calculate_document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_hash_is_hex_sha256() {
        assert_eq!(
            calculate_document_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(calculate_document_hash(b"a"), calculate_document_hash(b"b"));
    }

    #[test]
    fn directory_profile_shadows_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vkr_ru.yaml"),
            "name: vkr_ru\nrules:\n  dates: { max_year_spread: 3 }\n",
        )
        .unwrap();

        let source = DirectoryProfileSource::new(vec![dir.path().to_path_buf()]);
        let profile = source.load_profile("vkr_ru").unwrap();
        assert_eq!(profile.rules.len(), 1);
    }

    #[test]
    fn earlier_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("p.yml"), "name: first").unwrap();
        std::fs::write(second.path().join("p.yaml"), "name: second").unwrap();

        let source = DirectoryProfileSource::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(source.load_profile("p").unwrap().name, "first");
    }

    #[test]
    fn falls_back_to_builtin_and_reports_unknown() {
        let source = DirectoryProfileSource::new(vec![PathBuf::from("/nonexistent/profiles")]);
        assert_eq!(source.load_profile("vkr_ru").unwrap().name, "vkr_ru");
        assert!(matches!(
            source.load_profile("no_such_profile"),
            Err(ProfileError::NotFound(name)) if name == "no_such_profile"
        ));
    }

    #[test]
    fn path_like_names_are_rejected() {
        let source = DirectoryProfileSource::new(vec![PathBuf::from(".")]);
        for name in ["../vkr_ru", "a/b", "..", ""] {
            assert!(matches!(source.load_profile(name), Err(ProfileError::NotFound(_))));
        }
    }

    #[test]
    fn lists_directory_and_builtin_profiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("custom.yaml"), "rules: {}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let source = DirectoryProfileSource::new(vec![dir.path().to_path_buf()]);
        assert_eq!(source.available(), vec!["custom", "vkr_ru"]);
    }
}

//! Configuration persistence
//!
//! Loads and saves the category map as a single pretty-printed JSON
//! document (category name -> rules/history/pinned_history). Loading never
//! fails: a missing or malformed file falls back to the built-in defaults,
//! and a malformed individual entry only resets that category.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::core::categories::CategoryMap;
use crate::shared::errors::{CoreError, CoreResult};

const CONFIG_FILE: &str = "categories.json";

/// File-based persistence gateway for the category map
#[derive(Debug, Clone)]
pub struct ConfigGateway {
    path: PathBuf,
}

impl ConfigGateway {
    /// Gateway backed by an explicit file path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Gateway backed by the platform config directory
    pub fn from_project_dirs() -> CoreResult<Self> {
        let dirs = ProjectDirs::from("com", "clipsort", "clipsort")
            .ok_or_else(|| CoreError::SystemIO("Failed to get project directories".to_string()))?;
        Ok(Self {
            path: dirs.config_dir().join(CONFIG_FILE),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the category map, falling back to defaults on any problem.
    ///
    /// The fallback category is always present in the result.
    pub fn load(&self) -> CategoryMap {
        if !self.path.exists() {
            println!(
                "[Config] {} not found, initializing defaults",
                self.path.display()
            );
            return default_categories();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("[Config] Failed to read {}: {}", self.path.display(), e);
                return default_categories();
            }
        };

        let mut map: CategoryMap = match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                eprintln!("[Config] Invalid config format, initializing defaults: {}", e);
                return default_categories();
            }
        };

        map.ensure_uncategorized();
        println!("[Config] Loaded {} categories from {}", map.len(), self.path.display());
        map
    }

    /// Save the category map; the boolean is surfaced to the caller.
    ///
    /// A failed save never rolls back in-memory state.
    pub fn save(&self, map: &CategoryMap) -> bool {
        match self.try_save(map) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("[Config] Failed to save {}: {}", self.path.display(), e);
                false
            }
        }
    }

    fn try_save(&self, map: &CategoryMap) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Built-in default categories and seed rules
pub fn default_categories() -> CategoryMap {
    use crate::core::rules::Rule;

    let mut map = CategoryMap::new();

    // Seed rules keep their trailing spaces, so they bypass the trimming
    // in add_rule and are pushed directly.
    map.add_category("Code").expect("fresh map");
    if let Some(code) = map.get_mut("Code") {
        code.rules = ["def ", "class ", "import ", "function(", "=>", "{", "}"]
            .iter()
            .map(|raw| Rule::parse(raw))
            .collect();
    }

    map.add_category("Links").expect("fresh map");
    if let Some(links) = map.get_mut("Links") {
        links.rules = ["regex:https?://", r"regex:www\."]
            .iter()
            .map(|raw| Rule::parse(raw))
            .collect();
    }

    // Catch-all bucket users can attach their own rules to
    map.add_category("Text").expect("fresh map");

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::categories::UNCATEGORIZED;
    use tempfile::TempDir;

    fn gateway_in(dir: &TempDir) -> ConfigGateway {
        ConfigGateway::new(dir.path().join("categories.json"))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let map = gateway_in(&dir).load();
        assert_eq!(map.names(), vec![UNCATEGORIZED, "Code", "Links", "Text"]);
        assert!(map.get("Code").unwrap().rules.len() > 0);
        assert!(map.get(UNCATEGORIZED).unwrap().rules.is_empty());
    }

    #[test]
    fn test_malformed_top_level_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let gateway = gateway_in(&dir);
        std::fs::write(gateway.path(), "[1, 2, 3]").unwrap();
        let map = gateway.load();
        assert_eq!(map.names(), vec![UNCATEGORIZED, "Code", "Links", "Text"]);
    }

    #[test]
    fn test_malformed_entry_resets_only_that_category() {
        let dir = TempDir::new().unwrap();
        let gateway = gateway_in(&dir);
        std::fs::write(
            gateway.path(),
            r#"{"Good": {"rules": ["x"], "history": ["h"]}, "Bad": 42}"#,
        )
        .unwrap();

        let map = gateway.load();
        assert_eq!(map.get("Good").unwrap().unpinned, vec!["h"]);
        let bad = map.get("Bad").unwrap();
        assert!(bad.rules.is_empty() && bad.unpinned.is_empty() && bad.pinned.is_empty());
    }

    #[test]
    fn test_uncategorized_injected_after_load() {
        let dir = TempDir::new().unwrap();
        let gateway = gateway_in(&dir);
        std::fs::write(gateway.path(), r#"{"Notes": {"rules": []}}"#).unwrap();
        let map = gateway.load();
        assert!(map.contains(UNCATEGORIZED));
        assert!(map.contains("Notes"));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let gateway = gateway_in(&dir);

        let mut map = default_categories();
        map.add_item("Code", "def f():").unwrap();
        map.add_item("Code", "class X:").unwrap();
        map.pin_item("Code", "def f():").unwrap();
        map.add_item("Links", "https://example.com").unwrap();

        assert!(gateway.save(&map));
        let restored = gateway.load();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let gateway = ConfigGateway::new(dir.path().join("nested/dir/categories.json"));
        assert!(gateway.save(&CategoryMap::new()));
        assert!(gateway.path().exists());
    }

    #[test]
    fn test_save_to_unwritable_path_reports_failure() {
        let gateway = ConfigGateway::new(PathBuf::from("/proc/clipsort/categories.json"));
        assert!(!gateway.save(&CategoryMap::new()));
    }

    #[test]
    fn test_default_link_rules_classify_urls() {
        let map = default_categories();
        let links = map.get("Links").unwrap();
        assert!(links.rules.iter().any(|r| r.matches("https://example.com")));
        assert!(links.rules.iter().any(|r| r.matches("www.example.com")));
    }
}

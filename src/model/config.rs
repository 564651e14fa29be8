use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filter::Filter;
use super::task::{default_seed, TaskDraft};

/// Configuration from taskdeck.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Start from the built-in two-task seed when no tasks are listed
    #[serde(default = "default_true")]
    pub use_default: bool,
    /// Replaces the built-in seed when non-empty
    #[serde(default)]
    pub tasks: Vec<SeedTask>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig {
            use_default: true,
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due: NaiveDate,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub default_filter: Filter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Used when RUST_LOG is unset and no -v flag is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl DeckConfig {
    /// Initial tasks, in order, paired with their completion flag
    pub fn seed_tasks(&self) -> Vec<(TaskDraft, bool)> {
        if !self.seed.tasks.is_empty() {
            return self
                .seed
                .tasks
                .iter()
                .map(|t| {
                    (
                        TaskDraft::new(t.title.clone(), t.description.clone(), t.due),
                        t.completed,
                    )
                })
                .collect();
        }
        if self.seed.use_default {
            default_seed().into_iter().map(|d| (d, false)).collect()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: DeckConfig = toml::from_str("").unwrap();
        assert_eq!(config, DeckConfig::default());
        assert_eq!(config.view.default_filter, Filter::All);
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.seed_tasks().len(), 2);
    }

    #[test]
    fn test_custom_seed_replaces_default() {
        let config: DeckConfig = toml::from_str(
            r#"[view]
default_filter = "pending"

[[seed.tasks]]
title = "Water plants"
due = "2025-01-31"

[[seed.tasks]]
title = "File taxes"
description = "Before the deadline"
due = "2025-04-15"
completed = true
"#,
        )
        .unwrap();
        assert_eq!(config.view.default_filter, Filter::Pending);
        let seed = config.seed_tasks();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].0.title, "Water plants");
        assert!(!seed[0].1);
        assert_eq!(seed[1].0.description, "Before the deadline");
        assert!(seed[1].1);
    }

    #[test]
    fn test_seed_can_be_disabled() {
        let config: DeckConfig = toml::from_str("[seed]\nuse_default = false\n").unwrap();
        assert!(config.seed_tasks().is_empty());
    }

    #[test]
    fn test_filter_name_is_case_insensitive() {
        let config: DeckConfig = toml::from_str("[view]\ndefault_filter = \"Pending\"\n").unwrap();
        assert_eq!(config.view.default_filter, Filter::Pending);
    }

    #[test]
    fn test_unknown_filter_is_a_parse_error() {
        let result: Result<DeckConfig, _> = toml::from_str("[view]\ndefault_filter = \"done\"\n");
        assert!(result.is_err());
    }
}

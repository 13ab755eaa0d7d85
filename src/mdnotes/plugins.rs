//! Plugin marketplace backed by a built-in catalog.
//!
//! Installation only records state in memory; nothing is downloaded or executed.

use crate::error::{NotesError, Result};
use log::debug;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub icon: &'static str,
    pub keywords: &'static [&'static str],
    pub downloads: u32,
    pub rating: f32,
}

impl PluginInfo {
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
            || self.keywords.iter().any(|k| k.to_lowercase().contains(query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstalledPlugin {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub enabled: bool,
    pub state: PluginState,
}

/// A catalog entry together with its local install state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketEntry {
    #[serde(flatten)]
    pub plugin: PluginInfo,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

static MARKET: Lazy<Vec<PluginInfo>> = Lazy::new(|| {
    vec![
        PluginInfo {
            id: "ai-assistant",
            name: "AI Writing Assistant",
            version: "1.0.0",
            description: "Continuation, translation, grammar checks and other AI writing aids",
            author: "Markdown Notes",
            icon: "✨",
            keywords: &["AI", "writing", "translation"],
            downloads: 1200,
            rating: 4.8,
        },
        PluginInfo {
            id: "theme-pack",
            name: "Theme Pack",
            version: "1.0.0",
            description: "Extra editor and preview themes",
            author: "Markdown Notes",
            icon: "🎨",
            keywords: &["theme", "style"],
            downloads: 890,
            rating: 4.5,
        },
        PluginInfo {
            id: "image-upload",
            name: "Image Upload",
            version: "1.0.0",
            description: "Drag and drop images to cloud storage",
            author: "Community",
            icon: "📷",
            keywords: &["image", "upload", "cloud storage"],
            downloads: 560,
            rating: 4.2,
        },
        PluginInfo {
            id: "export-docx",
            name: "Word Export",
            version: "1.0.0",
            description: "Export markdown notes as Word documents",
            author: "Community",
            icon: "📄",
            keywords: &["export", "Word", "docx"],
            downloads: 430,
            rating: 4.0,
        },
        PluginInfo {
            id: "git-sync",
            name: "Git Sync",
            version: "1.0.0",
            description: "Automatically sync notes to a Git repository",
            author: "Community",
            icon: "📂",
            keywords: &["Git", "sync", "backup"],
            downloads: 320,
            rating: 4.1,
        },
    ]
});

/// Installed plugins for one session, keyed by plugin id.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    installed: BTreeMap<&'static str, InstalledPlugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog entries matching `search` (case-insensitive, over name, description and
    /// keywords). A blank search lists everything.
    pub fn market(&self, search: Option<&str>) -> Vec<MarketEntry> {
        let query = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        MARKET
            .iter()
            .filter(|p| query.as_deref().map_or(true, |q| p.matches(q)))
            .map(|p| {
                let installed = self.installed.get(p.id);
                MarketEntry {
                    plugin: p.clone(),
                    installed: installed.is_some(),
                    enabled: installed.map(|i| i.enabled),
                }
            })
            .collect()
    }

    pub fn installed(&self) -> Vec<InstalledPlugin> {
        self.installed.values().cloned().collect()
    }

    pub fn install(&mut self, id: &str) -> Result<InstalledPlugin> {
        let plugin = MARKET
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| NotesError::NotFound(format!("plugin {}", id)))?;
        if self.installed.contains_key(plugin.id) {
            return Err(NotesError::Conflict(format!("plugin {} is already installed", id)));
        }

        let record = InstalledPlugin {
            id: plugin.id,
            name: plugin.name,
            version: plugin.version,
            description: plugin.description,
            author: plugin.author,
            enabled: true,
            state: PluginState::Active,
        };
        self.installed.insert(plugin.id, record.clone());
        debug!("installed plugin {}", id);
        Ok(record)
    }

    pub fn uninstall(&mut self, id: &str) -> Result<()> {
        self.installed
            .remove(id)
            .map(|_| debug!("uninstalled plugin {}", id))
            .ok_or_else(|| not_installed(id))
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<InstalledPlugin> {
        let record = self.installed.get_mut(id).ok_or_else(|| not_installed(id))?;
        record.enabled = enabled;
        record.state = if enabled {
            PluginState::Active
        } else {
            PluginState::Inactive
        };
        Ok(record.clone())
    }
}

fn not_installed(id: &str) -> NotesError {
    NotesError::NotFound(format!("plugin {} is not installed", id))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note without its body, as returned by flat listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the containing folder; `None` at the store root.
    pub folder_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub folder_id: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

/// One entry of the folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FolderNode>>,
}

impl FolderNode {
    pub fn folder(id: String, name: String, children: Vec<FolderNode>) -> Self {
        Self {
            id,
            name,
            kind: NodeKind::Folder,
            note_id: None,
            children: Some(children),
        }
    }

    pub fn file(id: String, name: String) -> Self {
        Self {
            note_id: Some(id.clone()),
            id,
            name,
            kind: NodeKind::File,
            children: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn children(&self) -> &[FolderNode] {
        self.children.as_deref().unwrap_or(&[])
    }
}

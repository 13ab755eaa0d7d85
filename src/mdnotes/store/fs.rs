use super::ident::{self, SafePath};
use super::naming::{self, NOTE_EXTENSION};
use crate::error::{NotesError, Result};
use crate::model::{FolderNode, Note, NoteSummary};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_NOTE_TITLE: &str = "Untitled";
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";

/// Markdown notes and folders rooted at a single directory.
///
/// All methods take `&self`; the store holds no state besides the root, so it can be
/// shared across threads. Concurrent mutations of the same entry race at the
/// filesystem level.
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
}

impl NoteStore {
    /// Open (and create if needed) the store rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(NotesError::Io)?;
        let root = fs::canonicalize(root).map_err(NotesError::Io)?;
        debug!("note store opened at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder tree under the root: folders first, then notes, each sorted
    /// case-insensitively. Non-markdown files are skipped.
    pub fn list_folder_tree(&self) -> Result<Vec<FolderNode>> {
        self.list_children(&SafePath::root(&self.root))
    }

    /// Every note in the store, most recently modified first.
    pub fn list_notes(&self) -> Result<Vec<NoteSummary>> {
        let mut files = Vec::new();
        self.collect_notes(&SafePath::root(&self.root), &mut files)?;

        let mut summaries: Vec<NoteSummary> = files.iter().map(|f| self.summarize(f)).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    pub fn get_note(&self, id: &str) -> Result<Note> {
        let file = self.resolve_note(id)?;
        let content = fs::read_to_string(file.absolute()).map_err(NotesError::Io)?;
        Ok(self.to_note(&file, content))
    }

    /// Create a note named after `title` inside `folder_id` (the root when `None`).
    ///
    /// The body starts as a level-1 heading carrying the title.
    pub fn create_note(&self, title: &str, folder_id: Option<&str>) -> Result<Note> {
        let title = naming::sanitize_title(title, DEFAULT_NOTE_TITLE);
        let folder = self.resolve_container(folder_id)?;
        fs::create_dir_all(folder.absolute()).map_err(NotesError::Io)?;

        let file = naming::unique_note_path(&folder, &naming::file_base_name(&title))?;
        let content = format!("# {}\n\n", title);
        fs::write(file.absolute(), &content).map_err(NotesError::Io)?;
        debug!("created note {}", file.relative().display());

        Ok(self.to_note(&file, content))
    }

    /// Rewrite a note, optionally renaming it.
    ///
    /// Omitted content is re-read and written back unchanged. A new title moves the
    /// file to a fresh unique name; an existing file is never overwritten.
    pub fn update_note(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Note> {
        let file = self.resolve_note(id)?;
        let file_name = file.file_name();
        let current_title = naming::strip_extension(&file_name).to_string();

        let next_title = match title {
            Some(t) => naming::sanitize_title(t, &current_title),
            None => current_title.clone(),
        };
        let content = match content {
            Some(c) => c.to_string(),
            None => fs::read_to_string(file.absolute()).map_err(NotesError::Io)?,
        };

        let target = if naming::file_base_name(&next_title) != current_title {
            self.rename_note(&file, &next_title)?
        } else {
            file
        };

        fs::write(target.absolute(), &content).map_err(NotesError::Io)?;
        Ok(self.to_note(&target, content))
    }

    /// Delete a note. A missing file is not an error.
    ///
    /// Folders left empty are removed walking upwards; the root is always kept.
    pub fn delete_note(&self, id: &str) -> Result<()> {
        let file = ident::resolve(id, &self.root)?;
        if !naming::is_markdown(&file.file_name()) {
            return Err(NotesError::BadRequest(format!(
                "{} is not a {} note",
                file.relative().display(),
                NOTE_EXTENSION
            )));
        }
        if file.absolute().is_dir() {
            return Err(NotesError::NotAFile(file.relative().display().to_string()));
        }

        match fs::remove_file(file.absolute()) {
            Ok(()) => debug!("deleted note {}", file.relative().display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(NotesError::Io(e)),
        }

        self.cleanup_empty_parents(file.parent());
        Ok(())
    }

    pub fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FolderNode> {
        let name = naming::sanitize_title(name, DEFAULT_FOLDER_NAME);
        let parent = self.resolve_container(parent_id)?;
        let folder = parent.child(&name)?;

        if folder.absolute().exists() {
            return Err(NotesError::Conflict(folder.relative().display().to_string()));
        }
        fs::create_dir_all(folder.absolute()).map_err(NotesError::Io)?;
        debug!("created folder {}", folder.relative().display());

        Ok(self.to_folder_node(&folder, self.list_children(&folder)?))
    }

    /// Move a folder to a sibling path named `new_name`, taking its contents along.
    pub fn rename_folder(&self, id: &str, new_name: &str) -> Result<FolderNode> {
        let folder = self.resolve_folder(id)?;
        let name = naming::sanitize_title(new_name, &folder.file_name());
        let parent = folder
            .parent()
            .ok_or_else(|| NotesError::BadRequest("the store root cannot be renamed".into()))?;
        let target = parent.child(&name)?;

        if target.absolute().exists() {
            return Err(NotesError::Conflict(target.relative().display().to_string()));
        }
        fs::rename(folder.absolute(), target.absolute()).map_err(NotesError::Io)?;
        debug!(
            "renamed folder {} -> {}",
            folder.relative().display(),
            target.relative().display()
        );

        Ok(self.to_folder_node(&target, self.list_children(&target)?))
    }

    /// Remove a folder and everything under it, deepest entries first.
    ///
    /// Stops at the first entry that cannot be removed; whatever was already removed
    /// stays removed.
    pub fn delete_folder(&self, id: &str) -> Result<()> {
        let folder = self.resolve_folder(id)?;
        if folder.is_root() {
            return Err(NotesError::BadRequest("the store root cannot be deleted".into()));
        }
        remove_tree(folder.absolute())?;
        debug!("deleted folder {}", folder.relative().display());
        Ok(())
    }

    fn resolve_note(&self, id: &str) -> Result<SafePath> {
        let file = ident::resolve(id, &self.root)?;
        if !naming::is_markdown(&file.file_name()) {
            return Err(NotesError::BadRequest(format!(
                "{} is not a {} note",
                file.relative().display(),
                NOTE_EXTENSION
            )));
        }
        let meta = fs::metadata(file.absolute()).map_err(|e| not_found_or_io(e, &file))?;
        if !meta.is_file() {
            return Err(NotesError::NotAFile(file.relative().display().to_string()));
        }
        Ok(file)
    }

    fn resolve_folder(&self, id: &str) -> Result<SafePath> {
        let folder = ident::resolve(id, &self.root)?;
        let meta = fs::metadata(folder.absolute()).map_err(|e| not_found_or_io(e, &folder))?;
        if !meta.is_dir() {
            return Err(NotesError::NotAFolder(folder.relative().display().to_string()));
        }
        Ok(folder)
    }

    /// Folder that will receive a new entry. It may not exist yet, but it must not be a file.
    fn resolve_container(&self, id: Option<&str>) -> Result<SafePath> {
        let folder = match id {
            Some(id) => ident::resolve(id, &self.root)?,
            None => return Ok(SafePath::root(&self.root)),
        };
        if folder.absolute().exists() && !folder.absolute().is_dir() {
            return Err(NotesError::NotAFolder(folder.relative().display().to_string()));
        }
        Ok(folder)
    }

    fn rename_note(&self, file: &SafePath, title: &str) -> Result<SafePath> {
        let folder = file
            .parent()
            .ok_or_else(|| NotesError::NotAFile(file.relative().display().to_string()))?;
        let target = naming::unique_note_path(&folder, &naming::file_base_name(title))?;
        fs::rename(file.absolute(), target.absolute()).map_err(NotesError::Io)?;
        debug!(
            "renamed note {} -> {}",
            file.relative().display(),
            target.relative().display()
        );
        Ok(target)
    }

    fn cleanup_empty_parents(&self, start: Option<SafePath>) {
        let mut current = start;
        while let Some(dir) = current {
            if dir.is_root() {
                return;
            }
            let is_empty = match fs::read_dir(dir.absolute()) {
                Ok(mut entries) => entries.next().is_none(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => true,
                Err(e) => {
                    warn!("could not inspect {}: {}", dir.relative().display(), e);
                    return;
                }
            };
            if !is_empty {
                return;
            }
            match fs::remove_dir(dir.absolute()) {
                Ok(()) => debug!("removed empty folder {}", dir.relative().display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("could not remove {}: {}", dir.relative().display(), e);
                    return;
                }
            }
            current = dir.parent();
        }
    }

    fn list_children(&self, folder: &SafePath) -> Result<Vec<FolderNode>> {
        let (mut dirs, mut files) = self.read_entries(folder)?;
        dirs.sort_by_cached_key(sort_key);
        files.sort_by_cached_key(sort_key);

        let mut nodes = Vec::with_capacity(dirs.len() + files.len());
        for dir in &dirs {
            let children = self.list_children(dir)?;
            nodes.push(self.to_folder_node(dir, children));
        }
        for file in &files {
            nodes.push(FolderNode::file(file.id(), file.file_name()));
        }
        Ok(nodes)
    }

    fn collect_notes(&self, folder: &SafePath, out: &mut Vec<SafePath>) -> Result<()> {
        let (dirs, files) = self.read_entries(folder)?;
        out.extend(files);
        for dir in &dirs {
            self.collect_notes(dir, out)?;
        }
        Ok(())
    }

    /// Split a folder's entries into subfolders and markdown files. Symlinked
    /// folders are not descended into.
    fn read_entries(&self, folder: &SafePath) -> Result<(Vec<SafePath>, Vec<SafePath>)> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        if !folder.absolute().is_dir() {
            return Ok((dirs, files));
        }

        for entry in fs::read_dir(folder.absolute()).map_err(NotesError::Io)? {
            let entry = entry.map_err(NotesError::Io)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type().map_err(NotesError::Io)?;
            if !file_type.is_dir() && !naming::is_markdown(&name) {
                continue;
            }
            let child = match folder.child(&name) {
                Ok(child) => child,
                Err(e) => {
                    warn!("skipping unaddressable entry: {}", e);
                    continue;
                }
            };
            if file_type.is_dir() {
                dirs.push(child);
            } else {
                files.push(child);
            }
        }
        Ok((dirs, files))
    }

    fn to_folder_node(&self, folder: &SafePath, children: Vec<FolderNode>) -> FolderNode {
        FolderNode::folder(folder.id(), folder.file_name(), children)
    }

    fn summarize(&self, file: &SafePath) -> NoteSummary {
        let file_name = file.file_name();
        NoteSummary {
            id: file.id(),
            title: naming::strip_extension(&file_name).to_string(),
            updated_at: modified_at(file.absolute()),
            folder_id: file.parent().filter(|p| !p.is_root()).map(|p| p.id()),
        }
    }

    fn to_note(&self, file: &SafePath, content: String) -> Note {
        let summary = self.summarize(file);
        Note {
            id: summary.id,
            title: summary.title,
            updated_at: summary.updated_at,
            folder_id: summary.folder_id,
            content,
        }
    }
}

/// Case-insensitive name, then the exact name so case-only differences order stably.
fn sort_key(path: &SafePath) -> (String, String) {
    let name = path.file_name();
    (name.to_lowercase(), name)
}

fn modified_at(path: &Path) -> DateTime<Utc> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

fn not_found_or_io(e: io::Error, path: &SafePath) -> NotesError {
    if e.kind() == io::ErrorKind::NotFound {
        NotesError::NotFound(path.relative().display().to_string())
    } else {
        NotesError::Io(e)
    }
}

/// Depth-first removal; each directory's listing is read fully (and its handle
/// released) before descending.
fn remove_tree(dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir)
        .map_err(NotesError::Io)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(NotesError::Io)?;

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(NotesError::Io)?;
        if file_type.is_dir() {
            remove_tree(&path)?;
        } else {
            ignore_missing(fs::remove_file(&path))?;
        }
    }
    ignore_missing(fs::remove_dir(dir))
}

fn ignore_missing(result: io::Result<()>) -> Result<()> {
    match result {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(NotesError::Io(e)),
        _ => Ok(()),
    }
}

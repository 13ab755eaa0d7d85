//! # API Facade
//!
//! [`NotesApi`] is the single entry point for every mdnotes operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** note and folder operations to the [`NoteStore`]
//! - **Composes** the store with the markdown parser and the renderers. The store never
//!   renders and the renderers never read files; the facade holds the text in between
//! - **Owns** the per-root assistant settings and the session plugin registry
//!
//! ## What the API Does NOT Do
//!
//! - **I/O towards the user**: no stdout, stderr, or terminal formatting
//! - **Provider calls**: a remote [`Completer`] must be supplied by the caller
//!
//! ## Testing Strategy
//!
//! API tests check that calls reach the right component and that the composed
//! operations (preview, print, word count) work end to end on a temporary root. Store
//! and renderer behavior is tested in their own modules.

use crate::assist::{
    self, Assistant, AssistSettings, AssistSettingsStore, Completer, MaskedSettings,
    SettingsUpdate, Task,
};
use crate::error::Result;
use crate::markup;
use crate::model::{FolderNode, Note, NoteSummary};
use crate::plugins::PluginRegistry;
use crate::render::{pdf::PdfSink, preview, print, Theme};
use crate::store::{ident, NoteStore};
use crate::words;
use std::io::Write;
use std::path::Path;

pub struct NotesApi {
    store: NoteStore,
    assist: AssistSettingsStore,
    plugins: PluginRegistry,
}

impl NotesApi {
    /// Open the notes root, creating it if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let store = NoteStore::open(root)?;
        let assist = AssistSettingsStore::open(store.root());
        Ok(Self {
            store,
            assist,
            plugins: PluginRegistry::new(),
        })
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn list_folder_tree(&self) -> Result<Vec<FolderNode>> {
        self.store.list_folder_tree()
    }

    pub fn list_notes(&self) -> Result<Vec<NoteSummary>> {
        self.store.list_notes()
    }

    pub fn get_note(&self, id: &str) -> Result<Note> {
        self.store.get_note(id)
    }

    pub fn create_note(&self, title: &str, folder_id: Option<&str>) -> Result<Note> {
        self.store.create_note(title, folder_id)
    }

    pub fn update_note(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Note> {
        self.store.update_note(id, title, content)
    }

    pub fn delete_note(&self, id: &str) -> Result<()> {
        self.store.delete_note(id)
    }

    pub fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FolderNode> {
        self.store.create_folder(name, parent_id)
    }

    pub fn rename_folder(&self, id: &str, new_name: &str) -> Result<FolderNode> {
        self.store.rename_folder(id, new_name)
    }

    pub fn delete_folder(&self, id: &str) -> Result<()> {
        self.store.delete_folder(id)
    }

    /// Render a note as a standalone HTML page. Relative links resolve against the
    /// note's folder.
    pub fn preview_note(&self, id: &str, theme: Theme) -> Result<String> {
        let note = self.store.get_note(id)?;
        let folder = ident::resolve(id, self.store.root())?
            .parent()
            .map(|p| p.absolute().to_path_buf())
            .unwrap_or_else(|| self.store.root().to_path_buf());
        let doc = markup::parse(&note.content);
        Ok(preview::render(&doc, theme, &preview::directory_url(&folder)))
    }

    /// Write a note as PDF to `out`.
    pub fn print_note<W: Write>(&self, id: &str, out: W) -> Result<()> {
        let note = self.store.get_note(id)?;
        let doc = markup::parse(&note.content);
        let mut sink = PdfSink::new(out);
        print::render(&doc, &mut sink)
    }

    pub fn word_count(&self, id: &str) -> Result<usize> {
        let note = self.store.get_note(id)?;
        Ok(words::count(&note.content))
    }

    pub fn assist_settings(&self) -> MaskedSettings {
        self.assist.settings().masked()
    }

    pub fn update_assist_settings(&mut self, update: SettingsUpdate) -> Result<MaskedSettings> {
        Ok(self.assist.update(update)?.masked())
    }

    /// Run an assistant task. `remote` is used only when real settings are configured.
    pub fn assist(&self, task: Task, text: &str, remote: Option<&dyn Completer>) -> Result<String> {
        Assistant::new(self.assist.settings(), remote).run(task, text)
    }

    pub fn test_assist_connection(
        &self,
        candidate: &AssistSettings,
        completer: &dyn Completer,
    ) -> Result<String> {
        assist::test_connection(candidate, completer)
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::Language;
    use crate::error::NotesError;
    use tempfile::TempDir;

    fn setup() -> (TempDir, NotesApi) {
        let dir = TempDir::new().unwrap();
        let api = NotesApi::open(dir.path().join("notes")).unwrap();
        (dir, api)
    }

    #[test]
    fn note_operations_reach_the_store() {
        let (_dir, api) = setup();
        let folder = api.create_folder("Work", None).unwrap();
        let note = api.create_note("Plan", Some(&folder.id)).unwrap();

        api.update_note(&note.id, None, Some("# Plan\n\nship it\n"))
            .unwrap();
        assert_eq!(api.get_note(&note.id).unwrap().content, "# Plan\n\nship it\n");
        assert_eq!(api.list_notes().unwrap().len(), 1);
        assert_eq!(api.list_folder_tree().unwrap()[0].name, "Work");

        api.delete_note(&note.id).unwrap();
        assert!(api.list_folder_tree().unwrap().is_empty());
    }

    #[test]
    fn preview_uses_note_folder_as_base() {
        let (_dir, api) = setup();
        let folder = api.create_folder("Trips", None).unwrap();
        let note = api.create_note("Rome", Some(&folder.id)).unwrap();
        api.update_note(&note.id, None, Some("![map](map.png)\n"))
            .unwrap();

        let html = api.preview_note(&note.id, Theme::Dark).unwrap();
        let base = preview::directory_url(&api.root().join("Trips"));
        assert!(html.contains(&format!("<base href=\"{}\">", base)));
        assert!(html.contains("<img src=\"map.png\""));
        assert!(html.contains("github-dark"));
    }

    #[test]
    fn print_writes_pdf() {
        let (_dir, api) = setup();
        let note = api.create_note("Report", None).unwrap();
        let mut out = Vec::new();
        api.print_note(&note.id, &mut out).unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn render_errors_come_from_the_store() {
        let (_dir, api) = setup();
        let missing = ident::encode(Path::new("missing.md"));
        assert!(matches!(
            api.preview_note(&missing, Theme::Light),
            Err(NotesError::NotFound(_))
        ));
        assert!(matches!(
            api.print_note(&missing, Vec::new()),
            Err(NotesError::NotFound(_))
        ));
    }

    #[test]
    fn counts_words_of_a_note() {
        let (_dir, api) = setup();
        let note = api.create_note("Mixed", None).unwrap();
        api.update_note(&note.id, None, Some("hello 世界"))
            .unwrap();
        assert_eq!(api.word_count(&note.id).unwrap(), 3);
    }

    #[test]
    fn assistant_settings_live_in_root() {
        let (_dir, mut api) = setup();
        assert!(!api.assist_settings().has_api_key);

        let masked = api
            .update_assist_settings(SettingsUpdate {
                api_key: Some("secret".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(masked.has_api_key);
        assert!(api.root().join(assist::SETTINGS_FILENAME).is_file());

        // The settings file is not a note.
        assert!(api.list_notes().unwrap().is_empty());
    }

    #[test]
    fn assistant_defaults_to_demo_mode() {
        let (_dir, api) = setup();
        let reply = api
            .assist(Task::Translate(Language::En), "你好", None)
            .unwrap();
        assert!(reply.contains("English translation"));
    }

    #[test]
    fn connection_test_checks_candidate_settings() {
        let (_dir, api) = setup();
        let candidate = AssistSettings {
            provider: "openai".into(),
            api_key: "sk-test".into(),
            api_url: "https://api.example.test/v1".into(),
            model: String::new(),
        };
        let reply = api
            .test_assist_connection(&candidate, &assist::MockCompleter)
            .unwrap();
        assert!(reply.contains("Hello"));

        let keyless = AssistSettings {
            api_key: String::new(),
            ..candidate
        };
        assert!(matches!(
            api.test_assist_connection(&keyless, &assist::MockCompleter),
            Err(NotesError::BadRequest(_))
        ));
        // Testing never saves the candidate.
        assert!(!api.assist_settings().has_api_key);
    }

    #[test]
    fn plugins_are_session_scoped() {
        let (_dir, mut api) = setup();
        api.plugins_mut().install("git-sync").unwrap();
        assert_eq!(api.plugins().installed().len(), 1);
    }
}

//! Writing assistant: continuation, translation, grammar fixes and free-form chat.
//!
//! The assistant never talks to a provider itself. Callers that have one inject a
//! [`Completer`]; without one (or with the `mock` provider, or without an API key) the
//! built-in [`MockCompleter`] answers with demonstration text so the feature can be
//! tried offline.
//!
//! Settings live next to the notes in `.ai-config.json` and are only changed through
//! [`AssistSettingsStore::update`], which persists immediately.

use crate::error::{NotesError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILENAME: &str = ".ai-config.json";
pub const MOCK_PROVIDER: &str = "mock";

const CHAT_ECHO_CHARS: usize = 50;

/// A text-completion backend.
pub trait Completer {
    fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistSettings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub model: String,
}

fn default_provider() -> String {
    MOCK_PROVIDER.to_string()
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            api_url: String::new(),
            model: String::new(),
        }
    }
}

impl AssistSettings {
    /// True when requests are answered by the built-in demo responder.
    pub fn uses_mock(&self) -> bool {
        self.provider == MOCK_PROVIDER || self.api_key.trim().is_empty()
    }

    pub fn masked(&self) -> MaskedSettings {
        MaskedSettings {
            provider: self.provider.clone(),
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            has_api_key: !self.api_key.trim().is_empty(),
        }
    }
}

/// Settings as shown to users: the key itself is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskedSettings {
    pub provider: String,
    pub api_url: String,
    pub model: String,
    pub has_api_key: bool,
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsUpdate {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.api_key.is_none()
            && self.api_url.is_none()
            && self.model.is_none()
    }
}

/// Owns the assistant settings for one notes root.
#[derive(Debug, Clone)]
pub struct AssistSettingsStore {
    path: PathBuf,
    settings: AssistSettings,
}

impl AssistSettingsStore {
    /// Load settings from `root`. A missing file gives defaults; an unreadable one is
    /// logged and also gives defaults.
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        let path = root.as_ref().join(SETTINGS_FILENAME);
        let settings = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("ignoring malformed {}: {}", path.display(), e);
                    AssistSettings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AssistSettings::default(),
            Err(e) => {
                warn!("could not read {}: {}", path.display(), e);
                AssistSettings::default()
            }
        };
        Self { path, settings }
    }

    pub fn settings(&self) -> &AssistSettings {
        &self.settings
    }

    pub fn update(&mut self, update: SettingsUpdate) -> Result<&AssistSettings> {
        if let Some(provider) = update.provider {
            self.settings.provider = provider;
        }
        if let Some(api_key) = update.api_key {
            self.settings.api_key = api_key;
        }
        if let Some(api_url) = update.api_url {
            self.settings.api_url = api_url;
        }
        if let Some(model) = update.model {
            self.settings.model = model;
        }
        self.save()?;
        Ok(&self.settings)
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(NotesError::Io)?;
        }
        let content =
            serde_json::to_string_pretty(&self.settings).map_err(NotesError::Serialization)?;
        fs::write(&self.path, content).map_err(NotesError::Io)?;
        debug!("saved assistant settings to {}", self.path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    /// `zh` or `en`; anything else falls back to Chinese.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Language::En,
            _ => Language::Zh,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Language::Zh => "Chinese",
            Language::En => "English",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Continue,
    Translate(Language),
    Grammar,
    Chat,
}

impl Task {
    fn prompt(self, text: &str) -> String {
        match self {
            Task::Continue => format!(
                "Continue the following text in the same style and tone. Output only the continuation:\n\n{}",
                text
            ),
            Task::Translate(lang) => format!(
                "Translate the following text into {}. Output only the translation:\n\n{}",
                lang.name(),
                text
            ),
            Task::Grammar => format!(
                "Fix the grammar of the following text. Return only the corrected text:\n\n{}",
                text
            ),
            Task::Chat => text.to_string(),
        }
    }
}

/// Offline responder used in demo mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCompleter;

impl MockCompleter {
    pub fn answer(&self, task: Task, text: &str) -> String {
        match task {
            Task::Continue => format!(
                "{}\n\n[AI continuation example] This is simulated continuation text. Configure an API key in the assistant settings to get real responses.",
                text
            ),
            Task::Translate(Language::Zh) => format!(
                "[Translation example] This is the Chinese translation of \"{}\". Configure an API key to get real translations.",
                text
            ),
            Task::Translate(Language::En) => format!(
                "[Translation example] This is the English translation of \"{}\". Configure an API key to get real translations.",
                text
            ),
            Task::Grammar => format!(
                "[Grammar check example]\n{}\n\nConfigure an API key to get real grammar checks.",
                text
            ),
            Task::Chat => {
                let echo: String = text.chars().take(CHAT_ECHO_CHARS).collect();
                format!(
                    "Hello! I am the assistant (demo mode).\n\nYou said: \"{}...\"\n\nConfigure an API key in the assistant settings to enable real conversations.",
                    echo
                )
            }
        }
    }
}

impl Completer for MockCompleter {
    fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self.answer(Task::Chat, prompt))
    }
}

pub struct Assistant<'a> {
    settings: &'a AssistSettings,
    remote: Option<&'a dyn Completer>,
}

impl<'a> Assistant<'a> {
    pub fn new(settings: &'a AssistSettings, remote: Option<&'a dyn Completer>) -> Self {
        Self { settings, remote }
    }

    pub fn continue_text(&self, text: &str) -> Result<String> {
        self.run(Task::Continue, text)
    }

    pub fn translate(&self, text: &str, lang: Language) -> Result<String> {
        self.run(Task::Translate(lang), text)
    }

    pub fn check_grammar(&self, text: &str) -> Result<String> {
        self.run(Task::Grammar, text)
    }

    pub fn chat(&self, text: &str) -> Result<String> {
        self.run(Task::Chat, text)
    }

    pub fn run(&self, task: Task, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(NotesError::BadRequest("text must not be empty".into()));
        }
        if self.settings.uses_mock() {
            return Ok(MockCompleter.answer(task, text));
        }
        let remote = self.remote.ok_or_else(|| {
            NotesError::Assist(format!(
                "no completion backend available for provider '{}'",
                self.settings.provider
            ))
        })?;
        debug!("sending {:?} request to {}", task, self.settings.provider);
        remote.complete(&task.prompt(text))
    }
}

/// Check candidate settings before saving them: both key and URL are required, then a
/// short probe is sent through `completer`.
pub fn test_connection(settings: &AssistSettings, completer: &dyn Completer) -> Result<String> {
    if settings.api_key.trim().is_empty() {
        return Err(NotesError::BadRequest("API key must not be empty".into()));
    }
    if settings.api_url.trim().is_empty() {
        return Err(NotesError::BadRequest("API URL must not be empty".into()));
    }
    completer
        .complete("Hello")
        .map_err(|e| NotesError::Assist(format!("connection failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct Recording {
        prompts: RefCell<Vec<String>>,
        reply: Result<String>,
    }

    impl Recording {
        fn ok(reply: &str) -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                reply: Ok(reply.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                reply: Err(NotesError::Assist("timeout".into())),
            }
        }
    }

    impl Completer for Recording {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(NotesError::Assist(e.to_string())),
            }
        }
    }

    fn live_settings() -> AssistSettings {
        AssistSettings {
            provider: "openai".into(),
            api_key: "sk-test".into(),
            api_url: "https://api.example.test/v1/chat".into(),
            model: String::new(),
        }
    }

    #[test]
    fn defaults_use_mock() {
        let settings = AssistSettings::default();
        assert_eq!(settings.provider, "mock");
        assert!(settings.uses_mock());

        let keyless = AssistSettings {
            api_key: " ".into(),
            ..live_settings()
        };
        assert!(keyless.uses_mock());
        assert!(!live_settings().uses_mock());
    }

    #[test]
    fn masked_hides_key() {
        let masked = live_settings().masked();
        assert!(masked.has_api_key);
        let json = serde_json::to_string(&masked).unwrap();
        assert!(!json.contains("sk-test"));
    }

    #[test]
    fn store_updates_partially_and_persists() {
        let temp = TempDir::new().unwrap();
        let mut store = AssistSettingsStore::open(temp.path());
        assert_eq!(store.settings(), &AssistSettings::default());

        store
            .update(SettingsUpdate {
                provider: Some("deepseek".into()),
                api_key: Some("k".into()),
                ..Default::default()
            })
            .unwrap();
        store
            .update(SettingsUpdate {
                model: Some("chat".into()),
                ..Default::default()
            })
            .unwrap();

        let reopened = AssistSettingsStore::open(temp.path());
        let s = reopened.settings();
        assert_eq!(s.provider, "deepseek");
        assert_eq!(s.api_key, "k");
        assert_eq!(s.model, "chat");
        assert_eq!(s.api_url, "");
    }

    #[test]
    fn malformed_settings_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SETTINGS_FILENAME), "not json").unwrap();
        let store = AssistSettingsStore::open(temp.path());
        assert_eq!(store.settings(), &AssistSettings::default());
    }

    #[test]
    fn blank_text_is_rejected() {
        let settings = AssistSettings::default();
        let assistant = Assistant::new(&settings, None);
        assert!(matches!(
            assistant.chat("  "),
            Err(NotesError::BadRequest(_))
        ));
    }

    #[test]
    fn mock_answers_per_task() {
        let settings = AssistSettings::default();
        let assistant = Assistant::new(&settings, None);

        let cont = assistant.continue_text("Once upon a time").unwrap();
        assert!(cont.starts_with("Once upon a time\n\n[AI continuation example]"));

        let en = assistant.translate("你好", Language::En).unwrap();
        assert!(en.contains("English translation of \"你好\""));

        let grammar = assistant.check_grammar("he go").unwrap();
        assert!(grammar.contains("\nhe go\n"));
    }

    #[test]
    fn mock_chat_truncates_echo() {
        let long = "x".repeat(80);
        let reply = MockCompleter.answer(Task::Chat, &long);
        assert!(reply.contains(&format!("\"{}...\"", "x".repeat(50))));
        assert!(!reply.contains(&"x".repeat(51)));
    }

    #[test]
    fn live_settings_use_injected_completer() {
        let settings = live_settings();
        let remote = Recording::ok("bonjour");
        let assistant = Assistant::new(&settings, Some(&remote));

        assert_eq!(assistant.translate("hello", Language::Zh).unwrap(), "bonjour");
        let prompts = remote.prompts.borrow();
        assert!(prompts[0].contains("into Chinese"));
        assert!(prompts[0].ends_with("hello"));
    }

    #[test]
    fn live_settings_without_backend_fail() {
        let settings = live_settings();
        let assistant = Assistant::new(&settings, None);
        assert!(matches!(
            assistant.chat("hi"),
            Err(NotesError::Assist(_))
        ));
    }

    #[test]
    fn language_codes_default_to_chinese() {
        assert_eq!(Language::from_code("en"), Language::En);
        assert_eq!(Language::from_code("EN "), Language::En);
        assert_eq!(Language::from_code("fr"), Language::Zh);
    }

    #[test]
    fn connection_test_requires_key_and_url() {
        let probe = Recording::ok("pong");
        let no_key = AssistSettings {
            api_key: String::new(),
            ..live_settings()
        };
        assert!(matches!(
            test_connection(&no_key, &probe),
            Err(NotesError::BadRequest(_))
        ));
        let no_url = AssistSettings {
            api_url: String::new(),
            ..live_settings()
        };
        assert!(matches!(
            test_connection(&no_url, &probe),
            Err(NotesError::BadRequest(_))
        ));
        assert!(probe.prompts.borrow().is_empty());

        assert_eq!(test_connection(&live_settings(), &probe).unwrap(), "pong");
        assert!(matches!(
            test_connection(&live_settings(), &Recording::failing()),
            Err(NotesError::Assist(_))
        ));
    }
}

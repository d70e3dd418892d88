//! Localized message catalog.
//!
//! User-facing replies (the unknown-command notice, usage lines, lifecycle
//! confirmations) are looked up here by key, per the caller's preferred
//! language, and formatted with positional `{0}`-style placeholders. Plugins
//! register their own message sets during installation; language files on
//! disk are JSON maps, loaded with serde_json.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

/// Language used when a caller has no preference or a key is missing from
/// their language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Errors from loading a language file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("Failed to read language file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a JSON map of message keys to templates.
    #[error("Failed to parse language file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-language message templates plus per-caller language preferences.
#[derive(Debug)]
pub struct MessageCatalog {
    languages: RwLock<HashMap<String, HashMap<String, String>>>,
    preferences: RwLock<HashMap<String, String>>,
}

impl MessageCatalog {
    /// Creates a catalog seeded with the built-in default-language messages.
    pub fn new() -> Self {
        let catalog = Self {
            languages: RwLock::new(HashMap::new()),
            preferences: RwLock::new(HashMap::new()),
        };
        catalog.register_messages(DEFAULT_LANGUAGE, builtin_messages());
        catalog
    }

    /// Registers (or overwrites) message templates for `language`.
    ///
    /// Keys not present in `messages` are left untouched, so plugins can
    /// contribute their own sets without clobbering each other.
    pub fn register_messages(&self, language: &str, messages: HashMap<String, String>) {
        let mut languages = self.languages.write();
        languages
            .entry(language.to_string())
            .or_default()
            .extend(messages);
    }

    /// Sets the preferred language for a caller.
    pub fn set_language(&self, caller_id: &str, language: &str) {
        self.preferences
            .write()
            .insert(caller_id.to_string(), language.to_string());
    }

    /// Preferred language of a caller, falling back to the default.
    pub fn language_of(&self, caller_id: &str) -> String {
        self.preferences
            .read()
            .get(caller_id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    /// Looks up the template for `key` in the caller's language.
    ///
    /// Falls back to the default language, and finally to the key itself so
    /// a missing template degrades to something visible rather than nothing.
    pub fn get_message(&self, key: &str, caller_id: &str) -> String {
        let language = self.language_of(caller_id);
        let languages = self.languages.read();

        languages
            .get(&language)
            .and_then(|messages| messages.get(key))
            .or_else(|| {
                languages
                    .get(DEFAULT_LANGUAGE)
                    .and_then(|messages| messages.get(key))
            })
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Loads a JSON language file (a flat map of key to template) into
    /// `language`, returning how many templates it contributed.
    pub fn load_language_file(
        &self,
        language: &str,
        path: impl AsRef<Path>,
    ) -> Result<usize, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let messages: HashMap<String, String> = serde_json::from_str(&content)?;
        let count = messages.len();
        self.register_messages(language, messages);
        Ok(count)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitutes positional `{0}`, `{1}`, ... placeholders in a template.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut message = template.to_string();
    for (index, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{index}}}"), arg);
    }
    message
}

fn builtin_messages() -> HashMap<String, String> {
    HashMap::from([
        (
            "UnknownCommand".to_string(),
            "Unknown command: {0}".to_string(),
        ),
        (
            "LanguageSet".to_string(),
            "Language set to '{0}'".to_string(),
        ),
        (
            "LanguageCurrent".to_string(),
            "Your language is '{0}'".to_string(),
        ),
    ])
}

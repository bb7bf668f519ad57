/*!
 * System prompt templates for mod translation.
 *
 * Templates are plain text with three placeholders, substituted once per mod:
 * `{MOD_NAME}`, `{SOURCE_LANGUAGE}` and `{TARGET_LANGUAGE}`.
 */

use anyhow::{Context, Result};
use std::path::Path;

/// System prompt template for language file translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The built-in prompt, used when no template file exists.
    pub const MOD_TRANSLATOR: &'static str = r#"You are translating the language file of the Minecraft mod "{MOD_NAME}" from {SOURCE_LANGUAGE} to {TARGET_LANGUAGE}.

The user sends a JSON object mapping translation keys to {SOURCE_LANGUAGE} text.
Reply with a JSON object that has exactly the same keys, each mapped to its {TARGET_LANGUAGE} translation.

- Never change, add or remove keys
- Keep formatting codes such as §a, %s, %1$s and {0} exactly as they are
- Keep backslashes and line breaks exactly as they are
- Keep names of items, blocks and mobs consistent across the file
- Output only the JSON object"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.trim_matches(|c| c == '\n' || c == '\r').to_string(),
        }
    }

    /// Create the built-in mod translator template.
    pub fn mod_translator() -> Self {
        Self::new(Self::MOD_TRANSLATOR)
    }

    /// Load a template file, falling back to the built-in prompt when it is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Prompt file {:?} not found, using the built-in prompt", path);
            return Ok(Self::mod_translator());
        }

        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file: {:?}", path))?;
        Ok(Self::new(&template))
    }

    /// The raw template text
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Render the template for one mod.
    pub fn render(&self, mod_name: &str, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{MOD_NAME}", mod_name)
            .replace("{SOURCE_LANGUAGE}", source_language)
            .replace("{TARGET_LANGUAGE}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::mod_translator()
    }
}

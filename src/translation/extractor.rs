/*!
 * Extraction of the JSON payload from free-form model replies.
 *
 * Models like to wrap their answer in prose ("Sure! Here is ..."). The
 * extractor slices from the first `{` to the last `}` and parses that span.
 * Braces are matched by position only; a stray `}` before the payload or a
 * `{` after it will make the span unparsable and the reply is reported as
 * malformed rather than repaired.
 */

use crate::errors::ExtractError;

use super::LanguageMap;

/// Extracts language map fragments from model replies
pub struct ResponseExtractor;

impl ResponseExtractor {
    /// Byte span from the first `{` to the last `}`, inclusive
    pub fn json_span(text: &str) -> Option<&str> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        Some(&text[start..=end])
    }

    /// Extract and parse the JSON object embedded in a reply
    pub fn extract(text: &str) -> Result<LanguageMap, ExtractError> {
        let span = Self::json_span(text).ok_or(ExtractError::Incomplete)?;
        serde_json::from_str::<LanguageMap>(span)
            .map_err(|e| ExtractError::Malformed(e.to_string()))
    }
}

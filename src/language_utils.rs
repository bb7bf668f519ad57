use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Language utilities for Minecraft locale codes
///
/// Minecraft names its language files after locale codes such as `en_us`
/// or `ja_jp`: an ISO 639 language prefix, an underscore and a region.
/// These helpers validate such codes and resolve the language prefix.
static LOCALE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]{2,3})_([a-z0-9]{2,3})$").expect("valid locale regex")
});

/// Split a locale code into its language and region parts
fn split_locale(code: &str) -> Option<(String, String)> {
    let normalized = code.trim().to_lowercase();
    let caps = LOCALE_PATTERN.captures(&normalized)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Resolve the ISO 639 language of a prefix
fn language_from_prefix(prefix: &str) -> Option<Language> {
    match prefix.len() {
        2 => Language::from_639_1(prefix),
        3 => Language::from_639_3(prefix),
        _ => None,
    }
}

/// Validate a Minecraft locale code, returning it normalized to lowercase
pub fn validate_locale_code(code: &str) -> Result<String> {
    let (language, region) = split_locale(code)
        .ok_or_else(|| anyhow!("Invalid locale code (expected e.g. 'en_us'): {}", code))?;

    if language_from_prefix(&language).is_none() {
        return Err(anyhow!("Unknown language in locale code: {}", code));
    }

    Ok(format!("{}_{}", language, region))
}

/// Check if two locale codes name the same locale
pub fn locale_codes_match(code1: &str, code2: &str) -> bool {
    match (validate_locale_code(code1), validate_locale_code(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name of a locale code
pub fn get_language_name(code: &str) -> Result<String> {
    let (language, _) = split_locale(code)
        .ok_or_else(|| anyhow!("Invalid locale code: {}", code))?;
    let lang = language_from_prefix(&language)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}

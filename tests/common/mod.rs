/*!
 * Common test utilities for the modlingo test suite
 */

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use modlingo::app_config::Config;
use modlingo::LanguageMap;

/// Manifest of a well-formed test mod
pub const TEST_MANIFEST: &str = "Manifest-Version: 1.0\r\nSpecification-Title: Test Mod\r\nImplementation-Version: 1.0.0\r\n";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Builds a language map from key/value pairs
pub fn language_map(pairs: &[(&str, &str)]) -> LanguageMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Creates a jar with the given entries in the specified directory
pub fn create_test_jar(dir: &Path, filename: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
    let entries: Vec<(&str, &[u8])> = entries.iter()
        .map(|(name, content)| (*name, content.as_bytes()))
        .collect();
    create_test_jar_with_options(dir, filename, &entries, SimpleFileOptions::default())
}

/// Creates a jar whose entries are stored uncompressed, so their bytes can be found in the file
pub fn create_stored_test_jar(dir: &Path, filename: &str, entries: &[(&str, &[u8])]) -> Result<PathBuf> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    create_test_jar_with_options(dir, filename, entries, options)
}

fn create_test_jar_with_options(
    dir: &Path,
    filename: &str,
    entries: &[(&str, &[u8])],
    options: SimpleFileOptions,
) -> Result<PathBuf> {
    let jar_path = dir.join(filename);
    let mut writer = ZipWriter::new(File::create(&jar_path)?);
    for (name, content) in entries {
        writer.start_file(*name, options.clone())?;
        writer.write_all(content)?;
    }
    writer.finish()?;
    Ok(jar_path)
}

/// Flips one byte of the first occurrence of `marker` inside a file
pub fn corrupt_file_at(path: &Path, marker: &[u8]) -> Result<()> {
    let mut bytes = fs::read(path)?;
    let position = bytes.windows(marker.len())
        .position(|window| window == marker)
        .ok_or_else(|| anyhow::anyhow!("marker not found in {:?}", path))?;
    bytes[position] ^= 0x01;
    fs::write(path, bytes)?;
    Ok(())
}

/// Creates a typical mod jar: manifest, a class file and an en_us language file
pub fn create_mod_jar(dir: &Path, filename: &str, source: &LanguageMap) -> Result<PathBuf> {
    let source_json = serde_json::to_string_pretty(source)?;
    create_test_jar(dir, filename, &[
        ("META-INF/MANIFEST.MF", TEST_MANIFEST),
        ("com/example/TestMod.class", "not really bytecode"),
        ("assets/testmod/lang/en_us.json", &source_json),
    ])
}

/// Reads one entry of a jar as text, if present
pub fn read_jar_entry(jar: &Path, entry: &str) -> Result<Option<String>> {
    let mut archive = ZipArchive::new(File::open(jar)?)?;
    let mut file = match archive.by_name(entry) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Creates a valid configuration rooted in a temporary directory
pub fn create_test_config(root: &Path) -> Result<Config> {
    let mods_dir = root.join("mods");
    fs::create_dir_all(&mods_dir)?;

    let mut config = Config::default();
    config.translation.api_key = "sk-test".to_string();
    config.translation.prompt_file = root.join("prompt.txt").to_string_lossy().to_string();
    config.mods.mods_dir = mods_dir.to_string_lossy().to_string();
    config.mods.backup_dir = root.join("backup").to_string_lossy().to_string();
    Ok(config)
}

/*!
 * Mod archive (.jar) handling.
 *
 * Reads language files and the manifest out of a mod jar and writes a
 * translated language file back into it. The archive is rewritten into a
 * temporary file that replaces the original only once it is complete.
 */

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::errors::ModError;
use crate::translation::LanguageMap;

/// Manifest line carrying the human readable mod name
const SPECIFICATION_TITLE: &str = "Specification-Title:";

/// An opened mod jar and the names of its entries
#[derive(Debug, Clone)]
pub struct ModArchive {
    path: PathBuf,
    entry_names: Vec<String>,
}

impl ModArchive {
    /// Open a jar and index its entries
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ModError> {
        let path = path.as_ref().to_path_buf();
        let mut archive = ZipArchive::new(File::open(&path)?)?;

        let mut entry_names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if !entry.is_dir() {
                entry_names.push(entry.name().to_string());
            }
        }
        entry_names.sort();

        Ok(Self { path, entry_names })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File entries, sorted by name
    pub fn entry_names(&self) -> &[String] {
        &self.entry_names
    }

    /// First entry whose file name matches, ignoring ASCII case
    pub fn find_file(&self, file_name: &str) -> Option<&str> {
        self.entry_names.iter()
            .find(|name| {
                let base = name.rsplit('/').next().unwrap_or(name.as_str());
                base.eq_ignore_ascii_case(file_name)
            })
            .map(String::as_str)
    }

    /// Language file of a locale, e.g. `assets/mod/lang/en_us.json`
    pub fn find_language_file(&self, locale: &str) -> Option<&str> {
        self.find_file(&format!("{}.json", locale))
    }

    /// First `*.MF` manifest entry
    pub fn find_manifest(&self) -> Option<&str> {
        self.entry_names.iter()
            .find(|name| name.to_ascii_uppercase().ends_with(".MF"))
            .map(String::as_str)
    }

    /// Read an entry's bytes, dropping a UTF-8 BOM
    fn read_bytes(&self, entry_path: &str) -> Result<Vec<u8>, ModError> {
        let mut archive = ZipArchive::new(File::open(&self.path)?)?;
        let mut entry = archive.by_name(entry_path)?;

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;

        if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            bytes.drain(..3);
        }
        Ok(bytes)
    }

    /// Read an entry as text, replacing invalid UTF-8
    pub fn read_string(&self, entry_path: &str) -> Result<String, ModError> {
        let bytes = self.read_bytes(entry_path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read and parse a flat language file, which must be valid UTF-8
    pub fn read_language_map(&self, entry_path: &str) -> Result<LanguageMap, ModError> {
        let invalid = |message: String| ModError::InvalidLanguageFile {
            path: entry_path.to_string(),
            message,
        };
        let text = String::from_utf8(self.read_bytes(entry_path)?)
            .map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))
    }

    /// Mod name from the manifest's `Specification-Title` line
    pub fn mod_name(&self) -> Result<Option<String>, ModError> {
        match self.find_manifest() {
            Some(manifest) => Ok(specification_title(&self.read_string(manifest)?)),
            None => Ok(None),
        }
    }

    /// Add or replace one entry, rewriting the archive in place
    pub fn write_entry(&self, entry_path: &str, content: &[u8]) -> Result<(), ModError> {
        let temp_path = temp_path_for(&self.path);
        if let Err(error) = self.copy_with_entry(&temp_path, entry_path, content) {
            let _ = fs::remove_file(&temp_path);
            return Err(error);
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn copy_with_entry(&self, output_path: &Path, entry_path: &str, content: &[u8]) -> Result<(), ModError> {
        let mut source = ZipArchive::new(File::open(&self.path)?)?;
        let mut writer = ZipWriter::new(File::create(output_path)?);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for i in 0..source.len() {
            let mut entry = source.by_index(i)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                writer.add_directory(name.as_str(), options.clone())?;
                continue;
            }
            if name == entry_path {
                continue;
            }

            let mut buffer = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut buffer)?;
            writer.start_file(name.as_str(), options.clone())?;
            writer.write_all(&buffer)?;
        }

        writer.start_file(entry_path, options)?;
        writer.write_all(content)?;
        writer.finish()?;
        Ok(())
    }
}

/// Extract the value of a `Specification-Title:` manifest line
pub fn specification_title(manifest: &str) -> Option<String> {
    manifest.lines()
        .find_map(|line| line.strip_prefix(SPECIFICATION_TITLE))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Sibling path of a language file for another locale
pub fn sibling_language_path(source_entry: &str, locale: &str) -> String {
    match source_entry.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}.json", dir, locale),
        None => format!("{}.json", locale),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".tmp{}", std::process::id()));
    path.with_file_name(name)
}

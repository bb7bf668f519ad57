use anyhow::{Result, Context};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension directly inside a directory, sorted by name
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let normalized_ext = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Mod jars of a mods directory, in file name order
    pub fn find_mod_jars<P: AsRef<Path>>(mods_dir: P) -> Result<Vec<PathBuf>> {
        let mods_dir = mods_dir.as_ref();
        if !Self::dir_exists(mods_dir) {
            return Err(anyhow::anyhow!("Mods directory does not exist: {:?}", mods_dir));
        }
        Self::find_files(mods_dir, "jar")
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Copy every file into `<backup_root>/<yyyyMMddHHmmss>/mods/`
    ///
    /// # Returns
    /// * The folder the files were copied into
    pub fn backup_files<P: AsRef<Path>>(files: &[PathBuf], backup_root: P) -> Result<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let backup_dir = backup_root.as_ref().join(timestamp).join("mods");
        Self::ensure_dir(&backup_dir)?;

        for file in files {
            let file_name = file.file_name()
                .ok_or_else(|| anyhow::anyhow!("Not a file path: {:?}", file))?;
            Self::copy_file(file, backup_dir.join(file_name))?;
        }

        Ok(backup_dir)
    }
}

use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::errors::{AppError, ModError};
use crate::file_utils::FileManager;
use crate::mod_archive::{self, ModArchive};
use crate::providers::Provider;
use crate::providers::openai::OpenAI;
use crate::translation::{BatchOrchestrator, ProgressEvent, PromptTemplate, RetryingTranslator};

// @module: Application controller for mod language file translation

/// Why a mod was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The archive could not be read
    UnreadableArchive(String),
    /// A target language file is already shipped
    TargetExists,
    /// No `*.MF` manifest in the archive
    NoManifest,
    /// No source language file in the archive
    NoSourceFile,
    /// The source language file is not a flat string map
    InvalidSourceFile(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnreadableArchive(e) => write!(f, "the archive could not be read: {}", e),
            Self::TargetExists => write!(f, "the translation file already exists"),
            Self::NoManifest => write!(f, "the meta information file was not found"),
            Self::NoSourceFile => write!(f, "the original language file was not found"),
            Self::InvalidSourceFile(e) => write!(f, "the original language file is invalid: {}", e),
        }
    }
}

/// Result of processing one mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModOutcome {
    /// A target language file was written into the archive
    Translated {
        /// Entry path of the new language file
        entry: String,
        /// Number of translated keys
        keys: usize,
    },
    /// The mod was left untouched
    Skipped(SkipReason),
}

/// What a full run did
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Jar names that received a translation
    pub translated: Vec<String>,
    /// Jar names left untouched, with the reason
    pub skipped: Vec<(String, SkipReason)>,
    /// Where the jars were backed up to
    pub backup_dir: Option<PathBuf>,
    /// The run stopped early on a shutdown request
    pub interrupted: bool,
}

/// Main application controller for mod translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: System prompt template, rendered per mod
    template: PromptTemplate,
    // @field: Set to stop before the next mod
    shutdown: Arc<AtomicBool>,
}

impl Controller {
    // @method: Create a new controller, loading the prompt file named in the configuration
    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        let template = PromptTemplate::load_or_default(&config.translation.prompt_file)?;
        Ok(Self::with_template(config, template))
    }

    /// Create a controller with an explicit prompt template
    pub fn with_template(mut config: Config, template: PromptTemplate) -> Self {
        config.normalize();
        Self {
            config,
            template,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the run before the next mod once set
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run over the configured mods directory with the OpenAI provider
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        let translation = &self.config.translation;
        let provider = OpenAI::new_with_config(
            translation.api_key.clone(),
            translation.model.clone(),
            translation.endpoint.clone(),
            Duration::from_secs(translation.timeout_secs),
        );
        self.run_with_provider(provider).await
    }

    /// Run over the configured mods directory with any provider
    pub async fn run_with_provider<P: Provider>(&self, provider: P) -> Result<RunSummary, AppError> {
        let orchestrator = self.orchestrator(provider);
        let mods_dir = PathBuf::from(&self.config.mods.mods_dir);
        let jars = FileManager::find_mod_jars(&mods_dir)?;

        let mut summary = RunSummary::default();
        if jars.is_empty() {
            warn!("No mod jars found in {:?}", mods_dir);
            return Ok(summary);
        }

        let backup_dir = FileManager::backup_files(&jars, &self.config.mods.backup_dir)?;
        info!("Backed up {} mod(s) to {:?}", jars.len(), backup_dir);
        summary.backup_dir = Some(backup_dir);

        for (index, jar) in jars.iter().enumerate() {
            if self.shutdown.load(Ordering::SeqCst) {
                warn!("Shutdown requested, stopping before {:?}", jar);
                summary.interrupted = true;
                break;
            }

            let jar_name = Self::jar_name(jar);
            info!("Current processing target: {} / {} {}", index + 1, jars.len(), jar_name);

            match self.process_mod(&orchestrator, jar).await {
                Ok(ModOutcome::Translated { entry, keys }) => {
                    info!("Wrote {} key(s) to {}", keys, entry);
                    summary.translated.push(jar_name);
                }
                Ok(ModOutcome::Skipped(reason)) => {
                    info!("Skipping {}: {}", jar_name, reason);
                    summary.skipped.push((jar_name, reason));
                }
                Err(e) => {
                    error!("{}", e);
                    return Err(e);
                }
            }
        }

        info!(
            "Finished: {} translated, {} skipped{}",
            summary.translated.len(),
            summary.skipped.len(),
            if summary.interrupted { " (interrupted)" } else { "" }
        );
        Ok(summary)
    }

    /// Build the orchestrator described by the configuration
    pub fn orchestrator<P: Provider>(&self, provider: P) -> BatchOrchestrator<P> {
        let translation = &self.config.translation;
        let translator = RetryingTranslator::with_max_attempts(provider, translation.max_attempts);
        BatchOrchestrator::new(translator, translation.batch_size)
            .with_max_batch_attempts(translation.max_batch_attempts)
    }

    /// Translate one mod jar
    ///
    /// Archive-level problems skip the mod; a translation failure is fatal
    /// and leaves the archive untouched.
    pub async fn process_mod<P: Provider>(
        &self,
        orchestrator: &BatchOrchestrator<P>,
        jar: &Path,
    ) -> Result<ModOutcome, AppError> {
        let source_language = &self.config.source_language;
        let target_language = &self.config.target_language;
        let jar_name = Self::jar_name(jar);

        let archive = match ModArchive::open(jar) {
            Ok(archive) => archive,
            Err(e) => return Ok(ModOutcome::Skipped(SkipReason::UnreadableArchive(e.to_string()))),
        };

        if archive.find_language_file(target_language).is_some() {
            return Ok(ModOutcome::Skipped(SkipReason::TargetExists));
        }
        if archive.find_manifest().is_none() {
            return Ok(ModOutcome::Skipped(SkipReason::NoManifest));
        }
        let Some(source_entry) = archive.find_language_file(source_language) else {
            return Ok(ModOutcome::Skipped(SkipReason::NoSourceFile));
        };
        let source_entry = source_entry.to_string();

        let source_map = match archive.read_language_map(&source_entry) {
            Ok(map) => map,
            Err(ModError::InvalidLanguageFile { message, .. }) => {
                return Ok(ModOutcome::Skipped(SkipReason::InvalidSourceFile(message)));
            }
            Err(e) => return Ok(ModOutcome::Skipped(SkipReason::UnreadableArchive(e.to_string()))),
        };

        let mod_name = match archive.mod_name() {
            Ok(title) => title.unwrap_or_else(|| jar_name.clone()),
            Err(e) => return Ok(ModOutcome::Skipped(SkipReason::UnreadableArchive(e.to_string()))),
        };
        debug!("Mod name: {}, source file: {}", mod_name, source_entry);
        let system_prompt = self.template.render(&mod_name, source_language, target_language);

        let progress_bar = Self::batch_progress_bar(&mod_name);
        let target_map = orchestrator
            .translate_map(&source_map, &system_prompt, |event| Self::report(&progress_bar, event))
            .await;
        progress_bar.finish_and_clear();

        let target_map = target_map.map_err(|source| AppError::Translation {
            mod_name: jar_name.clone(),
            source,
        })?;

        let target_json = serde_json::to_string_pretty(&target_map)
            .map_err(|e| AppError::Unknown(format!("Failed to serialize translation: {}", e)))?;
        let target_entry = mod_archive::sibling_language_path(&source_entry, target_language);
        archive.write_entry(&target_entry, target_json.as_bytes())?;

        Ok(ModOutcome::Translated {
            entry: target_entry,
            keys: target_map.len(),
        })
    }

    fn batch_progress_bar(mod_name: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(mod_name.to_string());
        progress_bar
    }

    fn report(progress_bar: &ProgressBar, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total_batches, total_keys } => {
                progress_bar.set_length(total_batches as u64);
                debug!("Translating {} key(s) in {} batch(es)", total_keys, total_batches);
            }
            ProgressEvent::BatchStarted { batch, total_batches } => {
                debug!("Processing batch {} of {}", batch, total_batches);
            }
            ProgressEvent::BatchRetrying { batch, attempt, error } => {
                progress_bar.set_message(format!("batch {} retry {} ({})", batch, attempt, error));
            }
            ProgressEvent::BatchCompleted { .. } => progress_bar.inc(1),
        }
    }

    fn jar_name(jar: &Path) -> String {
        jar.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

//! Language resolution for candidate files: a forced language from the
//! settings wins, otherwise the extension is looked up in the registry.
//! Files resolving to no language are skipped by the indexer, never an
//! error; a forced language missing from the registry is fatal before
//! any crawling starts.

use crate::config::Settings;
use crate::core::{Error, Languages, Result};
use std::path::Path;

#[derive(Debug)]
pub struct LanguageDetection {
    languages: Languages,
    forced: Option<String>,
}

impl LanguageDetection {
    pub fn new(languages: Languages, settings: &Settings) -> Result<Self> {
        if let Some(forced) = &settings.forced_language {
            if languages.get(forced).is_none() {
                return Err(Error::configuration(format!(
                    "You must install a plugin that supports the language '{}'",
                    forced
                )));
            }
        }
        Ok(Self {
            languages,
            forced: settings.forced_language.clone(),
        })
    }

    pub fn language_of(&self, relative_path: &str) -> Option<String> {
        if let Some(forced) = &self.forced {
            return Some(forced.clone());
        }
        let extension = Path::new(relative_path)
            .extension()
            .and_then(|e| e.to_str())?;
        self.languages
            .of_extension(extension)
            .map(|l| l.key.clone())
    }
}

use crate::config::{SourceMode, ViewerConfig};
use crate::error::ViewerError;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the files directly inside `directory` whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively. The listing is sorted by file name.
pub fn enumerate_sources(
    directory: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, ViewerError> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(ViewerError::source_open(directory, e)),
            Err(e) => {
                log::warn!("skipping unreadable entry in {}: {}", directory.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && has_allowed_extension(entry.path(), extensions) {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
}

/// Picks one input file from a dataset directory, uniformly at random.
pub struct SourceSelector<R = StdRng> {
    dataset_path: PathBuf,
    mode: SourceMode,
    extensions: Vec<String>,
    rng: R,
}

impl SourceSelector<StdRng> {
    /// Seeds from the configuration when a seed is given, from entropy otherwise.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SourceSelector::with_rng(config, rng)
    }
}

impl<R: Rng> SourceSelector<R> {
    pub fn with_rng(config: &ViewerConfig, rng: R) -> Self {
        SourceSelector {
            dataset_path: config.dataset_path.clone(),
            mode: config.mode,
            extensions: config.allowed_extensions().to_vec(),
            rng,
        }
    }

    pub fn candidates(&self) -> Result<Vec<PathBuf>, ViewerError> {
        log::debug!(
            "scanning {} for {} files ({})",
            self.dataset_path.display(),
            self.mode,
            self.extensions.iter().join(", ")
        );
        enumerate_sources(&self.dataset_path, &self.extensions)
    }

    pub fn select(&mut self) -> Result<PathBuf, ViewerError> {
        let candidates = self.candidates()?;
        let selected = candidates
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| ViewerError::EmptyPool {
                path: self.dataset_path.clone(),
                mode: self.mode,
            })?;
        log::info!(
            "selected {} out of {} candidates",
            selected.display(),
            candidates.len()
        );
        Ok(selected)
    }
}

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;
use tracing::warn;

pub const CONFIG_FILE: &str = "config.json";

/// Directory name of the current install identity.
const APP_DIR: &str = "codeshade";

/// Older install identities that may still hold a config file: the packaged
/// Electron-era product name and the unpackaged hosting-runtime default.
/// Scanned read/delete only, never written.
const LEGACY_DIRS: [&str; 2] = ["CodeShade", "Electron"];

/// Overrides the canonical config directory (tilde expansion supported).
pub const CONFIG_DIR_ENV: &str = "CODESHADE_CONFIG_DIR";

/// Every on-disk location where a config file may exist, in scan order.
/// The first entry is the canonical path the store reads and writes;
/// the rest are only ever visited by reconciliation and manual reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    canonical: PathBuf,
    candidates: Vec<PathBuf>,
}

impl ConfigPaths {
    /// Build from an explicit candidate list; the first entry is canonical.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        let canonical = candidates
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self {
            canonical,
            candidates,
        }
    }

    /// Enumerate candidate locations for the current OS and environment.
    ///
    /// Order: env override (if set) or the current identity under the OS
    /// config root, then legacy identities under the same root, then the
    /// working directory as a final fallback. Deterministic for a given
    /// environment. An unavailable config root (headless or stripped-down
    /// test environments) is logged and skipped, never an error.
    pub fn resolve() -> Self {
        let mut candidates = Vec::new();

        let override_dir = env::var(CONFIG_DIR_ENV).ok().and_then(|raw| {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(PathBuf::from(shellexpand::tilde(&trimmed).to_string()))
            }
        });

        if let Some(dir) = &override_dir {
            candidates.push(dir.join(CONFIG_FILE));
        }

        match BaseDirs::new() {
            Some(base) => {
                let root = base.config_dir();
                if override_dir.is_none() {
                    candidates.push(root.join(APP_DIR).join(CONFIG_FILE));
                }
                for legacy in LEGACY_DIRS {
                    candidates.push(root.join(legacy).join(CONFIG_FILE));
                }
            }
            None => {
                warn!("could not determine the user config directory; skipping application data paths");
            }
        }

        match env::current_dir() {
            Ok(cwd) => candidates.push(cwd.join(CONFIG_FILE)),
            Err(e) => warn!("could not determine the working directory: {e}"),
        }

        // The override can point at the working directory; keep first occurrence.
        let mut deduped: Vec<PathBuf> = Vec::with_capacity(candidates.len());
        for path in candidates {
            if !deduped.contains(&path) {
                deduped.push(path);
            }
        }

        Self::new(deduped)
    }

    pub fn canonical(&self) -> &std::path::Path {
        &self.canonical
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

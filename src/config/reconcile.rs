use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::paths::ConfigPaths;
use super::validate;

/// What a reconciliation or reset pass did, for logging and the CLI.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub kept: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

/// Startup pass over every candidate path: unreadable, unparseable and
/// schema-invalid files are deleted; valid files are left untouched.
///
/// More than one valid file can survive at different legacy paths; only
/// the canonical one is read by the store afterwards, so the leftovers
/// are reported rather than removed.
pub fn reconcile(paths: &ConfigPaths) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for path in paths.candidates() {
        if !path.exists() {
            continue;
        }

        let keep = match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(raw) => validate::is_valid(&raw),
                Err(e) => {
                    debug!("unparseable config file at {}: {e}", path.display());
                    false
                }
            },
            Err(e) => {
                debug!("unreadable config file at {}: {e}", path.display());
                false
            }
        };

        if keep {
            report.kept.push(path.clone());
        } else {
            remove(path, &mut report);
        }
    }

    if report.kept.len() > 1 {
        info!(
            "{} valid config files remain after reconciliation; only {} is active",
            report.kept.len(),
            paths.canonical().display()
        );
    }

    report
}

/// Operator reset: delete every candidate file regardless of validity.
pub fn force_clear(paths: &ConfigPaths) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for path in paths.candidates() {
        if path.exists() {
            remove(path, &mut report);
        }
    }

    report
}

fn remove(path: &Path, report: &mut ReconcileReport) {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("removed stale config file at {}", path.display());
            report.removed.push(path.to_path_buf());
        }
        // Best effort: a file we cannot delete must not stop the pass.
        Err(e) => warn!("failed to remove config file at {}: {e}", path.display()),
    }
}

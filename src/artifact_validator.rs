use anyhow::Context;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the optional checksum manifest inside the models directory.
pub const CHECKSUM_MANIFEST: &str = "checksums.json";

/// Verifies model artifacts against SHA-256 checksums before they are served.
///
/// The manifest is a JSON object mapping file names (relative to the models
/// directory) to lowercase hex digests:
///
/// ```json
/// { "model_pmfby.json": "9f86d081884c7d65..." }
/// ```
///
/// A missing manifest disables the check. A listed file that is missing or
/// whose digest differs is a startup error.
pub fn verify_models_dir(models_dir: &Path) -> anyhow::Result<usize> {
    let manifest_path = models_dir.join(CHECKSUM_MANIFEST);
    if !manifest_path.exists() {
        tracing::info!(
            "No {} in {}, skipping artifact integrity check",
            CHECKSUM_MANIFEST,
            models_dir.display()
        );
        return Ok(0);
    }

    let raw = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let manifest: BTreeMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid checksum manifest {}", manifest_path.display()))?;

    for (file, expected) in &manifest {
        let path = models_dir.join(file);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("artifact {} listed in manifest is unreadable", path.display()))?;
        let actual = compute_checksum(&bytes);

        if !actual.eq_ignore_ascii_case(expected.trim()) {
            tracing::error!(
                "Checksum mismatch for {}. Expected: {}, Actual: {}",
                file,
                expected,
                actual
            );
            anyhow::bail!("checksum mismatch for artifact {}", file);
        }
        tracing::debug!("Verified checksum of {}", file);
    }

    tracing::info!("Verified {} model artifacts against {}", manifest.len(), CHECKSUM_MANIFEST);
    Ok(manifest.len())
}

/// Hex-encoded SHA-256 of `data`.
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

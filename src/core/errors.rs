//! Installation error taxonomy.

use thiserror::Error;

/// Error during an install or uninstall pipeline.
///
/// All variants are fatal to the operation that raised them and leave the
/// filesystem in its pre-operation state. Missing runtime dependencies and
/// smoke-test failures are *not* errors; they surface as warnings on a
/// successful [`InstallReport`](crate::ops::install::InstallReport).
#[derive(Debug, Error)]
pub enum InstallError {
    /// A required manifest field is missing or still a placeholder.
    ///
    /// Raised before any I/O happens. Notably covers the placeholder
    /// `sha256` sentinel shipped in unreleased manifests.
    #[error("manifest for `{package}` is incomplete: {field} {reason}")]
    ManifestIncomplete {
        package: String,
        field: &'static str,
        reason: String,
    },

    /// Network or HTTP failure while downloading the archive.
    ///
    /// Safe for the caller to retry; the archive is read-only content.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The download exceeded the caller-supplied timeout.
    #[error("fetch of {url} timed out after {seconds}s")]
    FetchTimeout { url: String, seconds: u64 },

    /// The archive's SHA-256 digest does not match the manifest.
    ///
    /// The downloaded content is discarded; nothing reaches the prefix.
    #[error(
        "checksum mismatch for {url}\n  expected: {expected}\n  actual:   {actual}"
    )]
    Integrity {
        url: String,
        expected: String,
        actual: String,
    },

    /// Malformed archive data, or an entry that would escape the prefix.
    #[error("failed to extract archive: {reason}")]
    Extraction { reason: String },

    /// Infrastructure failure (filesystem, lock acquisition, ...).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InstallError {
    /// Short kind name for log lines and CLI summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            InstallError::ManifestIncomplete { .. } => "ManifestIncomplete",
            InstallError::Fetch { .. } | InstallError::FetchTimeout { .. } => "FetchError",
            InstallError::Integrity { .. } => "IntegrityError",
            InstallError::Extraction { .. } => "ExtractionError",
            InstallError::Other(_) => "Error",
        }
    }

    /// Whether the caller may safely retry the whole operation.
    ///
    /// Only fetch failures qualify - re-fetching read-only release content
    /// is idempotent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InstallError::Fetch { .. } | InstallError::FetchTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = InstallError::Integrity {
            url: "https://example.com/a.tar.gz".to_string(),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(err.kind(), "IntegrityError");
        assert!(!err.is_retryable());

        let err = InstallError::FetchTimeout {
            url: "https://example.com/a.tar.gz".to_string(),
            seconds: 30,
        };
        assert_eq!(err.kind(), "FetchError");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_display_includes_digests() {
        let err = InstallError::Integrity {
            url: "https://example.com/a.tar.gz".to_string(),
            expected: "deadbeef".to_string(),
            actual: "cafebabe".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("deadbeef"));
        assert!(msg.contains("cafebabe"));
    }
}

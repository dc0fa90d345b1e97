//! Per-check findings attached to receipts.

use serde::{Deserialize, Serialize};

/// Stable finding classification for check failures.
///
/// These names are part of the receipt contract; renaming one breaks every
/// downstream consumer that filters receipts by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    /// Discovery ran and found no acceptable candidate bundle.
    DiscoveryEmpty,
    /// A discovery candidate was rejected (reason recorded per candidate).
    CandidateRejected,
    /// A required artifact file is absent or unreadable.
    MissingArtifact,
    /// Structural shape/type violation inside an artifact payload.
    SchemaInvalid,
    /// Cross-field or cross-artifact semantic violation.
    ConsistencyViolation,
    /// An artifact carries the in-payload sample/fixture marker.
    SampleRejected,
    /// A recorded digest or source path no longer matches current bytes.
    ProvenanceMismatch,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One collected check failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
    /// Logical artifact name the finding applies to, when attributable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    pub fn missing_artifact(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FindingKind::MissingArtifact, message).with_artifact(artifact)
    }

    pub fn schema_invalid(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FindingKind::SchemaInvalid, message).with_artifact(artifact)
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        Self::new(FindingKind::ConsistencyViolation, message)
    }

    pub fn sample_rejected(artifact: impl Into<String>) -> Self {
        let artifact = artifact.into();
        Self::new(
            FindingKind::SampleRejected,
            format!("artifact '{artifact}' is marked is_sample=true; sample/fixture data is not valid promotion evidence"),
        )
        .with_artifact(artifact)
    }

    pub fn provenance(message: impl Into<String>) -> Self {
        Self::new(FindingKind::ProvenanceMismatch, message)
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.artifact {
            Some(artifact) => write!(f, "{} [{}]: {}", self.kind, artifact, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Finding, FindingKind};

    #[test]
    fn display_includes_artifact_when_present() {
        let finding = Finding::sample_rejected("ranked_runs");
        assert!(finding.to_string().starts_with("SampleRejected [ranked_runs]:"));

        let bare = Finding::consistency("ranks are not contiguous");
        assert_eq!(
            bare.to_string(),
            "ConsistencyViolation: ranks are not contiguous"
        );
    }

    #[test]
    fn kind_serializes_as_stable_name() {
        let json = serde_json::to_string(&FindingKind::ProvenanceMismatch).unwrap();
        assert_eq!(json, "\"ProvenanceMismatch\"");
    }
}

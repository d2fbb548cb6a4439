use crate::domain::value_objects::ids::{ActorId, SubmissionId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Digital,
    Physical,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Digital => "digital",
            SubmissionKind::Physical => "physical",
        }
    }

    pub fn parse(value: &str) -> Option<SubmissionKind> {
        match value {
            "digital" => Some(SubmissionKind::Digital),
            "physical" => Some(SubmissionKind::Physical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    ChangesRequested,
    Rejected,
    Approved,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::ChangesRequested => "changes_requested",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Approved => "approved",
        }
    }

    pub fn parse(value: &str) -> Option<SubmissionStatus> {
        match value {
            "submitted" => Some(SubmissionStatus::Submitted),
            "changes_requested" => Some(SubmissionStatus::ChangesRequested),
            "rejected" => Some(SubmissionStatus::Rejected),
            "approved" => Some(SubmissionStatus::Approved),
            _ => None,
        }
    }
}

/// A versioned contractor deliverable. Each resubmission increments
/// `version`; only the highest version for a work request is reviewable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    pub work_request_id: WorkRequestId,
    pub submitted_by: ActorId,
    pub version: i32,
    pub kind: SubmissionKind,
    pub artifact_url: Option<String>,
    pub deliverable_files: Vec<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: SubmissionStatus,
    pub review_notes: Option<String>,
    pub submitted_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionValidationError {
    InvalidVersion,
    MissingArtifact,
    MissingDescription,
}

impl Submission {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SubmissionId,
        work_request_id: WorkRequestId,
        submitted_by: ActorId,
        version: i32,
        kind: SubmissionKind,
        artifact_url: Option<String>,
        deliverable_files: Vec<String>,
        description: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, SubmissionValidationError> {
        if version < 1 {
            return Err(SubmissionValidationError::InvalidVersion);
        }
        match kind {
            SubmissionKind::Digital => {
                let has_url = artifact_url.as_deref().is_some_and(|u| !u.trim().is_empty());
                if !has_url && deliverable_files.is_empty() {
                    return Err(SubmissionValidationError::MissingArtifact);
                }
            }
            SubmissionKind::Physical => {
                let has_description = description
                    .as_deref()
                    .is_some_and(|d| !d.trim().is_empty());
                if !has_description {
                    return Err(SubmissionValidationError::MissingDescription);
                }
            }
        }

        let now = Timestamp::now_utc();
        Ok(Self {
            id,
            work_request_id,
            submitted_by,
            version,
            kind,
            artifact_url,
            deliverable_files,
            description,
            notes,
            status: SubmissionStatus::Submitted,
            review_notes: None,
            submitted_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_digital_with_url_when_new_should_start_submitted() {
        let submission = Submission::new(
            SubmissionId::new(),
            WorkRequestId::new(),
            ActorId::new(),
            1,
            SubmissionKind::Digital,
            Some("https://cdn.example.com/drop.zip".to_string()),
            Vec::new(),
            None,
            None,
        )
        .expect("submission should be created");
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(submission.version, 1);
    }

    #[test]
    fn given_digital_without_artifact_when_new_should_return_error() {
        let result = Submission::new(
            SubmissionId::new(),
            WorkRequestId::new(),
            ActorId::new(),
            1,
            SubmissionKind::Digital,
            None,
            Vec::new(),
            Some("described but nothing attached".to_string()),
            None,
        );
        assert_eq!(result, Err(SubmissionValidationError::MissingArtifact));
    }

    #[test]
    fn given_digital_with_files_only_when_new_should_succeed() {
        let result = Submission::new(
            SubmissionId::new(),
            WorkRequestId::new(),
            ActorId::new(),
            2,
            SubmissionKind::Digital,
            None,
            vec!["final.pdf".to_string()],
            None,
            None,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn given_physical_without_description_when_new_should_return_error() {
        let result = Submission::new(
            SubmissionId::new(),
            WorkRequestId::new(),
            ActorId::new(),
            1,
            SubmissionKind::Physical,
            None,
            Vec::new(),
            None,
            None,
        );
        assert_eq!(result, Err(SubmissionValidationError::MissingDescription));
    }

    #[test]
    fn given_zero_version_when_new_should_return_error() {
        let result = Submission::new(
            SubmissionId::new(),
            WorkRequestId::new(),
            ActorId::new(),
            0,
            SubmissionKind::Physical,
            None,
            Vec::new(),
            Some("shipped package".to_string()),
            None,
        );
        assert_eq!(result, Err(SubmissionValidationError::InvalidVersion));
    }

    #[test]
    fn given_status_strings_when_parsed_should_round_trip() {
        for status in [
            SubmissionStatus::Submitted,
            SubmissionStatus::ChangesRequested,
            SubmissionStatus::Rejected,
            SubmissionStatus::Approved,
        ] {
            assert_eq!(SubmissionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SubmissionStatus::parse("draft"), None);
    }
}

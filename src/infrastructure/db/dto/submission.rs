use crate::domain::entities::submission::{Submission, SubmissionKind, SubmissionStatus};
use crate::domain::value_objects::ids::{ActorId, SubmissionId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub work_request_id: Uuid,
    pub submitted_by: Uuid,
    pub version: i32,
    pub kind: String,
    pub artifact_url: Option<String>,
    pub deliverable_files: Vec<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub review_notes: Option<String>,
    pub submitted_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SubmissionRow {
    pub fn from_submission(submission: &Submission) -> Self {
        Self {
            id: submission.id.0,
            work_request_id: submission.work_request_id.0,
            submitted_by: submission.submitted_by.0,
            version: submission.version,
            kind: submission.kind.as_str().to_string(),
            artifact_url: submission.artifact_url.clone(),
            deliverable_files: submission.deliverable_files.clone(),
            description: submission.description.clone(),
            notes: submission.notes.clone(),
            status: submission.status.as_str().to_string(),
            review_notes: submission.review_notes.clone(),
            submitted_at: submission.submitted_at.into_inner(),
            updated_at: submission.updated_at.into_inner(),
        }
    }

    pub fn into_submission(self) -> Submission {
        Submission {
            id: SubmissionId(self.id),
            work_request_id: WorkRequestId(self.work_request_id),
            submitted_by: ActorId(self.submitted_by),
            version: self.version,
            kind: SubmissionKind::parse(&self.kind).unwrap_or(SubmissionKind::Digital),
            artifact_url: self.artifact_url,
            deliverable_files: self.deliverable_files,
            description: self.description,
            notes: self.notes,
            status: SubmissionStatus::parse(&self.status).unwrap_or(SubmissionStatus::Submitted),
            review_notes: self.review_notes,
            submitted_at: Timestamp::from(self.submitted_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_digital_submission_when_mapped_should_round_trip() {
        let submission = Submission::new(
            SubmissionId::new(),
            WorkRequestId::new(),
            ActorId::new(),
            2,
            SubmissionKind::Digital,
            Some("https://files.example.com/drop/v2.zip".to_string()),
            vec!["v2.zip".to_string(), "notes.pdf".to_string()],
            None,
            Some("Second pass after review".to_string()),
        )
        .expect("submission should be valid");

        let result = SubmissionRow::from_submission(&submission).into_submission();

        assert_eq!(result, submission);
    }
}

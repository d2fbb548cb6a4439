use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::value_objects::ids::{ActorId, ProjectId, WorkRequestId};
use crate::domain::value_objects::money::{Currency, Money};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct WorkRequestRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub business_id: Uuid,
    pub contractor_id: Uuid,
    pub title: String,
    pub description: String,
    pub deliverable_description: String,
    pub amount_minor: i64,
    pub currency: String,
    pub due_date: Option<OffsetDateTime>,
    pub status: String,
    pub review_notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub accepted_at: Option<OffsetDateTime>,
    pub declined_at: Option<OffsetDateTime>,
}

impl WorkRequestRow {
    pub fn from_work_request(work_request: &WorkRequest) -> Self {
        Self {
            id: work_request.id.0,
            project_id: work_request.project_id.0,
            business_id: work_request.business_id.0,
            contractor_id: work_request.contractor_id.0,
            title: work_request.title.clone(),
            description: work_request.description.clone(),
            deliverable_description: work_request.deliverable_description.clone(),
            amount_minor: work_request.amount.amount_minor,
            currency: work_request.amount.currency.as_str().to_string(),
            due_date: work_request.due_date.map(Timestamp::into_inner),
            status: work_request.status.as_str().to_string(),
            review_notes: work_request.review_notes.clone(),
            created_at: work_request.created_at.into_inner(),
            updated_at: work_request.updated_at.into_inner(),
            accepted_at: work_request.accepted_at.map(Timestamp::into_inner),
            declined_at: work_request.declined_at.map(Timestamp::into_inner),
        }
    }

    pub fn into_work_request(self) -> WorkRequest {
        WorkRequest {
            id: WorkRequestId(self.id),
            project_id: ProjectId(self.project_id),
            business_id: ActorId(self.business_id),
            contractor_id: ActorId(self.contractor_id),
            title: self.title,
            description: self.description,
            deliverable_description: self.deliverable_description,
            amount: Money::new(
                self.amount_minor,
                Currency::parse(&self.currency).unwrap_or(Currency::Usd),
            ),
            due_date: self.due_date.map(Timestamp::from),
            status: WorkRequestStatus::parse(&self.status).unwrap_or(WorkRequestStatus::Pending),
            review_notes: self.review_notes,
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
            accepted_at: self.accepted_at.map(Timestamp::from),
            declined_at: self.declined_at.map(Timestamp::from),
        }
    }
}

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Reservation row for a creation request. The key is scoped to the
/// calling actor; the work request id is filled by the same insert.
#[derive(Debug, Clone, FromRow)]
pub struct IdempotencyKeyRow {
    pub actor_id: Uuid,
    pub idempotency_key: String,
    pub work_request_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

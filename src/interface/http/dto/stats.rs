use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusCountResponse {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BusinessStatsResponse {
    pub status_counts: Vec<StatusCountResponse>,
    /// Submitted work awaiting a review decision.
    pub open_review: i64,
    /// Approved work whose payout has not been transferred yet.
    pub awaiting_payment: i64,
    pub total: i64,
}

use crate::domain::entities::contract::Contract;
use crate::domain::entities::milestone::Milestone;
use crate::domain::entities::payment::Payment;
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::value_objects::ids::{EventId, MilestoneId, PaymentId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::state_machine::TransitionError;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTopic {
    WorkRequestCreated,
    WorkRequestAccepted,
    WorkRequestDeclined,
    WorkRequestSubmitted,
    WorkRequestChangesRequested,
    WorkRequestRejected,
    WorkRequestApproved,
    WorkRequestPaid,
    ContractCreated,
    MilestoneSubmitted,
    MilestoneApproved,
    MilestoneRejected,
    PaymentCaptured,
    PaymentTransferred,
}

impl EventTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTopic::WorkRequestCreated => "work_request.created",
            EventTopic::WorkRequestAccepted => "work_request.accepted",
            EventTopic::WorkRequestDeclined => "work_request.declined",
            EventTopic::WorkRequestSubmitted => "work_request.submitted",
            EventTopic::WorkRequestChangesRequested => "work_request.changes_requested",
            EventTopic::WorkRequestRejected => "work_request.rejected",
            EventTopic::WorkRequestApproved => "work_request.approved",
            EventTopic::WorkRequestPaid => "work_request.paid",
            EventTopic::ContractCreated => "contract.created",
            EventTopic::MilestoneSubmitted => "milestone.submitted",
            EventTopic::MilestoneApproved => "milestone.approved",
            EventTopic::MilestoneRejected => "milestone.rejected",
            EventTopic::PaymentCaptured => "payment.captured",
            EventTopic::PaymentTransferred => "payment.transferred",
        }
    }

    pub fn parse(value: &str) -> Option<EventTopic> {
        match value {
            "work_request.created" => Some(EventTopic::WorkRequestCreated),
            "work_request.accepted" => Some(EventTopic::WorkRequestAccepted),
            "work_request.declined" => Some(EventTopic::WorkRequestDeclined),
            "work_request.submitted" => Some(EventTopic::WorkRequestSubmitted),
            "work_request.changes_requested" => Some(EventTopic::WorkRequestChangesRequested),
            "work_request.rejected" => Some(EventTopic::WorkRequestRejected),
            "work_request.approved" => Some(EventTopic::WorkRequestApproved),
            "work_request.paid" => Some(EventTopic::WorkRequestPaid),
            "contract.created" => Some(EventTopic::ContractCreated),
            "milestone.submitted" => Some(EventTopic::MilestoneSubmitted),
            "milestone.approved" => Some(EventTopic::MilestoneApproved),
            "milestone.rejected" => Some(EventTopic::MilestoneRejected),
            "payment.captured" => Some(EventTopic::PaymentCaptured),
            "payment.transferred" => Some(EventTopic::PaymentTransferred),
            _ => None,
        }
    }
}

/// A typed domain event persisted atomically with the transition that
/// produced it. Consumers subscribe to exact topics instead of watching
/// broad invalidation lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub topic: EventTopic,
    pub work_request_id: Option<WorkRequestId>,
    pub milestone_id: Option<MilestoneId>,
    pub payment_id: Option<PaymentId>,
    pub payload: serde_json::Value,
    pub occurred_at: Timestamp,
}

impl Event {
    const WORK_REQUEST_TRANSITIONS: [((WorkRequestStatus, WorkRequestStatus), EventTopic); 8] = [
        (
            (WorkRequestStatus::Pending, WorkRequestStatus::Accepted),
            EventTopic::WorkRequestAccepted,
        ),
        (
            (WorkRequestStatus::Pending, WorkRequestStatus::Declined),
            EventTopic::WorkRequestDeclined,
        ),
        (
            (WorkRequestStatus::Accepted, WorkRequestStatus::Submitted),
            EventTopic::WorkRequestSubmitted,
        ),
        (
            (WorkRequestStatus::Submitted, WorkRequestStatus::NeedsRevision),
            EventTopic::WorkRequestChangesRequested,
        ),
        (
            (WorkRequestStatus::NeedsRevision, WorkRequestStatus::Submitted),
            EventTopic::WorkRequestSubmitted,
        ),
        (
            (WorkRequestStatus::Submitted, WorkRequestStatus::Rejected),
            EventTopic::WorkRequestRejected,
        ),
        (
            (WorkRequestStatus::Submitted, WorkRequestStatus::Approved),
            EventTopic::WorkRequestApproved,
        ),
        (
            (WorkRequestStatus::Approved, WorkRequestStatus::Paid),
            EventTopic::WorkRequestPaid,
        ),
    ];

    fn new(
        topic: EventTopic,
        work_request_id: Option<WorkRequestId>,
        milestone_id: Option<MilestoneId>,
        payment_id: Option<PaymentId>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::new(),
            topic,
            work_request_id,
            milestone_id,
            payment_id,
            payload,
            occurred_at: Timestamp::now_utc(),
        }
    }

    pub fn work_request_created(work_request: &WorkRequest) -> Self {
        Self::new(
            EventTopic::WorkRequestCreated,
            Some(work_request.id),
            None,
            None,
            work_request_payload(work_request),
        )
    }

    /// Maps a committed work-request transition to its topic. Unknown
    /// pairs are forbidden transitions and never produce an event.
    pub fn from_work_request_transition(
        work_request: &WorkRequest,
        prev_status: WorkRequestStatus,
    ) -> Result<Self, TransitionError> {
        let topic = Self::WORK_REQUEST_TRANSITIONS
            .iter()
            .find(|(pair, _)| pair.0 == prev_status && pair.1 == work_request.status)
            .map(|(_, topic)| *topic)
            .ok_or(TransitionError::Forbidden)?;
        Ok(Self::new(
            topic,
            Some(work_request.id),
            None,
            None,
            work_request_payload(work_request),
        ))
    }

    pub fn contract_created(contract: &Contract) -> Self {
        Self::new(
            EventTopic::ContractCreated,
            None,
            None,
            None,
            json!({
                "contract_id": contract.id.0,
                "business_id": contract.business_id.0,
                "contractor_id": contract.contractor_id.0,
                "currency": contract.currency.as_str(),
                "status": contract.status.as_str(),
            }),
        )
    }

    pub fn milestone_submitted(milestone: &Milestone) -> Self {
        Self::milestone(EventTopic::MilestoneSubmitted, milestone)
    }

    pub fn milestone_approved(milestone: &Milestone) -> Self {
        Self::milestone(EventTopic::MilestoneApproved, milestone)
    }

    pub fn milestone_rejected(milestone: &Milestone) -> Self {
        Self::milestone(EventTopic::MilestoneRejected, milestone)
    }

    fn milestone(topic: EventTopic, milestone: &Milestone) -> Self {
        Self::new(
            topic,
            None,
            Some(milestone.id),
            None,
            json!({
                "milestone_id": milestone.id.0,
                "contract_id": milestone.contract_id.0,
                "status": milestone.status.as_str(),
                "amount_minor": milestone.amount.amount_minor,
                "currency": milestone.amount.currency.as_str(),
            }),
        )
    }

    pub fn payment_captured(payment: &Payment) -> Self {
        Self::payment(EventTopic::PaymentCaptured, payment)
    }

    pub fn payment_transferred(payment: &Payment) -> Self {
        Self::payment(EventTopic::PaymentTransferred, payment)
    }

    fn payment(topic: EventTopic, payment: &Payment) -> Self {
        Self::new(
            topic,
            payment.work_request_id,
            payment.milestone_id,
            Some(payment.id),
            json!({
                "payment_id": payment.id.0,
                "status": payment.status.as_str(),
                "amount_minor": payment.amount.amount_minor,
                "currency": payment.amount.currency.as_str(),
                "intent_id": payment.intent_id,
                "transfer_id": payment.transfer_id,
            }),
        )
    }
}

fn work_request_payload(work_request: &WorkRequest) -> serde_json::Value {
    json!({
        "work_request_id": work_request.id.0,
        "project_id": work_request.project_id.0,
        "business_id": work_request.business_id.0,
        "contractor_id": work_request.contractor_id.0,
        "status": work_request.status.as_str(),
        "amount_minor": work_request.amount.amount_minor,
        "currency": work_request.amount.currency.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ids::{ActorId, ProjectId};
    use crate::domain::value_objects::money::{Currency, Money};

    fn sample_work_request(status: WorkRequestStatus) -> WorkRequest {
        let mut wr = WorkRequest::new(
            WorkRequestId::new(),
            ProjectId::new(),
            ActorId::new(),
            ActorId::new(),
            "title".to_string(),
            "description".to_string(),
            "deliverable".to_string(),
            Money::new(12_500, Currency::Usd),
            None,
        )
        .expect("work request should be created");
        wr.status = status;
        wr
    }

    #[test]
    fn given_pending_to_accepted_when_mapped_should_emit_accepted_topic() {
        let wr = sample_work_request(WorkRequestStatus::Accepted);
        let event = Event::from_work_request_transition(&wr, WorkRequestStatus::Pending)
            .expect("event should be created");
        assert_eq!(event.topic, EventTopic::WorkRequestAccepted);
        assert_eq!(event.work_request_id, Some(wr.id));
    }

    #[test]
    fn given_revision_resubmit_when_mapped_should_emit_submitted_topic() {
        let wr = sample_work_request(WorkRequestStatus::Submitted);
        let event = Event::from_work_request_transition(&wr, WorkRequestStatus::NeedsRevision)
            .expect("event should be created");
        assert_eq!(event.topic, EventTopic::WorkRequestSubmitted);
    }

    #[test]
    fn given_forbidden_pair_when_mapped_should_return_error() {
        let wr = sample_work_request(WorkRequestStatus::Paid);
        let result = Event::from_work_request_transition(&wr, WorkRequestStatus::Pending);
        assert_eq!(result, Err(TransitionError::Forbidden));
    }

    #[test]
    fn given_work_request_when_created_event_built_should_snapshot_amount() {
        let wr = sample_work_request(WorkRequestStatus::Pending);
        let event = Event::work_request_created(&wr);
        assert_eq!(event.topic, EventTopic::WorkRequestCreated);
        assert_eq!(event.payload["amount_minor"], 12_500);
        assert_eq!(event.payload["currency"], "usd");
    }

    #[test]
    fn given_payment_when_captured_event_built_should_link_payment() {
        let payment = Payment::captured_for_work_request(
            PaymentId::new(),
            Money::new(12_500, Currency::Usd),
            "pi_1".to_string(),
            WorkRequestId::new(),
        );
        let event = Event::payment_captured(&payment);
        assert_eq!(event.topic, EventTopic::PaymentCaptured);
        assert_eq!(event.payment_id, Some(payment.id));
        assert_eq!(event.work_request_id, payment.work_request_id);
    }

    #[test]
    fn given_topic_strings_when_parsed_should_round_trip() {
        let topics = [
            EventTopic::WorkRequestCreated,
            EventTopic::WorkRequestAccepted,
            EventTopic::WorkRequestDeclined,
            EventTopic::WorkRequestSubmitted,
            EventTopic::WorkRequestChangesRequested,
            EventTopic::WorkRequestRejected,
            EventTopic::WorkRequestApproved,
            EventTopic::WorkRequestPaid,
            EventTopic::ContractCreated,
            EventTopic::MilestoneSubmitted,
            EventTopic::MilestoneApproved,
            EventTopic::MilestoneRejected,
            EventTopic::PaymentCaptured,
            EventTopic::PaymentTransferred,
        ];
        for topic in topics {
            assert_eq!(EventTopic::parse(topic.as_str()), Some(topic));
        }
        assert_eq!(EventTopic::parse("work_request.unknown"), None);
    }
}

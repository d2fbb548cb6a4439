// Use case: approve_milestone.

use crate::application::context::AppContext;
use crate::domain::entities::event::Event;
use crate::domain::entities::milestone::{Milestone, MilestoneStatus};
use crate::domain::entities::payment::Payment;
use crate::domain::value_objects::ids::{ActorId, MilestoneId, PaymentId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::database::DatabaseError;

use super::disburse_payments::DisbursePaymentsUseCase;

/// The business approves a submitted milestone. `approved_at` is stamped
/// exactly once and the Payment is created exactly once; a repeated
/// approve is answered from the recorded approval. Milestone funds were
/// allocated when the contract was created, so the payment draws on that
/// allocation instead of a fresh provider capture.
pub struct ApproveMilestoneUseCase;

#[derive(Debug)]
pub enum ApproveMilestoneError {
    NotFound,
    Forbidden,
    Conflict,
    Storage(String),
}

impl From<DatabaseError> for ApproveMilestoneError {
    fn from(error: DatabaseError) -> Self {
        ApproveMilestoneError::Storage(error.to_string())
    }
}

#[derive(Debug)]
pub struct ApprovedMilestone {
    pub milestone: Milestone,
    pub payment: Payment,
    /// True when an earlier approval answered this call.
    pub replayed: bool,
}

impl ApproveMilestoneUseCase {
    pub async fn execute(
        ctx: &AppContext,
        id: MilestoneId,
        caller: ActorId,
    ) -> Result<ApprovedMilestone, ApproveMilestoneError> {
        // Step 1: Load the milestone and authorize the business via the
        // owning contract.
        let milestone = ctx
            .repos
            .milestone
            .get(id)
            .await
            .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(ApproveMilestoneError::NotFound)?;
        let contract = ctx
            .repos
            .contract
            .get(milestone.contract_id)
            .await
            .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(ApproveMilestoneError::NotFound)?;
        if caller != contract.business_id {
            return Err(ApproveMilestoneError::Forbidden);
        }
        // Approved stays in: a repeat approve is answered, not rejected.
        if !matches!(
            milestone.status,
            MilestoneStatus::Submitted | MilestoneStatus::Approved
        ) {
            return Err(ApproveMilestoneError::Conflict);
        }

        // Step 2: Approve and record the payment in one transaction. The
        // `approved_at IS NULL` guard in storage makes the stamp
        // single-shot; a CAS miss with an approved row is the replay path.
        let repos = ctx.repos.clone();
        let lifecycle = ctx.lifecycle.clone();
        let now = Timestamp::now_utc();
        let approved = ctx
            .repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    let updated = repos
                        .milestone
                        .approve_tx(tx, id, now)
                        .await
                        .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?;

                    let Some(updated) = updated else {
                        let current = repos
                            .milestone
                            .get_tx(tx, id)
                            .await
                            .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?
                            .ok_or(ApproveMilestoneError::NotFound)?;
                        if current.status != MilestoneStatus::Approved {
                            return Err(ApproveMilestoneError::Conflict);
                        }
                        let payment = repos
                            .payment
                            .get_by_milestone_tx(tx, id)
                            .await
                            .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?
                            .ok_or(ApproveMilestoneError::Conflict)?;
                        return Ok(ApprovedMilestone {
                            milestone: current,
                            payment,
                            replayed: true,
                        });
                    };

                    let payment = Payment::captured_for_milestone(
                        PaymentId::new(),
                        updated.amount,
                        format!("contract_funds_{}", id.0),
                        id,
                    );
                    repos
                        .payment
                        .insert_tx(tx, &payment)
                        .await
                        .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?;

                    lifecycle
                        .record_event_tx(tx, &Event::milestone_approved(&updated))
                        .await
                        .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?;
                    lifecycle
                        .record_event_tx(tx, &Event::payment_captured(&payment))
                        .await
                        .map_err(|e| ApproveMilestoneError::Storage(format!("{e:?}")))?;

                    Ok(ApprovedMilestone {
                        milestone: updated,
                        payment,
                        replayed: false,
                    })
                })
            })
            .await?;

        // Step 3: An auto_pay milestone is disbursed right away. A transfer
        // failure here does not undo the committed approval; the payment
        // stays captured and the disbursement worker retries it.
        if approved.milestone.auto_pay && !approved.replayed {
            match DisbursePaymentsUseCase::disburse(ctx, &approved.payment).await {
                Ok(transferred) => {
                    return Ok(ApprovedMilestone {
                        payment: transferred,
                        ..approved
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        milestone_id = %id.0,
                        payment_id = %approved.payment.id.0,
                        error = ?error,
                        "auto_pay disbursement failed, leaving payment captured"
                    );
                }
            }
        }

        Ok(approved)
    }
}

// Use case: disburse_payments.

use crate::application::context::AppContext;
use crate::domain::entities::event::Event;
use crate::domain::entities::payment::{Payment, PaymentStatus};
use crate::domain::entities::work_request::WorkRequestStatus;
use crate::domain::services::work_request_lifecycle::WorkRequestLifecycleError;
use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::database::DatabaseError;

/// Pays captured funds out to the contractor who earned them. Runs as a
/// background sweep over captured payments and inline for auto_pay
/// milestones.
pub struct DisbursePaymentsUseCase;

#[derive(Debug)]
pub enum DisbursePaymentsError {
    MissingRecipient(String),
    Provider(String),
    Conflict,
    Storage(String),
}

impl From<DatabaseError> for DisbursePaymentsError {
    fn from(error: DatabaseError) -> Self {
        DisbursePaymentsError::Storage(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct DisbursePaymentsResult {
    pub processed: usize,
    pub transferred: usize,
    pub failed: usize,
}

impl DisbursePaymentsUseCase {
    /// Sweep captured payments once and return processing stats. A payment
    /// that fails stays captured and is picked up again on the next pass.
    pub async fn run_once(
        ctx: &AppContext,
        limit: u32,
    ) -> Result<DisbursePaymentsResult, DisbursePaymentsError> {
        // Step 1: Load captured payments in capture order.
        let captured = ctx
            .repos
            .payment
            .list_by_status(PaymentStatus::Captured, i64::from(limit))
            .await
            .map_err(|e| DisbursePaymentsError::Storage(format!("{e:?}")))?;
        let total = captured.len();

        let mut transferred = 0;
        let mut failed = 0;

        // Step 2: Transfer each payment; one failure never stalls the rest.
        for payment in captured {
            match Self::disburse(ctx, &payment).await {
                Ok(_) => transferred += 1,
                Err(error) => {
                    tracing::warn!(
                        payment_id = %payment.id.0,
                        error = ?error,
                        "disbursement failed, payment stays captured"
                    );
                    failed += 1;
                }
            }
        }

        // Step 3: Return summary stats for observability.
        Ok(DisbursePaymentsResult {
            processed: total,
            transferred,
            failed,
        })
    }

    /// Run the disbursement loop continuously at a fixed interval.
    pub async fn run_loop(
        ctx: &AppContext,
        poll_interval: time::Duration,
        limit: u32,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> Result<(), DisbursePaymentsError> {
        // Step 1: Loop until shutdown is triggered.
        loop {
            if *shutdown.borrow() {
                break;
            }

            // Step 2: Run a sweep.
            let pass = Self::run_once(ctx, limit).await?;
            if pass.processed > 0 {
                tracing::debug!(
                    processed = pass.processed,
                    transferred = pass.transferred,
                    failed = pass.failed,
                    "disbursement pass finished"
                );
            }

            // Step 3: Sleep until the next pass or shutdown.
            let sleep_duration =
                std::time::Duration::from_millis(poll_interval.whole_milliseconds().max(0) as u64);
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(sleep_duration) => {}
            }
        }

        // Step 4: Exit cleanly.
        Ok(())
    }

    /// Transfer one captured payment to its contractor and record the
    /// outcome. The payment id doubles as the provider idempotency key,
    /// so a crashed pass that retries the same payment cannot double-pay.
    pub async fn disburse(
        ctx: &AppContext,
        payment: &Payment,
    ) -> Result<Payment, DisbursePaymentsError> {
        // Step 1: Resolve the contractor who earned this payment.
        let recipient = Self::resolve_recipient(ctx, payment).await?;

        // Step 2: Move the money at the provider.
        let transfer = ctx
            .gateway
            .transfer(
                payment.amount.amount_minor,
                payment.amount.currency.as_str(),
                &recipient.0.to_string(),
                &payment.id.0.to_string(),
            )
            .await
            .map_err(|e| DisbursePaymentsError::Provider(e.to_string()))?;

        // Step 3: Record the transfer, advance the work request, and journal
        // the event in one transaction.
        let repos = ctx.repos.clone();
        let lifecycle = ctx.lifecycle.clone();
        let payment_id = payment.id;
        let work_request_id = payment.work_request_id;
        let transfer_id = transfer.id.clone();
        let now = Timestamp::now_utc();
        ctx.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    // captured -> transferred; a miss means another pass won.
                    let updated = repos
                        .payment
                        .mark_transferred_tx(tx, payment_id, &transfer_id, now)
                        .await
                        .map_err(|e| DisbursePaymentsError::Storage(format!("{e:?}")))?
                        .ok_or(DisbursePaymentsError::Conflict)?;

                    // A paid-out work request reaches its terminal status here.
                    // Milestone payments leave the milestone as approved.
                    if let Some(work_request_id) = work_request_id {
                        lifecycle
                            .transition_tx(
                                tx,
                                work_request_id,
                                WorkRequestStatus::Approved,
                                WorkRequestStatus::Paid,
                                None,
                                now,
                            )
                            .await
                            .map_err(|error| match error {
                                WorkRequestLifecycleError::Conflict
                                | WorkRequestLifecycleError::InvalidTransition { .. } => {
                                    DisbursePaymentsError::Conflict
                                }
                                other => DisbursePaymentsError::Storage(format!("{other:?}")),
                            })?;
                    }

                    lifecycle
                        .record_event_tx(tx, &Event::payment_transferred(&updated))
                        .await
                        .map_err(|e| DisbursePaymentsError::Storage(format!("{e:?}")))?;

                    Ok(updated)
                })
            })
            .await
    }

    async fn resolve_recipient(
        ctx: &AppContext,
        payment: &Payment,
    ) -> Result<ActorId, DisbursePaymentsError> {
        if let Some(work_request_id) = payment.work_request_id {
            let work_request = ctx
                .repos
                .work_request
                .get(work_request_id)
                .await
                .map_err(|e| DisbursePaymentsError::Storage(format!("{e:?}")))?
                .ok_or_else(|| {
                    DisbursePaymentsError::MissingRecipient(format!(
                        "work request {} not found",
                        work_request_id.0
                    ))
                })?;
            return Ok(work_request.contractor_id);
        }

        if let Some(milestone_id) = payment.milestone_id {
            let milestone = ctx
                .repos
                .milestone
                .get(milestone_id)
                .await
                .map_err(|e| DisbursePaymentsError::Storage(format!("{e:?}")))?
                .ok_or_else(|| {
                    DisbursePaymentsError::MissingRecipient(format!(
                        "milestone {} not found",
                        milestone_id.0
                    ))
                })?;
            let contract = ctx
                .repos
                .contract
                .get(milestone.contract_id)
                .await
                .map_err(|e| DisbursePaymentsError::Storage(format!("{e:?}")))?
                .ok_or_else(|| {
                    DisbursePaymentsError::MissingRecipient(format!(
                        "contract {} not found",
                        milestone.contract_id.0
                    ))
                })?;
            return Ok(contract.contractor_id);
        }

        Err(DisbursePaymentsError::MissingRecipient(format!(
            "payment {} links neither a work request nor a milestone",
            payment.id.0
        )))
    }
}

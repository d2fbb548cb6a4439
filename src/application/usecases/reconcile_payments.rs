// Use case: reconcile_payments.

use crate::application::context::AppContext;
use crate::domain::entities::payment::{PaymentAttempt, PaymentAttemptStatus};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::payment::gateway::{IntentStatus, PaymentGatewayError};

use super::finalize_approval::FinalizeApprovalUseCase;

/// Repairs the two-phase approve-then-pay flow after a crash or an
/// abandoned checkout. A capture is never retried here; a captured
/// intent is only driven forward to the approval it already paid for,
/// and an intent the provider canceled is written off.
pub struct ReconcilePaymentsUseCase;

#[derive(Debug)]
pub enum ReconcilePaymentsError {
    Provider(String),
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct ReconcilePaymentsResult {
    pub processed: usize,
    pub finalized: usize,
    pub abandoned: usize,
    /// Attempts left in place because the payer may still confirm.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettledAttempt {
    Finalized,
    Abandoned,
    Skipped,
}

impl ReconcilePaymentsUseCase {
    /// Sweep stale payment attempts once and return processing stats. The
    /// stale window and batch size come from the reconciliation settings.
    pub async fn run_once(
        ctx: &AppContext,
        now: Timestamp,
    ) -> Result<ReconcilePaymentsResult, ReconcilePaymentsError> {
        let cutoff = now.plus_seconds(-ctx.settings.reconciliation.stale_after_seconds);
        let limit = i64::from(ctx.settings.reconciliation.max_batch);

        let mut result = ReconcilePaymentsResult {
            processed: 0,
            finalized: 0,
            abandoned: 0,
            skipped: 0,
            failed: 0,
        };

        // Step 1: Resume attempts whose capture was confirmed but whose
        // finalize never committed.
        let confirmed = ctx
            .repos
            .payment_attempt
            .list_stale(PaymentAttemptStatus::ConfirmedPendingFinalize, cutoff, limit)
            .await
            .map_err(|e| ReconcilePaymentsError::Storage(format!("{e:?}")))?;
        for attempt in confirmed {
            result.processed += 1;
            match FinalizeApprovalUseCase::finalize_confirmed(ctx, &attempt, None).await {
                Ok(_) => result.finalized += 1,
                Err(error) => {
                    tracing::warn!(
                        attempt_id = %attempt.id.0,
                        intent_id = %attempt.intent_id,
                        error = ?error,
                        "resume of confirmed attempt failed"
                    );
                    result.failed += 1;
                }
            }
        }

        // Step 2: Ask the provider about attempts still awaiting
        // confirmation past the stale window.
        let awaiting = ctx
            .repos
            .payment_attempt
            .list_stale(PaymentAttemptStatus::AwaitingConfirmation, cutoff, limit)
            .await
            .map_err(|e| ReconcilePaymentsError::Storage(format!("{e:?}")))?;
        for attempt in awaiting {
            result.processed += 1;
            match Self::settle_awaiting(ctx, &attempt, now).await {
                Ok(SettledAttempt::Finalized) => result.finalized += 1,
                Ok(SettledAttempt::Abandoned) => result.abandoned += 1,
                Ok(SettledAttempt::Skipped) => result.skipped += 1,
                Err(error) => {
                    tracing::warn!(
                        attempt_id = %attempt.id.0,
                        intent_id = %attempt.intent_id,
                        error = ?error,
                        "settling awaiting attempt failed"
                    );
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }

    /// Run the reconciliation loop continuously at a fixed interval.
    pub async fn run_loop(
        ctx: &AppContext,
        poll_interval: time::Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> Result<(), ReconcilePaymentsError> {
        // Step 1: Loop until shutdown is triggered.
        loop {
            if *shutdown.borrow() {
                break;
            }

            // Step 2: Run a sweep.
            let pass = Self::run_once(ctx, Timestamp::now_utc()).await?;
            if pass.processed > 0 {
                tracing::info!(
                    processed = pass.processed,
                    finalized = pass.finalized,
                    abandoned = pass.abandoned,
                    skipped = pass.skipped,
                    failed = pass.failed,
                    "reconciliation pass finished"
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

    async fn settle_awaiting(
        ctx: &AppContext,
        attempt: &PaymentAttempt,
        now: Timestamp,
    ) -> Result<SettledAttempt, ReconcilePaymentsError> {
        // Step 1: The provider holds the truth about the intent.
        let intent = match ctx.gateway.retrieve_intent(&attempt.intent_id).await {
            Ok(intent) => intent,
            Err(PaymentGatewayError::IntentNotFound(id)) => {
                // Nothing at the provider can ever capture this attempt;
                // abandon it so a fresh approval can mint a new intent.
                return Self::abandon(
                    ctx,
                    attempt,
                    now,
                    format!("intent {id} unknown at the provider"),
                )
                .await;
            }
            Err(error) => return Err(ReconcilePaymentsError::Provider(error.to_string())),
        };

        // Step 2: A captured intent is money already moved; mark it and
        // drive the finalize it paid for. The CAS makes the marker safe
        // against a concurrent finalize taking the same step.
        if intent.status.is_captured() {
            let marked = ctx
                .repos
                .payment_attempt
                .update_status(
                    attempt.id,
                    PaymentAttemptStatus::AwaitingConfirmation,
                    PaymentAttemptStatus::ConfirmedPendingFinalize,
                    None,
                    now,
                )
                .await
                .map_err(|e| ReconcilePaymentsError::Storage(format!("{e:?}")))?;
            let Some(marked) = marked else {
                return Ok(SettledAttempt::Skipped);
            };
            return FinalizeApprovalUseCase::finalize_confirmed(ctx, &marked, None)
                .await
                .map(|_| SettledAttempt::Finalized)
                .map_err(|e| ReconcilePaymentsError::Storage(format!("{e:?}")));
        }

        // Step 3: A canceled intent can never be confirmed; write the
        // attempt off. Anything else may still be confirmed by the payer,
        // so the attempt stays open.
        if intent.status == IntentStatus::Canceled {
            return Self::abandon(ctx, attempt, now, "intent canceled at the provider".to_string())
                .await;
        }
        Ok(SettledAttempt::Skipped)
    }

    async fn abandon(
        ctx: &AppContext,
        attempt: &PaymentAttempt,
        now: Timestamp,
        reason: String,
    ) -> Result<SettledAttempt, ReconcilePaymentsError> {
        let abandoned = ctx
            .repos
            .payment_attempt
            .update_status(
                attempt.id,
                PaymentAttemptStatus::AwaitingConfirmation,
                PaymentAttemptStatus::Abandoned,
                Some(reason),
                now,
            )
            .await
            .map_err(|e| ReconcilePaymentsError::Storage(format!("{e:?}")))?;
        // A CAS miss means the attempt moved under us; leave it alone.
        Ok(match abandoned {
            Some(_) => SettledAttempt::Abandoned,
            None => SettledAttempt::Skipped,
        })
    }
}

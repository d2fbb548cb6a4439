// Use case: deliver_webhooks.

use crate::application::context::AppContext;
use crate::domain::entities::webhook::{DeliveryStatus, WebhookDelivery};
use crate::domain::value_objects::timestamps::Timestamp;
use serde::Serialize;

/// Posts due webhook deliveries to their subscriber endpoints and
/// reschedules or abandons the ones that do not get a 2xx back.
pub struct DeliverWebhooksUseCase;

#[derive(Debug)]
pub enum DeliverWebhooksError {
    Storage(String),
    Client(String),
}

#[derive(Debug, Clone)]
pub struct DeliverWebhooksResult {
    pub processed: usize,
    pub delivered: usize,
    pub retried: usize,
    pub failed: usize,
}

/// The envelope a subscriber receives. Every field comes off the
/// delivery row itself, so the send path never reads the event table.
#[derive(Debug, Serialize)]
struct WebhookEnvelope<'a> {
    pub event_id: String,
    pub topic: &'a str,
    pub occurred_at: String,
    pub payload: &'a serde_json::Value,
}

impl DeliverWebhooksUseCase {
    /// Deliver due webhooks once and return processing stats.
    pub async fn run_once(
        ctx: &AppContext,
        now: Timestamp,
        limit: u32,
    ) -> Result<DeliverWebhooksResult, DeliverWebhooksError> {
        // Step 1: Load pending deliveries whose attempt time has come.
        let due = ctx
            .repos
            .webhook_delivery
            .list_due(now, i64::from(limit))
            .await
            .map_err(|e| DeliverWebhooksError::Storage(format!("{e:?}")))?;
        let total = due.len();

        let mut delivered = 0;
        let mut retried = 0;
        let mut failed = 0;

        // Step 2: Build an HTTP client with the configured timeout.
        let timeout =
            std::time::Duration::from_millis(ctx.settings.webhook_delivery.request_timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliverWebhooksError::Client(e.to_string()))?;

        // Step 3: Send each delivery and write back its outcome.
        for mut delivery in due {
            match Self::deliver_one(ctx, &client, now, &mut delivery).await? {
                DeliveryStatus::Delivered => delivered += 1,
                DeliveryStatus::Pending => retried += 1,
                DeliveryStatus::Failed => failed += 1,
            }
        }

        // Step 4: Return summary stats for observability.
        Ok(DeliverWebhooksResult {
            processed: total,
            delivered,
            retried,
            failed,
        })
    }

    /// Run the delivery loop continuously at a fixed interval.
    pub async fn run_loop(
        ctx: &AppContext,
        poll_interval: time::Duration,
        limit: u32,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> Result<(), DeliverWebhooksError> {
        // Step 1: Loop until shutdown is triggered.
        loop {
            if *shutdown.borrow() {
                break;
            }

            // Step 2: Run a delivery pass.
            let pass = Self::run_once(ctx, Timestamp::now_utc(), limit).await?;
            if pass.processed > 0 {
                tracing::debug!(
                    processed = pass.processed,
                    delivered = pass.delivered,
                    retried = pass.retried,
                    failed = pass.failed,
                    "webhook delivery pass finished"
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

    async fn deliver_one(
        ctx: &AppContext,
        client: &reqwest::Client,
        now: Timestamp,
        delivery: &mut WebhookDelivery,
    ) -> Result<DeliveryStatus, DeliverWebhooksError> {
        // Step 1: Send the envelope to the subscriber endpoint.
        let envelope = Self::build_envelope(delivery);
        let response = client
            .post(&delivery.target_url)
            .json(&envelope)
            .send()
            .await;

        // Step 2: Record the outcome on the delivery row.
        let outcome = match response {
            Ok(resp) if resp.status().is_success() => {
                Self::mark_delivered(delivery, now, resp.status().as_u16() as i32);
                DeliveryStatus::Delivered
            }
            Ok(resp) => {
                let status = resp.status().as_u16() as i32;
                Self::mark_retry(ctx, delivery, now, Some(status), "http_error".to_string())
            }
            Err(err) => Self::mark_retry(ctx, delivery, now, None, err.to_string()),
        };

        ctx.repos
            .webhook_delivery
            .update(delivery)
            .await
            .map_err(|e| DeliverWebhooksError::Storage(format!("{e:?}")))?;
        Ok(outcome)
    }

    fn build_envelope(delivery: &WebhookDelivery) -> WebhookEnvelope<'_> {
        WebhookEnvelope {
            event_id: delivery.event_id.0.to_string(),
            topic: delivery.topic.as_str(),
            occurred_at: delivery
                .occurred_at
                .as_inner()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            payload: &delivery.payload,
        }
    }

    fn mark_delivered(delivery: &mut WebhookDelivery, now: Timestamp, status: i32) {
        delivery.status = DeliveryStatus::Delivered;
        delivery.response_status = Some(status);
        delivery.last_error = None;
        delivery.next_attempt_at = None;
        delivery.delivered_at = Some(now);
        delivery.updated_at = now;
    }

    /// Bumps the attempt counter and either reschedules with backoff or,
    /// once the attempt cap is hit, abandons the delivery for good.
    fn mark_retry(
        ctx: &AppContext,
        delivery: &mut WebhookDelivery,
        now: Timestamp,
        response_status: Option<i32>,
        error: String,
    ) -> DeliveryStatus {
        let attempt = delivery.attempt.saturating_add(1);
        delivery.attempt = attempt;
        delivery.response_status = response_status;
        delivery.last_error = Some(error);
        delivery.delivered_at = None;
        delivery.updated_at = now;

        let max_attempts = ctx.settings.webhook_delivery.max_attempts;
        if attempt as u32 >= max_attempts {
            delivery.status = DeliveryStatus::Failed;
            delivery.next_attempt_at = None;
            return DeliveryStatus::Failed;
        }

        let backoff_ms = compute_backoff_ms(
            attempt as u32,
            ctx.settings.webhook_delivery.backoff_initial_ms,
            ctx.settings.webhook_delivery.backoff_max_ms,
        );
        delivery.status = DeliveryStatus::Pending;
        delivery.next_attempt_at = Some(Timestamp::from(
            now.as_inner() + time::Duration::milliseconds(backoff_ms as i64),
        ));
        DeliveryStatus::Pending
    }
}

fn compute_backoff_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
    let raw = base_ms.saturating_mul(exp);
    raw.min(max_ms)
}

use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use workpay::application::context::AppContext;
use workpay::application::usecases::deliver_webhooks::DeliverWebhooksUseCase;
use workpay::application::usecases::disburse_payments::DisbursePaymentsUseCase;
use workpay::application::usecases::reconcile_payments::ReconcilePaymentsUseCase;
use workpay::config;
use workpay::domain::services::work_request_lifecycle::WorkRequestLifecycle;
use workpay::infrastructure::db::postgres::PostgresDatabase;
use workpay::infrastructure::db::repositories::Repositories;
use workpay::infrastructure::payment::HttpPaymentGateway;
use workpay::interface::http;
use workpay::interface::http::state::AppState;

#[tokio::main]
async fn main() {
    // Step 1: Load configuration.
    let settings = config::load().expect("load config");

    // Step 2: Initialise tracing with an env-filter override.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workpay=info,axum=info".into()),
        )
        .init();

    // Step 3: Install the Prometheus recorder when metrics are enabled.
    let metrics = if settings.observability.enable_metrics {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .expect("install metrics recorder"),
        )
    } else {
        None
    };

    // Step 4: Connect to the database and apply migrations.
    let db = Arc::new(
        PostgresDatabase::connect(&settings.db.url, settings.db.max_connections)
            .await
            .expect("connect database"),
    );
    db.migrate().await.expect("run migrations");

    // Step 5: Build repositories, the lifecycle service, and the payment gateway.
    let repos = Repositories::postgres(db.clone());
    let lifecycle = WorkRequestLifecycle::new(repos.clone());
    let gateway = HttpPaymentGateway::new(&settings.payment).expect("build payment gateway");

    // Step 6: Assemble shared application context and HTTP state.
    let ctx = Arc::new(AppContext::new(
        repos,
        Arc::new(lifecycle),
        Arc::new(gateway),
        settings.clone(),
    ));
    let state = AppState::new(ctx.clone(), metrics);

    // Step 7: Start the background workers on a shared shutdown channel.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    spawn_workers(ctx, shutdown_rx);

    // Step 8: Build the HTTP app.
    let app = http::app(state);
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    // Step 9: Bind and serve until interrupted.
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("bind server");
    tracing::info!(
        addr = %bind_addr,
        service = %settings.observability.service_name,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await
        .expect("serve");
}

/// Spawn the webhook delivery, payment reconciliation, and disbursement loops.
fn spawn_workers(ctx: Arc<AppContext>, shutdown: tokio::sync::watch::Receiver<bool>) {
    let webhook_interval =
        time::Duration::milliseconds(ctx.settings.webhook_delivery.poll_interval_ms as i64);
    let webhook_batch = ctx.settings.webhook_delivery.batch_size;
    let payment_interval =
        time::Duration::milliseconds(ctx.settings.reconciliation.poll_interval_ms as i64);
    let payment_batch = ctx.settings.reconciliation.max_batch;

    {
        let ctx = ctx.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) =
                DeliverWebhooksUseCase::run_loop(&ctx, webhook_interval, webhook_batch, shutdown)
                    .await
            {
                tracing::error!(error = ?e, "webhook delivery worker stopped");
            }
        });
    }

    {
        let ctx = ctx.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) =
                ReconcilePaymentsUseCase::run_loop(&ctx, payment_interval, shutdown).await
            {
                tracing::error!(error = ?e, "payment reconciliation worker stopped");
            }
        });
    }

    tokio::spawn(async move {
        if let Err(e) =
            DisbursePaymentsUseCase::run_loop(&ctx, payment_interval, payment_batch, shutdown).await
        {
            tracing::error!(error = ?e, "disbursement worker stopped");
        }
    });
}

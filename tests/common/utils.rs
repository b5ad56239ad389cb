use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use vitalsync_core::config::settings::{get_config, DatabaseSettings};
use vitalsync_core::models::time_series::TimeSeriesSampleCreate;
use vitalsync_core::services::telemetry::{get_subscriber, init_subscriber};
use vitalsync_core::services::TimeSeriesService;

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink
        );
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub db_pool: PgPool,
    pub service: TimeSeriesService,
}

pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let mut configuration = get_config().expect("Failed to read configuration.");
    configuration.database.db_name = Uuid::new_v4().to_string();
    let connection_pool = configure_db(&configuration.database).await;

    TestApp {
        service: TimeSeriesService::new(connection_pool.clone()),
        db_pool: connection_pool,
    }
}

pub async fn configure_db(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(
            &config.connection_string_without_db()
        )
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.db_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string().expose_secret())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

pub fn sample_payload(
    device_id: &str,
    recorded_at: DateTime<Utc>,
    value: &str,
) -> TimeSeriesSampleCreate {
    TimeSeriesSampleCreate {
        device_id: Some(device_id.to_string()),
        recorded_at,
        value: value.parse().expect("Invalid decimal literal"),
        series_type: None,
    }
}

pub fn timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("Invalid RFC 3339 timestamp")
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::time_series::{
    DataPointSeries, SeriesType, TimeSeriesQueryParams, TimeSeriesSampleCreate,
};

/// Insert one sample into `data_point_series` with a fresh id.
///
/// No uniqueness constraint beyond the primary key: repeated calls with an
/// identical payload produce distinct rows.
#[tracing::instrument(
    name = "Insert time series sample",
    skip(pool, sample),
    fields(
        series_type = %series_type,
        device_id = ?sample.device_id
    )
)]
pub async fn insert_sample(
    pool: &PgPool,
    sample: &TimeSeriesSampleCreate,
    series_type: SeriesType,
) -> Result<DataPointSeries, sqlx::Error> {
    sqlx::query_as::<_, DataPointSeries>(
        r#"
        INSERT INTO data_point_series (id, device_id, recorded_at, value, series_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, device_id, recorded_at, value, series_type
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(sample.device_id.as_deref())
    .bind(sample.recorded_at)
    .bind(sample.value)
    .bind(series_type)
    .fetch_one(pool)
    .await
}

/// Range scan over `data_point_series` for one series type.
///
/// Both timestamp bounds are inclusive; an absent bound leaves that side
/// open. Rows come back ordered by `recorded_at` ascending.
#[tracing::instrument(
    name = "Query time series samples",
    skip(pool, params),
    fields(
        series_type = %series_type,
        device_id = ?params.device_id
    )
)]
pub async fn get_samples(
    pool: &PgPool,
    params: &TimeSeriesQueryParams,
    series_type: SeriesType,
) -> Result<Vec<DataPointSeries>, sqlx::Error> {
    sqlx::query_as::<_, DataPointSeries>(
        r#"
        SELECT id, device_id, recorded_at, value, series_type
        FROM data_point_series
        WHERE series_type = $1
          AND ($2::text IS NULL OR device_id = $2)
          AND ($3::timestamptz IS NULL OR recorded_at >= $3)
          AND ($4::timestamptz IS NULL OR recorded_at <= $4)
        ORDER BY recorded_at
        "#,
    )
    .bind(series_type)
    .bind(params.device_id.as_deref())
    .bind(params.start_datetime)
    .bind(params.end_datetime)
    .fetch_all(pool)
    .await
}

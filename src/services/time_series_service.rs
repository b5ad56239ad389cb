use sqlx::PgPool;
use uuid::Uuid;

use crate::db::time_series;
use crate::models::time_series::{
    DataPointSeries, SeriesType, TimeSeriesQueryParams, TimeSeriesSampleCreate,
    TimeSeriesSampleResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum TimeSeriesError {
    #[error("Invalid sample payload: {0}")]
    Validation(String),

    // Driver detail is carried on the source chain, not in the message.
    #[error("Storage error while accessing time series data")]
    Storage(#[from] sqlx::Error),
}

/// Failure partway through a bulk create.
///
/// The first `persisted` samples are already committed; the payload at
/// `index` was not stored and no later payload was attempted.
#[derive(Debug, thiserror::Error)]
#[error("Bulk create failed at sample {index} ({persisted} samples already stored): {source}")]
pub struct BulkCreateError {
    pub index: usize,
    pub persisted: usize,
    #[source]
    pub source: TimeSeriesError,
}

/// Coordinated access to the unified device time series samples.
///
/// Construct one instance at startup and hand out references; every
/// operation is a stateless round-trip against the pool it holds.
#[derive(Debug, Clone)]
pub struct TimeSeriesService {
    pool: PgPool,
}

impl TimeSeriesService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn create_sample(
        &self,
        sample: &TimeSeriesSampleCreate,
        series_type: SeriesType,
    ) -> Result<DataPointSeries, TimeSeriesError> {
        sample.validate().map_err(TimeSeriesError::Validation)?;
        let created = time_series::insert_sample(&self.pool, sample, series_type).await?;
        tracing::debug!("Stored {} data point {}", series_type, created.id);
        Ok(created)
    }

    pub async fn create_heart_rate_sample(
        &self,
        sample: &TimeSeriesSampleCreate,
    ) -> Result<DataPointSeries, TimeSeriesError> {
        self.create_sample(sample, SeriesType::HeartRate).await
    }

    pub async fn create_step_sample(
        &self,
        sample: &TimeSeriesSampleCreate,
    ) -> Result<DataPointSeries, TimeSeriesError> {
        self.create_sample(sample, SeriesType::Steps).await
    }

    pub async fn create_energy_sample(
        &self,
        sample: &TimeSeriesSampleCreate,
    ) -> Result<DataPointSeries, TimeSeriesError> {
        self.create_sample(sample, SeriesType::Energy).await
    }

    async fn bulk_create_samples(
        &self,
        samples: &[TimeSeriesSampleCreate],
        series_type: SeriesType,
    ) -> Result<Vec<DataPointSeries>, BulkCreateError> {
        let mut created = Vec::with_capacity(samples.len());
        for (index, sample) in samples.iter().enumerate() {
            match self.create_sample(sample, series_type).await {
                Ok(row) => created.push(row),
                Err(source) => {
                    return Err(BulkCreateError {
                        index,
                        persisted: created.len(),
                        source,
                    });
                }
            }
        }
        Ok(created)
    }

    /// Store each payload as an independent insert, in order.
    ///
    /// Not atomic across the batch: a failure at element k leaves elements
    /// 0..k durably committed (see [`BulkCreateError`]).
    pub async fn bulk_create_heart_rate_samples(
        &self,
        samples: &[TimeSeriesSampleCreate],
    ) -> Result<Vec<DataPointSeries>, BulkCreateError> {
        self.bulk_create_samples(samples, SeriesType::HeartRate).await
    }

    /// Same contract as [`Self::bulk_create_heart_rate_samples`].
    pub async fn bulk_create_step_samples(
        &self,
        samples: &[TimeSeriesSampleCreate],
    ) -> Result<Vec<DataPointSeries>, BulkCreateError> {
        self.bulk_create_samples(samples, SeriesType::Steps).await
    }

    /// Same contract as [`Self::bulk_create_heart_rate_samples`].
    pub async fn bulk_create_energy_samples(
        &self,
        samples: &[TimeSeriesSampleCreate],
    ) -> Result<Vec<DataPointSeries>, BulkCreateError> {
        self.bulk_create_samples(samples, SeriesType::Energy).await
    }

    async fn get_user_series(
        &self,
        params: &TimeSeriesQueryParams,
        series_type: SeriesType,
    ) -> Result<Vec<TimeSeriesSampleResponse>, TimeSeriesError> {
        if params.device_id.is_none() {
            return Err(TimeSeriesError::Validation(
                "device_id is required to query series data".into(),
            ));
        }
        let samples = time_series::get_samples(&self.pool, params, series_type).await?;
        Ok(samples
            .into_iter()
            .map(TimeSeriesSampleResponse::from)
            .collect())
    }

    /// Heart rate samples for the given device and window.
    ///
    /// `user_id` is recorded for audit only; the sample table carries no
    /// user column, and device ownership is enforced by the caller's auth
    /// layer.
    #[tracing::instrument(
        name = "Get user heart rate series",
        skip(self, params),
        fields(
            user_id = %user_id,
            device_id = ?params.device_id
        )
    )]
    pub async fn get_user_heart_rate_series(
        &self,
        user_id: Uuid,
        params: &TimeSeriesQueryParams,
    ) -> Result<Vec<TimeSeriesSampleResponse>, TimeSeriesError> {
        self.get_user_series(params, SeriesType::HeartRate).await
    }

    /// Step samples for the given device and window. Same `user_id`
    /// caveat as [`Self::get_user_heart_rate_series`].
    #[tracing::instrument(
        name = "Get user step series",
        skip(self, params),
        fields(
            user_id = %user_id,
            device_id = ?params.device_id
        )
    )]
    pub async fn get_user_step_series(
        &self,
        user_id: Uuid,
        params: &TimeSeriesQueryParams,
    ) -> Result<Vec<TimeSeriesSampleResponse>, TimeSeriesError> {
        self.get_user_series(params, SeriesType::Steps).await
    }

    /// Energy samples for the given device and window. Same `user_id`
    /// caveat as [`Self::get_user_heart_rate_series`].
    #[tracing::instrument(
        name = "Get user energy series",
        skip(self, params),
        fields(
            user_id = %user_id,
            device_id = ?params.device_id
        )
    )]
    pub async fn get_user_energy_series(
        &self,
        user_id: Uuid,
        params: &TimeSeriesQueryParams,
    ) -> Result<Vec<TimeSeriesSampleResponse>, TimeSeriesError> {
        self.get_user_series(params, SeriesType::Energy).await
    }
}

use sqlx::PgPool;

use crate::models::series_catalog::SeriesTypeDefinition;

/// All seeded series type definitions, ordered by code.
pub async fn get_series_type_definitions(
    pool: &PgPool,
) -> Result<Vec<SeriesTypeDefinition>, sqlx::Error> {
    sqlx::query_as::<_, SeriesTypeDefinition>(
        "SELECT id, code, unit FROM series_type_definition ORDER BY code",
    )
    .fetch_all(pool)
    .await
}

/// Resolve a series-type code to its catalog entry.
pub async fn find_series_type_definition(
    pool: &PgPool,
    code: &str,
) -> Result<Option<SeriesTypeDefinition>, sqlx::Error> {
    sqlx::query_as::<_, SeriesTypeDefinition>(
        "SELECT id, code, unit FROM series_type_definition WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await
}

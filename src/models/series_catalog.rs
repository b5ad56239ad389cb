use serde::Serialize;
use sqlx::FromRow;

/// Catalog row mapping a series-type code to its canonical unit.
///
/// Seeded by migration and read-mostly; samples never reference a code
/// that is missing from this table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeriesTypeDefinition {
    pub id: i32,
    pub code: String,
    pub unit: String,
}

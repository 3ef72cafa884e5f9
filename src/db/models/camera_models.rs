use serde::{Deserialize, Serialize};

/// Camera model
///
/// Cameras are immutable in this system; rows are created only by the seed
/// routine or an external admin process.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: i64,
    pub name: String,
    pub location: String,
}

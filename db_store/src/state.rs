//! Small named JSON documents kept in the `state` table.
//!
//! Each value is stored under a fixed key and replaced wholesale on save.
//! The table is expected to be created by the owning service's migrations:
//!
//! ```sql
//! create table state (key text primary key not null, value jsonb not null);
//! ```

use serde::{de::DeserializeOwned, Serialize};
use sqlx::types::Json;

use crate::{Error, Result};

pub async fn get_value(
    exec: impl sqlx::PgExecutor<'_>,
    key: &str,
) -> Result<Option<serde_json::Value>> {
    let value = sqlx::query_scalar::<_, Json<serde_json::Value>>(
        r#"
        select value from state where key = $1
        "#,
    )
    .bind(key)
    .fetch_optional(exec)
    .await?;
    Ok(value.map(|Json(value)| value))
}

pub async fn save_value(
    exec: impl sqlx::PgExecutor<'_>,
    key: &str,
    value: &serde_json::Value,
) -> Result {
    sqlx::query(
        r#"
        insert into state (key, value)
        values ($1, $2)
        on conflict (key) do update set
        value = EXCLUDED.value
        "#,
    )
    .bind(key)
    .bind(Json(value))
    .execute(exec)
    .await?;
    Ok(())
}

pub fn encode<T>(key: &str, value: &T) -> Result<serde_json::Value>
where
    T: Serialize,
{
    serde_json::to_value(value).map_err(|source| Error::EncodeError {
        key: key.to_string(),
        source,
    })
}

pub fn decode<T>(key: &str, value: serde_json::Value) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|source| Error::DecodeError {
        key: key.to_string(),
        source,
    })
}

//! PostgreSQL source driver.
//!
//! Executes the partition query through a prepared statement, so the result
//! column count is known before the first row, and pumps rows into the
//! engine's bounded cursor channel. Arrays surface with their element type
//! for schema refinement; `oid` columns are treated as large-object
//! references and materialized with `lo_get` when the engine asks.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::{pin_mut, StreamExt};
use rust_decimal::Decimal;
use tokio_postgres::types::{FromSql, Kind, ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SourceConfig;
use crate::core::native::{ElementType, LargeObject, NativeArray, NativeValue};
use crate::core::traits::{RowCursor, SourceConnection, SourceConnector};
use crate::drivers::common::SslMode;
use crate::error::{ExtractError, Result};

/// Connector producing one PostgreSQL connection per `extract` call.
pub struct PgConnector;

/// One live PostgreSQL connection.
pub struct PgConnection {
    client: Arc<Client>,
}

fn pg_config(config: &SourceConfig) -> tokio_postgres::Config {
    let mut pg = tokio_postgres::Config::new();
    pg.host(&config.host)
        .port(config.port)
        .dbname(&config.database)
        .user(&config.user)
        .password(&config.password)
        .application_name("partition-extract");
    pg
}

#[async_trait]
impl SourceConnector for PgConnector {
    type Conn = PgConnection;

    async fn connect(&self, config: &SourceConfig) -> Result<PgConnection> {
        let pg = pg_config(config);
        let ssl = SslMode::parse(&config.ssl_mode)?;

        let client = match ssl.postgres_connector()? {
            Some(tls) => {
                let (client, connection) = pg.connect(tls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("postgres connection error: {e}");
                    }
                });
                client
            }
            None => {
                let (client, connection) = pg.connect(NoTls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("postgres connection error: {e}");
                    }
                });
                client
            }
        };

        info!("connected to PostgreSQL source: {}", config.endpoint());
        Ok(PgConnection {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl SourceConnection for PgConnection {
    async fn run_query(&mut self, sql: &str) -> Result<RowCursor> {
        let stmt = self.client.prepare(sql).await?;
        let types: Vec<Type> = stmt.columns().iter().map(|c| c.type_().clone()).collect();
        let (tx, cursor) = RowCursor::channel(types.len());

        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            let params = std::iter::empty::<&(dyn ToSql + Sync)>();
            let stream = match client.query_raw(&stmt, params).await {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };

            pin_mut!(stream);
            while let Some(next) = stream.next().await {
                let item = next
                    .map_err(ExtractError::from)
                    .and_then(|row| row_to_native(&row, &types, &client));
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    return;
                }
            }
        });

        Ok(cursor)
    }

    async fn close(self) {
        debug!("closing PostgreSQL source connection");
        // dropping the last Client reference tears down the connection task
    }
}

/// Large-object reference held until the engine materializes it.
struct PgLargeObject {
    oid: u32,
    client: Arc<Client>,
}

#[async_trait]
impl LargeObject for PgLargeObject {
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>> {
        let row = self
            .client
            .query_one("SELECT lo_get($1)", &[&self.oid])
            .await?;
        Ok(row.try_get(0)?)
    }
}

fn row_to_native(row: &Row, types: &[Type], client: &Arc<Client>) -> Result<Vec<NativeValue>> {
    types
        .iter()
        .enumerate()
        .map(|(idx, ty)| cell_to_native(row, idx, ty, client))
        .collect()
}

/// Convert one cell to its native value, keyed on the wire type name.
fn cell_to_native(row: &Row, idx: usize, ty: &Type, client: &Arc<Client>) -> Result<NativeValue> {
    if let Kind::Array(elem) = ty.kind() {
        return array_cell(row, idx, elem);
    }

    let value = match ty.name() {
        "bool" => row.try_get::<_, Option<bool>>(idx)?.map(NativeValue::Bool),
        "int2" => row.try_get::<_, Option<i16>>(idx)?.map(NativeValue::I16),
        "int4" => row.try_get::<_, Option<i32>>(idx)?.map(NativeValue::I32),
        "int8" => row.try_get::<_, Option<i64>>(idx)?.map(NativeValue::I64),
        "float4" => row.try_get::<_, Option<f32>>(idx)?.map(NativeValue::F32),
        "float8" => row.try_get::<_, Option<f64>>(idx)?.map(NativeValue::F64),
        "numeric" => row
            .try_get::<_, Option<Decimal>>(idx)?
            .map(NativeValue::Decimal),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)?
            .map(NativeValue::Bytes),
        "uuid" => row.try_get::<_, Option<Uuid>>(idx)?.map(NativeValue::Uuid),
        "date" => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(NativeValue::Date),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(NativeValue::Timestamp),
        // normalized to naive UTC so no offset survives extraction
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|dt| NativeValue::Timestamp(dt.naive_utc())),
        "time" => row
            .try_get::<_, Option<NaiveTime>>(idx)?
            .map(NativeValue::Time),
        // oid columns are large-object references; contents are fetched
        // lazily via lo_get when the engine materializes the handle
        "oid" => row.try_get::<_, Option<u32>>(idx)?.map(|oid| {
            NativeValue::Blob(Box::new(PgLargeObject {
                oid,
                client: Arc::clone(client),
            }))
        }),
        // text, varchar, bpchar, name, enums and friends
        _ => row
            .try_get::<_, Option<String>>(idx)?
            .map(NativeValue::Text),
    };

    Ok(value.unwrap_or(NativeValue::Null))
}

fn array_cell(row: &Row, idx: usize, elem: &Type) -> Result<NativeValue> {
    let element = ElementType::named(elem.name());

    let values = match elem.name() {
        "bool" => read_array(row, idx, NativeValue::Bool)?,
        "int2" => read_array(row, idx, NativeValue::I16)?,
        "int4" => read_array(row, idx, NativeValue::I32)?,
        "int8" => read_array(row, idx, NativeValue::I64)?,
        "float4" => read_array(row, idx, NativeValue::F32)?,
        "float8" => read_array(row, idx, NativeValue::F64)?,
        "numeric" => read_array(row, idx, NativeValue::Decimal)?,
        "bytea" => read_array(row, idx, NativeValue::Bytes)?,
        "uuid" => read_array(row, idx, NativeValue::Uuid)?,
        "date" => read_array(row, idx, NativeValue::Date)?,
        "timestamp" => read_array(row, idx, NativeValue::Timestamp)?,
        "time" => read_array(row, idx, NativeValue::Time)?,
        "text" | "varchar" | "bpchar" | "name" => read_array(row, idx, NativeValue::Text)?,
        other => {
            return Err(ExtractError::Unsupported(format!(
                "array element type '{other}'"
            )))
        }
    };

    Ok(values
        .map(|values| {
            NativeValue::Array(NativeArray {
                values,
                element: Some(element),
            })
        })
        .unwrap_or(NativeValue::Null))
}

/// Read an array cell of element type `T`, mapping NULL elements through.
fn read_array<'a, T, F>(row: &'a Row, idx: usize, wrap: F) -> Result<Option<Vec<NativeValue>>>
where
    T: FromSql<'a>,
    F: Fn(T) -> NativeValue,
{
    let raw = row.try_get::<_, Option<Vec<Option<T>>>>(idx)?;
    Ok(raw.map(|items| {
        items
            .into_iter()
            .map(|item| item.map(&wrap).unwrap_or(NativeValue::Null))
            .collect()
    }))
}

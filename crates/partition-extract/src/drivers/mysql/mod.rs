//! MySQL/MariaDB source driver.
//!
//! Holds a single-connection pool so exactly one connection serves the
//! `extract` call. Blobs arrive inline as byte sequences (MySQL has no
//! lazy large-object handles) and there are no native arrays, so cells are
//! all scalars keyed on the protocol type name.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::StreamExt;
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::native::NativeValue;
use crate::core::traits::{RowCursor, SourceConnection, SourceConnector};
use crate::drivers::common::SslMode;
use crate::error::Result;

/// Connection acquisition timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connector producing one MySQL connection per `extract` call.
pub struct MysqlConnector;

/// One live MySQL connection (a pool capped at a single connection).
pub struct MysqlConnection {
    pool: MySqlPool,
}

fn mysql_ssl_mode(mode: SslMode) -> MySqlSslMode {
    match mode {
        SslMode::Disable => MySqlSslMode::Disabled,
        SslMode::Require => MySqlSslMode::Required,
        SslMode::VerifyCa => MySqlSslMode::VerifyCa,
        SslMode::VerifyFull => MySqlSslMode::VerifyIdentity,
    }
}

#[async_trait]
impl SourceConnector for MysqlConnector {
    type Conn = MysqlConnection;

    async fn connect(&self, config: &SourceConfig) -> Result<MysqlConnection> {
        let ssl = SslMode::parse(&config.ssl_mode)?;

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(mysql_ssl_mode(ssl));

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").fetch_one(&pool).await?;

        info!("connected to MySQL source: {}", config.endpoint());
        Ok(MysqlConnection { pool })
    }
}

#[async_trait]
impl SourceConnection for MysqlConnection {
    async fn run_query(&mut self, sql: &str) -> Result<RowCursor> {
        // prepared-statement metadata gives the column count before any row
        let stmt = self.pool.prepare(sql).await?;
        let column_count = stmt.columns().len();
        let (tx, cursor) = RowCursor::channel(column_count);

        let pool = self.pool.clone();
        let sql = sql.to_string();
        tokio::spawn(async move {
            let mut stream = sqlx::query(&sql).fetch(&pool);
            while let Some(next) = stream.next().await {
                let item = next
                    .map_err(Into::into)
                    .and_then(|row| row_to_native(&row));
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    return;
                }
            }
        });

        Ok(cursor)
    }

    async fn close(self) {
        debug!("closing MySQL source connection");
        self.pool.close().await;
    }
}

fn row_to_native(row: &MySqlRow) -> Result<Vec<NativeValue>> {
    (0..row.columns().len())
        .map(|idx| cell_to_native(row, idx))
        .collect()
}

/// Convert one cell to its native value, keyed on the protocol type name.
/// Unsigned integers widen to the next signed type; `BIGINT UNSIGNED` goes
/// through `Decimal` to stay lossless.
fn cell_to_native(row: &MySqlRow, idx: usize) -> Result<NativeValue> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(NativeValue::Null);
    }

    let type_name = row.columns()[idx].type_info().name().to_uppercase();
    let value = match type_name.as_str() {
        "BOOLEAN" => NativeValue::Bool(row.try_get::<bool, _>(idx)?),

        "TINYINT" => NativeValue::I16(row.try_get::<i8, _>(idx)? as i16),
        "SMALLINT" => NativeValue::I16(row.try_get::<i16, _>(idx)?),
        "MEDIUMINT" | "INT" => NativeValue::I32(row.try_get::<i32, _>(idx)?),
        "BIGINT" => NativeValue::I64(row.try_get::<i64, _>(idx)?),

        "TINYINT UNSIGNED" => NativeValue::I16(row.try_get::<u8, _>(idx)? as i16),
        "SMALLINT UNSIGNED" => NativeValue::I32(row.try_get::<u16, _>(idx)? as i32),
        "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => {
            NativeValue::I64(row.try_get::<u32, _>(idx)? as i64)
        }
        "BIGINT UNSIGNED" => NativeValue::Decimal(Decimal::from(row.try_get::<u64, _>(idx)?)),

        "FLOAT" => NativeValue::F32(row.try_get::<f32, _>(idx)?),
        "DOUBLE" => NativeValue::F64(row.try_get::<f64, _>(idx)?),
        "DECIMAL" => NativeValue::Decimal(row.try_get::<Decimal, _>(idx)?),

        "YEAR" => NativeValue::I32(row.try_get::<u16, _>(idx)? as i32),
        "BIT" => NativeValue::I64(row.try_get::<u64, _>(idx)? as i64),

        "DATE" => NativeValue::Date(row.try_get::<NaiveDate, _>(idx)?),
        "TIME" => NativeValue::Time(row.try_get::<NaiveTime, _>(idx)?),
        "DATETIME" => NativeValue::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?),
        // TIMESTAMP is UTC on the wire; normalized to naive UTC
        "TIMESTAMP" => {
            NativeValue::Timestamp(row.try_get::<DateTime<Utc>, _>(idx)?.naive_utc())
        }

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            NativeValue::Bytes(row.try_get::<Vec<u8>, _>(idx)?)
        }

        // CHAR, VARCHAR, TEXT family, ENUM, SET, JSON and anything else
        _ => NativeValue::Text(row.try_get::<String, _>(idx)?),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_mapping() {
        assert_eq!(mysql_ssl_mode(SslMode::Disable), MySqlSslMode::Disabled);
        assert_eq!(mysql_ssl_mode(SslMode::Require), MySqlSslMode::Required);
        assert_eq!(mysql_ssl_mode(SslMode::VerifyCa), MySqlSslMode::VerifyCa);
        assert_eq!(
            mysql_ssl_mode(SslMode::VerifyFull),
            MySqlSslMode::VerifyIdentity
        );
    }
}

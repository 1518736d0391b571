//! PostgreSQL connection
//!
//! Wraps a single sqlx connection behind the engine's `Database` trait.
//! Autocommit is emulated driver-side: with autocommit off, the first
//! statement opens a transaction, and re-enabling autocommit commits any
//! transaction still open.

use async_trait::async_trait;
use sqlx::{Connection as _, Executor as _, PgConnection, Row as _};
use tracing::debug;

use schemaflow_core::{
    ConnectionType, CoreError, CoreResult, Database, LedgerRecord,
};

/// One live PostgreSQL connection, owned by a single migration run
pub struct PostgresDatabase {
    connection: PgConnection,
    current_user: String,
    autocommit: bool,
    in_transaction: bool,
}

impl PostgresDatabase {
    /// Connect and capture the authenticated user for ledger attribution
    pub async fn connect(url: &str) -> CoreResult<Self> {
        let mut connection = PgConnection::connect(url)
            .await
            .map_err(|e| CoreError::sql("Unable to connect to PostgreSQL", e))?;

        let row = sqlx::query("SELECT current_user")
            .fetch_one(&mut connection)
            .await
            .map_err(|e| CoreError::sql("Unable to determine current user", e))?;
        let current_user: String = row
            .try_get(0)
            .map_err(|e| CoreError::sql("Unable to determine current user", e))?;

        Ok(Self {
            connection,
            current_user,
            autocommit: true,
            in_transaction: false,
        })
    }

    async fn begin_if_needed(&mut self) -> CoreResult<()> {
        if !self.autocommit && !self.in_transaction {
            self.connection
                .execute("BEGIN")
                .await
                .map_err(|e| CoreError::sql("Unable to begin transaction", e))?;
            self.in_transaction = true;
        }
        Ok(())
    }

    /// DDL for the schema history table and its success index
    pub fn history_table_ddl(table: &str) -> [String; 2] {
        [
            format!(
                "CREATE TABLE IF NOT EXISTS {} (\n    \
                    installed_rank INT NOT NULL PRIMARY KEY,\n    \
                    version VARCHAR(50),\n    \
                    description VARCHAR(200) NOT NULL,\n    \
                    type VARCHAR(20) NOT NULL,\n    \
                    script VARCHAR(1000) NOT NULL,\n    \
                    checksum INT,\n    \
                    installed_by VARCHAR(100) NOT NULL,\n    \
                    installed_on TIMESTAMPTZ NOT NULL DEFAULT now(),\n    \
                    execution_time INT NOT NULL,\n    \
                    success BOOLEAN NOT NULL\n\
                )",
                table
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {}_s_idx ON {} (success)",
                table, table
            ),
        ]
    }

    /// Parameterized insert for one ledger row
    pub fn history_insert_sql(table: &str) -> String {
        format!(
            "INSERT INTO {} (installed_rank, version, description, type, script, \
             checksum, installed_by, installed_on, execution_time, success) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, now()), $9, $10)",
            table
        )
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Postgres
    }

    fn current_user(&self) -> &str {
        &self.current_user
    }

    async fn execute(&mut self, sql: &str) -> CoreResult<u64> {
        self.begin_if_needed().await?;
        let done = self
            .connection
            .execute(sql)
            .await
            .map_err(|e| CoreError::sql("Unable to execute statement", e))?;
        Ok(done.rows_affected())
    }

    async fn autocommit(&mut self) -> CoreResult<bool> {
        Ok(self.autocommit)
    }

    async fn set_autocommit(&mut self, autocommit: bool) -> CoreResult<()> {
        // Re-enabling autocommit commits any transaction still open.
        if autocommit && self.in_transaction {
            self.connection
                .execute("COMMIT")
                .await
                .map_err(|e| CoreError::sql("Unable to commit transaction", e))?;
            self.in_transaction = false;
        }
        self.autocommit = autocommit;
        Ok(())
    }

    async fn commit(&mut self) -> CoreResult<()> {
        if self.in_transaction {
            self.connection
                .execute("COMMIT")
                .await
                .map_err(|e| CoreError::sql("Unable to commit transaction", e))?;
            self.in_transaction = false;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> CoreResult<()> {
        if self.in_transaction {
            self.connection
                .execute("ROLLBACK")
                .await
                .map_err(|e| CoreError::sql("Unable to rollback transaction", e))?;
            self.in_transaction = false;
        }
        Ok(())
    }

    async fn ensure_history_table(&mut self, table: &str) -> CoreResult<()> {
        debug!("Ensuring schema history table {} exists", table);
        for sql in Self::history_table_ddl(table) {
            self.execute(&sql).await?;
        }
        Ok(())
    }

    async fn append_history_row(&mut self, table: &str, record: &LedgerRecord) -> CoreResult<()> {
        self.begin_if_needed().await?;
        let sql = Self::history_insert_sql(table);
        sqlx::query(&sql)
            .bind(record.installed_rank)
            .bind(record.version.as_deref())
            .bind(&record.description)
            .bind(&record.migration_type)
            .bind(&record.script)
            .bind(record.checksum)
            .bind(&record.installed_by)
            .bind(record.installed_on)
            .bind(record.execution_time_ms as i32)
            .bind(record.success)
            .execute(&mut self.connection)
            .await
            .map_err(|e| CoreError::sql("Unable to record migration in schema history table", e))?;
        Ok(())
    }
}

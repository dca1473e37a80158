use crate::{Database, schema};

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{marker::PhantomData, sync::Arc};
use surrealdb::{Surreal, engine::any::Any, opt::auth::Root};
use tracing::debug;

use app_error::{AppError, AppErrorExt, AppResult};

/// Upper bound on attempts for one write under contention
pub const MAX_WRITE_ATTEMPTS: u32 = 10;

lazy_static! {
    // SurrealDB identifier rules
    static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

#[derive(Clone)]
pub struct DbCredentials {
    username: String,
    password: String,
}

impl DbCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_password(&self) -> &str {
        &self.password
    }
}

// Don't accidentally log credentials
impl std::fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Database {
    pub fn new(client: Surreal<Any>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.client
    }

    /// Connect to `endpoint`, sign in when credentials are given, select the
    /// namespace/database and apply the schema.
    pub async fn initialize(
        endpoint: &str,
        namespace: &str,
        database: &str,
        credentials: Option<&DbCredentials>,
    ) -> AppResult<Self> {
        if namespace.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Database namespace cannot be empty".into(),
            ));
        }

        if database.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Database name cannot be empty".into(),
            ));
        }

        let client = surrealdb::engine::any::connect(endpoint)
            .await
            .context("Failed to connect to database")
            .db_err()?;

        if let Some(credentials) = credentials {
            client
                .signin(Root {
                    username: credentials.get_username(),
                    password: credentials.get_password(),
                })
                .await
                .context("Failed to authenticate with database")
                .db_err()?;
        }

        client
            .use_ns(namespace)
            .use_db(database)
            .await
            .context("Failed to select namespace and database")
            .db_err()?;

        let db = Self::new(client);
        schema::apply(&db).await?;

        Ok(db)
    }

    pub async fn initialize_memory_db(namespace: &str, database: &str) -> AppResult<Self> {
        Self::initialize("mem://", namespace, database, None).await
    }

    pub fn create<T>(&self, table: &str) -> CreateBuilder<'_, T> {
        CreateBuilder {
            db: self,
            table: table.to_string(),
            _phantom: PhantomData,
        }
    }

    pub fn query(&self, sql: impl Into<String>) -> QueryBuilder<'_> {
        QueryBuilder {
            db: self,
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }
}

pub struct CreateBuilder<'a, T> {
    db: &'a Database,
    table: String,
    _phantom: PhantomData<T>,
}

impl<'a, T> CreateBuilder<'a, T>
where
    T: Serialize + Send + Sync + 'static,
{
    pub async fn content(self, data: T) -> AppResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.db
            .client
            .create(self.table.as_str())
            .content(data)
            .await
            .context("Failed to create record")
            .db_err()
    }
}

pub struct QueryBuilder<'a> {
    db: &'a Database,
    sql: String,
    bindings: Vec<(String, serde_json::Value)>,
}

impl<'a> QueryBuilder<'a> {
    pub fn bind(mut self, binding: (impl Into<String>, impl Into<serde_json::Value>)) -> Self {
        self.bindings.push((binding.0.into(), binding.1.into()));
        self
    }

    pub async fn execute(self) -> AppResult<QueryResponse> {
        let mut query = self.db.client.query(self.sql.as_str());

        for (name, value) in self.bindings {
            query = query.bind((name, value));
        }

        let response = query.await.context("Failed to execute query").db_err()?;
        Ok(QueryResponse(response))
    }
}

pub struct QueryResponse(surrealdb::Response);

impl QueryResponse {
    /// Results of statement `index`; statement-level errors surface here
    pub fn take<T>(mut self, index: usize) -> AppResult<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.0
            .take(index)
            .context("Failed to extract query results")
            .db_err()
    }
}

/// Typed access to one table
pub struct DbService<T> {
    db: Arc<Database>,
    table_name: String,
    _phantom: PhantomData<T>,
}

impl<T> DbService<T>
where
    T: Clone + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static,
{
    pub fn new(db: Arc<Database>, table_name: impl Into<String>) -> Self {
        Self {
            db,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    // Keep the driver error in the chain so callers can classify it
    async fn execute_db_operation<F, R>(&self, operation: &str, execute: F) -> AppResult<R>
    where
        F: Future<Output = AppResult<R>>,
    {
        execute.await.map_err(|e| match e {
            AppError::DatabaseError(err) => AppError::DatabaseError(err.context(format!(
                "Failed to {} {} record",
                operation, self.table_name
            ))),
            other => other,
        })
    }

    pub async fn create_record(&self, item: T) -> AppResult<Option<T>> {
        self.execute_db_operation("create", async {
            self.db.create(&self.table_name).content(item).await
        })
        .await
    }

    /// Create a record, reissuing the write while the datastore reports a
    /// transaction conflict. A retried insert sees the committed state, so
    /// unique index violations still surface to the caller.
    pub async fn create_record_with_retry(&self, item: T) -> AppResult<Option<T>> {
        let mut attempt = 1;

        loop {
            match self.create_record(item.clone()).await {
                Err(e) if schema::is_write_conflict(&e) && attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(
                        "Write conflict on {} (attempt {}), retrying",
                        self.table_name, attempt
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn validate_identifier(&self, identifier: &str) -> AppResult<()> {
        if !IDENTIFIER_REGEX.is_match(identifier) {
            return Err(AppError::ValidationError(format!(
                "Invalid identifier '{}': must start with a letter or underscore and contain only alphanumeric characters and underscores",
                identifier
            )));
        }

        Ok(())
    }

    pub async fn get_records_by_field<V>(&self, field: &str, value: V) -> AppResult<Vec<T>>
    where
        V: Serialize + Send + Sync + 'static,
    {
        self.validate_identifier(field)?;
        self.validate_identifier(&self.table_name)?;

        let sql = format!("SELECT * FROM {} WHERE {} = $value", self.table_name, field);

        let value_json = serde_json::to_value(value).map_err(|e| {
            AppError::ValidationError(format!(
                "Failed to serialize value for field '{}': {}",
                field, e
            ))
        })?;

        self.execute_db_operation("query", async {
            self.db
                .query(&sql)
                .bind(("value", value_json))
                .execute()
                .await?
                .take(0)
        })
        .await
    }
}

//! # Record Data Source
//!
//! Unified interface to the table-shaped record backend. The editor shell
//! only ever needs two queries: the list of table names, and the flat
//! `{id, path, value}` records of one table. The HTTP implementation talks
//! to the same endpoints the original backend served; the static
//! implementation backs tests and offline demos.

use crate::record::RecordPath;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}

/// Record backend contract.
#[async_trait]
pub trait RecordSource {
    /// Names of the tables this source can serve.
    async fn table_names(&self) -> Result<Vec<String>, SourceError>;

    /// Flat records of one table.
    async fn records(&self, table: &str) -> Result<Vec<RecordPath>, SourceError>;
}

/// HTTP-backed record source.
pub struct HttpRecordSource {
    client: Client,
    base_url: String,
}

impl HttpRecordSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn table_names(&self) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/xml/tables", self.base_url);
        let names = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<String>>()
            .await?;
        tracing::debug!(count = names.len(), "fetched table names");
        Ok(names)
    }

    async fn records(&self, table: &str) -> Result<Vec<RecordPath>, SourceError> {
        let url = format!("{}/xml/records", self.base_url);
        let records = self
            .client
            .get(&url)
            .query(&[("tableName", table)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RecordPath>>()
            .await?;
        tracing::debug!(table, count = records.len(), "fetched records");
        Ok(records)
    }
}

/// In-memory record source for tests and offline use.
#[derive(Default)]
pub struct StaticRecordSource {
    tables: HashMap<String, Vec<RecordPath>>,
    order: Vec<String>,
}

impl StaticRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, records: Vec<RecordPath>) -> Self {
        let name = name.into();
        if !self.tables.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tables.insert(name, records);
        self
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn table_names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.order.clone())
    }

    async fn records(&self, table: &str) -> Result<Vec<RecordPath>, SourceError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| SourceError::UnknownTable(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_source() -> StaticRecordSource {
        StaticRecordSource::new()
            .with_table(
                "orders",
                vec![RecordPath::new("1", "/order/total", "12.50")],
            )
            .with_table("customers", vec![])
    }

    #[tokio::test]
    async fn test_static_source_lists_tables_in_insertion_order() {
        let source = sample_source();
        let names = source.table_names().await.unwrap();
        assert_eq!(names, vec!["orders", "customers"]);
    }

    #[tokio::test]
    async fn test_static_source_serves_records() {
        let source = sample_source();
        let records = source.records("orders").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/order/total");
    }

    #[tokio::test]
    async fn test_unknown_table_is_an_error() {
        let source = sample_source();
        let err = source.records("missing").await.unwrap_err();
        assert!(matches!(err, SourceError::UnknownTable(_)));
    }
}

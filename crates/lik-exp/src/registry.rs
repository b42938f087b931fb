//! Append-only registry of sweep outcomes, one row per launched run.

use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use lik_core::errors::{ErrorInfo, LikError};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::report::SweepReport;

/// Supported registry backends, selected by file extension.
#[derive(Debug, Clone, PartialEq)]
pub enum Registry {
    Csv(PathBuf),
    Sqlite(PathBuf),
}

impl Registry {
    /// Construct a registry handle from a filesystem path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("sqlite") | Some("db") => Registry::Sqlite(path),
            _ => Registry::Csv(path),
        }
    }
}

/// Query descriptor for registry lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Query {
    #[serde(default)]
    pub plan_hash: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Table representation returned from registry queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Append every run of a [`SweepReport`] to the registry backend.
pub fn registry_append(registry: &Registry, report: &SweepReport) -> Result<(), LikError> {
    match registry {
        Registry::Csv(path) => append_csv(path, report),
        Registry::Sqlite(path) => append_sqlite(path, report),
    }
}

/// Query the registry returning a structured table.
pub fn registry_query(registry: &Registry, query: &Query) -> Result<Table, LikError> {
    match registry {
        Registry::Csv(path) => query_csv(path, query),
        Registry::Sqlite(path) => query_sqlite(path, query),
    }
}

fn report_rows(report: &SweepReport) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(report.launches());
    for group in &report.groups {
        for job in &group.jobs {
            rows.push(vec![
                report.created_at.clone(),
                report.plan_hash.clone(),
                job.likelihood_temp.to_string(),
                job.seed.to_string(),
                job.label.clone(),
                job.status.registry_cell(),
            ]);
        }
    }
    rows
}

fn append_csv(path: &Path, report: &SweepReport) -> Result<(), LikError> {
    ensure_parent(path)?;
    let file_exists = path.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| {
            LikError::Registry(
                ErrorInfo::new("registry-open", "failed to open CSV registry")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    if !file_exists {
        writer
            .write_record(table_columns())
            .map_err(|err| wrap_csv("registry-write-header", err))?;
    }
    for row in report_rows(report) {
        writer
            .write_record(&row)
            .map_err(|err| wrap_csv("registry-write-row", err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("registry-flush", err.into()))?;
    Ok(())
}

fn append_sqlite(path: &Path, report: &SweepReport) -> Result<(), LikError> {
    ensure_parent(path)?;
    let mut conn = Connection::open(path).map_err(|err| {
        LikError::Registry(
            ErrorInfo::new("registry-sqlite-open", "failed to open sqlite registry")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    conn.execute_batch(
        r#"CREATE TABLE IF NOT EXISTS runs (
            date TEXT NOT NULL,
            plan_hash TEXT NOT NULL,
            likelihood_temp TEXT NOT NULL,
            seed INTEGER NOT NULL,
            label TEXT NOT NULL,
            status TEXT NOT NULL
        );"#,
    )
    .map_err(|err| wrap_sqlite("registry-sqlite-schema", err))?;
    let tx = conn
        .transaction()
        .map_err(|err| wrap_sqlite("registry-sqlite-transaction", err))?;
    for row in report_rows(report) {
        tx.execute(
            "INSERT INTO runs (date, plan_hash, likelihood_temp, seed, label, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![row[0], row[1], row[2], row[3], row[4], row[5]],
        )
        .map_err(|err| wrap_sqlite("registry-sqlite-insert", err))?;
    }
    tx.commit()
        .map_err(|err| wrap_sqlite("registry-sqlite-commit", err))?;
    Ok(())
}

fn query_csv(path: &Path, query: &Query) -> Result<Table, LikError> {
    if !path.exists() {
        return Ok(empty_table());
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("registry-read", err))?;
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| wrap_csv("registry-record", err))?;
        if let Some(hash) = &query.plan_hash {
            if record.get(1) != Some(hash) {
                continue;
            }
        }
        rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        if let Some(limit) = query.limit {
            if rows.len() >= limit {
                break;
            }
        }
    }
    Ok(Table {
        columns: table_columns(),
        rows,
    })
}

fn query_sqlite(path: &Path, query: &Query) -> Result<Table, LikError> {
    if !path.exists() {
        return Ok(empty_table());
    }
    let conn = Connection::open(path).map_err(|err| wrap_sqlite("registry-sqlite-open", err))?;
    let mut sql =
        "SELECT date, plan_hash, likelihood_temp, seed, label, status FROM runs".to_string();
    if query.plan_hash.is_some() {
        sql.push_str(" WHERE plan_hash = ?1");
    }
    sql.push_str(" ORDER BY date, likelihood_temp, seed");
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|err| wrap_sqlite("registry-sqlite-prepare", err))?;
    let mut rows_iter = if let Some(hash) = &query.plan_hash {
        stmt.query([hash])
    } else {
        stmt.query([])
    }
    .map_err(|err| wrap_sqlite("registry-sqlite-query", err))?;
    let mut rows = Vec::new();
    while let Some(row) = rows_iter
        .next()
        .map_err(|err| wrap_sqlite("registry-sqlite-row", err))?
    {
        let mut result = Vec::with_capacity(6);
        for idx in 0..6 {
            let value: String = if idx == 3 {
                let seed: i64 = row
                    .get(idx)
                    .map_err(|err| wrap_sqlite("registry-sqlite-get", err))?;
                seed.to_string()
            } else {
                row.get(idx)
                    .map_err(|err| wrap_sqlite("registry-sqlite-get", err))?
            };
            result.push(value);
        }
        rows.push(result);
        if let Some(limit) = query.limit {
            if rows.len() >= limit {
                break;
            }
        }
    }
    Ok(Table {
        columns: table_columns(),
        rows,
    })
}

fn ensure_parent(path: &Path) -> Result<(), LikError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                LikError::Registry(
                    ErrorInfo::new("registry-create", "failed to create registry directory")
                        .with_context("path", parent.display().to_string())
                        .with_hint(err.to_string()),
                )
            })?;
        }
    }
    Ok(())
}

fn table_columns() -> Vec<String> {
    vec![
        "date".into(),
        "plan_hash".into(),
        "likelihood_temp".into(),
        "seed".into(),
        "label".into(),
        "status".into(),
    ]
}

fn empty_table() -> Table {
    Table {
        columns: table_columns(),
        rows: Vec::new(),
    }
}

fn wrap_csv(code: &str, err: csv::Error) -> LikError {
    LikError::Registry(ErrorInfo::new(code, "CSV registry failure").with_hint(err.to_string()))
}

fn wrap_sqlite(code: &str, err: rusqlite::Error) -> LikError {
    LikError::Registry(ErrorInfo::new(code, "sqlite registry failure").with_hint(err.to_string()))
}

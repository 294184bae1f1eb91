// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! An in-process [`RemoteStore`] with the same table semantics as the hosted one.
//!
//! Used by the headless driver and the test suites. Supports snapshots, injected faults and an
//! artificial per-call latency.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::remote::{ColumnEq, RemoteError, RemoteOp, RemoteStore, Row, Table};
use crate::model::ProjectId;

/// Serialized form of every table, in row order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub decisions: Vec<Row>,
    #[serde(default)]
    pub decision_links: Vec<Row>,
}

/// A remote call as observed by the memory store, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub table: Table,
    pub op: RemoteOp,
    pub target: Option<String>,
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Table, Vec<Row>>,
    next_id: u64,
    faults: HashSet<(Table, RemoteOp)>,
    offline: bool,
    latency: Option<Duration>,
    calls: Vec<CallRecord>,
}

impl Tables {
    fn table(&mut self, table: Table) -> &mut Vec<Row> {
        self.rows.entry(table).or_default()
    }

    fn check(
        &mut self,
        table: Table,
        op: RemoteOp,
        target: Option<&str>,
    ) -> Result<(), RemoteError> {
        self.calls.push(CallRecord { table, op, target: target.map(ToOwned::to_owned) });
        if self.offline {
            return Err(RemoteError::Unavailable("memory store is offline".to_owned()));
        }
        if self.faults.contains(&(table, op)) {
            return Err(RemoteError::Rejected {
                table,
                op,
                reason: "injected fault".to_owned(),
            });
        }
        Ok(())
    }

    fn mint_id(&mut self, table: Table) -> String {
        let prefix = match table {
            Table::Decisions => "d",
            Table::DecisionLinks => "l",
        };
        loop {
            self.next_id += 1;
            let candidate = format!("{prefix}-{}", self.next_id);
            let taken = self
                .rows
                .values()
                .flatten()
                .any(|row| row.get("id").and_then(Value::as_str) == Some(candidate.as_str()));
            if !taken {
                return candidate;
            }
        }
    }
}

fn apply_column_defaults(table: Table, row: &mut Row) {
    let defaults: &[(&str, Value)] = match table {
        Table::Decisions => &[
            ("statement", Value::Null),
            ("x", Value::Null),
            ("y", Value::Null),
            ("queue_time_min", Value::Null),
            ("action_time_min", Value::Null),
        ],
        Table::DecisionLinks => &[
            ("source_handle", Value::Null),
            ("target_handle", Value::Null),
        ],
    };
    for (column, value) in defaults {
        row.entry(column.to_string()).or_insert_with(|| value.clone());
    }
    if table == Table::DecisionLinks {
        for (column, value) in [
            ("curve", Value::from("step")),
            ("pattern", Value::from("solid")),
            ("arrow_start", Value::from(false)),
            ("arrow_end", Value::from(true)),
        ] {
            let slot = row.entry(column.to_owned()).or_insert(Value::Null);
            if slot.is_null() {
                *slot = value;
            }
        }
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: MemorySnapshot) -> Self {
        let remote = Self::new();
        if let Ok(mut tables) = remote.inner.lock() {
            tables.rows.insert(Table::Decisions, snapshot.decisions);
            tables.rows.insert(Table::DecisionLinks, snapshot.decision_links);
        }
        remote
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        match self.inner.lock() {
            Ok(mut tables) => MemorySnapshot {
                decisions: tables.table(Table::Decisions).clone(),
                decision_links: tables.table(Table::DecisionLinks).clone(),
            },
            Err(_) => MemorySnapshot::default(),
        }
    }

    pub fn rows(&self, table: Table) -> Vec<Row> {
        match self.inner.lock() {
            Ok(mut tables) => tables.table(table).clone(),
            Err(_) => Vec::new(),
        }
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.inner.lock().map(|tables| tables.calls.clone()).unwrap_or_default()
    }

    /// Makes every `op` on `table` fail with [`RemoteError::Rejected`] until cleared.
    pub fn inject_fault(&self, table: Table, op: RemoteOp) {
        if let Ok(mut tables) = self.inner.lock() {
            tables.faults.insert((table, op));
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut tables) = self.inner.lock() {
            tables.faults.clear();
        }
    }

    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut tables) = self.inner.lock() {
            tables.offline = offline;
        }
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut tables) = self.inner.lock() {
            tables.latency = latency;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RemoteError> {
        self.inner
            .lock()
            .map_err(|_| RemoteError::Unavailable("memory store lock poisoned".to_owned()))
    }

    async fn delay(&self) {
        let latency = self.inner.lock().ok().and_then(|tables| tables.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn select_by_project(
        &self,
        table: Table,
        project_id: &ProjectId,
    ) -> Result<Vec<Row>, RemoteError> {
        self.delay().await;
        let mut tables = self.lock()?;
        tables.check(table, RemoteOp::Select, Some(project_id.as_str()))?;
        let project = Value::from(project_id.as_str());
        Ok(tables
            .table(table)
            .iter()
            .filter(|row| row.get("project_id") == Some(&project))
            .cloned()
            .collect())
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, RemoteError> {
        self.delay().await;
        let mut tables = self.lock()?;
        tables.check(table, RemoteOp::Insert, None)?;

        let id = match row_id(&row) {
            Some(id) => id.to_owned(),
            None => tables.mint_id(table),
        };
        if tables.table(table).iter().any(|existing| row_id(existing) == Some(id.as_str())) {
            return Err(RemoteError::Rejected {
                table,
                op: RemoteOp::Insert,
                reason: format!("duplicate id {id}"),
            });
        }
        row.insert("id".to_owned(), Value::from(id));
        apply_column_defaults(table, &mut row);
        tables.table(table).push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> Result<Row, RemoteError> {
        self.delay().await;
        let mut tables = self.lock()?;
        tables.check(table, RemoteOp::Update, Some(id))?;

        let Some(existing) = tables.table(table).iter_mut().find(|row| row_id(row) == Some(id))
        else {
            return Err(RemoteError::NotFound { table, id: id.to_owned() });
        };
        for (column, value) in patch {
            if column == "id" {
                continue;
            }
            existing.insert(column, value);
        }
        Ok(existing.clone())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError> {
        self.delay().await;
        let mut tables = self.lock()?;
        tables.check(table, RemoteOp::Delete, Some(id))?;
        tables.table(table).retain(|row| row_id(row) != Some(id));
        Ok(())
    }

    async fn delete_any(&self, table: Table, any: &[ColumnEq]) -> Result<u64, RemoteError> {
        self.delay().await;
        let mut tables = self.lock()?;
        let target = any
            .iter()
            .map(|arm| format!("{}.eq.{}", arm.column, arm.value))
            .collect::<Vec<_>>()
            .join(",");
        tables.check(table, RemoteOp::Delete, Some(&target))?;

        let rows = tables.table(table);
        let before = rows.len();
        rows.retain(|row| !any.iter().any(|arm| arm.matches(row)));
        Ok((before - rows.len()) as u64)
    }
}

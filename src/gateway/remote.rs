// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ProjectId;

/// One row of a remote table, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Decisions,
    DecisionLinks,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Self::Decisions => "decisions",
            Self::DecisionLinks => "decision_links",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOp {
    Select,
    Insert,
    Update,
    Delete,
}

/// `column = value`, one arm of an or-condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnEq {
    pub column: &'static str,
    pub value: Value,
}

impl ColumnEq {
    pub fn new(column: &'static str, value: impl Into<Value>) -> Self {
        Self { column, value: value.into() }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(self.column) == Some(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("{table}: no row with id {id}")]
    NotFound { table: Table, id: String },
    #[error("{table}: {op:?} rejected: {reason}")]
    Rejected { table: Table, op: RemoteOp, reason: String },
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

/// A request/response table store scoped by project id.
///
/// Calls have no transaction guarantees and may complete in any order relative to each other.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select_by_project(
        &self,
        table: Table,
        project_id: &ProjectId,
    ) -> Result<Vec<Row>, RemoteError>;

    /// Inserts `row` and returns the stored record, with its id and column defaults filled in.
    async fn insert(&self, table: Table, row: Row) -> Result<Row, RemoteError>;

    /// Merges `patch` into the row with `id` and returns the stored record.
    async fn update(&self, table: Table, id: &str, patch: Row) -> Result<Row, RemoteError>;

    async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError>;

    /// Deletes every row matching at least one of `any`. Returns how many rows went away.
    async fn delete_any(&self, table: Table, any: &[ColumnEq]) -> Result<u64, RemoteError>;
}

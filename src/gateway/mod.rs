// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence gateway.
//!
//! Translates graph mutations into calls against a project-scoped [`RemoteStore`] and decodes
//! the returned rows back into model values. The gateway holds no state of its own: every call
//! either returns the canonical record or an error, and the caller decides how to reconcile.

pub mod memory;
pub mod records;
pub mod remote;

use std::sync::Arc;

use serde_json::Value;

pub use memory::{CallRecord, MemoryRemote, MemorySnapshot};
pub use records::{LinkRecord, NodeRecord, RecordError};
pub use remote::{ColumnEq, RemoteError, RemoteOp, RemoteStore, Row, Table};

use crate::model::{
    Curve, Handle, Link, LinkHandles, LinkId, LinkKind, LinkStyle, Node, NodeId, NodeKind,
    Pattern, Position, ProjectId,
};
use records::{from_row, to_row};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("could not decode {table} row: {source}")]
    Decode {
        table: Table,
        #[source]
        source: RecordError,
    },
    #[error("links of node {node_id} were deleted but the node itself was not: {source}")]
    CascadeIncomplete {
        node_id: NodeId,
        #[source]
        source: RemoteError,
    },
}

/// Partial update of a node row. `None` leaves the column untouched; for nullable columns,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub kind: Option<NodeKind>,
    pub title: Option<String>,
    pub statement: Option<Option<String>>,
    pub position: Option<Position>,
    pub queue_time_minutes: Option<Option<f64>>,
    pub action_time_minutes: Option<Option<f64>>,
}

impl NodePatch {
    pub fn position(position: Position) -> Self {
        Self { position: Some(position), ..Self::default() }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }

    /// Every persisted field of `node`.
    pub fn full(node: &Node) -> Self {
        Self {
            kind: Some(node.kind()),
            title: Some(node.title().to_owned()),
            statement: Some(node.statement().map(ToOwned::to_owned)),
            position: Some(node.position()),
            queue_time_minutes: Some(node.queue_time_minutes()),
            action_time_minutes: Some(node.action_time_minutes()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        if let Some(kind) = self.kind {
            row.insert("kind".to_owned(), Value::from(kind.as_str()));
        }
        if let Some(title) = &self.title {
            row.insert("title".to_owned(), Value::from(title.as_str()));
        }
        if let Some(statement) = &self.statement {
            row.insert("statement".to_owned(), Value::from(statement.clone()));
        }
        if let Some(position) = self.position {
            row.insert("x".to_owned(), Value::from(position.x));
            row.insert("y".to_owned(), Value::from(position.y));
        }
        if let Some(minutes) = self.queue_time_minutes {
            row.insert("queue_time_min".to_owned(), Value::from(minutes));
        }
        if let Some(minutes) = self.action_time_minutes {
            row.insert("action_time_min".to_owned(), Value::from(minutes));
        }
        row
    }
}

/// Partial update of a link row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub from_id: Option<NodeId>,
    pub to_id: Option<NodeId>,
    pub source_handle: Option<Option<Handle>>,
    pub target_handle: Option<Option<Handle>>,
    pub curve: Option<Curve>,
    pub pattern: Option<Pattern>,
    pub arrow_start: Option<bool>,
    pub arrow_end: Option<bool>,
}

impl LinkPatch {
    pub fn route(from_id: NodeId, to_id: NodeId, handles: LinkHandles) -> Self {
        Self {
            from_id: Some(from_id),
            to_id: Some(to_id),
            source_handle: Some(handles.source),
            target_handle: Some(handles.target),
            ..Self::default()
        }
    }

    pub fn style(style: LinkStyle) -> Self {
        Self {
            curve: Some(style.curve),
            pattern: Some(style.pattern),
            arrow_start: Some(style.arrow_start),
            arrow_end: Some(style.arrow_end),
            ..Self::default()
        }
    }

    /// Every mutable field of `link`. The kind is never part of a patch.
    pub fn full(link: &Link) -> Self {
        Self::route(link.from_id().clone(), link.to_id().clone(), link.handles().clone())
            .merged(Self::style(link.style()))
    }

    fn merged(self, other: Self) -> Self {
        Self {
            from_id: other.from_id.or(self.from_id),
            to_id: other.to_id.or(self.to_id),
            source_handle: other.source_handle.or(self.source_handle),
            target_handle: other.target_handle.or(self.target_handle),
            curve: other.curve.or(self.curve),
            pattern: other.pattern.or(self.pattern),
            arrow_start: other.arrow_start.or(self.arrow_start),
            arrow_end: other.arrow_end.or(self.arrow_end),
        }
    }

    fn to_row(&self) -> Result<Row, RecordError> {
        let mut row = Row::new();
        if let Some(from_id) = &self.from_id {
            row.insert("from_id".to_owned(), Value::from(from_id.as_str()));
        }
        if let Some(to_id) = &self.to_id {
            row.insert("to_id".to_owned(), Value::from(to_id.as_str()));
        }
        if let Some(handle) = &self.source_handle {
            row.insert("source_handle".to_owned(), serde_json::to_value(handle)?);
        }
        if let Some(handle) = &self.target_handle {
            row.insert("target_handle".to_owned(), serde_json::to_value(handle)?);
        }
        if let Some(curve) = self.curve {
            row.insert("curve".to_owned(), serde_json::to_value(curve)?);
        }
        if let Some(pattern) = self.pattern {
            row.insert("pattern".to_owned(), serde_json::to_value(pattern)?);
        }
        if let Some(arrow_start) = self.arrow_start {
            row.insert("arrow_start".to_owned(), Value::from(arrow_start));
        }
        if let Some(arrow_end) = self.arrow_end {
            row.insert("arrow_end".to_owned(), Value::from(arrow_end));
        }
        Ok(row)
    }
}

/// Everything stored for one project, in stored order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    /// Rows that could not be decoded and were left out.
    pub skipped_rows: usize,
}

#[derive(Clone)]
pub struct Gateway {
    remote: Arc<dyn RemoteStore>,
    default_position: Position,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").field("default_position", &self.default_position).finish()
    }
}

impl Gateway {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote, default_position: Position::new(100.0, 100.0) }
    }

    /// Where nodes stored without coordinates are placed.
    pub fn with_default_position(mut self, position: Position) -> Self {
        self.default_position = position;
        self
    }

    /// Loads every node and link of `project_id`. Rows that do not decode are logged and
    /// skipped so one bad row never hides the rest of the project.
    pub async fn load_project(&self, project_id: &ProjectId) -> Result<ProjectGraph, GatewayError> {
        let node_rows = self.remote.select_by_project(Table::Decisions, project_id).await?;
        let link_rows = self.remote.select_by_project(Table::DecisionLinks, project_id).await?;

        let mut skipped_rows = 0usize;
        let nodes = node_rows
            .into_iter()
            .filter_map(|row| skip_undecodable(self.decode_node(row), &mut skipped_rows))
            .collect::<Vec<_>>();
        let links = link_rows
            .into_iter()
            .filter_map(|row| skip_undecodable(decode_link(row), &mut skipped_rows))
            .collect::<Vec<_>>();

        tracing::debug!(
            project_id = %project_id,
            nodes = nodes.len(),
            links = links.len(),
            skipped_rows,
            "loaded project"
        );
        Ok(ProjectGraph { nodes, links, skipped_rows })
    }

    pub async fn create_node(
        &self,
        project_id: &ProjectId,
        kind: NodeKind,
        title: &str,
        position: Position,
    ) -> Result<Node, GatewayError> {
        let record = NodeRecord::for_insert(project_id, kind, title, position);
        let row = to_row(&record).map_err(|source| decode_error(Table::Decisions, source))?;
        let stored = self.remote.insert(Table::Decisions, row).await?;
        self.decode_node(stored)
    }

    pub async fn update_node(&self, node_id: &NodeId, patch: &NodePatch) -> Result<Node, GatewayError> {
        let stored = self
            .remote
            .update(Table::Decisions, node_id.as_str(), patch.to_row())
            .await?;
        self.decode_node(stored)
    }

    pub async fn delete_node(&self, node_id: &NodeId) -> Result<(), GatewayError> {
        self.remote.delete(Table::Decisions, node_id.as_str()).await?;
        Ok(())
    }

    /// Deletes every link touching `node_id`. Returns how many were removed.
    pub async fn delete_links_touching(&self, node_id: &NodeId) -> Result<u64, GatewayError> {
        let any = [
            ColumnEq::new("from_id", node_id.as_str()),
            ColumnEq::new("to_id", node_id.as_str()),
        ];
        Ok(self.remote.delete_any(Table::DecisionLinks, &any).await?)
    }

    /// Deletes a node and its links: links first, then the node.
    ///
    /// If the links go but the node does not, the result is
    /// [`GatewayError::CascadeIncomplete`]; nothing is restored.
    pub async fn delete_node_cascade(&self, node_id: &NodeId) -> Result<u64, GatewayError> {
        let removed_links = self.delete_links_touching(node_id).await?;
        match self.remote.delete(Table::Decisions, node_id.as_str()).await {
            Ok(()) => Ok(removed_links),
            Err(source) => Err(GatewayError::CascadeIncomplete { node_id: node_id.clone(), source }),
        }
    }

    pub async fn create_link(
        &self,
        project_id: &ProjectId,
        from_id: &NodeId,
        to_id: &NodeId,
        kind: LinkKind,
        handles: &LinkHandles,
        style: LinkStyle,
    ) -> Result<Link, GatewayError> {
        let record = LinkRecord::for_insert(project_id, from_id, to_id, kind, handles, style);
        let row = to_row(&record).map_err(|source| decode_error(Table::DecisionLinks, source))?;
        let stored = self.remote.insert(Table::DecisionLinks, row).await?;
        decode_link(stored)
    }

    pub async fn update_link(&self, link_id: &LinkId, patch: &LinkPatch) -> Result<Link, GatewayError> {
        let row = patch
            .to_row()
            .map_err(|source| decode_error(Table::DecisionLinks, source))?;
        let stored = self
            .remote
            .update(Table::DecisionLinks, link_id.as_str(), row)
            .await?;
        decode_link(stored)
    }

    pub async fn delete_link(&self, link_id: &LinkId) -> Result<(), GatewayError> {
        self.remote.delete(Table::DecisionLinks, link_id.as_str()).await?;
        Ok(())
    }

    fn decode_node(&self, row: Row) -> Result<Node, GatewayError> {
        from_row::<NodeRecord>(row)
            .and_then(|record| record.into_node(self.default_position))
            .map_err(|source| decode_error(Table::Decisions, source))
    }
}

fn decode_link(row: Row) -> Result<Link, GatewayError> {
    from_row::<LinkRecord>(row)
        .and_then(LinkRecord::into_link)
        .map_err(|source| decode_error(Table::DecisionLinks, source))
}

fn skip_undecodable<T>(decoded: Result<T, GatewayError>, skipped: &mut usize) -> Option<T> {
    match decoded {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "skipping row that does not decode");
            *skipped += 1;
            None
        }
    }
}

fn decode_error(table: Table, source: RecordError) -> GatewayError {
    GatewayError::Decode { table, source }
}

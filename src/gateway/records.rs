// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed views of the `decisions` and `decision_links` rows.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::remote::Row;
use crate::model::{
    Curve, Handle, Link, LinkHandles, LinkId, LinkKind, LinkStyle, Node, NodeId, NodeKind,
    Pattern, Position, ProjectId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub project_id: ProjectId,
    /// A missing or null kind reads as a decision.
    #[serde(default, deserialize_with = "node_kind_or_default")]
    pub kind: NodeKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub statement: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub queue_time_min: Option<f64>,
    #[serde(default)]
    pub action_time_min: Option<f64>,
}

impl NodeRecord {
    /// The insert payload for a freshly created node; the store assigns the id.
    pub fn for_insert(
        project_id: &ProjectId,
        kind: NodeKind,
        title: &str,
        position: Position,
    ) -> Self {
        Self {
            id: None,
            project_id: project_id.clone(),
            kind,
            title: Some(title.to_owned()),
            statement: None,
            x: Some(position.x),
            y: Some(position.y),
            queue_time_min: None,
            action_time_min: None,
        }
    }

    /// Builds the model node. Missing coordinates fall back to `default_position`, a missing
    /// title to the kind's default.
    pub fn into_node(self, default_position: Position) -> Result<Node, RecordError> {
        let id = self.id.ok_or(RecordError::MissingId)?;
        let position = Position::new(
            self.x.unwrap_or(default_position.x),
            self.y.unwrap_or(default_position.y),
        );
        let title = self
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| self.kind.style().default_title.to_owned());

        let mut node = Node::new(id, self.project_id, self.kind, position).with_title(title);
        node.set_statement(self.statement);
        node.set_queue_time_minutes(self.queue_time_min);
        node.set_action_time_minutes(self.action_time_min);
        Ok(node)
    }
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        let position = node.position();
        Self {
            id: Some(node.id().clone()),
            project_id: node.project_id().clone(),
            kind: node.kind(),
            title: Some(node.title().to_owned()),
            statement: node.statement().map(ToOwned::to_owned),
            x: Some(position.x),
            y: Some(position.y),
            queue_time_min: node.queue_time_minutes(),
            action_time_min: node.action_time_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LinkId>,
    pub project_id: ProjectId,
    pub from_id: NodeId,
    pub to_id: NodeId,
    /// Anything but `data` reads as `precedes`, including older `process` rows.
    #[serde(default = "precedes", deserialize_with = "link_kind_data_or_precedes")]
    pub kind: LinkKind,
    #[serde(default)]
    pub source_handle: Option<Handle>,
    #[serde(default)]
    pub target_handle: Option<Handle>,
    #[serde(default)]
    pub curve: Option<Curve>,
    #[serde(default)]
    pub pattern: Option<Pattern>,
    #[serde(default)]
    pub arrow_start: Option<bool>,
    #[serde(default)]
    pub arrow_end: Option<bool>,
}

impl LinkRecord {
    pub fn for_insert(
        project_id: &ProjectId,
        from_id: &NodeId,
        to_id: &NodeId,
        kind: LinkKind,
        handles: &LinkHandles,
        style: LinkStyle,
    ) -> Self {
        Self {
            id: None,
            project_id: project_id.clone(),
            from_id: from_id.clone(),
            to_id: to_id.clone(),
            kind,
            source_handle: handles.source.clone(),
            target_handle: handles.target.clone(),
            curve: Some(style.curve),
            pattern: Some(style.pattern),
            arrow_start: Some(style.arrow_start),
            arrow_end: Some(style.arrow_end),
        }
    }

    /// Builds the model link; unset rendering hints take the defaults.
    pub fn into_link(self) -> Result<Link, RecordError> {
        let id = self.id.ok_or(RecordError::MissingId)?;
        let defaults = LinkStyle::default();
        let style = LinkStyle {
            curve: self.curve.unwrap_or(defaults.curve),
            pattern: self.pattern.unwrap_or(defaults.pattern),
            arrow_start: self.arrow_start.unwrap_or(defaults.arrow_start),
            arrow_end: self.arrow_end.unwrap_or(defaults.arrow_end),
        };
        Ok(Link::new(id, self.project_id, self.from_id, self.to_id, self.kind)
            .with_handles(LinkHandles::new(self.source_handle, self.target_handle))
            .with_style(style))
    }
}

fn node_kind_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NodeKind, D::Error> {
    Ok(Option::<NodeKind>::deserialize(deserializer)?.unwrap_or_default())
}

fn precedes() -> LinkKind {
    LinkKind::Precedes
}

fn link_kind_data_or_precedes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LinkKind, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(kind)) if kind == LinkKind::Data.as_str() => LinkKind::Data,
        _ => LinkKind::Precedes,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record has no id")]
    MissingId,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub(crate) fn to_row<T: Serialize>(record: &T) -> Result<Row, RecordError> {
    match serde_json::to_value(record)? {
        Value::Object(row) => Ok(row),
        other => Err(RecordError::Json(serde::ser::Error::custom(format!(
            "expected an object row, got {other}"
        )))),
    }
}

pub(crate) fn from_row<T: for<'de> Deserialize<'de>>(row: Row) -> Result<T, RecordError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

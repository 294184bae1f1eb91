// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::{NodeId, ProjectId};

/// The closed set of note kinds a canvas can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Decision,
    Data,
    Opportunity,
    #[serde(alias = "gateway")]
    Choice,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [Self::Decision, Self::Data, Self::Opportunity, Self::Choice];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Data => "data",
            Self::Opportunity => "opportunity",
            Self::Choice => "choice",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node kind tag '{tag}'")]
pub struct ParseNodeKindError {
    tag: String,
}

impl ParseNodeKindError {
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl FromStr for NodeKind {
    type Err = ParseNodeKindError;

    /// Parses a palette drag payload. `gateway` is the older spelling of `choice`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "decision" => Ok(Self::Decision),
            "data" => Ok(Self::Data),
            "opportunity" => Ok(Self::Opportunity),
            "choice" | "gateway" => Ok(Self::Choice),
            other => Err(ParseNodeKindError { tag: other.to_owned() }),
        }
    }
}

/// Canvas-space coordinates of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// A positioned, typed, titled note on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    project_id: ProjectId,
    kind: NodeKind,
    title: String,
    statement: Option<String>,
    position: Position,
    queue_time_minutes: Option<f64>,
    action_time_minutes: Option<f64>,
    rev: u64,
}

impl Node {
    pub fn new(id: NodeId, project_id: ProjectId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            project_id,
            kind,
            title: kind.style().default_title.to_owned(),
            statement: None,
            position,
            queue_time_minutes: None,
            action_time_minutes: None,
            rev: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// The text the canvas shows: the raw title, prefixed for kinds that carry a prefix.
    pub fn label(&self) -> String {
        match self.kind.style().label_prefix {
            Some(prefix) => format!("{prefix}{}", self.title),
            None => self.title.clone(),
        }
    }

    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    pub fn set_statement<T: Into<String>>(&mut self, statement: Option<T>) {
        self.statement = statement.map(Into::into);
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn queue_time_minutes(&self) -> Option<f64> {
        self.queue_time_minutes
    }

    pub fn set_queue_time_minutes(&mut self, minutes: Option<f64>) {
        self.queue_time_minutes = minutes;
    }

    pub fn action_time_minutes(&self) -> Option<f64> {
        self.action_time_minutes
    }

    pub fn set_action_time_minutes(&mut self, minutes: Option<f64>) {
        self.action_time_minutes = minutes;
    }

    /// Local edit revision. Bumped on every local mutation; never sent to the remote store.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) -> u64 {
        self.rev = self.rev.saturating_add(1);
        self.rev
    }

    /// True when every field the remote store persists matches `other`.
    pub fn same_content(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.title == other.title
            && self.statement == other.statement
            && self.position == other.position
            && self.queue_time_minutes == other.queue_time_minutes
            && self.action_time_minutes == other.action_time_minutes
    }
}

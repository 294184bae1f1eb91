// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-side projections of the graph.
//!
//! Every function here is pure: it borrows nodes and links and never mutates the store. The
//! rendering surface recomputes them whenever the graph or the selected [`View`] changes.

pub mod aggregate;
pub mod filter;
pub mod render;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Link, LinkKind, Node, NodeKind};

pub use aggregate::{aggregate, Totals};
pub use filter::{filter, Projection};
pub use render::{RenderLink, RenderNode, Scene};

/// One of the three read-only projections of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Process,
    Information,
    Opportunities,
}

impl View {
    pub const ALL: [View; 3] = [Self::Process, Self::Information, Self::Opportunities];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Information => "information",
            Self::Opportunities => "opportunities",
        }
    }

    /// Whether `node` is shown (and counted) under this view.
    pub fn shows_node(self, node: &Node) -> bool {
        match self {
            Self::Process => true,
            Self::Information => node.kind() == NodeKind::Data,
            Self::Opportunities => node.kind() == NodeKind::Opportunity,
        }
    }

    /// Whether `link` is shown under this view. Decided by the link's own kind, never by the
    /// current kinds of its endpoints.
    pub fn shows_link(self, link: &Link) -> bool {
        match self {
            Self::Process => true,
            Self::Information => link.kind() == LinkKind::Data,
            Self::Opportunities => false,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view '{0}' (expected process, information or opportunities)")]
pub struct ParseViewError(String);

impl FromStr for View {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "process" => Ok(Self::Process),
            "information" => Ok(Self::Information),
            "opportunities" => Ok(Self::Opportunities),
            other => Err(ParseViewError(other.to_owned())),
        }
    }
}

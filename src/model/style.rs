// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Kind-to-appearance lookup tables.
//!
//! Every visual decision that depends on a node or link kind goes through these tables, so adding
//! a kind is a compile error until it has an entry here.

use serde::Serialize;

use super::link::LinkKind;
use super::node::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    Sticky,
    Cylinder,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub background: &'static str,
    pub text_color: &'static str,
    pub shape: NodeShape,
    pub label_prefix: Option<&'static str>,
    pub default_title: &'static str,
}

const DECISION_STYLE: NodeStyle = NodeStyle {
    background: "#FFF7B3",
    text_color: "#1f2937",
    shape: NodeShape::Sticky,
    label_prefix: None,
    default_title: "New item",
};

const DATA_STYLE: NodeStyle = NodeStyle {
    background: "#DCFCE7",
    text_color: "#1F7A1F",
    shape: NodeShape::Cylinder,
    label_prefix: None,
    default_title: "Data",
};

const OPPORTUNITY_STYLE: NodeStyle = NodeStyle {
    background: "#CDE3FF",
    text_color: "#1f2937",
    shape: NodeShape::Sticky,
    label_prefix: None,
    default_title: "New item",
};

const CHOICE_STYLE: NodeStyle = NodeStyle {
    background: "#F6E7B2",
    text_color: "#1f2937",
    shape: NodeShape::Diamond,
    label_prefix: Some("Choice: "),
    default_title: "New item",
};

impl NodeKind {
    pub fn style(self) -> &'static NodeStyle {
        match self {
            Self::Decision => &DECISION_STYLE,
            Self::Data => &DATA_STYLE,
            Self::Opportunity => &OPPORTUNITY_STYLE,
            Self::Choice => &CHOICE_STYLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkAppearance {
    pub stroke: &'static str,
    pub label: Option<&'static str>,
}

impl LinkKind {
    pub fn appearance(self) -> LinkAppearance {
        match self {
            Self::Data => LinkAppearance { stroke: "#228B22", label: Some("data") },
            Self::Precedes => LinkAppearance { stroke: "#5A6C80", label: None },
        }
    }
}

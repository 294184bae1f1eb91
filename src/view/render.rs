// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Payloads handed to the rendering surface.
//!
//! Everything the surface needs to paint a node or a link is resolved here from the style
//! tables, so the surface never branches on kinds itself.

use serde::Serialize;

use crate::graph::{GraphStore, Selection};
use crate::model::{
    Curve, Handle, Link, LinkId, LinkKind, Node, NodeId, NodeKind, NodeShape, Position,
};

use super::{aggregate, filter, Totals, View};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub background: &'static str,
    pub text_color: &'static str,
    pub shape: NodeShape,
    pub position: Position,
    pub selected: bool,
    pub renaming: bool,
}

impl RenderNode {
    pub fn new(node: &Node, selected: bool, renaming: bool) -> Self {
        let style = node.kind().style();
        Self {
            id: node.id().clone(),
            kind: node.kind(),
            label: node.label(),
            background: style.background,
            text_color: style.text_color,
            shape: style.shape,
            position: node.position(),
            selected,
            renaming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLink {
    pub id: LinkId,
    pub from_id: NodeId,
    pub to_id: NodeId,
    pub kind: LinkKind,
    pub label: Option<&'static str>,
    pub stroke: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<&'static str>,
    pub curve: Curve,
    pub arrow_start: bool,
    pub arrow_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Handle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Handle>,
    pub selected: bool,
}

impl RenderLink {
    pub fn new(link: &Link, selected: bool) -> Self {
        let appearance = link.kind().appearance();
        let style = link.style();
        Self {
            id: link.id().clone(),
            from_id: link.from_id().clone(),
            to_id: link.to_id().clone(),
            kind: link.kind(),
            label: appearance.label,
            stroke: appearance.stroke,
            dash_array: style.pattern.dash_array(),
            curve: style.curve,
            arrow_start: style.arrow_start,
            arrow_end: style.arrow_end,
            source_handle: link.handles().source.clone(),
            target_handle: link.handles().target.clone(),
            selected,
        }
    }
}

/// The full render payload for one view: visible nodes and links plus the view's totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub view: View,
    pub nodes: Vec<RenderNode>,
    pub links: Vec<RenderLink>,
    pub totals: Totals,
}

impl Scene {
    /// Projects `store` under `view`. `renaming` marks the node whose inline editor is open.
    pub fn build(store: &GraphStore, view: View, renaming: Option<&NodeId>) -> Self {
        let projection = filter(store.nodes(), store.links(), view);
        let selection = store.selection();

        let nodes = projection
            .nodes
            .iter()
            .map(|node| {
                let selected = matches!(selection, Selection::Node(id) if id == node.id());
                RenderNode::new(node, selected, renaming == Some(node.id()))
            })
            .collect();
        let links = projection
            .links
            .iter()
            .map(|link| {
                let selected = matches!(selection, Selection::Link(id) if id == link.id());
                RenderLink::new(link, selected)
            })
            .collect();

        Self { view, nodes, links, totals: aggregate(projection.nodes.iter().copied(), view) }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Scene;
    use crate::graph::GraphStore;
    use crate::model::fixtures::{link_id, node_id, value_stream};
    use crate::model::{LinkStyle, NodeShape, Pattern};
    use crate::view::View;

    fn store() -> GraphStore {
        let (nodes, links) = value_stream();
        let mut store = GraphStore::new();
        store.replace_all(nodes, links);
        store
    }

    #[test]
    fn scene_resolves_styles_and_labels() {
        let mut store = store();
        store.select_node(&node_id("d-gate"));
        let scene = Scene::build(&store, View::Process, Some(&node_id("d-intake")));

        let gate = scene.nodes.iter().find(|node| node.id.as_str() == "d-gate").expect("gate");
        assert_eq!(gate.label, "Choice: New item");
        assert_eq!(gate.shape, NodeShape::Diamond);
        assert_eq!(gate.background, "#F6E7B2");
        assert!(gate.selected);
        assert!(!gate.renaming);

        let intake = &scene.nodes[0];
        assert!(intake.renaming);
        assert!(!intake.selected);

        let data_link = scene.links.iter().find(|link| link.id.as_str() == "l-2").expect("l-2");
        assert_eq!(data_link.stroke, "#228B22");
        assert_eq!(data_link.label, Some("data"));
        assert_eq!(scene.totals.total, 42.0);
    }

    #[test]
    fn dashed_links_carry_a_dash_array() {
        let mut store = store();
        if let Some(link) = store.link_mut(&link_id("l-1")) {
            link.set_style(LinkStyle { pattern: Pattern::Dashed, ..LinkStyle::default() });
        }
        store.select_link(&link_id("l-1"));
        let scene = Scene::build(&store, View::Process, None);

        let dashed = &scene.links[0];
        assert_eq!(dashed.dash_array, Some("8 6"));
        assert!(dashed.selected);
        assert_eq!(scene.links[1].dash_array, None);
    }

    #[test]
    fn scene_serializes_for_the_surface() {
        let scene = Scene::build(&store(), View::Opportunities, None);
        let value = serde_json::to_value(&scene).expect("serialize");
        assert_eq!(value["view"], json!("opportunities"));
        assert_eq!(value["links"], json!([]));
        assert_eq!(value["nodes"][0]["id"], json!("d-idea"));
        assert_eq!(value["nodes"][0]["shape"], json!("sticky"));
        assert_eq!(value["totals"]["total"], json!(2.0));
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![cfg(test)]

use super::{Link, LinkId, LinkKind, Node, NodeId, NodeKind, Position, ProjectId};

pub(crate) fn project_id() -> ProjectId {
    ProjectId::new("p-1").expect("project id")
}

pub(crate) fn node_id(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

pub(crate) fn link_id(value: &str) -> LinkId {
    LinkId::new(value).expect("link id")
}

pub(crate) fn node(id: &str, kind: NodeKind, x: f64, y: f64) -> Node {
    Node::new(node_id(id), project_id(), kind, Position::new(x, y))
}

pub(crate) fn timed_node(id: &str, kind: NodeKind, queue: Option<f64>, action: Option<f64>) -> Node {
    let mut node = node(id, kind, 0.0, 0.0);
    node.set_queue_time_minutes(queue);
    node.set_action_time_minutes(action);
    node
}

pub(crate) fn link(id: &str, from: &Node, to: &Node) -> Link {
    Link::new(
        link_id(id),
        project_id(),
        from.id().clone(),
        to.id().clone(),
        LinkKind::classify(from.kind(), to.kind()),
    )
}

/// A small value stream: two decisions, a data store feeding the first, a choice and an
/// opportunity hanging off the second decision.
pub(crate) fn value_stream() -> (Vec<Node>, Vec<Link>) {
    let intake = timed_node("d-intake", NodeKind::Decision, Some(10.0), Some(5.0));
    let review = timed_node("d-review", NodeKind::Decision, Some(0.0), None);
    let crm = timed_node("d-crm", NodeKind::Data, None, Some(20.0));
    let gate = timed_node("d-gate", NodeKind::Choice, Some(3.0), Some(2.0));
    let idea = timed_node("d-idea", NodeKind::Opportunity, Some(1.0), Some(1.0));

    let links = vec![
        link("l-1", &intake, &review),
        link("l-2", &crm, &intake),
        link("l-3", &review, &gate),
    ];
    (vec![intake, review, crm, gate, idea], links)
}

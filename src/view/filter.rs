// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Link, Node};

use super::View;

/// The visible subset of a graph under one view, in store order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection<'a> {
    pub nodes: Vec<&'a Node>,
    pub links: Vec<&'a Link>,
}

impl Projection<'_> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

pub fn filter<'a>(
    nodes: impl IntoIterator<Item = &'a Node>,
    links: impl IntoIterator<Item = &'a Link>,
    view: View,
) -> Projection<'a> {
    Projection {
        nodes: nodes.into_iter().filter(|node| view.shows_node(node)).collect(),
        links: links.into_iter().filter(|link| view.shows_link(link)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::filter;
    use crate::graph::GraphStore;
    use crate::model::fixtures::{link, node, value_stream};
    use crate::model::{LinkKind, NodeKind};
    use crate::view::View;

    fn ids<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        items.into_iter().collect()
    }

    #[test]
    fn process_shows_everything_in_order() {
        let (nodes, links) = value_stream();
        let projection = filter(&nodes, &links, View::Process);
        assert_eq!(projection.nodes.len(), nodes.len());
        assert_eq!(projection.links.len(), links.len());
        assert_eq!(
            ids(projection.nodes.iter().map(|node| node.id().as_str())),
            ["d-intake", "d-review", "d-crm", "d-gate", "d-idea"]
        );
    }

    #[test]
    fn information_shows_data_nodes_and_data_links() {
        let (nodes, links) = value_stream();
        let projection = filter(&nodes, &links, View::Information);
        assert_eq!(ids(projection.nodes.iter().map(|node| node.id().as_str())), ["d-crm"]);
        assert_eq!(ids(projection.links.iter().map(|link| link.id().as_str())), ["l-2"]);
        assert!(projection.links.iter().all(|link| link.kind() == LinkKind::Data));
    }

    #[rstest]
    #[case::none(0)]
    #[case::some(3)]
    #[case::many(40)]
    fn opportunities_never_show_links(#[case] extra_links: usize) {
        let a = node("o-a", NodeKind::Opportunity, 0.0, 0.0);
        let b = node("o-b", NodeKind::Opportunity, 10.0, 0.0);
        let c = node("d-c", NodeKind::Decision, 20.0, 0.0);
        let links = (0..extra_links)
            .map(|index| link(&format!("l-{index}"), &a, if index % 2 == 0 { &b } else { &c }))
            .collect::<Vec<_>>();
        let nodes = [a.clone(), b.clone(), c];

        let projection = filter(&nodes, &links, View::Opportunities);
        assert_eq!(ids(projection.nodes.iter().map(|node| node.id().as_str())), ["o-a", "o-b"]);
        assert!(projection.links.is_empty());
    }

    #[test]
    fn information_link_visibility_ignores_current_endpoint_kinds() {
        let a = node("d-a", NodeKind::Decision, 0.0, 0.0);
        let mut b = node("d-b", NodeKind::Decision, 10.0, 0.0);
        let precedes = link("l-1", &a, &b);
        b.set_kind(NodeKind::Data);

        let nodes = [a, b];
        let projection = filter(&nodes, [&precedes], View::Information);
        assert_eq!(projection.nodes.len(), 1);
        assert!(projection.links.is_empty());
    }

    #[test]
    fn filtering_leaves_store_untouched() {
        let (nodes, links) = value_stream();
        let mut store = GraphStore::new();
        store.replace_all(nodes, links);
        let before = (store.nodes().count(), store.links().count());

        for view in View::ALL {
            let _ = filter(store.nodes(), store.links(), view);
        }
        assert_eq!((store.nodes().count(), store.links().count()), before);
        assert!(filter(store.nodes(), store.links(), View::Information).nodes.len() < before.0);
    }
}

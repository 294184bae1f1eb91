// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::model::{Link, LinkId, Node, NodeId};

/// What is currently selected on the canvas. A node and a link can never both be selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Link(LinkId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("link {link_id} references missing node {node_id}")]
    MissingEndpoint { link_id: LinkId, node_id: NodeId },
    #[error("link {link_id} would connect node {node_id} to itself")]
    SelfLoop { link_id: LinkId, node_id: NodeId },
}

/// A node removed from the store together with the links that went with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub links: Vec<Link>,
}

/// The canonical in-memory graph of one project.
///
/// Nodes and links keep insertion order. Every stored link resolves both endpoints to stored
/// nodes; operations that would break this are rejected or cascade.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: IndexMap<NodeId, Node>,
    links: IndexMap<LinkId, Link>,
    selection: Selection,
    node_aliases: HashMap<NodeId, NodeId>,
    link_aliases: HashMap<LinkId, LinkId>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn links(&self) -> impl ExactSizeIterator<Item = &Link> + '_ {
        self.links.values()
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub fn link(&self, link_id: &LinkId) -> Option<&Link> {
        self.links.get(link_id)
    }

    pub fn link_mut(&mut self, link_id: &LinkId) -> Option<&mut Link> {
        self.links.get_mut(link_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Inserts or replaces a node, keeping its position in the order when it already exists.
    pub fn upsert_node(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id().clone(), node)
    }

    /// Inserts or replaces a link after checking that both endpoints exist and differ.
    pub fn upsert_link(&mut self, link: Link) -> Result<Option<Link>, StoreError> {
        if link.from_id() == link.to_id() {
            return Err(StoreError::SelfLoop {
                link_id: link.id().clone(),
                node_id: link.from_id().clone(),
            });
        }
        for endpoint in [link.from_id(), link.to_id()] {
            if !self.nodes.contains_key(endpoint) {
                return Err(StoreError::MissingEndpoint {
                    link_id: link.id().clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        Ok(self.links.insert(link.id().clone(), link))
    }

    /// Removes a node and every link touching it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        let node = self.nodes.shift_remove(node_id)?;

        let incident = self.incident_link_ids(node_id);
        let links = incident
            .iter()
            .filter_map(|link_id| self.links.shift_remove(link_id))
            .collect::<Vec<_>>();

        let selection_gone = match &self.selection {
            Selection::Node(selected) => selected == node_id,
            Selection::Link(selected) => incident.contains(selected),
            Selection::None => false,
        };
        if selection_gone {
            self.selection = Selection::None;
        }

        Some(RemovedNode { node, links })
    }

    pub fn remove_link(&mut self, link_id: &LinkId) -> Option<Link> {
        let link = self.links.shift_remove(link_id)?;
        if self.selection == Selection::Link(link_id.clone()) {
            self.selection = Selection::None;
        }
        Some(link)
    }

    /// Swaps the whole graph, as on initial load. Links with a dangling endpoint are dropped
    /// and counted in the return value.
    pub fn replace_all(&mut self, nodes: Vec<Node>, links: Vec<Link>) -> usize {
        self.nodes = nodes.into_iter().map(|node| (node.id().clone(), node)).collect();
        self.links.clear();
        self.selection = Selection::None;
        self.node_aliases.clear();
        self.link_aliases.clear();

        let mut dropped = 0usize;
        for link in links {
            if let Err(err) = self.upsert_link(link) {
                tracing::warn!(error = %err, "dropping link that does not fit the loaded graph");
                dropped += 1;
            }
        }
        dropped
    }

    pub fn incident_link_ids(&self, node_id: &NodeId) -> Vec<LinkId> {
        self.links
            .values()
            .filter(|link| link.touches(node_id))
            .map(|link| link.id().clone())
            .collect()
    }

    /// Moves a node to a new id in place. Incident link endpoints and the selection follow,
    /// and `old` keeps resolving to `new` through [`GraphStore::resolve_node`].
    pub fn rekey_node(&mut self, old: &NodeId, new: NodeId) -> bool {
        let Some((index, _, mut node)) = self.nodes.shift_remove_full(old) else {
            return false;
        };
        node.set_id(new.clone());
        self.nodes.shift_insert(index, new.clone(), node);

        for link in self.links.values_mut() {
            link.replace_endpoint(old, &new);
        }
        if self.selection == Selection::Node(old.clone()) {
            self.selection = Selection::Node(new.clone());
        }
        for target in self.node_aliases.values_mut() {
            if target == old {
                *target = new.clone();
            }
        }
        self.node_aliases.insert(old.clone(), new);
        true
    }

    pub fn rekey_link(&mut self, old: &LinkId, new: LinkId) -> bool {
        let Some((index, _, mut link)) = self.links.shift_remove_full(old) else {
            return false;
        };
        link.set_id(new.clone());
        self.links.shift_insert(index, new.clone(), link);

        if self.selection == Selection::Link(old.clone()) {
            self.selection = Selection::Link(new.clone());
        }
        self.link_aliases.insert(old.clone(), new);
        true
    }

    /// Maps an id that may have been re-keyed to the id the node is stored under now.
    pub fn resolve_node(&self, node_id: &NodeId) -> Option<NodeId> {
        if self.nodes.contains_key(node_id) {
            return Some(node_id.clone());
        }
        self.node_aliases
            .get(node_id)
            .filter(|current| self.nodes.contains_key(*current))
            .cloned()
    }

    pub fn resolve_link(&self, link_id: &LinkId) -> Option<LinkId> {
        if self.links.contains_key(link_id) {
            return Some(link_id.clone());
        }
        self.link_aliases
            .get(link_id)
            .filter(|current| self.links.contains_key(*current))
            .cloned()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn select_node(&mut self, node_id: &NodeId) -> bool {
        if !self.nodes.contains_key(node_id) {
            return false;
        }
        self.selection = Selection::Node(node_id.clone());
        true
    }

    pub fn select_link(&mut self, link_id: &LinkId) -> bool {
        if !self.links.contains_key(link_id) {
            return false;
        }
        self.selection = Selection::Link(link_id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }
}

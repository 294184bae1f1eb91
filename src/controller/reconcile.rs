// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Remote calls and the application of their results.
//!
//! A response only overwrites local state when the entity's revision is unchanged since the
//! call was issued. Otherwise the local edit is newer and the response is dropped.

use std::collections::HashSet;
use std::future::Future;

use indexmap::IndexSet;

use super::{Controller, Notice};
use crate::gateway::{GatewayError, LinkPatch, NodePatch};
use crate::model::{Link, LinkId, Node, NodeId};

/// The result of one remote call, sent back to the controller's thread.
pub(crate) enum Completion {
    NodeCreated { sent: Node, result: Result<Node, GatewayError> },
    NodeUpdated { node_id: NodeId, rev: u64, result: Result<Node, GatewayError> },
    NodeDeleted { node_id: NodeId, result: Result<u64, GatewayError> },
    LinkCreated { sent: Link, result: Result<Link, GatewayError> },
    LinkUpdated { link_id: LinkId, rev: u64, result: Result<Link, GatewayError> },
    LinkDeleted { link_id: LinkId, result: Result<(), GatewayError> },
}

/// Bookkeeping for entities that do not (yet) have a settled remote counterpart.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    /// Provisional nodes whose create is in flight.
    creating_nodes: HashSet<NodeId>,
    /// Provisional nodes whose create failed. They and everything touching them stay local.
    failed_nodes: HashSet<NodeId>,
    /// Deleted locally while their create was in flight.
    discard_nodes: HashSet<NodeId>,
    creating_links: HashSet<LinkId>,
    failed_links: HashSet<LinkId>,
    discard_links: HashSet<LinkId>,
    /// Links waiting for an endpoint's server id before their create can go out.
    deferred_creates: IndexSet<LinkId>,
    /// Stored links rerouted onto a provisional node; a full update goes out once it settles.
    deferred_updates: IndexSet<LinkId>,
}

impl Controller {
    /// Waits for the next remote call to finish and applies its result.
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn apply_next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.in_flight -= 1;
                self.apply_completion(completion);
                true
            }
            None => false,
        }
    }

    /// Applies every result that has already arrived, without waiting.
    pub fn apply_ready_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply_completion(completion);
            applied += 1;
        }
        applied
    }

    /// Applies results until nothing is in flight, including calls issued while reconciling.
    /// Never returns if a remote call hangs.
    pub async fn settle(&mut self) {
        while self.apply_next_completion().await {}
    }

    fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::NodeCreated { sent, result } => self.node_created(sent, result),
            Completion::NodeUpdated { node_id, rev, result } => {
                self.node_updated(&node_id, rev, result)
            }
            Completion::NodeDeleted { node_id, result } => match result {
                Ok(links) => tracing::debug!(node_id = %node_id, links, "node deleted remotely"),
                Err(err) => self.report(format!("could not delete node {node_id}"), &err),
            },
            Completion::LinkCreated { sent, result } => self.link_created(sent, result),
            Completion::LinkUpdated { link_id, rev, result } => {
                self.link_updated(&link_id, rev, result)
            }
            Completion::LinkDeleted { link_id, result } => match result {
                Ok(()) => tracing::debug!(link_id = %link_id, "link deleted remotely"),
                Err(err) => self.report(format!("could not delete link {link_id}"), &err),
            },
        }
    }

    fn node_created(&mut self, sent: Node, result: Result<Node, GatewayError>) {
        let local_id = sent.id().clone();
        self.pending.creating_nodes.remove(&local_id);
        let discard = self.pending.discard_nodes.remove(&local_id);

        let mut stored = match result {
            Ok(stored) => stored,
            Err(err) => {
                if !discard {
                    self.pending.failed_nodes.insert(local_id.clone());
                    self.fail_links_touching(&local_id);
                }
                self.report(format!("could not save new node {local_id}"), &err);
                return;
            }
        };

        let server_id = stored.id().clone();
        if discard {
            tracing::debug!(node_id = %server_id, "deleting node removed while it was being created");
            self.issue_node_delete(server_id);
            return;
        }
        if !self.store.rekey_node(&local_id, server_id.clone()) {
            return;
        }
        self.state.follows_rekey(&local_id, &server_id);
        tracing::debug!(local_id = %local_id, node_id = %server_id, "node saved");

        let local = self.store.node(&server_id).map(|local| (local.rev(), NodePatch::full(local)));
        match local {
            Some((rev, _)) if rev == sent.rev() => {
                stored.set_rev(rev);
                self.store.upsert_node(stored);
            }
            Some((rev, patch)) => self.issue_node_update(server_id, rev, patch),
            None => {}
        }
        self.flush_deferred();
    }

    fn node_updated(&mut self, node_id: &NodeId, rev: u64, result: Result<Node, GatewayError>) {
        let mut stored = match result {
            Ok(stored) => stored,
            Err(err) => {
                self.report(format!("could not save node {node_id}"), &err);
                return;
            }
        };
        match self.store.node(node_id).map(Node::rev) {
            Some(current) if current == rev => {
                stored.set_rev(rev);
                self.store.upsert_node(stored);
            }
            Some(current) => {
                tracing::debug!(node_id = %node_id, rev, current, "ignoring stale node response");
            }
            None => tracing::debug!(node_id = %node_id, "node gone before its update returned"),
        }
    }

    fn link_created(&mut self, sent: Link, result: Result<Link, GatewayError>) {
        let local_id = sent.id().clone();
        self.pending.creating_links.remove(&local_id);
        let discard = self.pending.discard_links.remove(&local_id);

        let mut stored = match result {
            Ok(stored) => stored,
            Err(err) => {
                if !discard {
                    self.pending.failed_links.insert(local_id.clone());
                }
                self.report(format!("could not save new link {local_id}"), &err);
                return;
            }
        };

        let server_id = stored.id().clone();
        if discard {
            tracing::debug!(link_id = %server_id, "deleting link removed while it was being created");
            self.issue_link_delete(server_id);
            return;
        }
        if !self.store.rekey_link(&local_id, server_id.clone()) {
            return;
        }
        tracing::debug!(local_id = %local_id, link_id = %server_id, "link saved");

        let local = self.store.link(&server_id).map(|local| (local.rev(), LinkPatch::full(local)));
        match local {
            Some((rev, _)) if rev == sent.rev() => {
                stored.set_rev(rev);
                if let Err(err) = self.store.upsert_link(stored) {
                    tracing::warn!(error = %err, "stored link does not fit the local graph");
                }
            }
            Some((_, patch)) => self.sync_link(&server_id, patch),
            None => {}
        }
    }

    fn link_updated(&mut self, link_id: &LinkId, rev: u64, result: Result<Link, GatewayError>) {
        let mut stored = match result {
            Ok(stored) => stored,
            Err(err) => {
                self.report(format!("could not save link {link_id}"), &err);
                return;
            }
        };
        match self.store.link(link_id).map(Link::rev) {
            Some(current) if current == rev => {
                stored.set_rev(rev);
                if let Err(err) = self.store.upsert_link(stored) {
                    tracing::warn!(error = %err, "stored link does not fit the local graph");
                }
            }
            Some(current) => {
                tracing::debug!(link_id = %link_id, rev, current, "ignoring stale link response");
            }
            None => tracing::debug!(link_id = %link_id, "link gone before its update returned"),
        }
    }

    /// Pushes a local node edit. Provisional nodes are reconciled when their create returns,
    /// or stay local if it failed.
    pub(super) fn sync_node(&mut self, node_id: &NodeId, patch: NodePatch) {
        if node_id.is_provisional() {
            return;
        }
        if let Some(rev) = self.store.node(node_id).map(Node::rev) {
            self.issue_node_update(node_id.clone(), rev, patch);
        }
    }

    /// Pushes a local link edit, deferring it while an endpoint has no server id yet.
    pub(super) fn sync_link(&mut self, link_id: &LinkId, patch: LinkPatch) {
        if link_id.is_provisional() {
            return;
        }
        let Some(link) = self.store.link(link_id) else {
            return;
        };
        let endpoints = [link.from_id(), link.to_id()];
        if endpoints.iter().any(|id| self.pending.failed_nodes.contains(*id)) {
            tracing::debug!(link_id = %link_id, "link points at a local-only node; keeping edit local");
            return;
        }
        if endpoints.iter().any(|id| id.is_provisional()) {
            self.pending.deferred_updates.insert(link_id.clone());
            return;
        }

        let rev = link.rev();
        let patch = if self.pending.deferred_updates.shift_remove(link_id) {
            LinkPatch::full(link)
        } else {
            patch
        };
        self.issue_link_update(link_id.clone(), rev, patch);
    }

    /// Issues the create of a freshly inserted link, or parks it until it can be issued.
    pub(super) fn sync_new_link(&mut self, link_id: &LinkId) {
        let Some(link) = self.store.link(link_id) else {
            return;
        };
        let endpoints = [link.from_id(), link.to_id()];
        if endpoints.iter().any(|id| self.pending.failed_nodes.contains(*id)) {
            self.pending.failed_links.insert(link_id.clone());
            return;
        }
        if endpoints.iter().any(|id| id.is_provisional()) {
            self.pending.deferred_creates.insert(link_id.clone());
            return;
        }
        let link = link.clone();
        self.issue_link_create(link);
    }

    /// Handles the remote side of a node that was just removed locally.
    pub(super) fn forget_node(&mut self, node_id: &NodeId) {
        if !node_id.is_provisional() {
            self.issue_node_delete(node_id.clone());
        } else if self.pending.creating_nodes.contains(node_id) {
            self.pending.discard_nodes.insert(node_id.clone());
        } else {
            self.pending.failed_nodes.remove(node_id);
        }
    }

    /// Handles the remote side of a link that was just removed locally. `cascades` is set when
    /// the remote node delete already takes the stored link with it.
    pub(super) fn forget_link(&mut self, link_id: &LinkId, cascades: bool) {
        self.pending.deferred_creates.shift_remove(link_id);
        let diverged = self.pending.deferred_updates.shift_remove(link_id);

        if link_id.is_provisional() {
            if self.pending.creating_links.contains(link_id) {
                self.pending.discard_links.insert(link_id.clone());
            } else {
                self.pending.failed_links.remove(link_id);
            }
            return;
        }
        if cascades && !diverged {
            return;
        }
        self.issue_link_delete(link_id.clone());
    }

    /// Issues every parked create and update whose endpoints now all have server ids.
    fn flush_deferred(&mut self) {
        let settled = |store: &crate::graph::GraphStore, link_id: &LinkId| {
            store
                .link(link_id)
                .map_or(true, |link| !link.from_id().is_provisional() && !link.to_id().is_provisional())
        };

        let creates = self
            .pending
            .deferred_creates
            .iter()
            .filter(|link_id| settled(&self.store, *link_id))
            .cloned()
            .collect::<Vec<_>>();
        for link_id in creates {
            self.pending.deferred_creates.shift_remove(&link_id);
            if let Some(link) = self.store.link(&link_id).cloned() {
                self.issue_link_create(link);
            }
        }

        let updates = self
            .pending
            .deferred_updates
            .iter()
            .filter(|link_id| settled(&self.store, *link_id))
            .cloned()
            .collect::<Vec<_>>();
        for link_id in updates {
            self.pending.deferred_updates.shift_remove(&link_id);
            if let Some(link) = self.store.link(&link_id) {
                let (rev, patch) = (link.rev(), LinkPatch::full(link));
                self.issue_link_update(link_id, rev, patch);
            }
        }
    }

    /// Parked links touching a node whose create failed will never be saved.
    fn fail_links_touching(&mut self, node_id: &NodeId) {
        let touching = self.store.incident_link_ids(node_id);
        for link_id in touching {
            if self.pending.deferred_creates.shift_remove(&link_id) {
                self.pending.failed_links.insert(link_id);
            } else {
                self.pending.deferred_updates.shift_remove(&link_id);
            }
        }
    }

    fn report(&mut self, message: String, err: &GatewayError) {
        tracing::warn!(error = %err, "{message}");
        self.notices.push(Notice::warn(format!("{message}: {err}")));
    }

    fn spawn<F>(&mut self, call: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.in_flight += 1;
        let completions = self.completions_tx.clone();
        self.runtime.spawn(async move {
            // the receiver only goes away with the controller
            let _ = completions.send(call.await);
        });
    }

    pub(super) fn issue_node_create(&mut self, node: Node) {
        self.pending.creating_nodes.insert(node.id().clone());
        let gateway = self.gateway.clone();
        let project_id = self.project_id.clone();
        self.spawn(async move {
            let result = gateway
                .create_node(&project_id, node.kind(), node.title(), node.position())
                .await;
            Completion::NodeCreated { sent: node, result }
        });
    }

    fn issue_node_update(&mut self, node_id: NodeId, rev: u64, patch: NodePatch) {
        let gateway = self.gateway.clone();
        self.spawn(async move {
            let result = gateway.update_node(&node_id, &patch).await;
            Completion::NodeUpdated { node_id, rev, result }
        });
    }

    fn issue_node_delete(&mut self, node_id: NodeId) {
        let gateway = self.gateway.clone();
        self.spawn(async move {
            let result = gateway.delete_node_cascade(&node_id).await;
            Completion::NodeDeleted { node_id, result }
        });
    }

    fn issue_link_create(&mut self, link: Link) {
        self.pending.creating_links.insert(link.id().clone());
        let gateway = self.gateway.clone();
        let project_id = self.project_id.clone();
        self.spawn(async move {
            let result = gateway
                .create_link(
                    &project_id,
                    link.from_id(),
                    link.to_id(),
                    link.kind(),
                    link.handles(),
                    link.style(),
                )
                .await;
            Completion::LinkCreated { sent: link, result }
        });
    }

    fn issue_link_update(&mut self, link_id: LinkId, rev: u64, patch: LinkPatch) {
        let gateway = self.gateway.clone();
        self.spawn(async move {
            let result = gateway.update_link(&link_id, &patch).await;
            Completion::LinkUpdated { link_id, rev, result }
        });
    }

    fn issue_link_delete(&mut self, link_id: LinkId) {
        let gateway = self.gateway.clone();
        self.spawn(async move {
            let result = gateway.delete_link(&link_id).await;
            Completion::LinkDeleted { link_id, result }
        });
    }
}

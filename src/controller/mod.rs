// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Interaction controller.
//!
//! Turns surface gestures into graph mutations plus remote calls. Every handler mutates the
//! [`GraphStore`] synchronously (optimistic, never rolled back) and then spawns the remote call
//! on the controller's tokio runtime. Results come back as completions on a channel and are applied
//! by [`Controller::apply_next_completion`], [`Controller::apply_ready_completions`] or
//! [`Controller::settle`], always on the caller's thread.

mod gesture;
mod reconcile;

use tokio::runtime::Handle as RuntimeHandle;
use tokio::sync::mpsc;

pub use gesture::{
    Gesture, IgnoreReason, NodeEdit, Notice, NoticeLevel, Outcome, ValidationError,
};

use crate::config::CanvasConfig;
use crate::gateway::{Gateway, GatewayError, LinkPatch, NodePatch};
use crate::graph::{GraphStore, Selection};
use crate::model::{
    Handle, Link, LinkHandles, LinkId, LinkKind, LinkStyle, Node, NodeId, NodeKind, Position,
    ProjectId, Side,
};
use crate::view::{Scene, View};
use reconcile::{Completion, Pending};

/// What the user is in the middle of. Illegal combinations, such as renaming while
/// connecting, cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Connecting {
        source: NodeId,
        handle: Option<Handle>,
    },
    Renaming(NodeId),
}

impl InteractionState {
    fn follows_rekey(&mut self, old: &NodeId, new: &NodeId) {
        match self {
            Self::Connecting { source, .. } if source == old => *source = new.clone(),
            Self::Renaming(node_id) if node_id == old => *node_id = new.clone(),
            _ => {}
        }
    }

    fn involves(&self, node_id: &NodeId) -> bool {
        match self {
            Self::Idle => false,
            Self::Connecting { source, .. } => source == node_id,
            Self::Renaming(renaming) => renaming == node_id,
        }
    }
}

/// Result of loading a project into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub nodes: usize,
    pub links: usize,
    pub dropped_links: usize,
    pub skipped_rows: usize,
}

pub struct Controller {
    project_id: ProjectId,
    gateway: Gateway,
    config: CanvasConfig,
    store: GraphStore,
    state: InteractionState,
    /// Set once a connect gesture has produced its result; cleared by the next connect start.
    connect_done: bool,
    next_seq: u64,
    pending: Pending,
    notices: Vec<Notice>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    runtime: RuntimeHandle,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("project_id", &self.project_id)
            .field("state", &self.state)
            .field("nodes", &self.store.nodes().len())
            .field("links", &self.store.links().len())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates a controller whose remote calls run on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime. Use [`Controller::with_runtime`] to hand in
    /// a runtime explicitly.
    pub fn new(project_id: ProjectId, gateway: Gateway, config: CanvasConfig) -> Self {
        Self::with_runtime(project_id, gateway, config, RuntimeHandle::current())
    }

    /// Creates a controller that spawns its remote calls onto `runtime`. Gesture handlers can
    /// then be called from any thread; completions are applied by whoever drives
    /// [`Controller::settle`] or [`Controller::apply_ready_completions`].
    pub fn with_runtime(
        project_id: ProjectId,
        gateway: Gateway,
        config: CanvasConfig,
        runtime: RuntimeHandle,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            project_id,
            gateway: gateway.with_default_position(config.default_position),
            config,
            store: GraphStore::new(),
            state: InteractionState::Idle,
            connect_done: false,
            next_seq: 0,
            pending: Pending::default(),
            notices: Vec::new(),
            completions_tx,
            completions_rx,
            in_flight: 0,
            runtime,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Remote calls issued but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The render payload for `view`, with the node being renamed marked.
    pub fn scene(&self, view: View) -> Scene {
        let renaming = match &self.state {
            InteractionState::Renaming(node_id) => Some(node_id),
            _ => None,
        };
        Scene::build(&self.store, view, renaming)
    }

    /// Loads the project and replaces the whole local graph with it.
    pub async fn load(&mut self) -> Result<LoadSummary, GatewayError> {
        let graph = self.gateway.load_project(&self.project_id).await?;
        let (nodes, links, skipped_rows) = (graph.nodes.len(), graph.links.len(), graph.skipped_rows);
        let dropped_links = self.store.replace_all(graph.nodes, graph.links);
        self.state = InteractionState::Idle;
        self.connect_done = false;
        self.pending = Pending::default();

        tracing::info!(
            project_id = %self.project_id,
            nodes,
            links,
            dropped_links,
            skipped_rows,
            "project loaded"
        );
        if skipped_rows > 0 {
            self.notices.push(Notice::warn(format!("{skipped_rows} stored rows could not be read")));
        }
        Ok(LoadSummary { nodes, links: links - dropped_links, dropped_links, skipped_rows })
    }

    /// Routes a serialized surface event to its handler.
    pub fn dispatch(&mut self, gesture: Gesture) -> Outcome {
        match gesture {
            Gesture::PaletteDrop { kind, position } => self.palette_drop(&kind, position),
            Gesture::ConnectStart { node_id, handle } => self.connect_start(&node_id, handle),
            Gesture::ConnectEnd { target, handle, position } => {
                self.connect_end(target.as_ref(), handle, position)
            }
            Gesture::NodeDragEnd { node_id, position } => self.node_drag_end(&node_id, position),
            Gesture::NodeSelect { node_id } => self.select_node(&node_id),
            Gesture::EdgeSelect { link_id } => self.select_link(&link_id),
            Gesture::EdgeReroute { link_id, from_id, to_id, handles } => {
                self.reroute_link(&link_id, &from_id, &to_id, handles)
            }
            Gesture::BackgroundClick => self.background_click(),
            Gesture::NodeDoubleClick { node_id } => self.begin_rename(&node_id),
            Gesture::TitleCommit { node_id, text } => self.commit_title(&node_id, &text),
            Gesture::TabChain { node_id, text } => self.tab_chain(&node_id, text.as_deref()),
            Gesture::DeleteSelection => self.delete_selection(),
            Gesture::DeleteNode { node_id } => self.delete_node(&node_id),
            Gesture::DeleteLink { link_id } => self.delete_link(&link_id),
            Gesture::EditNode { node_id, edit } => self.edit_node(&node_id, &edit),
            Gesture::EditLinkStyle { link_id, style } => self.edit_link_style(&link_id, style),
        }
    }

    /// A palette item carrying `kind_tag` was dropped with the cursor at `cursor`.
    pub fn palette_drop(&mut self, kind_tag: &str, cursor: Position) -> Outcome {
        let kind = match kind_tag.parse::<NodeKind>() {
            Ok(kind) => kind,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring palette drop");
                return Outcome::Ignored(IgnoreReason::UnknownKind(err.tag().to_owned()));
            }
        };
        let node_id = self.insert_node(kind, self.config.centered_at(cursor));
        self.state = InteractionState::Idle;
        Outcome::Created { node_id: Some(node_id), link_id: None }
    }

    pub fn connect_start(&mut self, node_id: &NodeId, handle: Option<Handle>) -> Outcome {
        let Some(source) = self.store.resolve_node(node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone()));
        };
        self.connect_done = false;
        self.state = InteractionState::Connecting { source, handle };
        Outcome::Applied
    }

    /// Ends a connect gesture over `target`'s `handle`, or over empty canvas at `release` when
    /// `target` is `None`.
    pub fn connect_end(
        &mut self,
        target: Option<&NodeId>,
        handle: Option<Handle>,
        release: Position,
    ) -> Outcome {
        if self.connect_done {
            return Outcome::Ignored(IgnoreReason::AlreadyConnected);
        }
        let InteractionState::Connecting { source, handle: source_handle } = &self.state else {
            return Outcome::Ignored(IgnoreReason::NoConnectInProgress);
        };
        let (source, source_handle) = (source.clone(), source_handle.clone());
        self.state = InteractionState::Idle;
        self.connect_done = true;

        let Some(source) = self.store.resolve_node(&source) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(source));
        };

        match target {
            Some(target) => {
                let Some(target_id) = self.store.resolve_node(target) else {
                    return Outcome::Ignored(IgnoreReason::UnknownNode(target.clone()));
                };
                if target_id == source {
                    return Outcome::Ignored(IgnoreReason::SelfLoop(source));
                }
                let handles = LinkHandles::new(source_handle, handle);
                match self.insert_link(&source, &target_id, handles) {
                    Some(link_id) => Outcome::Created { node_id: None, link_id: Some(link_id) },
                    None => Outcome::Ignored(IgnoreReason::UnknownNode(target_id)),
                }
            }
            None => {
                let position = self.config.centered_at(release);
                self.spawn_connected(&source, position, LinkHandles::continuing(source_handle))
            }
        }
    }

    /// A node was dropped after being dragged. Every call issues exactly one remote update.
    pub fn node_drag_end(&mut self, node_id: &NodeId, position: Position) -> Outcome {
        let Some(node_id) = self.store.resolve_node(node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone()));
        };
        if let Some(node) = self.store.node_mut(&node_id) {
            node.set_position(position);
            node.bump_rev();
        }
        self.sync_node(&node_id, NodePatch::position(position));
        Outcome::Applied
    }

    pub fn select_node(&mut self, node_id: &NodeId) -> Outcome {
        match self.store.resolve_node(node_id) {
            Some(node_id) if self.store.select_node(&node_id) => Outcome::Applied,
            _ => Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone())),
        }
    }

    pub fn select_link(&mut self, link_id: &LinkId) -> Outcome {
        match self.store.resolve_link(link_id) {
            Some(link_id) if self.store.select_link(&link_id) => Outcome::Applied,
            _ => Outcome::Ignored(IgnoreReason::UnknownLink(link_id.clone())),
        }
    }

    /// Clears the selection and leaves rename mode.
    pub fn background_click(&mut self) -> Outcome {
        self.store.clear_selection();
        if matches!(self.state, InteractionState::Renaming(_)) {
            self.state = InteractionState::Idle;
        }
        Outcome::Applied
    }

    /// Moves a link's endpoints and handles. The link's kind is left as it was.
    pub fn reroute_link(
        &mut self,
        link_id: &LinkId,
        from_id: &NodeId,
        to_id: &NodeId,
        handles: LinkHandles,
    ) -> Outcome {
        let Some(link_id) = self.store.resolve_link(link_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownLink(link_id.clone()));
        };
        let Some(from_id) = self.store.resolve_node(from_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(from_id.clone()));
        };
        let Some(to_id) = self.store.resolve_node(to_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(to_id.clone()));
        };
        if from_id == to_id {
            return Outcome::Ignored(IgnoreReason::SelfLoop(from_id));
        }

        if let Some(link) = self.store.link_mut(&link_id) {
            link.set_endpoints(from_id.clone(), to_id.clone());
            link.set_handles(handles.clone());
            link.bump_rev();
        }
        self.sync_link(&link_id, LinkPatch::route(from_id, to_id, handles));
        Outcome::Applied
    }

    pub fn begin_rename(&mut self, node_id: &NodeId) -> Outcome {
        let Some(node_id) = self.store.resolve_node(node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone()));
        };
        self.state = InteractionState::Renaming(node_id);
        Outcome::Applied
    }

    /// Commits an inline title edit and leaves rename mode for that node.
    ///
    /// A blank title is rejected with a notice; an unchanged title issues no remote call.
    pub fn commit_title(&mut self, node_id: &NodeId, text: &str) -> Outcome {
        let Some(node_id) = self.store.resolve_node(node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone()));
        };
        if self.state == InteractionState::Renaming(node_id.clone()) {
            self.state = InteractionState::Idle;
        }

        let title = text.trim();
        if title.is_empty() {
            return self.invalid(ValidationError::BlankTitle);
        }
        let Some(node) = self.store.node_mut(&node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id));
        };
        if node.title() == title {
            return Outcome::Unchanged;
        }
        node.set_title(title);
        node.bump_rev();
        self.sync_node(&node_id, NodePatch::title(title));
        Outcome::Applied
    }

    /// Commits `pending_title` (when given) and spawns a connected node of the same kind to the
    /// right of `node_id`, wired right side to left side. Only available while `node_id` is
    /// being renamed.
    pub fn tab_chain(&mut self, node_id: &NodeId, pending_title: Option<&str>) -> Outcome {
        let Some(source) = self.store.resolve_node(node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone()));
        };
        if self.state != InteractionState::Renaming(source.clone()) {
            return Outcome::Ignored(IgnoreReason::NotRenaming(source));
        }
        if let Some(text) = pending_title {
            if let Outcome::Invalid(err) = self.commit_title(&source, text) {
                return Outcome::Invalid(err);
            }
        }
        let Some(position) = self.store.node(&source).map(Node::position) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(source));
        };
        let handles =
            LinkHandles::new(Some(Handle::from(Side::Right)), Some(Handle::from(Side::Left)));
        self.spawn_connected(&source, self.config.chain_position(position), handles)
    }

    pub fn delete_selection(&mut self) -> Outcome {
        match self.store.selection().clone() {
            Selection::Node(node_id) => self.delete_node(&node_id),
            Selection::Link(link_id) => self.delete_link(&link_id),
            Selection::None => Outcome::Ignored(IgnoreReason::NothingSelected),
        }
    }

    /// Removes a node and its links locally, then deletes links and node remotely, in that
    /// order.
    pub fn delete_node(&mut self, node_id: &NodeId) -> Outcome {
        let Some(node_id) = self.store.resolve_node(node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone()));
        };
        let Some(removed) = self.store.remove_node(&node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id));
        };
        if self.state.involves(&node_id) {
            self.state = InteractionState::Idle;
        }
        let cascades = !node_id.is_provisional();
        for link in &removed.links {
            self.forget_link(link.id(), cascades);
        }
        self.forget_node(&node_id);
        Outcome::Applied
    }

    pub fn delete_link(&mut self, link_id: &LinkId) -> Outcome {
        let Some(link_id) = self.store.resolve_link(link_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownLink(link_id.clone()));
        };
        if self.store.remove_link(&link_id).is_none() {
            return Outcome::Ignored(IgnoreReason::UnknownLink(link_id));
        }
        self.forget_link(&link_id, false);
        Outcome::Applied
    }

    /// Applies inspector edits. Validation runs first; an invalid edit changes nothing.
    ///
    /// Changing the kind never reclassifies existing links.
    pub fn edit_node(&mut self, node_id: &NodeId, edit: &NodeEdit) -> Outcome {
        if let Err(err) = edit.validate() {
            return self.invalid(err);
        }
        let Some(node_id) = self.store.resolve_node(node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id.clone()));
        };
        let Some(node) = self.store.node_mut(&node_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(node_id));
        };

        let mut patch = NodePatch::default();
        if let Some(title) = &edit.title {
            let title = title.trim();
            if node.title() != title {
                node.set_title(title);
                patch.title = Some(title.to_owned());
            }
        }
        if let Some(statement) = &edit.statement {
            if node.statement() != statement.as_deref() {
                node.set_statement(statement.clone());
                patch.statement = Some(statement.clone());
            }
        }
        if let Some(kind) = edit.kind {
            if node.kind() != kind {
                node.set_kind(kind);
                patch.kind = Some(kind);
            }
        }
        if let Some(minutes) = edit.queue_time_minutes {
            if node.queue_time_minutes() != minutes {
                node.set_queue_time_minutes(minutes);
                patch.queue_time_minutes = Some(minutes);
            }
        }
        if let Some(minutes) = edit.action_time_minutes {
            if node.action_time_minutes() != minutes {
                node.set_action_time_minutes(minutes);
                patch.action_time_minutes = Some(minutes);
            }
        }

        if patch.is_empty() {
            return Outcome::Unchanged;
        }
        node.bump_rev();
        self.sync_node(&node_id, patch);
        Outcome::Applied
    }

    pub fn edit_link_style(&mut self, link_id: &LinkId, style: LinkStyle) -> Outcome {
        let Some(link_id) = self.store.resolve_link(link_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownLink(link_id.clone()));
        };
        let Some(link) = self.store.link_mut(&link_id) else {
            return Outcome::Ignored(IgnoreReason::UnknownLink(link_id));
        };
        if link.style() == style {
            return Outcome::Unchanged;
        }
        link.set_style(style);
        link.bump_rev();
        self.sync_link(&link_id, LinkPatch::style(style));
        Outcome::Applied
    }

    fn invalid(&mut self, err: ValidationError) -> Outcome {
        self.notices.push(Notice::info(err.to_string()));
        Outcome::Invalid(err)
    }

    fn mint_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Inserts a provisional node and issues its remote create.
    fn insert_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let node_id = NodeId::provisional(self.mint_seq());
        let node = Node::new(node_id.clone(), self.project_id.clone(), kind, position);
        self.store.upsert_node(node.clone());
        tracing::debug!(node_id = %node_id, kind = %kind, "node created locally");
        self.issue_node_create(node);
        node_id
    }

    /// Inserts a provisional link between two stored nodes. Its remote create is issued now
    /// or deferred until both endpoints carry server ids.
    fn insert_link(&mut self, from_id: &NodeId, to_id: &NodeId, handles: LinkHandles) -> Option<LinkId> {
        let from_kind = self.store.node(from_id)?.kind();
        let to_kind = self.store.node(to_id)?.kind();
        let link_id = LinkId::provisional(self.mint_seq());
        let link = Link::new(
            link_id.clone(),
            self.project_id.clone(),
            from_id.clone(),
            to_id.clone(),
            LinkKind::classify(from_kind, to_kind),
        )
        .with_handles(handles);

        if let Err(err) = self.store.upsert_link(link) {
            tracing::warn!(error = %err, "link rejected by the graph store");
            return None;
        }
        tracing::debug!(link_id = %link_id, from_id = %from_id, to_id = %to_id, "link created locally");
        self.sync_new_link(&link_id);
        Some(link_id)
    }

    /// Creates a node of `source`'s kind at `position`, links `source` to it and puts the new
    /// node into rename mode.
    fn spawn_connected(&mut self, source: &NodeId, position: Position, handles: LinkHandles) -> Outcome {
        let Some(kind) = self.store.node(source).map(Node::kind) else {
            return Outcome::Ignored(IgnoreReason::UnknownNode(source.clone()));
        };
        let node_id = self.insert_node(kind, position);
        let link_id = self.insert_link(source, &node_id, handles);
        self.state = InteractionState::Renaming(node_id.clone());
        Outcome::Created { node_id: Some(node_id), link_id }
    }
}

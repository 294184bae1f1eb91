// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::{LinkId, NodeId, ProjectId};
use super::node::NodeKind;

/// How a link is classified. Decided once, when the link is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Data,
    Precedes,
}

impl LinkKind {
    /// `Data` when either endpoint is a data note, otherwise `Precedes`.
    pub fn classify(from: NodeKind, to: NodeKind) -> Self {
        if from == NodeKind::Data || to == NodeKind::Data {
            Self::Data
        } else {
            Self::Precedes
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Precedes => "precedes",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Step,
    #[serde(rename = "smoothstep")]
    SmoothStep,
    Straight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl Pattern {
    /// SVG `stroke-dasharray` for the pattern; `None` draws a continuous line.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("8 6"),
            Self::Dotted => Some("2 6"),
        }
    }
}

/// Rendering hints of a link. Independently mutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub curve: Curve,
    pub pattern: Pattern,
    pub arrow_start: bool,
    pub arrow_end: bool,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            curve: Curve::Step,
            pattern: Pattern::Solid,
            arrow_start: false,
            arrow_end: true,
        }
    }
}

/// A cardinal side of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "top" => Some(Self::Top),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            _ => None,
        }
    }

    fn from_initial(initial: char) -> Option<Self> {
        match initial {
            't' => Some(Self::Top),
            'r' => Some(Self::Right),
            'b' => Some(Self::Bottom),
            'l' => Some(Self::Left),
            _ => None,
        }
    }
}

/// A named anchor on a node's boundary. Only used to route lines, never for graph semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(SmolStr);

impl Handle {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(SmolStr::new(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The side this handle sits on, if its name encodes one.
    ///
    /// Accepts `right`, `r-src`/`r-tgt` and `tright` style names.
    pub fn side(&self) -> Option<Side> {
        let name = self.0.to_ascii_lowercase();
        if let Some(side) = Side::from_word(&name) {
            return Some(side);
        }
        if let Some(side) = name.strip_prefix('t').and_then(Side::from_word) {
            return Some(side);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(initial), Some('-')) => Side::from_initial(initial),
            _ => None,
        }
    }
}

impl From<Side> for Handle {
    fn from(side: Side) -> Self {
        Self(SmolStr::new(side.as_str()))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkHandles {
    pub source: Option<Handle>,
    pub target: Option<Handle>,
}

impl LinkHandles {
    pub fn new(source: Option<Handle>, target: Option<Handle>) -> Self {
        Self { source, target }
    }

    /// Handles for a line dragged out of `source` that should keep travelling in the same
    /// direction: the target anchor is the side opposite to where the drag started.
    pub fn continuing(source: Option<Handle>) -> Self {
        let target = source.as_ref().and_then(Handle::side).map(|side| Handle::from(side.opposite()));
        Self { source, target }
    }
}

/// A directed, typed connection between two nodes of the same project.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    id: LinkId,
    project_id: ProjectId,
    from_id: NodeId,
    to_id: NodeId,
    kind: LinkKind,
    handles: LinkHandles,
    style: LinkStyle,
    rev: u64,
}

impl Link {
    pub fn new(
        id: LinkId,
        project_id: ProjectId,
        from_id: NodeId,
        to_id: NodeId,
        kind: LinkKind,
    ) -> Self {
        Self {
            id,
            project_id,
            from_id,
            to_id,
            kind,
            handles: LinkHandles::default(),
            style: LinkStyle::default(),
            rev: 0,
        }
    }

    pub fn with_handles(mut self, handles: LinkHandles) -> Self {
        self.handles = handles;
        self
    }

    pub fn with_style(mut self, style: LinkStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> &LinkId {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: LinkId) {
        self.id = id;
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn from_id(&self) -> &NodeId {
        &self.from_id
    }

    pub fn to_id(&self) -> &NodeId {
        &self.to_id
    }

    pub fn set_endpoints(&mut self, from_id: NodeId, to_id: NodeId) {
        self.from_id = from_id;
        self.to_id = to_id;
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.from_id == node_id || &self.to_id == node_id
    }

    /// Rewrites any endpoint equal to `old` to `new`. Returns whether anything changed.
    pub(crate) fn replace_endpoint(&mut self, old: &NodeId, new: &NodeId) -> bool {
        let mut changed = false;
        if &self.from_id == old {
            self.from_id = new.clone();
            changed = true;
        }
        if &self.to_id == old {
            self.to_id = new.clone();
            changed = true;
        }
        changed
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn handles(&self) -> &LinkHandles {
        &self.handles
    }

    pub fn set_handles(&mut self, handles: LinkHandles) {
        self.handles = handles;
    }

    pub fn style(&self) -> LinkStyle {
        self.style
    }

    pub fn set_style(&mut self, style: LinkStyle) {
        self.style = style;
    }

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

    pub fn same_content(&self, other: &Link) -> bool {
        self.from_id == other.from_id
            && self.to_id == other.to_id
            && self.kind == other.kind
            && self.handles == other.handles
            && self.style == other.style
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Handle, LinkHandles, LinkKind, LinkStyle, Pattern, Side};
    use crate::model::NodeKind;

    #[rstest]
    #[case(NodeKind::Decision, NodeKind::Decision, LinkKind::Precedes)]
    #[case(NodeKind::Decision, NodeKind::Data, LinkKind::Data)]
    #[case(NodeKind::Data, NodeKind::Choice, LinkKind::Data)]
    #[case(NodeKind::Opportunity, NodeKind::Choice, LinkKind::Precedes)]
    fn link_kind_is_data_when_either_end_is_data(
        #[case] from: NodeKind,
        #[case] to: NodeKind,
        #[case] expected: LinkKind,
    ) {
        assert_eq!(LinkKind::classify(from, to), expected);
    }

    #[rstest]
    #[case("right", Some(Side::Right))]
    #[case("Left", Some(Side::Left))]
    #[case("r-src", Some(Side::Right))]
    #[case("b-tgt", Some(Side::Bottom))]
    #[case("tright", Some(Side::Right))]
    #[case("ttop", Some(Side::Top))]
    #[case("top", Some(Side::Top))]
    #[case("r1", None)]
    #[case("anchor", None)]
    fn handle_side_recognizes_cardinal_names(#[case] name: &str, #[case] side: Option<Side>) {
        assert_eq!(Handle::new(name).side(), side);
    }

    #[test]
    fn continuing_handles_point_at_the_opposite_side() {
        let handles = LinkHandles::continuing(Some(Handle::new("r-src")));
        assert_eq!(handles.source, Some(Handle::new("r-src")));
        assert_eq!(handles.target, Some(Handle::new("left")));

        let handles = LinkHandles::continuing(Some(Handle::new("top")));
        assert_eq!(handles.target, Some(Handle::new("bottom")));

        let handles = LinkHandles::continuing(Some(Handle::new("r1")));
        assert_eq!(handles.target, None);

        let handles = LinkHandles::continuing(None);
        assert_eq!(handles, LinkHandles::default());
    }

    #[test]
    fn default_style_has_single_end_arrow() {
        let style = LinkStyle::default();
        assert!(!style.arrow_start);
        assert!(style.arrow_end);
        assert_eq!(style.pattern.dash_array(), None);
        assert_eq!(Pattern::Dashed.dash_array(), Some("8 6"));
        assert_eq!(Pattern::Dotted.dash_array(), Some("2 6"));
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use crate::model::{Handle, LinkHandles, LinkId, LinkStyle, NodeId, NodeKind, Position};

/// A surface event, in the serialized form used by gesture scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gesture {
    PaletteDrop {
        kind: String,
        position: Position,
    },
    ConnectStart {
        node_id: NodeId,
        #[serde(default)]
        handle: Option<Handle>,
    },
    ConnectEnd {
        #[serde(default)]
        target: Option<NodeId>,
        #[serde(default)]
        handle: Option<Handle>,
        position: Position,
    },
    NodeDragEnd {
        node_id: NodeId,
        position: Position,
    },
    NodeSelect {
        node_id: NodeId,
    },
    EdgeSelect {
        link_id: LinkId,
    },
    EdgeReroute {
        link_id: LinkId,
        from_id: NodeId,
        to_id: NodeId,
        #[serde(default)]
        handles: LinkHandles,
    },
    BackgroundClick,
    NodeDoubleClick {
        node_id: NodeId,
    },
    TitleCommit {
        node_id: NodeId,
        text: String,
    },
    TabChain {
        node_id: NodeId,
        #[serde(default)]
        text: Option<String>,
    },
    DeleteSelection,
    DeleteNode {
        node_id: NodeId,
    },
    DeleteLink {
        link_id: LinkId,
    },
    EditNode {
        node_id: NodeId,
        #[serde(flatten)]
        edit: NodeEdit,
    },
    EditLinkStyle {
        link_id: LinkId,
        style: LinkStyle,
    },
}

/// Inspector edits to a node. `None` leaves the field alone; nullable fields are cleared with
/// `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub statement: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub queue_time_minutes: Option<Option<f64>>,
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub action_time_minutes: Option<Option<f64>>,
}

impl NodeEdit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ValidationError::BlankTitle);
            }
        }
        for (field, minutes) in [
            ("queue_time_minutes", self.queue_time_minutes),
            ("action_time_minutes", self.action_time_minutes),
        ] {
            if let Some(Some(value)) = minutes {
                validate_minutes(field, value)?;
            }
        }
        Ok(())
    }
}

/// Distinguishes an absent field from an explicit `null`. Absent fields are skipped on
/// serialization, so only `Some(..)` reaches `serialize`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.as_ref().and_then(Option::as_ref).serialize(serializer)
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<T>>, D::Error> {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

fn validate_minutes(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteMinutes { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeMinutes { field, value });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be blank")]
    BlankTitle,
    #[error("{field} must be a finite number")]
    NonFiniteMinutes { field: &'static str },
    #[error("{field} must not be negative, got {value}")]
    NegativeMinutes { field: &'static str, value: f64 },
}

/// Why a gesture changed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownKind(String),
    UnknownNode(NodeId),
    UnknownLink(LinkId),
    NoConnectInProgress,
    AlreadyConnected,
    SelfLoop(NodeId),
    NothingSelected,
    /// Tab-chain-create on a node whose inline title editor is not open.
    NotRenaming(NodeId),
}

/// What a gesture did to the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Local state changed; any remote calls are in flight.
    Applied,
    /// Recognized, but nothing needed to change.
    Unchanged,
    Created {
        node_id: Option<NodeId>,
        link_id: Option<LinkId>,
    },
    Ignored(IgnoreReason),
    Invalid(ValidationError),
}

impl Outcome {
    pub fn created_node(&self) -> Option<&NodeId> {
        match self {
            Self::Created { node_id, .. } => node_id.as_ref(),
            _ => None,
        }
    }

    pub fn created_link(&self) -> Option<&LinkId> {
        match self {
            Self::Created { link_id, .. } => link_id.as_ref(),
            _ => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warn,
}

/// A non-blocking status message for the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warn(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warn, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Gesture, NodeEdit, ValidationError};
    use crate::model::{Handle, Position};

    #[test]
    fn gestures_parse_from_script_json() {
        let script = json!([
            {"type": "palette_drop", "kind": "data", "position": {"x": 10.0, "y": 20.0}},
            {"type": "connect_start", "node_id": "d-1", "handle": "r-src"},
            {"type": "connect_end", "position": {"x": 0.0, "y": 0.0}},
            {"type": "background_click"},
            {"type": "edit_node", "node_id": "d-1", "queue_time_minutes": null, "title": "Ship"}
        ]);
        let gestures: Vec<Gesture> = serde_json::from_value(script).expect("parse");

        assert_eq!(
            gestures[0],
            Gesture::PaletteDrop { kind: "data".to_owned(), position: Position::new(10.0, 20.0) }
        );
        assert!(matches!(
            &gestures[1],
            Gesture::ConnectStart { handle: Some(handle), .. } if handle == &Handle::new("r-src")
        ));
        assert!(matches!(gestures[2], Gesture::ConnectEnd { target: None, handle: None, .. }));
        assert_eq!(gestures[3], Gesture::BackgroundClick);
        let Gesture::EditNode { edit, .. } = &gestures[4] else {
            panic!("expected edit_node, got {:?}", gestures[4]);
        };
        assert_eq!(edit.title.as_deref(), Some("Ship"));
        assert_eq!(edit.queue_time_minutes, Some(None));
        assert_eq!(edit.action_time_minutes, None);
    }

    #[rstest]
    #[case(NodeEdit { title: Some("  ".to_owned()), ..NodeEdit::default() }, ValidationError::BlankTitle)]
    #[case(
        NodeEdit { queue_time_minutes: Some(Some(-1.0)), ..NodeEdit::default() },
        ValidationError::NegativeMinutes { field: "queue_time_minutes", value: -1.0 }
    )]
    #[case(
        NodeEdit { action_time_minutes: Some(Some(f64::NAN)), ..NodeEdit::default() },
        ValidationError::NonFiniteMinutes { field: "action_time_minutes" }
    )]
    fn invalid_edits_are_rejected(#[case] edit: NodeEdit, #[case] expected: ValidationError) {
        assert_eq!(edit.validate(), Err(expected));
    }

    #[test]
    fn edit_node_survives_a_json_round_trip() {
        let title_only = Gesture::EditNode {
            node_id: "d-1".parse().expect("node id"),
            edit: NodeEdit { title: Some("Ship".to_owned()), ..NodeEdit::default() },
        };
        let value = serde_json::to_value(&title_only).expect("serialize");
        assert_eq!(value, json!({"type": "edit_node", "node_id": "d-1", "title": "Ship"}));
        assert_eq!(serde_json::from_value::<Gesture>(value).expect("parse"), title_only);

        let clearing = Gesture::EditNode {
            node_id: "d-1".parse().expect("node id"),
            edit: NodeEdit {
                statement: Some(None),
                queue_time_minutes: Some(None),
                action_time_minutes: Some(Some(4.5)),
                ..NodeEdit::default()
            },
        };
        let text = serde_json::to_string(&clearing).expect("serialize");
        assert_eq!(serde_json::from_str::<Gesture>(&text).expect("parse"), clearing);
    }

    #[test]
    fn clearing_minutes_is_valid() {
        let edit = NodeEdit {
            queue_time_minutes: Some(None),
            action_time_minutes: Some(Some(0.0)),
            ..NodeEdit::default()
        };
        assert_eq!(edit.validate(), Ok(()));
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A project holds typed notes ([`Node`]) connected by typed, directed [`Link`]s. Both carry a
//! local edit revision used to discard stale remote responses.

pub(crate) mod fixtures;
pub mod ids;
pub mod link;
pub mod node;
pub mod style;

pub use ids::{IdError, LinkId, NodeId, ProjectId, PROVISIONAL_PREFIX};
pub use link::{Curve, Handle, Link, LinkHandles, LinkKind, LinkStyle, Pattern, Side};
pub use node::{Node, NodeKind, ParseNodeKindError, Position};
pub use style::{LinkAppearance, NodeShape, NodeStyle};

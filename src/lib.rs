// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Threadline: canvas graph synchronization for value-stream maps.
//!
//! Keeps an in-memory graph of typed notes and links consistent with a remotely persisted one
//! while mediating every editing gesture, and projects the graph into per-view render payloads
//! and timing totals.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod graph;
pub mod model;
pub mod view;

pub use config::{CanvasConfig, ConfigError};
pub use controller::{Controller, Gesture, InteractionState, Outcome};
pub use gateway::{Gateway, GatewayError, MemoryRemote, RemoteStore};
pub use graph::GraphStore;
pub use view::View;

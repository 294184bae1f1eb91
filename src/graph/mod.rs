// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory graph of the project currently on the canvas.
//!
//! All operations are synchronous and never touch the network.

pub mod store;

pub use store::{GraphStore, RemovedNode, Selection, StoreError};

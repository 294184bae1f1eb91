// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas geometry settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::Position;

const DEFAULT_NODE_SIZE: f64 = 120.0;
const DEFAULT_CHAIN_GAP: f64 = 48.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config field {field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Width and height of a freshly created node.
    pub node_size: f64,
    /// Horizontal space between a node and the one spawned by tab-chain-create.
    pub chain_gap: f64,
    /// Where stored nodes without coordinates are placed.
    pub default_position: Position,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            node_size: DEFAULT_NODE_SIZE,
            chain_gap: DEFAULT_CHAIN_GAP,
            default_position: Position::new(100.0, 100.0),
        }
    }
}

impl CanvasConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("node_size", self.node_size), ("chain_gap", self.chain_gap)] {
            if !value.is_finite() || value < 0.0 || (field == "node_size" && value == 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Top-left corner that centers a new node under `cursor`.
    pub fn centered_at(&self, cursor: Position) -> Position {
        let half = self.node_size / 2.0;
        cursor.offset(-half, -half)
    }

    /// Where tab-chain-create puts the node following one at `source`.
    pub fn chain_position(&self, source: Position) -> Position {
        source.offset(self.node_size + self.chain_gap, 0.0)
    }
}

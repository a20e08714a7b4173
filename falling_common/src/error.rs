// Copyright 2025 Justin Hu
//
// This file is part of Falling.
//
// Falling is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Falling is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with Falling. If not, see <https://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the client core

use thiserror::Error;

/// The server named something the local mirror doesn't have
///
/// Once one of these happens the mirror can no longer be trusted, so callers
/// surface it rather than recovering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[expect(missing_docs)]
pub enum ProtocolFault {
    #[error("player '{0}' not found")]
    UnknownPlayer(String),
    #[error("player '{0}' already exists")]
    DuplicatePlayer(String),
    #[error("player '{player}' has no pile {pile}")]
    UnknownPile { player: String, pile: usize },
    #[error("pile {pile} of player '{player}' has no card {index}")]
    UnknownCard {
        player: String,
        pile: usize,
        index: usize,
    },
    #[error("local player '{0}' is not seated")]
    LocalPlayerMissing(String),
}

/// A text frame that didn't decode as a server message
#[derive(Debug, Error)]
#[error("malformed frame ({source}): {frame}")]
pub struct DecodeError {
    /// What serde didn't like
    #[source]
    pub source: serde_json::Error,
    /// The offending frame
    pub frame: String,
}

/// Anything that can go wrong while handling an inbound frame
#[derive(Debug, Error)]
pub enum SessionError {
    /// The frame could not be decoded; it was dropped
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The frame referenced state the mirror doesn't have
    #[error("protocol fault: {0}")]
    Fault(#[from] ProtocolFault),
    /// The mirror already faulted and is ignoring the server
    #[error("session halted after an earlier protocol fault")]
    Halted,
}

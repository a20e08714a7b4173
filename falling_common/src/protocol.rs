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

//! Wire messages exchanged with the game server

use serde::{Deserialize, Serialize};

use crate::{CardType, error::DecodeError};

/// A rider attachment as sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderData {
    /// The card doing the riding
    pub rider: CardType,
    /// Cards stacked on top of the rider, oldest first
    pub extras: Vec<CardType>,
}

/// A message pushed by the server
///
/// Indices always refer to the state as it stands when the message arrives
#[expect(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    CreatePlayer {
        name: String,
        piles: Vec<Vec<CardType>>,
        rider: Option<RiderData>,
    },
    DealCard {
        player: String,
        pile: usize,
        card: CardType,
    },
    PlayRider {
        player_from: String,
        from_pile: usize,
        card_index: usize,
        player_to: String,
    },
    PlayAndDiscard {
        player_from: String,
        from_pile: usize,
        card_index: usize,
        player_to: String,
    },
    RemoveRider {
        player: String,
        just_one_extra: bool,
    },
    NewPile {
        player: String,
    },
    RemovePile {
        player: String,
        pile: usize,
    },
    RemovePlayer {
        name: String,
        only_data: bool,
    },
    ReadyUpdate {
        data: Vec<bool>,
        #[serde(rename = "showBtn")]
        show_button: bool,
    },
    /// Anything newer than this client understands
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(text).map_err(|source| DecodeError {
            source,
            frame: text.to_string(),
        })
    }

    /// Get the wire name of this message's kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::CreatePlayer { .. } => "CreatePlayer",
            ServerMessage::DealCard { .. } => "DealCard",
            ServerMessage::PlayRider { .. } => "PlayRider",
            ServerMessage::PlayAndDiscard { .. } => "PlayAndDiscard",
            ServerMessage::RemoveRider { .. } => "RemoveRider",
            ServerMessage::NewPile { .. } => "NewPile",
            ServerMessage::RemovePile { .. } => "RemovePile",
            ServerMessage::RemovePlayer { .. } => "RemovePlayer",
            ServerMessage::ReadyUpdate { .. } => "ReadyUpdate",
            ServerMessage::Unknown => "Unknown",
        }
    }
}

/// A message sent to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Claim a seat under this name
    Login {
        /// Name to play under
        name: String,
    },
    /// Pick up the top card of one of your piles
    GrabCard {
        /// Which of your piles
        pile_index: usize,
        /// Grab the card under the top one, which is still being dealt
        slide: bool,
    },
    /// Play the grabbed card
    PlayCard {
        /// Who to play it on, or `None` to put it back
        target: Option<String>,
    },
    /// Declare yourself ready
    Ready,
}

impl ClientMessage {
    /// Encode as one text frame
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("client messages are plain data")
    }
}

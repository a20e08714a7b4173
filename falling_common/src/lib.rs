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

//! Common structure definitions and the headless client core for Falling
//!
//! The server is the only authority on game state. Everything in this crate
//! mirrors what the server says: [`reducer`] applies server events to the
//! [`model`], while [`gesture`] and [`bot`] only ever produce outbound
//! [`protocol::ClientMessage`]s.

#![warn(missing_docs)]

pub mod bot;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod model;
pub mod protocol;
pub mod ready;
pub mod reducer;
pub mod schedule;
pub mod session;
pub mod visual;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The kind of a card
///
/// Kinds form a closed set; the server never sends anything else
#[expect(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Hit,
    Skip,
    Split,
    Extra,
    Stop,
    Ground,
}

/// Who a card may be played onto
///
/// Advisory only, the server decides what is legal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOn {
    /// May be played onto the player holding it
    pub own: bool,
    /// May be played onto some other player
    pub other: bool,
}

impl CardType {
    /// Every card type, in catalogue order
    pub const ALL: [CardType; 6] = [
        CardType::Hit,
        CardType::Skip,
        CardType::Split,
        CardType::Extra,
        CardType::Stop,
        CardType::Ground,
    ];

    /// Get the label printed on this card
    pub fn name(&self) -> &'static str {
        match *self {
            CardType::Hit => "Hit",
            CardType::Skip => "Skip",
            CardType::Split => "Split",
            CardType::Extra => "Extra",
            CardType::Stop => "Stop",
            CardType::Ground => "GND",
        }
    }

    /// Get the display colour of this card
    pub fn colour(&self) -> &'static str {
        match *self {
            CardType::Hit => "#F88",
            CardType::Skip => "#0FF",
            CardType::Split => "#B9F",
            CardType::Extra => "#5F5",
            CardType::Stop => "#CC3",
            CardType::Ground => "#888",
        }
    }

    /// Get who this card may be played onto
    pub fn play_on(&self) -> PlayOn {
        let (own, other) = match *self {
            CardType::Hit => (false, true),
            CardType::Skip => (true, false),
            CardType::Split => (false, true),
            CardType::Extra => (true, true),
            CardType::Stop => (false, true),
            CardType::Ground => (false, false),
        };
        PlayOn { own, other }
    }

    /// Check if this card may be played onto the given kind of target
    pub fn playable_on(&self, on_self: bool) -> bool {
        let play_on = self.play_on();
        if on_self { play_on.own } else { play_on.other }
    }

    /// Check if this card kills the pile it tops
    pub fn is_ground(&self) -> bool {
        *self == CardType::Ground
    }
}

impl Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

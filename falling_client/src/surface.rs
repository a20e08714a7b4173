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

//! The table as the browser sees it
//!
//! [`WebSurface`] keeps a plain description of what should be on screen,
//! which the components in [`crate::display`] render. Geometry comes back out
//! of the real DOM by element id.

use std::collections::HashMap;

use falling_common::{
    CardType,
    geometry::Rect,
    model::CardId,
    ready::ReadyButton,
    visual::{Container, Motion, Offset, Placement, Surface},
};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: CardId,
    pub kind: CardType,
    pub offset: Offset,
    pub motion: Motion,
}

impl CardView {
    pub fn element_id(&self) -> String {
        card_element_id(self.id)
    }
}

/// One player's area, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerArea {
    pub view: PlayerView,
    pub piles: Vec<Vec<CardView>>,
    pub rider: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub key: u64,
    pub name: String,
    pub is_local: bool,
    pub hue: f64,
    pub piles: Vec<Vec<CardId>>,
    pub rider: Vec<CardId>,
    pub ready: bool,
}

impl PlayerView {
    pub fn element_id(&self) -> String {
        format!("player-{}", self.key)
    }

    pub fn pile_element_id(&self, pile: usize) -> String {
        format!("pile-{}-{pile}", self.key)
    }

    pub fn rider_element_id(&self) -> String {
        format!("rider-{}", self.key)
    }

    /// Background colour of the player's area
    pub fn background(&self) -> String {
        if self.is_local {
            format!("hsl({:.0}, 100%, 50%)", self.hue)
        } else {
            format!("hsl({:.0}, 40%, 70%)", self.hue)
        }
    }

    fn slot(&mut self, container: &Container) -> Option<&mut Vec<CardId>> {
        match container {
            Container::Pile { pile, .. } => self.piles.get_mut(*pile),
            Container::Rider { .. } => Some(&mut self.rider),
        }
    }

    fn forget(&mut self, card: CardId) -> bool {
        let before = self.card_count();
        for slot in self.piles.iter_mut().chain(Some(&mut self.rider)) {
            slot.retain(|id| *id != card);
        }
        before != self.card_count()
    }

    fn card_count(&self) -> usize {
        self.piles.iter().map(Vec::len).sum::<usize>() + self.rider.len()
    }
}

fn card_element_id(card: CardId) -> String {
    format!("card-{}", card.0)
}

/// A [`Surface`] that renders through dioxus
#[derive(Debug, Default)]
pub struct WebSurface {
    players: Vec<PlayerView>,
    cards: HashMap<CardId, CardView>,
    next_key: u64,
    ready_button: ReadyButton,
    notice: Option<String>,
}

impl WebSurface {
    pub fn areas(&self) -> Vec<PlayerArea> {
        let cards = |ids: &[CardId]| {
            ids.iter()
                .filter_map(|id| self.cards.get(id).cloned())
                .collect::<Vec<_>>()
        };
        self.players
            .iter()
            .map(|player| PlayerArea {
                view: player.clone(),
                piles: player.piles.iter().map(|pile| cards(pile)).collect(),
                rider: cards(&player.rider),
            })
            .collect()
    }

    pub fn ready_button(&self) -> ReadyButton {
        self.ready_button
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn player_mut(&mut self, name: &str) -> Option<&mut PlayerView> {
        let player = self.players.iter_mut().find(|player| player.name == name);
        if player.is_none() {
            warn!(name, "no area for player");
        }
        player
    }

    fn detach(&mut self, card: CardId) {
        for player in &mut self.players {
            if player.forget(card) {
                return;
            }
        }
    }

    fn element_rect(&self, id: &str) -> Option<Rect> {
        let element = web_sys::window()?.document()?.get_element_by_id(id)?;
        let rect = element.get_bounding_client_rect();
        Some(Rect::new(rect.x(), rect.y(), rect.width(), rect.height()))
    }
}

impl Surface for WebSurface {
    fn create_player(&mut self, name: &str, is_local: bool) {
        self.players.push(PlayerView {
            key: self.next_key,
            name: name.to_string(),
            is_local,
            hue: js_sys::Math::random() * 360.0,
            piles: Vec::new(),
            rider: Vec::new(),
            ready: false,
        });
        self.next_key += 1;
    }

    fn remove_player(&mut self, name: &str) {
        let Some(index) = self.players.iter().position(|player| player.name == name) else {
            return;
        };
        let player = self.players.remove(index);
        for card in player.piles.iter().flatten().chain(&player.rider) {
            self.cards.remove(card);
        }
    }

    fn add_pile(&mut self, player: &str) {
        if let Some(player) = self.player_mut(player) {
            player.piles.push(Vec::new());
        }
    }

    fn remove_pile(&mut self, player: &str, pile: usize) {
        if let Some(player) = self.player_mut(player)
            && pile < player.piles.len()
        {
            player.piles.remove(pile);
        }
    }

    fn create_card(&mut self, card: CardId, kind: CardType, at: &Container, placement: Placement) {
        self.cards.insert(card, CardView {
            id: card,
            kind,
            offset: Offset::ZERO,
            motion: Motion::Instant,
        });
        self.relocate(card, at, placement);
    }

    fn relocate(&mut self, card: CardId, to: &Container, placement: Placement) {
        self.detach(card);
        let Some(slot) = self
            .player_mut(to.player())
            .and_then(|player| player.slot(to))
        else {
            return;
        };
        match placement {
            Placement::Front => slot.insert(0, card),
            Placement::Back => slot.push(card),
        }
    }

    fn set_offset(&mut self, card: CardId, offset: Offset, motion: Motion) {
        if let Some(view) = self.cards.get_mut(&card) {
            view.offset = offset;
            view.motion = motion;
        }
    }

    fn destroy_card(&mut self, card: CardId) {
        self.detach(card);
        self.cards.remove(&card);
    }

    fn set_ready(&mut self, player: &str, ready: bool) {
        if let Some(player) = self.player_mut(player) {
            player.ready = ready;
        }
    }

    fn set_ready_button(&mut self, button: ReadyButton) {
        self.ready_button = button;
    }

    fn show_notice(&mut self, notice: &str) {
        self.notice = Some(notice.to_string());
    }

    fn card_rect(&self, card: CardId) -> Option<Rect> {
        self.element_rect(&card_element_id(card))
    }

    fn container_rect(&self, container: &Container) -> Option<Rect> {
        let player = self
            .players
            .iter()
            .find(|player| player.name == container.player())?;
        match container {
            Container::Pile { pile, .. } => self.element_rect(&player.pile_element_id(*pile)),
            Container::Rider { .. } => self.element_rect(&player.rider_element_id()),
        }
    }

    fn player_rect(&self, name: &str) -> Option<Rect> {
        let player = self.players.iter().find(|player| player.name == name)?;
        self.element_rect(&player.element_id())
    }

    fn viewport_height(&self) -> f64 {
        web_sys::window()
            .and_then(|window| window.inner_height().ok())
            .and_then(|height| height.as_f64())
            .unwrap_or_default()
    }
}

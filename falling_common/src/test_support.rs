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

//! A fake surface that records what it was told

use std::collections::HashMap;

use crate::{
    CardType,
    geometry::Rect,
    model::CardId,
    ready::ReadyButton,
    visual::{Container, Motion, Offset, Placement, Surface},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreatePlayer(String, bool),
    RemovePlayer(String),
    AddPile(String),
    RemovePile(String, usize),
    CreateCard(CardId, CardType, Container, Placement),
    Relocate(CardId, Container, Placement),
    SetOffset(CardId, Offset, Motion),
    DestroyCard(CardId),
    SetReady(String, bool),
    SetReadyButton(ReadyButton),
    ShowNotice(String),
}

/// Records every call and answers geometry queries from fixed tables
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<Call>,
    pub cards: HashMap<CardId, Container>,
    pub card_rects: HashMap<CardId, Rect>,
    pub container_rects: HashMap<Container, Rect>,
    pub player_rects: HashMap<String, Rect>,
    pub viewport_height: f64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            viewport_height: 800.0,
            ..Self::default()
        }
    }

    /// Calls made since the last time this was called
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn offsets_for(&self, card: CardId) -> Vec<(Offset, Motion)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetOffset(id, offset, motion) if *id == card => Some((*offset, *motion)),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<CardId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::DestroyCard(id) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn create_player(&mut self, name: &str, is_local: bool) {
        self.calls
            .push(Call::CreatePlayer(name.to_string(), is_local));
    }

    fn remove_player(&mut self, name: &str) {
        self.calls.push(Call::RemovePlayer(name.to_string()));
    }

    fn add_pile(&mut self, player: &str) {
        self.calls.push(Call::AddPile(player.to_string()));
    }

    fn remove_pile(&mut self, player: &str, pile: usize) {
        self.calls.push(Call::RemovePile(player.to_string(), pile));
    }

    fn create_card(&mut self, card: CardId, kind: CardType, at: &Container, placement: Placement) {
        self.cards.insert(card, at.clone());
        self.calls
            .push(Call::CreateCard(card, kind, at.clone(), placement));
    }

    fn relocate(&mut self, card: CardId, to: &Container, placement: Placement) {
        self.cards.insert(card, to.clone());
        self.calls.push(Call::Relocate(card, to.clone(), placement));
    }

    fn set_offset(&mut self, card: CardId, offset: Offset, motion: Motion) {
        self.calls.push(Call::SetOffset(card, offset, motion));
    }

    fn destroy_card(&mut self, card: CardId) {
        self.cards.remove(&card);
        self.calls.push(Call::DestroyCard(card));
    }

    fn set_ready(&mut self, player: &str, ready: bool) {
        self.calls.push(Call::SetReady(player.to_string(), ready));
    }

    fn set_ready_button(&mut self, button: ReadyButton) {
        self.calls.push(Call::SetReadyButton(button));
    }

    fn show_notice(&mut self, notice: &str) {
        self.calls.push(Call::ShowNotice(notice.to_string()));
    }

    fn card_rect(&self, card: CardId) -> Option<Rect> {
        self.card_rects.get(&card).copied()
    }

    fn container_rect(&self, container: &Container) -> Option<Rect> {
        self.container_rects.get(container).copied()
    }

    fn player_rect(&self, name: &str) -> Option<Rect> {
        self.player_rects.get(name).copied()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}

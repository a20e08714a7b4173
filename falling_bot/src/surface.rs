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

//! A surface with nothing to draw on

use falling_common::{
    CardType,
    geometry::Rect,
    model::CardId,
    ready::ReadyButton,
    visual::{Container, Motion, Offset, Placement, Surface},
};
use tracing::{trace, warn};

/// Accepts every visual command and has no geometry to report
#[derive(Debug, Default)]
pub struct HeadlessSurface;

impl Surface for HeadlessSurface {
    fn create_player(&mut self, name: &str, is_local: bool) {
        trace!(name, is_local, "player seated");
    }

    fn remove_player(&mut self, name: &str) {
        trace!(name, "player left");
    }

    fn add_pile(&mut self, _player: &str) {}

    fn remove_pile(&mut self, _player: &str, _pile: usize) {}

    fn create_card(
        &mut self,
        _card: CardId,
        _kind: CardType,
        _at: &Container,
        _placement: Placement,
    ) {
    }

    fn relocate(&mut self, _card: CardId, _to: &Container, _placement: Placement) {}

    fn set_offset(&mut self, _card: CardId, _offset: Offset, _motion: Motion) {}

    fn destroy_card(&mut self, _card: CardId) {}

    fn set_ready(&mut self, player: &str, ready: bool) {
        trace!(player, ready, "ready flag");
    }

    fn set_ready_button(&mut self, _button: ReadyButton) {}

    fn show_notice(&mut self, notice: &str) {
        warn!("{notice}");
    }

    fn card_rect(&self, _card: CardId) -> Option<Rect> {
        None
    }

    fn container_rect(&self, _container: &Container) -> Option<Rect> {
        None
    }

    fn player_rect(&self, _name: &str) -> Option<Rect> {
        None
    }

    fn viewport_height(&self) -> f64 {
        0.0
    }
}

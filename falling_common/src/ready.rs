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

//! The local player's one-shot "I'm ready" control

use tracing::info;

use crate::protocol::ClientMessage;

/// What the ready button currently looks like
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadyButton {
    /// Plain indicator, nothing to press
    #[default]
    Hidden,
    /// "I'm Ready", waiting to be pressed
    Offered,
    /// Pressed; back to a plain indicator until the server asks again
    Pressed,
}

/// Tracks the ready button across server updates
#[derive(Debug, Default)]
pub struct ReadyIndicator {
    button: ReadyButton,
}

impl ReadyIndicator {
    #[expect(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    #[expect(missing_docs)]
    pub fn button(&self) -> ReadyButton {
        self.button
    }

    /// Apply the server's latest word on whether we should be asked
    ///
    /// Returns the new button state if it changed
    pub fn update(&mut self, offer: bool) -> Option<ReadyButton> {
        let next = match (offer, self.button) {
            (true, _) => ReadyButton::Offered,
            (false, ReadyButton::Offered) => ReadyButton::Hidden,
            (false, other) => other,
        };
        (next != self.button).then(|| {
            self.button = next;
            next
        })
    }

    /// Press the button
    ///
    /// Only the first press after an offer sends anything
    pub fn press(&mut self) -> Option<ClientMessage> {
        if self.button != ReadyButton::Offered {
            return None;
        }
        info!("declaring ready");
        self.button = ReadyButton::Pressed;
        Some(ClientMessage::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_one_shot() {
        let mut ready = ReadyIndicator::new();
        assert_eq!(ready.update(true), Some(ReadyButton::Offered));
        assert_eq!(ready.press(), Some(ClientMessage::Ready));
        assert_eq!(ready.button(), ReadyButton::Pressed);
        assert_eq!(ready.press(), None);
    }

    #[test]
    fn test_press_without_offer_does_nothing() {
        let mut ready = ReadyIndicator::new();
        assert_eq!(ready.press(), None);
        assert_eq!(ready.button(), ReadyButton::Hidden);
    }

    #[test]
    fn test_repeated_offer_is_not_a_change() {
        let mut ready = ReadyIndicator::new();
        assert_eq!(ready.update(true), Some(ReadyButton::Offered));
        assert_eq!(ready.update(true), None);
    }

    #[test]
    fn test_withdrawn_offer_hides_button() {
        let mut ready = ReadyIndicator::new();
        ready.update(true);
        assert_eq!(ready.update(false), Some(ReadyButton::Hidden));
        assert_eq!(ready.press(), None);
    }

    #[test]
    fn test_pressed_survives_updates_until_reoffered() {
        let mut ready = ReadyIndicator::new();
        ready.update(true);
        ready.press();
        assert_eq!(ready.update(false), None);
        assert_eq!(ready.button(), ReadyButton::Pressed);
        assert_eq!(ready.update(true), Some(ReadyButton::Offered));
        assert_eq!(ready.press(), Some(ClientMessage::Ready));
    }
}

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

//! Picking a card up and throwing it at someone
//!
//! A grab goes `Idle -> Grabbed -> (Released | TimedOut) -> Idle`. The
//! controller only reads the model and only talks to the server; the card
//! doesn't actually go anywhere until the server says so.

use std::time::Duration;

use tracing::debug;

use crate::{
    config::Timings,
    geometry::{Point, Rect, nearest},
    model::{CardId, GameState},
    protocol::ClientMessage,
    schedule::{Scheduler, TaskHandle},
    visual::{Container, Motion, Offset, Surface},
};

/// How a grab was started
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerDown {
    /// A mouse press on the top card of one of our piles
    Card {
        #[expect(missing_docs)]
        pile: usize,
        #[expect(missing_docs)]
        at: Point,
    },
    /// A touch anywhere; it grabs from the nearest pile if close enough
    Touch {
        #[expect(missing_docs)]
        at: Point,
    },
}

/// Whether a card is being held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum GesturePhase {
    Idle,
    Grabbed,
}

/// How a grab ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Let go before the timeout; `target` is who it was thrown at
    Released {
        #[expect(missing_docs)]
        target: Option<String>,
    },
    /// Held too long, put back
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Timeout,
    Revert(CardId),
}

#[derive(Debug)]
struct Grab {
    card: CardId,
    origin: Rect,
    card_pos: Point,
    pointer: Point,
    timeout: TaskHandle,
}

/// Tracks at most one grabbed card
#[derive(Debug)]
pub struct GestureController {
    timings: Timings,
    grab: Option<Grab>,
    timers: Scheduler<Timer>,
}

impl GestureController {
    #[expect(missing_docs)]
    pub fn new(timings: Timings) -> Self {
        Self {
            timings,
            grab: None,
            timers: Scheduler::new(),
        }
    }

    /// Whether a card is being held
    pub fn phase(&self) -> GesturePhase {
        if self.grab.is_some() {
            GesturePhase::Grabbed
        } else {
            GesturePhase::Idle
        }
    }

    /// Whether pointer moves and releases are being listened to
    pub fn is_tracking(&self) -> bool {
        self.grab.is_some()
    }

    /// The card being held, if any
    pub fn held_card(&self) -> Option<CardId> {
        self.grab.as_ref().map(|grab| grab.card)
    }

    /// Try to start a grab
    ///
    /// Returns the grab notification for the server, or `None` if the press
    /// didn't land on anything we can pick up
    pub fn press(
        &mut self,
        state: &GameState,
        surface: &mut impl Surface,
        local: &str,
        down: PointerDown,
    ) -> Option<ClientMessage> {
        if self.grab.is_some() {
            return None;
        }
        let me = state.find_player(local).ok()?;
        let (pile_index, at) = match down {
            PointerDown::Card { pile, at } => (pile, at),
            PointerDown::Touch { at } => {
                let centers = (0..me.piles().len()).map(|pile| {
                    surface
                        .container_rect(&Container::pile(local, pile))
                        .map_or(Point::new(f64::INFINITY, f64::INFINITY), |rect| {
                            rect.center()
                        })
                });
                let (pile, distance) = nearest(centers, at)?;
                if distance >= self.timings.touch_radius {
                    return None;
                }
                (pile, at)
            }
        };

        let pile = me.pile(pile_index).ok()?;
        let top = pile.top()?;
        if top.kind().is_ground() {
            debug!(pile = pile_index, "not grabbing from a dead pile");
            return None;
        }
        let (card, slide) = match pile.cards() {
            [.., under, last] if last.is_pending_entry() => (under, true),
            _ => (top, false),
        };

        surface.set_offset(card.id(), Offset::ZERO, Motion::Instant);
        let origin = surface
            .card_rect(card.id())
            .unwrap_or(Rect::new(at.x, at.y, 0.0, 0.0));
        let timeout = self.timers.after(self.timings.grab_timeout, Timer::Timeout);
        self.grab = Some(Grab {
            card: card.id(),
            origin,
            card_pos: Point::default(),
            pointer: Self::relative(origin, at),
            timeout,
        });
        debug!(pile = pile_index, slide, "grabbed card");
        Some(ClientMessage::GrabCard {
            pile_index,
            slide,
        })
    }

    /// Follow the pointer
    pub fn pointer_move(&mut self, at: Point) {
        if let Some(grab) = self.grab.as_mut() {
            grab.pointer = Self::relative(grab.origin, at);
        }
    }

    /// Let go of the card
    ///
    /// `at` is where it was let go, if the input says; otherwise the last
    /// known pointer position is used
    pub fn release(
        &mut self,
        state: &GameState,
        surface: &impl Surface,
        local: &str,
        at: Option<Point>,
    ) -> Option<ClientMessage> {
        let grab = self.grab.take()?;
        self.timers.cancel(grab.timeout);
        let at = at.unwrap_or_else(|| Self::absolute(grab.origin, grab.pointer));

        let candidates = state
            .players()
            .iter()
            .filter_map(|player| {
                let center = surface.player_rect(player.name())?.center();
                Some((player.name(), center))
            })
            .collect::<Vec<_>>();
        let target = nearest(candidates.iter().map(|(_, center)| *center), at)
            .map(|(index, _)| candidates[index].0)
            .filter(|name| !(*name == local && at.y > surface.viewport_height() / 2.0))
            .map(str::to_string);

        self.end(grab.card, GestureOutcome::Released {
            target: target.clone(),
        });
        Some(ClientMessage::PlayCard { target })
    }

    /// Run the inactivity timeout; returns the put-back message if it fired
    pub fn advance(&mut self, now: Duration) -> Option<ClientMessage> {
        let fired = self
            .timers
            .advance(now)
            .into_iter()
            .any(|timer| timer == Timer::Timeout);
        if !fired {
            return None;
        }
        let grab = self.grab.take()?;
        self.end(grab.card, GestureOutcome::TimedOut);
        Some(ClientMessage::PlayCard { target: None })
    }

    /// Ease the held card toward the pointer and put released cards back
    pub fn frame(&mut self, state: &GameState, surface: &mut impl Surface) {
        for timer in self.timers.frame() {
            if let Timer::Revert(card) = timer
                && state.find_card(card).is_some()
            {
                surface.set_offset(card, Offset::ZERO, Motion::Eased);
            }
        }

        let Some(grab) = self.grab.as_mut() else {
            return;
        };
        if state.find_card(grab.card).is_none() {
            return;
        }
        let easing = self.timings.follow_easing;
        grab.card_pos = Point::new(
            (grab.card_pos.x * easing + grab.pointer.x) / (easing + 1.0),
            (grab.card_pos.y * easing + grab.pointer.y) / (easing + 1.0),
        );
        surface.set_offset(
            grab.card,
            Offset::px(grab.card_pos.x, grab.card_pos.y),
            Motion::Instant,
        );
    }

    /// When the inactivity timeout would fire
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    fn end(&mut self, card: CardId, outcome: GestureOutcome) {
        debug!(?card, ?outcome, "grab ended");
        self.timers
            .after_frames(self.timings.settle_frames, Timer::Revert(card));
    }

    /// Offset from the card's resting place that puts its centre on `at`
    fn relative(origin: Rect, at: Point) -> Point {
        at - origin.origin() - Point::new(origin.width / 2.0, origin.height / 2.0)
    }

    fn absolute(origin: Rect, pointer: Point) -> Point {
        pointer + origin.origin() + Point::new(origin.width / 2.0, origin.height / 2.0)
    }
}

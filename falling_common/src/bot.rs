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

//! Autonomous play
//!
//! Every tick the bot picks a random pile of its own and a random player and
//! throws the top card if that kind of card may be played there. Once it sees
//! a ground card in its hand it stops for good.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::{
    model::GameState,
    protocol::ClientMessage,
    schedule::{Scheduler, TaskHandle},
};

/// Plays on a fixed period until it is holding ground
#[derive(Debug)]
pub struct BotPlayer {
    rng: StdRng,
    period: Duration,
    timers: Scheduler<()>,
    tick: Option<TaskHandle>,
}

impl BotPlayer {
    /// A bot that first plays one `period` after `now`
    pub fn new(seed: u64, period: Duration, now: Duration) -> Self {
        let mut timers = Scheduler::new();
        timers.advance(now);
        let tick = Some(timers.after(period, ()));
        Self {
            rng: StdRng::seed_from_u64(seed),
            period,
            timers,
            tick,
        }
    }

    /// Whether the bot has given up for good
    pub fn is_halted(&self) -> bool {
        self.tick.is_none()
    }

    /// When the next tick is due
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Run the tick if it is due; returns what to send
    ///
    /// Missed ticks are not made up for: a long gap runs one tick
    pub fn advance(&mut self, now: Duration, state: &GameState, local: &str) -> Vec<ClientMessage> {
        if self.timers.advance(now).is_empty() || self.tick.is_none() {
            return Vec::new();
        }
        let sent = self.play(state, local);
        if self.tick.is_some() {
            self.tick = Some(self.timers.after(self.period, ()));
        }
        sent
    }

    /// Stop ticking
    pub fn halt(&mut self) {
        if let Some(tick) = self.tick.take() {
            self.timers.cancel(tick);
        }
    }

    fn play(&mut self, state: &GameState, local: &str) -> Vec<ClientMessage> {
        let Ok(me) = state.find_player(local) else {
            return Vec::new();
        };
        if me.holds_ground() {
            info!("holding ground, bot stopping");
            self.tick = None;
            return Vec::new();
        }
        if me.piles().is_empty() {
            return Vec::new();
        }

        let pile_index = self.rng.random_range(0..me.piles().len());
        let Some(card) = me.piles()[pile_index].top() else {
            return Vec::new();
        };
        let players = state.players();
        let target = &players[self.rng.random_range(0..players.len())];
        let on_self = target.name() == me.name();
        if !card.kind().playable_on(on_self) {
            debug!(card = %card.kind(), target = target.name(), "not a good play");
            return Vec::new();
        }

        debug!(card = %card.kind(), target = target.name(), "bot playing");
        vec![
            ClientMessage::GrabCard {
                pile_index,
                slide: false,
            },
            ClientMessage::PlayCard {
                target: Some(target.name().to_string()),
            },
        ]
    }
}

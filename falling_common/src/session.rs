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

//! One connection's worth of client
//!
//! [`Session`] owns the mirrored state and everything that reads or writes
//! it. The host feeds it frames, input and time, and drains
//! [`Session::take_outbox`] into the socket.

use std::{mem, time::Duration};

use tracing::{error, info, warn};

use crate::{
    bot::BotPlayer,
    config::{ClientConfig, Timings},
    error::SessionError,
    geometry::Point,
    gesture::{GestureController, PointerDown},
    model::GameState,
    protocol::{ClientMessage, ServerMessage},
    ready::{ReadyButton, ReadyIndicator},
    reducer::{Applied, Reducer},
    visual::Surface,
};

/// Shown when the transport closes
pub const CONNECTION_LOST_NOTICE: &str =
    "Lost connection with the server! Refresh to re-join the game.";
/// Shown when the server says something the mirror can't follow
pub const DESYNC_NOTICE: &str = "Lost track of the game! Refresh to re-join the game.";

/// Where the connection is at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for the transport to open
    Connecting,
    /// Mirroring the server
    Active,
    /// Gave up after a protocol fault; inbound frames are ignored
    Faulted,
    /// The transport closed
    Disconnected,
}

/// The client core, wired together
#[derive(Debug)]
pub struct Session<S: Surface> {
    config: ClientConfig,
    state: GameState,
    surface: S,
    reducer: Reducer,
    gesture: GestureController,
    bot: Option<BotPlayer>,
    ready: ReadyIndicator,
    outbox: Vec<ClientMessage>,
    status: SessionStatus,
}

impl<S: Surface> Session<S> {
    /// Set up a session; the bot only runs for a named player who asked for
    /// it
    pub fn new(config: ClientConfig, timings: Timings, surface: S, bot_seed: u64) -> Self {
        let bot = (config.bot && config.login_name().is_some())
            .then(|| BotPlayer::new(bot_seed, timings.bot_period, Duration::ZERO));
        Self {
            config,
            state: GameState::new(),
            surface,
            reducer: Reducer::new(timings),
            gesture: GestureController::new(timings),
            bot,
            ready: ReadyIndicator::new(),
            outbox: Vec::new(),
            status: SessionStatus::Connecting,
        }
    }

    #[expect(missing_docs)]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[expect(missing_docs)]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[expect(missing_docs)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[expect(missing_docs)]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[expect(missing_docs)]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[expect(missing_docs)]
    pub fn gesture(&self) -> &GestureController {
        &self.gesture
    }

    #[expect(missing_docs)]
    pub fn ready_button(&self) -> ReadyButton {
        self.ready.button()
    }

    /// Whether the bot is still playing
    pub fn is_bot_running(&self) -> bool {
        self.bot.as_ref().is_some_and(|bot| !bot.is_halted())
    }

    /// Whether outbound intent is allowed right now
    pub fn can_act(&self) -> bool {
        self.status == SessionStatus::Active && self.config.login_name().is_some()
    }

    /// The transport opened
    pub fn connected(&mut self) {
        if self.status != SessionStatus::Connecting {
            return;
        }
        self.status = SessionStatus::Active;
        match self.config.login_name() {
            Some(name) => {
                info!(name, "logging in");
                self.outbox.push(ClientMessage::Login {
                    name: name.to_string(),
                });
            }
            None => info!("spectating"),
        }
    }

    /// Handle one inbound frame
    ///
    /// Decode errors drop the frame and leave the session running. A protocol
    /// fault halts the mirror for good.
    pub fn receive(&mut self, frame: &str) -> Result<(), SessionError> {
        if self.status == SessionStatus::Faulted {
            return Err(SessionError::Halted);
        }
        let message = ServerMessage::decode(frame).inspect_err(|err| {
            error!(%err, "dropping frame");
        })?;
        if message == ServerMessage::Unknown {
            warn!(frame, "ignoring unknown server event");
            return Ok(());
        }

        let local = self.config.login_name();
        match self
            .reducer
            .apply(&mut self.state, &mut self.surface, local, &message)
        {
            Ok(Applied::ReadyUpdate { offer_button }) => {
                if let Some(button) = self.ready.update(offer_button) {
                    self.surface.set_ready_button(button);
                }
                if self.bot.is_some() && self.can_act() {
                    self.press_ready();
                }
                Ok(())
            }
            Ok(Applied::Changed | Applied::Ignored) => Ok(()),
            Err(fault) => {
                error!(%fault, kind = message.kind(), "lost sync with the server");
                self.status = SessionStatus::Faulted;
                self.stop_bot();
                self.surface.show_notice(DESYNC_NOTICE);
                Err(fault.into())
            }
        }
    }

    /// Mouse or touch went down
    pub fn pointer_down(&mut self, down: PointerDown) {
        if !self.can_act() {
            return;
        }
        let Some(local) = self.config.login_name() else {
            return;
        };
        if let Some(message) = self
            .gesture
            .press(&self.state, &mut self.surface, local, down)
        {
            self.outbox.push(message);
        }
    }

    /// Mouse or touch moved
    pub fn pointer_move(&mut self, at: Point) {
        self.gesture.pointer_move(at);
    }

    /// Mouse or touch came up; `at` is `None` when the input doesn't say
    /// where
    pub fn pointer_up(&mut self, at: Option<Point>) {
        let local = self.config.login_name().unwrap_or_default();
        let released = self.gesture.release(&self.state, &self.surface, local, at);
        if let Some(message) = released
            && self.can_act()
        {
            self.outbox.push(message);
        }
    }

    /// The ready button was pressed
    pub fn press_ready(&mut self) {
        if !self.can_act() {
            return;
        }
        if let Some(message) = self.ready.press() {
            self.surface.set_ready_button(self.ready.button());
            self.outbox.push(message);
        }
    }

    /// Let time pass: animations, the grab timeout and the bot
    pub fn advance(&mut self, now: Duration) {
        let can_act = self.can_act();
        self.reducer.advance(now, &mut self.state, &mut self.surface);
        if let Some(message) = self.gesture.advance(now)
            && can_act
        {
            self.outbox.push(message);
        }
        if let (Some(bot), Some(local)) = (self.bot.as_mut(), self.config.login_name()) {
            let sent = bot.advance(now, &self.state, local);
            if can_act {
                self.outbox.extend(sent);
            }
        }
    }

    /// One animation frame went by
    pub fn frame(&mut self) {
        self.reducer.frame(&mut self.state, &mut self.surface);
        self.gesture.frame(&self.state, &mut self.surface);
    }

    /// The transport closed; there is no coming back from this
    pub fn transport_lost(&mut self) {
        if self.status == SessionStatus::Disconnected {
            return;
        }
        info!("lost connection with the server");
        self.status = SessionStatus::Disconnected;
        self.stop_bot();
        self.surface.show_notice(CONNECTION_LOST_NOTICE);
    }

    /// Whether anything is waiting to go to the server
    pub fn has_outgoing(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Take everything waiting to go to the server, oldest first
    pub fn take_outbox(&mut self) -> Vec<ClientMessage> {
        mem::take(&mut self.outbox)
    }

    /// The earliest time [`advance`](Self::advance) has something to do
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.reducer.next_deadline(),
            self.gesture.next_deadline(),
            self.bot.as_ref().and_then(BotPlayer::next_deadline),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn stop_bot(&mut self) {
        if let Some(bot) = self.bot.as_mut() {
            bot.halt();
        }
    }
}

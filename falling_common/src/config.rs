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

//! Client configuration

use std::{collections::HashMap, time::Duration};

use percent_encoding::percent_decode_str;

/// Port the game server listens on
pub const SERVER_PORT: u16 = 8774;

/// Animation and timer constants
///
/// Nothing here affects game state, only how things look and how long the
/// client waits before acting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    /// How long a grabbed card may be held before it's put back
    pub grab_timeout: Duration,
    /// How often the bot considers a move
    pub bot_period: Duration,
    /// How long a freshly dealt card can't be picked up for
    pub entry_settle: Duration,
    /// When a discarded card starts flying away
    pub discard_lift: Duration,
    /// When a discarded card is gone
    pub discard_destroy: Duration,
    /// When removed rider cards are gone
    pub rider_exit: Duration,
    /// Frames to wait before letting a moved card ease back into place
    pub settle_frames: u32,
    /// Weight of the old card position when following the pointer
    pub follow_easing: f64,
    /// How close a touch has to be to a pile's centre to grab from it
    pub touch_radius: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            grab_timeout: Duration::from_millis(1500),
            bot_period: Duration::from_millis(600),
            entry_settle: Duration::from_millis(400),
            discard_lift: Duration::from_millis(400),
            discard_destroy: Duration::from_millis(800),
            rider_exit: Duration::from_millis(400),
            settle_frames: 2,
            follow_easing: 5.0,
            touch_radius: 200.0,
        }
    }
}

/// Who we are and where to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Name to log in with; `None` spectates
    pub name: Option<String>,
    /// Let the bot play for us
    pub bot: bool,
    /// WebSocket URL of the game server
    pub endpoint: String,
}

impl ClientConfig {
    /// Build a config from a page URL, the way the browser client is launched
    ///
    /// Recognizes `?name=...` and `?bot=true`; the server is assumed to be on
    /// the page's host
    pub fn from_page(href: &str, hostname: &str) -> Self {
        let query = parse_query(href);
        Self {
            name: query
                .get("name")
                .filter(|name| !name.is_empty())
                .cloned(),
            bot: query.get("bot").is_some_and(|bot| bot == "true"),
            endpoint: format!("wss://{hostname}:{SERVER_PORT}/"),
        }
    }

    /// Get the name to log in with, if any
    pub fn login_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Split the query part of a URL into decoded key/value pairs
pub fn parse_query(href: &str) -> HashMap<String, String> {
    let Some((_, rest)) = href.split_once('?') else {
        return HashMap::new();
    };
    let query = rest.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.split('=');
            let key = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Undo form encoding: `+` is a space, `%XX` is a byte
fn decode_component(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

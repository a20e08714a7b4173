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

//! Client for Falling

mod display;
mod scenes;
mod socket;
mod surface;

use dioxus::prelude::*;
use falling_common::config::ClientConfig;

use crate::scenes::*;

enum ClientState {
    Error(String),
    Join(ClientConfig),
    Playing(ClientConfig),
}

fn main() {
    dioxus::launch(App);
}

/// Read `?name=..&bot=true` off the page we were loaded from
fn page_config() -> Option<ClientConfig> {
    let location = web_sys::window()?.location();
    Some(ClientConfig::from_page(
        &location.href().ok()?,
        &location.hostname().ok()?,
    ))
}

#[component]
fn App() -> Element {
    let state = use_signal(|| match page_config() {
        Some(config) if config.login_name().is_some() => ClientState::Playing(config),
        Some(config) => ClientState::Join(config),
        None => ClientState::Error("Couldn't read the page address".to_string()),
    });

    rsx! {
        document::Link { rel: "stylesheet", href: asset!("/assets/main.css") }
        document::Link {
            rel: "stylesheet",
            href: "https://cdn.jsdelivr.net/npm/bootstrap@5.3.7/dist/css/bootstrap.min.css",
            integrity: "sha384-LN+7fdVzj6u52u30Kp6M/trliBMCMKTyK833zpbD+pXdCLuTusPj697FH4R/5mcr",
            crossorigin: "anonymous",
        }
        match *state.read() {
            ClientState::Join(ref config) => {
                rsx! {
                    Join { state, config: config.clone() }
                }
            }
            ClientState::Playing(ref config) => {
                rsx! {
                    Playing { config: config.clone() }
                }
            }
            ClientState::Error(ref message) => {
                rsx! {
                    Error { message }
                }
            }
        }
    }
}

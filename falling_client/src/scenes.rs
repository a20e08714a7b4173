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

use dioxus::prelude::*;
use falling_common::{
    config::{ClientConfig, Timings},
    geometry::Point,
    gesture::{GesturePhase, PointerDown},
    session::Session,
};

use crate::{ClientState, display::Table, socket, surface::WebSurface};

#[component]
pub fn Join(state: Signal<ClientState>, config: ClientConfig) -> Element {
    let mut username = use_signal(|| "".to_string());
    let spectate = config.clone();

    rsx! {
        div { class: "container",
            h1 { class: "row mb-3", "Join Game" }
            div { class: "row mb-3",
                label {
                    r#for: "username",
                    class: "form-label col-sm-1 col-form-label",
                    "Name"
                }
                div { class: "col-sm-5",
                    input {
                        r#type: "text",
                        id: "username",
                        class: "form-control",
                        oninput: move |e| username.set(e.value()),
                    }
                }
            }
            button {
                class: "row btn btn-primary mb-3",
                r#type: "submit",
                disabled: username.read().trim().is_empty(),
                onclick: move |_| {
                    state
                        .set(
                            ClientState::Playing(ClientConfig {
                                name: Some(username.read().trim().to_string()),
                                ..config.clone()
                            }),
                        );
                },
                "Join Game"
            }
            button {
                class: "row btn btn-secondary",
                onclick: move |_| {
                    state
                        .set(
                            ClientState::Playing(ClientConfig {
                                name: None,
                                ..spectate.clone()
                            }),
                        );
                },
                "Just Watch"
            }
        }
    }
}

#[component]
pub fn Playing(config: ClientConfig) -> Element {
    let mut session = use_signal(|| {
        let seed = (js_sys::Math::random() * 2f64.powi(53)) as u64;
        Session::new(config, Timings::default(), WebSurface::default(), seed)
    });
    let connection = use_signal(|| socket::connect(session));
    let send = move || {
        if let Some(socket) = connection.peek().as_ref() {
            socket::flush(session, socket);
        }
    };

    let view = session.read();
    let surface = view.surface();
    let class = match view.gesture().phase() {
        GesturePhase::Grabbed => "game grabbing user-select-none",
        GesturePhase::Idle => "game user-select-none",
    };

    rsx! {
        div {
            class,
            ontouchstart: move |event: TouchEvent| {
                if !session.peek().can_act() {
                    return;
                }
                let Some(touch) = event.touches().into_iter().next() else {
                    return;
                };
                // no emulated mouse press after this
                event.prevent_default();
                let at = touch.client_coordinates();
                session.write().pointer_down(PointerDown::Touch {
                    at: Point::new(at.x, at.y),
                });
                send();
            },
            onmousemove: move |event: MouseEvent| {
                if session.peek().gesture().is_tracking() {
                    let at = event.client_coordinates();
                    session.write().pointer_move(Point::new(at.x, at.y));
                }
            },
            onmouseup: move |event: MouseEvent| {
                if session.peek().gesture().is_tracking() {
                    let at = event.client_coordinates();
                    session.write().pointer_up(Some(Point::new(at.x, at.y)));
                    send();
                }
            },
            ontouchmove: move |event: TouchEvent| {
                if !session.peek().gesture().is_tracking() {
                    return;
                }
                if let Some(touch) = event.touches().into_iter().next() {
                    let at = touch.client_coordinates();
                    session.write().pointer_move(Point::new(at.x, at.y));
                }
            },
            ontouchend: move |_| {
                if session.peek().gesture().is_tracking() {
                    session.write().pointer_up(None);
                    send();
                }
            },
            Table {
                areas: surface.areas(),
                ready_button: surface.ready_button(),
                on_pile_press: move |(pile, at): (usize, Point)| {
                    session.write().pointer_down(PointerDown::Card { pile, at });
                    send();
                },
                on_ready: move |_| {
                    session.write().press_ready();
                    send();
                },
            }
            if let Some(notice) = surface.notice() {
                div { class: "notice",
                    p { "{notice}" }
                }
            }
        }
    }
}

#[component]
pub fn Error(message: String) -> Element {
    rsx! {
        div { class: "container",
            h1 { "Something Went Wrong" }
            p { "{message}" }
            p {
                "To try again "
                a { href: "/", class: "btn btn-primary", "refresh the page" }
            }
        }
    }
}

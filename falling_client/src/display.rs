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
    geometry::Point,
    ready::ReadyButton,
    visual::{Motion, Unit},
};

use crate::surface::{CardView, PlayerArea};

#[component]
pub fn Table(
    areas: Vec<PlayerArea>,
    ready_button: ReadyButton,
    on_pile_press: Callback<(usize, Point), ()>,
    on_ready: Callback<(), ()>,
) -> Element {
    rsx! {
        div { class: "table",
            for area in areas {
                Area {
                    key: "{area.view.key}",
                    area,
                    ready_button,
                    on_pile_press,
                    on_ready,
                }
            }
        }
    }
}

#[component]
fn Area(
    area: PlayerArea,
    ready_button: ReadyButton,
    on_pile_press: Callback<(usize, Point), ()>,
    on_ready: Callback<(), ()>,
) -> Element {
    let PlayerArea { view, piles, rider } = area;
    let is_local = view.is_local;

    rsx! {
        div {
            id: view.element_id(),
            class: if is_local { "player local" } else { "player" },
            style: "background:{view.background()}",
            div { class: "player-name",
                "{view.name}"
                if is_local {
                    b { " (You)" }
                }
            }
            ReadyIndicator {
                ready: view.ready,
                button: is_local.then_some(ready_button),
                on_ready,
            }
            div { id: view.rider_element_id(), class: "rider",
                for card in rider {
                    CardFace { key: "{card.id.0}", card }
                }
            }
            div { class: "piles",
                for (index , pile) in piles.into_iter().enumerate() {
                    div {
                        id: view.pile_element_id(index),
                        class: "pile",
                        role: if is_local { "button" } else { "" },
                        onmousedown: move |event: MouseEvent| {
                            if !is_local {
                                return;
                            }
                            let at = event.client_coordinates();
                            on_pile_press((index, Point::new(at.x, at.y)));
                        },
                        for card in pile {
                            CardFace { key: "{card.id.0}", card }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ReadyIndicator(ready: bool, button: Option<ReadyButton>, on_ready: Callback<(), ()>) -> Element {
    let class = if ready { "ready lit" } else { "ready" };
    match button {
        Some(ReadyButton::Offered) => rsx! {
            button {
                class: "btn btn-primary ready",
                onclick: move |_| on_ready(()),
                "I'm Ready"
            }
        },
        _ => rsx! {
            span { class, "Ready!" }
        },
    }
}

#[component]
fn CardFace(card: CardView) -> Element {
    let unit = match card.offset.unit {
        Unit::Px => "px",
        Unit::Em => "em",
    };
    let transition = match card.motion {
        Motion::Instant => "none",
        Motion::Eased => "transform 0.4s ease-out",
    };
    let (x, y) = (card.offset.x, card.offset.y);
    let style = format!(
        "background:{};transform:translate({x}{unit},{y}{unit});transition:{transition}",
        card.kind.colour()
    );

    rsx! {
        div {
            id: card.element_id(),
            class: "card",
            style,
            "{card.kind}"
        }
    }
}

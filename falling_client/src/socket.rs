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

//! Getting frames, time and messages in and out of the session

use std::{cell::RefCell, rc::Rc, time::Duration};

use dioxus::prelude::*;
use falling_common::session::Session;
use tracing::{error, warn};
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::surface::WebSurface;

/// How often time advances while the page isn't being drawn
const BACKGROUND_TICK_MS: i32 = 100;

pub type SessionSignal = Signal<Session<WebSurface>>;

/// Open the socket and start driving the session
///
/// Returns `None` (and shows the lost-connection notice) if the socket can't
/// even be created
pub fn connect(mut session: SessionSignal) -> Option<WebSocket> {
    let endpoint = session.peek().config().endpoint.clone();
    let socket = match WebSocket::new(&endpoint) {
        Ok(socket) => socket,
        Err(err) => {
            error!(?err, %endpoint, "couldn't open websocket");
            session.write().transport_lost();
            return None;
        }
    };

    let onopen = {
        let socket = socket.clone();
        Closure::<dyn FnMut()>::new(move || {
            session.write().connected();
            flush(session, &socket);
        })
    };
    socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let onmessage = {
        let socket = socket.clone();
        Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(frame) = event.data().as_string() else {
                warn!("ignoring non-text frame");
                return;
            };
            // the session logs and recovers on its own
            let _ = session.write().receive(&frame);
            flush(session, &socket);
        })
    };
    socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |_| {
        session.write().transport_lost();
    });
    socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    run_frames(session, socket.clone());
    run_background_ticks(session, socket.clone());
    Some(socket)
}

/// Send whatever the session has queued
pub fn flush(mut session: SessionSignal, socket: &WebSocket) {
    if socket.ready_state() != WebSocket::OPEN || !session.peek().has_outgoing() {
        return;
    }
    for message in session.write().take_outbox() {
        if let Err(err) = socket.send_with_str(&message.encode()) {
            warn!(?err, "couldn't send");
        }
    }
}

fn run_frames(mut session: SessionSignal, socket: WebSocket) {
    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&frame);
    *frame.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        {
            let mut session = session.write();
            session.frame();
            session.advance(millis(timestamp));
        }
        flush(session, &socket);
        if let Some(callback) = next.borrow().as_ref() {
            request_frame(callback);
        }
    }));
    if let Some(callback) = frame.borrow().as_ref() {
        request_frame(callback);
    }
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        error!(?err, "couldn't schedule a frame");
    }
}

/// Timers keep running in hidden tabs, where frames stop
fn run_background_ticks(mut session: SessionSignal, socket: WebSocket) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let tick = Closure::<dyn FnMut()>::new(move || {
        if !session.peek().next_deadline().is_some_and(|deadline| deadline <= now()) {
            return;
        }
        session.write().advance(now());
        flush(session, &socket);
    });
    if let Err(err) = window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        BACKGROUND_TICK_MS,
    ) {
        error!(?err, "couldn't start the background timer");
    }
    tick.forget();
}

fn now() -> Duration {
    web_sys::window()
        .and_then(|window| window.performance())
        .map_or(Duration::ZERO, |performance| millis(performance.now()))
}

fn millis(timestamp: f64) -> Duration {
    Duration::from_secs_f64(timestamp.max(0.0) / 1000.0)
}

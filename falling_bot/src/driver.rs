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

//! Pumps a session against a websocket

use std::{future, time::Duration};

use anyhow::Context;
use falling_common::{error::SessionError, session::Session};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::debug;

use crate::surface::HeadlessSurface;

/// Roughly one display frame
pub const FRAME: Duration = Duration::from_millis(16);

/// Run until the server hangs up
///
/// Logs in first. Returns an error if the socket fails or the server says
/// something the mirror can't follow.
pub async fn run<I, O>(
    session: &mut Session<HeadlessSurface>,
    mut inbound: I,
    mut outbound: O,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    O: Sink<Message> + Unpin,
    O::Error: std::error::Error + Send + Sync + 'static,
{
    let start = Instant::now();
    let mut frames = time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    session.connected();
    flush(session, &mut outbound).await?;

    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            biased;

            incoming = inbound.next() => match incoming {
                Some(Ok(Message::Text(text))) => match session.receive(text.as_str()) {
                    // already logged; the frame is dropped
                    Ok(()) | Err(SessionError::Decode(_)) => {}
                    Err(err) => return Err(err).context("lost sync with the server"),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "server closed the connection");
                    session.transport_lost();
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    session.transport_lost();
                    return Err(err).context("websocket failed");
                }
                None => {
                    session.transport_lost();
                    return Ok(());
                }
            },
            _ = frames.tick() => {
                session.frame();
                session.advance(start.elapsed());
            }
            () = sleep_until(start, deadline) => {
                session.advance(start.elapsed());
            }
        }

        flush(session, &mut outbound).await?;
    }
}

async fn sleep_until(start: Instant, deadline: Option<Duration>) {
    match deadline {
        Some(deadline) => time::sleep_until(start + deadline).await,
        None => future::pending().await,
    }
}

async fn flush<O>(session: &mut Session<HeadlessSurface>, outbound: &mut O) -> anyhow::Result<()>
where
    O: Sink<Message> + Unpin,
    O::Error: std::error::Error + Send + Sync + 'static,
{
    for message in session.take_outbox() {
        debug!(?message, "sending");
        outbound
            .send(Message::text(message.encode()))
            .await
            .context("couldn't send to the server")?;
    }
    Ok(())
}

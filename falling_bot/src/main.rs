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

//! Headless autonomous player for Falling

mod driver;
mod surface;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use falling_common::{
    config::{ClientConfig, Timings},
    session::Session,
};
use futures_util::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::surface::HeadlessSurface;

#[derive(Parser)]
#[command(about = "Joins a Falling game and plays it without a browser")]
struct Args {
    /// Name to join the game under
    #[arg(short, long)]
    name: String,
    /// Server to connect to
    #[arg(short, long, default_value = "ws://127.0.0.1:8774/")]
    url: String,
    /// Milliseconds between moves
    #[arg(long, default_value_t = 600)]
    period_ms: u64,
    /// Milliseconds a grabbed card may be held
    #[arg(long, default_value_t = 1500)]
    grab_timeout_ms: u64,
    /// Seed for move choice; random if not given
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter used when RUST_LOG isn't set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let timings = Timings {
        bot_period: Duration::from_millis(args.period_ms),
        grab_timeout: Duration::from_millis(args.grab_timeout_ms),
        ..Timings::default()
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = ClientConfig {
        name: Some(args.name),
        bot: true,
        endpoint: args.url,
    };

    info!(url = %config.endpoint, seed, "connecting");
    let (socket, _) = tokio_tungstenite::connect_async(config.endpoint.as_str())
        .await
        .with_context(|| format!("couldn't connect to {}", config.endpoint))?;
    let (outbound, inbound) = socket.split();

    let mut session = Session::new(config, timings, HeadlessSurface, seed);
    let result = driver::run(&mut session, inbound, outbound).await;
    info!(status = ?session.status(), "done");
    result
}

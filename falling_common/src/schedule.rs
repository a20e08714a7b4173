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

//! Deferred work with cancellation
//!
//! Time never passes on its own here: the host calls [`Scheduler::advance`]
//! with the current time and [`Scheduler::frame`] once per animation frame,
//! and gets back whatever fell due. That keeps every timer deterministic under
//! test.

use std::{collections::BTreeMap, time::Duration};

/// Handle to a scheduled task, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// A queue of tasks waiting on either a time or a number of frames
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<(Duration, u64), T>,
    frames: Vec<(u32, u64, T)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: BTreeMap::new(),
            frames: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    #[expect(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last time passed to [`advance`](Self::advance)
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has passed
    pub fn after(&mut self, delay: Duration, task: T) -> TaskHandle {
        let id = self.mint();
        self.timers.insert((self.now + delay, id), task);
        TaskHandle(id)
    }

    /// Run `task` after this many more frames
    pub fn after_frames(&mut self, frames: u32, task: T) -> TaskHandle {
        let id = self.mint();
        self.frames.push((frames, id, task));
        TaskHandle(id)
    }

    /// Drop a task before it runs; returns whether it was still pending
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if let Some(key) = self.timers.keys().find(|(_, id)| *id == handle.0).copied() {
            self.timers.remove(&key);
            return true;
        }
        let before = self.frames.len();
        self.frames.retain(|(_, id, _)| *id != handle.0);
        self.frames.len() != before
    }

    /// Whether a task is still waiting to run
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.timers.keys().any(|(_, id)| *id == handle.0)
            || self.frames.iter().any(|(_, id, _)| *id == handle.0)
    }

    /// Look at a task that hasn't run yet
    pub fn peek(&self, handle: TaskHandle) -> Option<&T> {
        self.timers
            .iter()
            .find(|((_, id), _)| *id == handle.0)
            .map(|(_, task)| task)
            .or_else(|| {
                self.frames
                    .iter()
                    .find(|(_, id, _)| *id == handle.0)
                    .map(|(_, _, task)| task)
            })
    }

    /// When the earliest timer falls due
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Move the clock forward and collect every timer now due, earliest first
    ///
    /// Time never goes backwards; an earlier `now` is ignored
    pub fn advance(&mut self, now: Duration) -> Vec<T> {
        self.now = self.now.max(now);
        let mut due = Vec::new();
        while let Some(entry) = self.timers.first_entry() {
            if entry.key().0 > self.now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    /// Count one frame and collect every task that was waiting on it, in the
    /// order they were scheduled
    pub fn frame(&mut self) -> Vec<T> {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.frames.len());
        for (frames, id, task) in self.frames.drain(..) {
            if frames <= 1 {
                due.push(task);
            } else {
                waiting.push((frames - 1, id, task));
            }
        }
        self.frames = waiting;
        due
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.frames.is_empty()
    }

    fn mint(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

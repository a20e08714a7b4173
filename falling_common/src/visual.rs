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

//! The boundary to whatever draws the table
//!
//! A [`Surface`] is the only thing that touches the screen. The core tells it
//! where cards live and how they should be offset, and asks it where things
//! ended up. [`Animator`] layers the timed, purely cosmetic transitions on top;
//! nothing it does feeds back into the game model.

use std::collections::HashMap;

use crate::{
    CardType,
    config::Timings,
    geometry::Rect,
    model::CardId,
    ready::ReadyButton,
    schedule::{Scheduler, TaskHandle},
};

/// Somewhere a card can sit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum Container {
    Pile { player: String, pile: usize },
    Rider { player: String },
}

impl Container {
    /// One of a player's piles
    pub fn pile(player: &str, pile: usize) -> Self {
        Container::Pile {
            player: player.to_string(),
            pile,
        }
    }

    /// A player's rider slot
    pub fn rider(player: &str) -> Self {
        Container::Rider {
            player: player.to_string(),
        }
    }

    /// Whose area this is in
    pub fn player(&self) -> &str {
        match self {
            Container::Pile { player, .. } | Container::Rider { player } => player,
        }
    }
}

/// Which end of a container a card is put at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before everything already there
    Front,
    /// After everything already there
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum Unit {
    Px,
    Em,
}

/// How far a card is drawn from its resting place
#[derive(Debug, Clone, Copy, PartialEq)]
#[expect(missing_docs)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub unit: Unit,
}

impl Offset {
    /// Resting position
    pub const ZERO: Offset = Offset::px(0.0, 0.0);

    #[expect(missing_docs)]
    pub const fn px(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            unit: Unit::Px,
        }
    }

    #[expect(missing_docs)]
    pub const fn em(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            unit: Unit::Em,
        }
    }
}

/// Whether an offset change should be animated by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Jump straight there
    Instant,
    /// Let the surface's normal transition ease it there
    Eased,
}

/// Something that can draw the table
///
/// Queries return `None` when the thing isn't laid out (or there is no layout
/// at all, as for a headless bot)
pub trait Surface {
    /// Add an area for a newly seated player, with no piles yet
    fn create_player(&mut self, name: &str, is_local: bool);
    /// Remove a player's area and anything still in it
    fn remove_player(&mut self, name: &str);
    /// Add an empty pile slot at the end of a player's piles
    fn add_pile(&mut self, player: &str);
    /// Remove a pile slot, shifting later ones down
    fn remove_pile(&mut self, player: &str, pile: usize);
    /// Show a new card
    fn create_card(&mut self, card: CardId, kind: CardType, at: &Container, placement: Placement);
    /// Move a card's visual to another container
    fn relocate(&mut self, card: CardId, to: &Container, placement: Placement);
    /// Draw a card away from its resting place
    fn set_offset(&mut self, card: CardId, offset: Offset, motion: Motion);
    /// Remove a card's visual
    fn destroy_card(&mut self, card: CardId);
    /// Light or dim a player's ready indicator
    fn set_ready(&mut self, player: &str, ready: bool);
    /// Show the local player's ready button in some state
    fn set_ready_button(&mut self, button: ReadyButton);
    /// Tell the user something has gone irrecoverably wrong
    fn show_notice(&mut self, notice: &str);

    /// Where a card is currently drawn
    fn card_rect(&self, card: CardId) -> Option<Rect>;
    /// Where a container is
    fn container_rect(&self, container: &Container) -> Option<Rect>;
    /// Where a player's whole area is
    fn player_rect(&self, name: &str) -> Option<Rect>;
    /// Height of the visible page
    fn viewport_height(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Offset(Offset, Motion),
    Destroy,
    Settle,
}

/// Timed card transitions
#[derive(Debug)]
pub struct Animator {
    timings: Timings,
    steps: Scheduler<(CardId, Step)>,
    pending: HashMap<CardId, Vec<TaskHandle>>,
    in_flight: HashMap<CardId, String>,
}

impl Animator {
    #[expect(missing_docs)]
    pub fn new(timings: Timings) -> Self {
        Self {
            timings,
            steps: Scheduler::new(),
            pending: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Show a card already at rest, as when a player is seated
    pub fn place(
        &mut self,
        surface: &mut impl Surface,
        card: CardId,
        kind: CardType,
        at: &Container,
        placement: Placement,
    ) {
        surface.create_card(card, kind, at, placement);
    }

    /// Show a card dropping into the back of a pile
    ///
    /// The card is reported as settled once it can be picked up
    pub fn deal(
        &mut self,
        surface: &mut impl Surface,
        card: CardId,
        kind: CardType,
        at: &Container,
    ) {
        surface.create_card(card, kind, at, Placement::Back);
        surface.set_offset(card, Offset::em(0.0, -20.0), Motion::Instant);
        self.after_frames(card, Step::Offset(Offset::ZERO, Motion::Eased));
        self.after(card, self.timings.entry_settle, Step::Settle);
    }

    /// Move a card to another container without it visibly jumping
    pub fn move_to(
        &mut self,
        surface: &mut impl Surface,
        card: CardId,
        to: &Container,
        placement: Placement,
    ) {
        self.cancel(card, |step| matches!(step, Step::Offset(..)));
        let before = surface.card_rect(card);
        surface.relocate(card, to, placement);
        let after = surface.container_rect(to);
        if let (Some(before), Some(after)) = (before, after) {
            let delta = before.origin() - after.origin();
            surface.set_offset(card, Offset::px(delta.x, delta.y), Motion::Instant);
        }
        self.after_frames(card, Step::Offset(Offset::ZERO, Motion::Eased));
    }

    /// Fly a card into someone's rider slot and then away, destroying it
    pub fn discard_via(&mut self, surface: &mut impl Surface, card: CardId, to: &str) {
        self.move_to(surface, card, &Container::rider(to), Placement::Back);
        self.steps_after_frames(
            card,
            self.timings.settle_frames + 1,
            Step::Offset(Offset::em(-0.5, -0.5), Motion::Eased),
        );
        self.after(
            card,
            self.timings.discard_lift,
            Step::Offset(Offset::em(-0.5, -20.0), Motion::Eased),
        );
        self.after(card, self.timings.discard_destroy, Step::Destroy);
        self.in_flight.insert(card, to.to_string());
    }

    /// Lift a card off its owner and destroy it
    pub fn lift_away(&mut self, surface: &mut impl Surface, card: CardId, owner: &str) {
        self.cancel(card, |step| matches!(step, Step::Offset(..)));
        surface.set_offset(card, Offset::ZERO, Motion::Eased);
        self.after_frames(card, Step::Offset(Offset::em(0.0, -20.0), Motion::Eased));
        self.after(card, self.timings.rider_exit, Step::Destroy);
        self.in_flight.insert(card, owner.to_string());
    }

    /// Remove a card's visual right now, dropping anything queued for it
    pub fn destroy_now(&mut self, surface: &mut impl Surface, card: CardId) {
        self.cancel(card, |_| true);
        self.in_flight.remove(&card);
        surface.destroy_card(card);
    }

    /// Destroy every card still animating inside a player's area
    pub fn abandon(&mut self, surface: &mut impl Surface, owner: &str) {
        let mut cards = self
            .in_flight
            .iter()
            .filter(|(_, card_owner)| *card_owner == owner)
            .map(|(card, _)| *card)
            .collect::<Vec<_>>();
        cards.sort();
        for card in cards {
            self.destroy_now(surface, card);
        }
    }

    /// Run timed steps; returns cards that have finished being dealt
    pub fn advance(&mut self, now: std::time::Duration, surface: &mut impl Surface) -> Vec<CardId> {
        let due = self.steps.advance(now);
        self.run(due, surface)
    }

    /// Run frame-counted steps; returns cards that have finished being dealt
    pub fn frame(&mut self, surface: &mut impl Surface) -> Vec<CardId> {
        let due = self.steps.frame();
        self.run(due, surface)
    }

    /// When the next timed step falls due
    pub fn next_deadline(&self) -> Option<std::time::Duration> {
        self.steps.next_deadline()
    }

    /// Whether a card has transitions queued
    pub fn is_animating(&self, card: CardId) -> bool {
        self.pending.get(&card).is_some_and(|handles| !handles.is_empty())
    }

    /// How many cards are still visible after leaving the model
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn run(&mut self, due: Vec<(CardId, Step)>, surface: &mut impl Surface) -> Vec<CardId> {
        let mut settled = Vec::new();
        for (card, step) in due {
            match step {
                Step::Offset(offset, motion) => surface.set_offset(card, offset, motion),
                Step::Destroy => {
                    self.in_flight.remove(&card);
                    surface.destroy_card(card);
                }
                Step::Settle => settled.push(card),
            }
            self.forget_finished(card);
        }
        settled
    }

    fn after(&mut self, card: CardId, delay: std::time::Duration, step: Step) {
        let handle = self.steps.after(delay, (card, step));
        self.pending.entry(card).or_default().push(handle);
    }

    fn after_frames(&mut self, card: CardId, step: Step) {
        self.steps_after_frames(card, self.timings.settle_frames, step);
    }

    fn steps_after_frames(&mut self, card: CardId, frames: u32, step: Step) {
        let handle = self.steps.after_frames(frames, (card, step));
        self.pending.entry(card).or_default().push(handle);
    }

    /// Cancel queued steps for a card that match `which`
    fn cancel(&mut self, card: CardId, which: impl Fn(&Step) -> bool) {
        let Some(handles) = self.pending.remove(&card) else {
            return;
        };
        let mut kept = Vec::new();
        for handle in handles {
            let matched = self.steps.peek(handle).map(|(_, step)| which(step));
            match matched {
                Some(true) => {
                    self.steps.cancel(handle);
                }
                Some(false) => kept.push(handle),
                None => {}
            }
        }
        if !kept.is_empty() {
            self.pending.insert(card, kept);
        }
    }

    fn forget_finished(&mut self, card: CardId) {
        if let Some(handles) = self.pending.get_mut(&card) {
            handles.retain(|handle| self.steps.is_pending(*handle));
            if handles.is_empty() {
                self.pending.remove(&card);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{Call, RecordingSurface};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_deal_drops_in_then_settles() {
        let mut surface = RecordingSurface::new();
        let mut animator = Animator::new(Timings::default());
        let card = CardId(1);
        animator.deal(&mut surface, card, CardType::Hit, &Container::pile("A", 0));

        assert_eq!(
            surface.offsets_for(card),
            [(Offset::em(0.0, -20.0), Motion::Instant)]
        );
        assert!(animator.frame(&mut surface).is_empty());
        assert!(animator.frame(&mut surface).is_empty());
        assert_eq!(
            surface.offsets_for(card).last(),
            Some(&(Offset::ZERO, Motion::Eased))
        );

        assert!(animator.advance(ms(399), &mut surface).is_empty());
        assert_eq!(animator.advance(ms(400), &mut surface), [card]);
        assert!(!animator.is_animating(card));
    }

    #[test]
    fn test_move_keeps_visual_continuity() {
        let mut surface = RecordingSurface::new();
        let card = CardId(7);
        let to = Container::rider("B");
        surface
            .card_rects
            .insert(card, Rect::new(100.0, 500.0, 50.0, 80.0));
        surface
            .container_rects
            .insert(to.clone(), Rect::new(300.0, 100.0, 50.0, 80.0));
        let mut animator = Animator::new(Timings::default());

        animator.move_to(&mut surface, card, &to, Placement::Front);
        assert_eq!(
            surface.take_calls(),
            [
                Call::Relocate(card, to.clone(), Placement::Front),
                Call::SetOffset(card, Offset::px(-200.0, 400.0), Motion::Instant),
            ]
        );
        animator.frame(&mut surface);
        animator.frame(&mut surface);
        assert_eq!(
            surface.take_calls(),
            [Call::SetOffset(card, Offset::ZERO, Motion::Eased)]
        );
    }

    #[test]
    fn test_move_without_layout_still_relocates() {
        let mut surface = RecordingSurface::new();
        let mut animator = Animator::new(Timings::default());
        animator.move_to(&mut surface, CardId(1), &Container::rider("B"), Placement::Front);
        assert_eq!(
            surface.take_calls(),
            [Call::Relocate(CardId(1), Container::rider("B"), Placement::Front)]
        );
    }

    #[test]
    fn test_discard_destroys_after_animation() {
        let mut surface = RecordingSurface::new();
        let mut animator = Animator::new(Timings::default());
        let card = CardId(3);
        animator.discard_via(&mut surface, card, "B");
        assert_eq!(animator.in_flight(), 1);

        for _ in 0..3 {
            animator.frame(&mut surface);
        }
        assert_eq!(
            surface.offsets_for(card).last(),
            Some(&(Offset::em(-0.5, -0.5), Motion::Eased))
        );

        animator.advance(ms(400), &mut surface);
        assert_eq!(
            surface.offsets_for(card).last(),
            Some(&(Offset::em(-0.5, -20.0), Motion::Eased))
        );
        assert!(surface.destroyed().is_empty());

        animator.advance(ms(800), &mut surface);
        assert_eq!(surface.destroyed(), [card]);
        assert_eq!(animator.in_flight(), 0);
        assert!(!animator.is_animating(card));
    }

    #[test]
    fn test_destroy_now_cancels_queued_steps() {
        let mut surface = RecordingSurface::new();
        let mut animator = Animator::new(Timings::default());
        let card = CardId(5);
        animator.deal(&mut surface, card, CardType::Hit, &Container::pile("A", 0));
        animator.destroy_now(&mut surface, card);
        surface.take_calls();

        animator.frame(&mut surface);
        animator.frame(&mut surface);
        assert!(animator.advance(ms(1000), &mut surface).is_empty());
        assert!(surface.take_calls().is_empty());
    }

    #[test]
    fn test_abandon_destroys_cards_in_flight_to_owner() {
        let mut surface = RecordingSurface::new();
        let mut animator = Animator::new(Timings::default());
        animator.discard_via(&mut surface, CardId(1), "B");
        animator.lift_away(&mut surface, CardId(2), "C");
        animator.lift_away(&mut surface, CardId(3), "B");
        surface.take_calls();

        animator.abandon(&mut surface, "B");
        assert_eq!(surface.destroyed(), [CardId(1), CardId(3)]);
        assert_eq!(animator.in_flight(), 1);

        surface.take_calls();
        animator.advance(ms(1000), &mut surface);
        assert_eq!(surface.destroyed(), [CardId(2)]);
    }

    #[test]
    fn test_move_replaces_pending_offsets_but_keeps_settle() {
        let mut surface = RecordingSurface::new();
        let mut animator = Animator::new(Timings::default());
        let card = CardId(9);
        animator.deal(&mut surface, card, CardType::Hit, &Container::pile("A", 0));
        animator.move_to(&mut surface, card, &Container::rider("B"), Placement::Front);
        surface.take_calls();

        animator.frame(&mut surface);
        animator.frame(&mut surface);
        assert_eq!(
            surface.take_calls(),
            [Call::SetOffset(card, Offset::ZERO, Motion::Eased)]
        );
        assert_eq!(animator.advance(ms(400), &mut surface), [card]);
    }
}

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

//! Applies server events to the local mirror
//!
//! Each event is applied completely and synchronously before the next one is
//! looked at, so indices in the next event always resolve against the state
//! the server had in mind. The visual side is handed to the [`Animator`] and
//! may still be playing when later events arrive; nothing here waits on it.
//!
//! Every event checks all of its references before touching anything, so an
//! event that faults leaves the model as it was.

use std::time::Duration;

use tracing::debug;

use crate::{
    config::Timings,
    error::ProtocolFault,
    model::{Card, GameState},
    protocol::ServerMessage,
    visual::{Animator, Container, Placement, Surface},
};

/// What applying an event did, beyond the model itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The model changed
    Changed,
    /// Ready flags changed; `offer_button` says whether to ask the local
    /// player
    ReadyUpdate {
        #[expect(missing_docs)]
        offer_button: bool,
    },
    /// Nothing to do
    Ignored,
}

/// The only thing allowed to change the [`GameState`]
#[derive(Debug)]
pub struct Reducer {
    animator: Animator,
}

impl Reducer {
    #[expect(missing_docs)]
    pub fn new(timings: Timings) -> Self {
        Self {
            animator: Animator::new(timings),
        }
    }

    #[cfg(test)]
    pub(crate) fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Apply one server event
    ///
    /// `local` is the name we logged in as, if any
    pub fn apply(
        &mut self,
        state: &mut GameState,
        surface: &mut impl Surface,
        local: Option<&str>,
        message: &ServerMessage,
    ) -> Result<Applied, ProtocolFault> {
        debug!(kind = message.kind(), "applying server event");
        match message {
            ServerMessage::CreatePlayer { name, piles, rider } => {
                let player = state.seat_player(name, piles, rider.as_ref())?;
                surface.create_player(name, local == Some(name.as_str()));
                for (index, pile) in player.piles().iter().enumerate() {
                    surface.add_pile(name);
                    let at = Container::pile(name, index);
                    for card in pile.cards() {
                        self.animator
                            .place(surface, card.id(), card.kind(), &at, Placement::Back);
                    }
                }
                if let Some(rider) = player.rider() {
                    let at = Container::rider(name);
                    for card in rider.cards() {
                        self.animator
                            .place(surface, card.id(), card.kind(), &at, Placement::Front);
                    }
                }
                Ok(Applied::Changed)
            }
            ServerMessage::DealCard { player, pile, card } => {
                state.find_player(player)?.pile(*pile)?;
                let card = state.deal_card(*card);
                let (id, kind) = (card.id(), card.kind());
                state.find_player_mut(player)?.push_card(*pile, card)?;
                self.animator
                    .deal(surface, id, kind, &Container::pile(player, *pile));
                Ok(Applied::Changed)
            }
            ServerMessage::PlayRider {
                player_from,
                from_pile,
                card_index,
                player_to,
            } => {
                state.find_player(player_to)?;
                state.find_player(player_from)?.card(*from_pile, *card_index)?;
                let card = state
                    .find_player_mut(player_from)?
                    .take_card(*from_pile, *card_index)?;
                self.animator.move_to(
                    surface,
                    card.id(),
                    &Container::rider(player_to),
                    Placement::Front,
                );
                state.find_player_mut(player_to)?.attach(card);
                Ok(Applied::Changed)
            }
            ServerMessage::PlayAndDiscard {
                player_from,
                from_pile,
                card_index,
                player_to,
            } => {
                state.find_player(player_to)?;
                state.find_player(player_from)?.card(*from_pile, *card_index)?;
                let card = state
                    .find_player_mut(player_from)?
                    .take_card(*from_pile, *card_index)?;
                self.animator.discard_via(surface, card.id(), player_to);
                Ok(Applied::Changed)
            }
            ServerMessage::RemoveRider {
                player,
                just_one_extra,
            } => {
                let target = state.find_player_mut(player)?;
                let removed: Vec<Card> = if *just_one_extra {
                    target.pop_extra().into_iter().collect()
                } else {
                    target
                        .take_rider()
                        .map(|rider| rider.cards().cloned().collect())
                        .unwrap_or_default()
                };
                if removed.is_empty() {
                    debug!(player, just_one_extra, "nothing to remove from rider");
                    return Ok(Applied::Ignored);
                }
                for card in removed {
                    self.animator.lift_away(surface, card.id(), player);
                }
                Ok(Applied::Changed)
            }
            ServerMessage::NewPile { player } => {
                state.find_player_mut(player)?.push_pile();
                surface.add_pile(player);
                Ok(Applied::Changed)
            }
            ServerMessage::RemovePile { player, pile } => {
                let removed = state.find_player_mut(player)?.remove_pile(*pile)?;
                for card in removed.cards() {
                    self.animator.destroy_now(surface, card.id());
                }
                surface.remove_pile(player, *pile);
                Ok(Applied::Changed)
            }
            ServerMessage::RemovePlayer { name, only_data } => {
                if *only_data {
                    let (piles, rider) = state.find_player_mut(name)?.clear();
                    let cards = piles
                        .iter()
                        .flat_map(|pile| pile.cards().iter())
                        .chain(rider.iter().flat_map(|rider| rider.cards()));
                    for card in cards {
                        self.animator.destroy_now(surface, card.id());
                    }
                    for pile in (1..piles.len()).rev() {
                        surface.remove_pile(name, pile);
                    }
                    if piles.is_empty() {
                        surface.add_pile(name);
                    }
                } else {
                    let player = state.unseat_player(name)?;
                    let cards = player
                        .piles()
                        .iter()
                        .flat_map(|pile| pile.cards().iter())
                        .chain(player.rider().into_iter().flat_map(|rider| rider.cards()));
                    for card in cards {
                        self.animator.destroy_now(surface, card.id());
                    }
                    self.animator.abandon(surface, name);
                    surface.remove_player(name);
                }
                Ok(Applied::Changed)
            }
            ServerMessage::ReadyUpdate { data, show_button } => {
                let me = match local {
                    Some(local) if *show_button => Some(
                        state
                            .player_index(local)
                            .map_err(|_| ProtocolFault::LocalPlayerMissing(local.to_string()))?,
                    ),
                    _ => None,
                };
                for index in 0..state.players().len() {
                    let ready = data.get(index).copied().unwrap_or(false);
                    if let Some(player) = state.player_at_mut(index) {
                        player.set_ready(ready);
                        surface.set_ready(player.name(), ready);
                    }
                }
                let offer_button = me.is_some_and(|me| !data.get(me).copied().unwrap_or(false));
                Ok(Applied::ReadyUpdate { offer_button })
            }
            ServerMessage::Unknown => Ok(Applied::Ignored),
        }
    }

    /// Let timed animations run; dealt cards that have landed become
    /// playable
    pub fn advance(&mut self, now: Duration, state: &mut GameState, surface: &mut impl Surface) {
        for card in self.animator.advance(now, surface) {
            state.settle(card);
        }
    }

    /// When [`advance`](Self::advance) next has something to do
    pub fn next_deadline(&self) -> Option<Duration> {
        self.animator.next_deadline()
    }

    /// Let frame-counted animations run
    pub fn frame(&mut self, state: &mut GameState, surface: &mut impl Surface) {
        for card in self.animator.frame(surface) {
            state.settle(card);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CardType,
        model::Player,
        protocol::RiderData,
        test_support::{Call, RecordingSurface},
    };

    struct Table {
        state: GameState,
        surface: RecordingSurface,
        reducer: Reducer,
    }

    impl Table {
        fn new() -> Self {
            Self {
                state: GameState::new(),
                surface: RecordingSurface::new(),
                reducer: Reducer::new(Timings::default()),
            }
        }

        fn apply(&mut self, message: ServerMessage) -> Result<Applied, ProtocolFault> {
            self.reducer
                .apply(&mut self.state, &mut self.surface, Some("A"), &message)
        }

        fn json(&mut self, text: &str) -> Result<Applied, ProtocolFault> {
            self.apply(ServerMessage::decode(text).unwrap())
        }

        fn player(&self, name: &str) -> &Player {
            self.state.find_player(name).unwrap()
        }

        fn kinds(&self, name: &str, pile: usize) -> Vec<CardType> {
            self.player(name)
                .pile(pile)
                .unwrap()
                .cards()
                .iter()
                .map(|card| card.kind())
                .collect()
        }
    }

    fn create(name: &str, piles: Vec<Vec<CardType>>) -> ServerMessage {
        ServerMessage::CreatePlayer {
            name: name.to_string(),
            piles,
            rider: None,
        }
    }

    fn deal(player: &str, pile: usize, card: CardType) -> ServerMessage {
        ServerMessage::DealCard {
            player: player.to_string(),
            pile,
            card,
        }
    }

    fn play_rider(from: &str, pile: usize, index: usize, to: &str) -> ServerMessage {
        ServerMessage::PlayRider {
            player_from: from.to_string(),
            from_pile: pile,
            card_index: index,
            player_to: to.to_string(),
        }
    }

    fn remove_rider(player: &str, just_one_extra: bool) -> ServerMessage {
        ServerMessage::RemoveRider {
            player: player.to_string(),
            just_one_extra,
        }
    }

    #[test]
    fn test_play_rider_scenario() {
        let mut table = Table::new();
        table
            .json(r#"{"type":"CreatePlayer","name":"A","piles":[["hit"]],"rider":null}"#)
            .unwrap();
        table
            .json(r#"{"type":"CreatePlayer","name":"B","piles":[[]],"rider":null}"#)
            .unwrap();
        table
            .json(concat!(
                r#"{"type":"PlayRider","playerFrom":"A","fromPile":0,"#,
                r#""cardIndex":0,"playerTo":"B"}"#,
            ))
            .unwrap();

        let a = table.player("A");
        assert_eq!(a.piles().len(), 1);
        assert!(a.piles()[0].is_empty());
        let rider = table.player("B").rider().unwrap();
        assert_eq!(rider.rider().kind(), CardType::Hit);
        assert!(rider.extras().is_empty());
    }

    #[test]
    fn test_create_player_materializes_cards() {
        let mut table = Table::new();
        table
            .apply(ServerMessage::CreatePlayer {
                name: "A".to_string(),
                piles: vec![vec![CardType::Hit, CardType::Skip], vec![]],
                rider: Some(RiderData {
                    rider: CardType::Stop,
                    extras: vec![CardType::Extra],
                }),
            })
            .unwrap();
        table.apply(create("B", vec![vec![]])).unwrap();

        let a = table.player("A");
        assert_eq!(a.card_count(), 4);
        assert_eq!(a.rider().unwrap().extras()[0].kind(), CardType::Extra);
        assert!(a.piles()[0].cards().iter().all(|card| !card.is_pending_entry()));

        let calls = table.surface.take_calls();
        assert_eq!(calls[0], Call::CreatePlayer("A".to_string(), true));
        assert!(calls.contains(&Call::CreatePlayer("B".to_string(), false)));
        let piles_added = calls
            .iter()
            .filter(|call| matches!(call, Call::AddPile(name) if name == "A"))
            .count();
        assert_eq!(piles_added, 2);
    }

    #[test]
    fn test_deal_appends_pending_card_until_settled() {
        let mut table = Table::new();
        table.apply(create("A", vec![vec![CardType::Skip]])).unwrap();
        table.apply(deal("A", 0, CardType::Hit)).unwrap();

        assert_eq!(table.kinds("A", 0), [CardType::Skip, CardType::Hit]);
        let top = table.player("A").piles()[0].top().unwrap().clone();
        assert!(top.is_pending_entry());

        table
            .reducer
            .advance(Duration::from_millis(400), &mut table.state, &mut table.surface);
        assert!(!table.state.find_card(top.id()).unwrap().is_pending_entry());
    }

    #[test]
    fn test_deal_then_remove_pile_in_order() {
        let mut table = Table::new();
        table
            .apply(create("P", vec![vec![], vec![CardType::Skip]]))
            .unwrap();
        table.apply(deal("P", 0, CardType::Hit)).unwrap();
        let dealt = table.player("P").piles()[0].top().unwrap().id();
        table
            .apply(ServerMessage::RemovePile {
                player: "P".to_string(),
                pile: 0,
            })
            .unwrap();

        let p = table.player("P");
        assert_eq!(p.piles().len(), 1);
        assert_eq!(table.kinds("P", 0), [CardType::Skip]);
        assert!(table.state.find_card(dealt).is_none());
        assert!(table.surface.destroyed().contains(&dealt));
        assert!(!table.reducer.animator().is_animating(dealt));
    }

    #[test]
    fn test_remove_one_extra_never_pops_base_rider() {
        let mut table = Table::new();
        table
            .apply(create("A", vec![vec![CardType::Hit, CardType::Split]]))
            .unwrap();
        table.apply(create("B", vec![vec![]])).unwrap();
        table.apply(play_rider("A", 0, 1, "B")).unwrap();

        assert_eq!(table.apply(remove_rider("B", true)), Ok(Applied::Ignored));
        assert_eq!(
            table.player("B").rider().unwrap().rider().kind(),
            CardType::Split
        );

        table.apply(play_rider("A", 0, 0, "B")).unwrap();
        assert_eq!(table.player("B").rider().unwrap().extras().len(), 1);
        assert_eq!(table.apply(remove_rider("B", true)), Ok(Applied::Changed));
        let rider = table.player("B").rider().unwrap();
        assert_eq!(rider.rider().kind(), CardType::Split);
        assert!(rider.extras().is_empty());

        table.apply(remove_rider("B", false)).unwrap();
        assert!(table.player("B").rider().is_none());
    }

    #[test]
    fn test_remove_rider_without_rider_is_ignored() {
        let mut table = Table::new();
        table.apply(create("A", vec![])).unwrap();
        assert_eq!(table.apply(remove_rider("A", false)), Ok(Applied::Ignored));
    }

    #[test]
    fn test_play_and_discard_removes_card_from_model() {
        let mut table = Table::new();
        table
            .apply(create("A", vec![vec![CardType::Stop, CardType::Hit]]))
            .unwrap();
        table.apply(create("B", vec![vec![]])).unwrap();
        let stop = table.player("A").piles()[0].cards()[0].id();
        table
            .apply(ServerMessage::PlayAndDiscard {
                player_from: "A".to_string(),
                from_pile: 0,
                card_index: 0,
                player_to: "B".to_string(),
            })
            .unwrap();

        assert_eq!(table.kinds("A", 0), [CardType::Hit]);
        assert!(table.player("B").rider().is_none());
        assert!(table.state.find_card(stop).is_none());
        assert_eq!(table.reducer.animator().in_flight(), 1);

        table
            .reducer
            .advance(Duration::from_millis(800), &mut table.state, &mut table.surface);
        assert_eq!(table.surface.destroyed(), [stop]);
    }

    #[test]
    fn test_new_pile_and_remove_pile_keep_indices() {
        let mut table = Table::new();
        table.apply(create("A", vec![vec![CardType::Hit]])).unwrap();
        table
            .apply(ServerMessage::NewPile {
                player: "A".to_string(),
            })
            .unwrap();
        table.apply(deal("A", 1, CardType::Skip)).unwrap();
        table
            .apply(ServerMessage::NewPile {
                player: "A".to_string(),
            })
            .unwrap();
        table.apply(deal("A", 2, CardType::Stop)).unwrap();
        table
            .apply(ServerMessage::RemovePile {
                player: "A".to_string(),
                pile: 1,
            })
            .unwrap();

        assert_eq!(table.kinds("A", 0), [CardType::Hit]);
        assert_eq!(table.kinds("A", 1), [CardType::Stop]);
        assert!(
            table
                .surface
                .calls
                .contains(&Call::RemovePile("A".to_string(), 1))
        );
    }

    #[test]
    fn test_remove_player_only_data_keeps_seat() {
        let mut table = Table::new();
        table
            .apply(ServerMessage::CreatePlayer {
                name: "A".to_string(),
                piles: vec![vec![CardType::Hit], vec![CardType::Skip], vec![]],
                rider: Some(RiderData {
                    rider: CardType::Stop,
                    extras: vec![],
                }),
            })
            .unwrap();
        table.apply(create("B", vec![])).unwrap();
        table.surface.take_calls();
        table
            .apply(ServerMessage::RemovePlayer {
                name: "A".to_string(),
                only_data: true,
            })
            .unwrap();

        let a = table.player("A");
        assert_eq!(a.piles().len(), 1);
        assert!(a.piles()[0].is_empty());
        assert!(a.rider().is_none());
        assert_eq!(table.state.player_index("A").unwrap(), 0);
        assert_eq!(table.surface.destroyed().len(), 3);
        let removed_piles = table
            .surface
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::RemovePile(_, pile) => Some(*pile),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(removed_piles, [2, 1]);

        // a player with no piles gets one
        table.surface.take_calls();
        table
            .apply(ServerMessage::RemovePlayer {
                name: "B".to_string(),
                only_data: true,
            })
            .unwrap();
        assert_eq!(table.player("B").piles().len(), 1);
        assert_eq!(table.surface.calls, [Call::AddPile("B".to_string())]);
    }

    #[test]
    fn test_remove_player_fully() {
        let mut table = Table::new();
        table.apply(create("A", vec![vec![CardType::Hit]])).unwrap();
        table.apply(create("B", vec![vec![CardType::Stop]])).unwrap();
        table.apply(create("C", vec![])).unwrap();
        table
            .apply(ServerMessage::PlayAndDiscard {
                player_from: "A".to_string(),
                from_pile: 0,
                card_index: 0,
                player_to: "B".to_string(),
            })
            .unwrap();
        table
            .apply(ServerMessage::RemovePlayer {
                name: "B".to_string(),
                only_data: false,
            })
            .unwrap();

        let names = table
            .state
            .players()
            .iter()
            .map(Player::name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["A", "C"]);
        assert_eq!(table.surface.destroyed().len(), 2);
        assert_eq!(table.reducer.animator().in_flight(), 0);
        assert!(
            table
                .surface
                .calls
                .contains(&Call::RemovePlayer("B".to_string()))
        );
        assert!(table.state.find_player("B").is_err());
    }

    #[test]
    fn test_ready_update() {
        let mut table = Table::new();
        table.apply(create("B", vec![])).unwrap();
        table.apply(create("A", vec![])).unwrap();
        table.apply(create("C", vec![])).unwrap();

        let applied = table
            .apply(ServerMessage::ReadyUpdate {
                data: vec![true, false],
                show_button: true,
            })
            .unwrap();
        assert_eq!(applied, Applied::ReadyUpdate { offer_button: true });
        let ready = table
            .state
            .players()
            .iter()
            .map(Player::is_ready)
            .collect::<Vec<_>>();
        assert_eq!(ready, [true, false, false]);

        let applied = table
            .apply(ServerMessage::ReadyUpdate {
                data: vec![true, true, false, true],
                show_button: true,
            })
            .unwrap();
        assert_eq!(applied, Applied::ReadyUpdate { offer_button: false });

        let applied = table
            .apply(ServerMessage::ReadyUpdate {
                data: vec![false, false, false],
                show_button: false,
            })
            .unwrap();
        assert_eq!(applied, Applied::ReadyUpdate { offer_button: false });
    }

    #[test]
    fn test_ready_update_needs_local_player_when_offering() {
        let mut table = Table::new();
        table.apply(create("B", vec![])).unwrap();
        assert_eq!(
            table.apply(ServerMessage::ReadyUpdate {
                data: vec![true],
                show_button: true,
            }),
            Err(ProtocolFault::LocalPlayerMissing("A".to_string()))
        );
        assert!(!table.player("B").is_ready());
    }

    #[test]
    fn test_faults_leave_model_untouched() {
        let mut table = Table::new();
        table.apply(create("A", vec![vec![CardType::Hit]])).unwrap();
        let before = table.state.clone();

        assert_eq!(
            table.apply(play_rider("A", 0, 0, "Nobody")),
            Err(ProtocolFault::UnknownPlayer("Nobody".to_string()))
        );
        assert_eq!(
            table.apply(play_rider("A", 0, 1, "A")),
            Err(ProtocolFault::UnknownCard {
                player: "A".to_string(),
                pile: 0,
                index: 1
            })
        );
        assert_eq!(
            table.apply(deal("A", 3, CardType::Hit)),
            Err(ProtocolFault::UnknownPile {
                player: "A".to_string(),
                pile: 3
            })
        );
        assert_eq!(
            table.apply(create("A", vec![])),
            Err(ProtocolFault::DuplicatePlayer("A".to_string()))
        );
        assert!(table.apply(remove_rider("Z", false)).is_err());
        assert_eq!(table.state, before);
    }

    #[test]
    fn test_unknown_is_ignored() {
        let mut table = Table::new();
        assert_eq!(table.apply(ServerMessage::Unknown), Ok(Applied::Ignored));
    }

    #[test]
    fn test_card_conservation() {
        let mut table = Table::new();
        let mut added = 0;
        let mut removed = 0;

        table
            .apply(create("A", vec![vec![CardType::Hit, CardType::Extra], vec![]]))
            .unwrap();
        table.apply(create("B", vec![vec![CardType::Stop]])).unwrap();
        added += 3;

        for (pile, card) in [(0, CardType::Skip), (1, CardType::Split), (1, CardType::Hit)] {
            table.apply(deal("A", pile, card)).unwrap();
            added += 1;
        }
        table.apply(play_rider("A", 0, 2, "B")).unwrap();
        table.apply(play_rider("A", 1, 0, "B")).unwrap();
        table.apply(play_rider("B", 0, 0, "A")).unwrap();
        table.apply(remove_rider("B", true)).unwrap();
        removed += 1;
        table
            .apply(ServerMessage::PlayAndDiscard {
                player_from: "A".to_string(),
                from_pile: 0,
                card_index: 0,
                player_to: "B".to_string(),
            })
            .unwrap();
        removed += 1;
        table
            .apply(ServerMessage::RemovePile {
                player: "A".to_string(),
                pile: 1,
            })
            .unwrap();
        removed += 1;

        assert_eq!(table.state.card_count(), added - removed);
        assert_eq!(table.player("A").card_count(), 2);
        assert_eq!(table.player("B").card_count(), 1);
    }
}

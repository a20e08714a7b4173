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

//! The local mirror of the game
//!
//! Only the [`reducer`](crate::reducer) mutates this; everything else gets a
//! shared reference. Indices are load-bearing: piles and cards are never
//! compacted or reordered except as a server event says.

use crate::{CardType, error::ProtocolFault, protocol::RiderData};

/// Identity of one card, stable for as long as the card exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u64);

/// A card on the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    kind: CardType,
    pending_entry: bool,
}

impl Card {
    /// This card's identity
    pub fn id(&self) -> CardId {
        self.id
    }

    /// What kind of card this is
    pub fn kind(&self) -> CardType {
        self.kind
    }

    /// Whether the card is still being dealt and can't be picked up yet
    pub fn is_pending_entry(&self) -> bool {
        self.pending_entry
    }
}

/// One of a player's stacks of cards
///
/// The top card is the last one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Pile(Vec<Card>);

impl Pile {
    /// Cards from bottom to top
    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    /// The card that would be played from this pile
    pub fn top(&self) -> Option<&Card> {
        self.0.last()
    }

    /// A pile topped by a ground card can't be played from
    pub fn is_dead(&self) -> bool {
        self.top().is_some_and(|card| card.kind.is_ground())
    }

    #[expect(missing_docs)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[expect(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cards riding on a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rider {
    rider: Card,
    extras: Vec<Card>,
}

impl Rider {
    /// The card that started the ride
    pub fn rider(&self) -> &Card {
        &self.rider
    }

    /// Cards stacked on afterwards, oldest first
    pub fn extras(&self) -> &[Card] {
        &self.extras
    }

    /// The rider followed by the extras
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        std::iter::once(&self.rider).chain(self.extras.iter())
    }

    /// Total cards in the attachment
    pub fn card_count(&self) -> usize {
        1 + self.extras.len()
    }
}

/// Someone seated at the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    piles: Vec<Pile>,
    rider: Option<Rider>,
    ready: bool,
}

impl Player {
    /// The name every message uses to refer to this player
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Piles in server order
    pub fn piles(&self) -> &[Pile] {
        &self.piles
    }

    /// Who is riding this player, if anyone
    pub fn rider(&self) -> Option<&Rider> {
        self.rider.as_ref()
    }

    /// Whether the player has declared themselves ready
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Get a pile by index
    pub fn pile(&self, pile: usize) -> Result<&Pile, ProtocolFault> {
        self.piles.get(pile).ok_or_else(|| ProtocolFault::UnknownPile {
            player: self.name.clone(),
            pile,
        })
    }

    /// Get a card by pile and position within the pile
    pub fn card(&self, pile: usize, index: usize) -> Result<&Card, ProtocolFault> {
        self.pile(pile)?
            .0
            .get(index)
            .ok_or_else(|| ProtocolFault::UnknownCard {
                player: self.name.clone(),
                pile,
                index,
            })
    }

    /// Cards held in piles plus cards riding on this player
    pub fn card_count(&self) -> usize {
        let riding = self.rider.as_ref().map_or(0, Rider::card_count);
        self.piles.iter().map(Pile::len).sum::<usize>() + riding
    }

    /// Whether any pile holds a ground card, anywhere in it
    pub fn holds_ground(&self) -> bool {
        self.piles
            .iter()
            .any(|pile| pile.0.iter().any(|card| card.kind.is_ground()))
    }

    pub(crate) fn push_card(&mut self, pile: usize, card: Card) -> Result<(), ProtocolFault> {
        self.pile(pile)?;
        self.piles[pile].0.push(card);
        Ok(())
    }

    pub(crate) fn take_card(&mut self, pile: usize, index: usize) -> Result<Card, ProtocolFault> {
        self.card(pile, index)?;
        Ok(self.piles[pile].0.remove(index))
    }

    /// Attach a card, as the rider if nobody is riding yet
    pub(crate) fn attach(&mut self, card: Card) {
        match self.rider {
            Some(ref mut rider) => rider.extras.push(card),
            None => {
                self.rider = Some(Rider {
                    rider: card,
                    extras: Vec::new(),
                })
            }
        }
    }

    pub(crate) fn pop_extra(&mut self) -> Option<Card> {
        self.rider.as_mut()?.extras.pop()
    }

    pub(crate) fn take_rider(&mut self) -> Option<Rider> {
        self.rider.take()
    }

    pub(crate) fn push_pile(&mut self) {
        self.piles.push(Pile::default());
    }

    pub(crate) fn remove_pile(&mut self, pile: usize) -> Result<Pile, ProtocolFault> {
        self.pile(pile)?;
        Ok(self.piles.remove(pile))
    }

    /// Drop every card, leaving one empty pile and no rider
    pub(crate) fn clear(&mut self) -> (Vec<Pile>, Option<Rider>) {
        let piles = std::mem::replace(&mut self.piles, vec![Pile::default()]);
        (piles, self.rider.take())
    }

    pub(crate) fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    fn cards_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        let riders = self
            .rider
            .iter_mut()
            .flat_map(|rider| std::iter::once(&mut rider.rider).chain(rider.extras.iter_mut()));
        self.piles
            .iter_mut()
            .flat_map(|pile| pile.0.iter_mut())
            .chain(riders)
    }
}

/// Everyone at the table, in the order the server seated them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    players: Vec<Player>,
    next_card: u64,
}

impl GameState {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Players in seating order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look a player up by name
    pub fn find_player(&self, name: &str) -> Result<&Player, ProtocolFault> {
        self.players
            .iter()
            .find(|player| player.name == name)
            .ok_or_else(|| ProtocolFault::UnknownPlayer(name.to_string()))
    }

    /// Seat position of a player
    pub fn player_index(&self, name: &str) -> Result<usize, ProtocolFault> {
        self.players
            .iter()
            .position(|player| player.name == name)
            .ok_or_else(|| ProtocolFault::UnknownPlayer(name.to_string()))
    }

    /// Find a card wherever it is
    pub fn find_card(&self, id: CardId) -> Option<&Card> {
        self.players.iter().find_map(|player| {
            player
                .piles
                .iter()
                .flat_map(|pile| pile.0.iter())
                .chain(player.rider.iter().flat_map(Rider::cards))
                .find(|card| card.id == id)
        })
    }

    /// Total cards on the table
    pub fn card_count(&self) -> usize {
        self.players.iter().map(Player::card_count).sum()
    }

    pub(crate) fn find_player_mut(&mut self, name: &str) -> Result<&mut Player, ProtocolFault> {
        self.players
            .iter_mut()
            .find(|player| player.name == name)
            .ok_or_else(|| ProtocolFault::UnknownPlayer(name.to_string()))
    }

    pub(crate) fn player_at_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    /// Mint a new card
    pub(crate) fn new_card(&mut self, kind: CardType) -> Card {
        let id = CardId(self.next_card);
        self.next_card += 1;
        Card {
            id,
            kind,
            pending_entry: false,
        }
    }

    /// Mint a card that is still sliding into place
    pub(crate) fn deal_card(&mut self, kind: CardType) -> Card {
        Card {
            pending_entry: true,
            ..self.new_card(kind)
        }
    }

    /// Seat a new player at the end of the table
    pub(crate) fn seat_player(
        &mut self,
        name: &str,
        piles: &[Vec<CardType>],
        rider: Option<&RiderData>,
    ) -> Result<&Player, ProtocolFault> {
        if self.find_player(name).is_ok() {
            return Err(ProtocolFault::DuplicatePlayer(name.to_string()));
        }

        let piles = piles
            .iter()
            .map(|pile| Pile(pile.iter().map(|kind| self.new_card(*kind)).collect()))
            .collect();
        let rider = rider.map(|rider| Rider {
            rider: self.new_card(rider.rider),
            extras: rider
                .extras
                .iter()
                .map(|kind| self.new_card(*kind))
                .collect(),
        });
        self.players.push(Player {
            name: name.to_string(),
            piles,
            rider,
            ready: false,
        });
        Ok(&self.players[self.players.len() - 1])
    }

    pub(crate) fn unseat_player(&mut self, name: &str) -> Result<Player, ProtocolFault> {
        let index = self.player_index(name)?;
        Ok(self.players.remove(index))
    }

    /// Mark a dealt card as settled; returns false if the card is gone
    pub(crate) fn settle(&mut self, id: CardId) -> bool {
        for player in &mut self.players {
            if let Some(card) = player.cards_mut().find(|card| card.id == id) {
                card.pending_entry = false;
                return true;
            }
        }
        false
    }
}

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// A room's private 52-card deck.
///
/// Cards are handed out front to back and never replaced until the next
/// [`Deck::reset`], so every card dealt within one hand is distinct.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
    stacked: Option<Vec<Card>>,
}

impl Deck {
    /// Creates a deck seeded from the thread RNG.
    pub fn new() -> Self {
        Self::new_with_seed(rand::random())
    }

    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until reset is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            rng,
            stacked: None,
        }
    }

    /// Repopulates all 52 cards and applies a uniform shuffle.
    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.position = 0;
        match self.stacked.take() {
            Some(order) => {
                // stacked cards go on top, the rest keep a shuffled order
                self.cards.retain(|c| !order.contains(c));
                self.cards.shuffle(&mut self.rng);
                let mut top = order;
                top.append(&mut self.cards);
                self.cards = top;
            }
            None => self.cards.shuffle(&mut self.rng),
        }
    }

    /// Removes and returns the next `n` cards.
    ///
    /// # Panics
    ///
    /// Panics when fewer than `n` cards remain. The betting flow never deals
    /// more than 8 × 2 + 5 cards per hand, so this is an engine bug.
    pub fn deal(&mut self, n: usize) -> Vec<Card> {
        assert!(
            n <= self.remaining(),
            "deck exhausted: requested {n} cards, {} remaining",
            self.remaining()
        );
        let dealt = self.cards[self.position..self.position + n].to_vec();
        self.position += n;
        dealt
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    /// Fixes the order of the first cards dealt after the next reset.
    /// Duplicates are dropped; the remaining cards are shuffled below them.
    #[doc(hidden)]
    pub fn stack(&mut self, order: Vec<Card>) {
        let mut unique = Vec::with_capacity(order.len());
        for card in order {
            if !unique.contains(&card) {
                unique.push(card);
            }
        }
        self.stacked = Some(unique);
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn stacked_cards_come_out_first_after_reset() {
        let ace = Card::new(Rank::Ace, Suit::Spades);
        let king = Card::new(Rank::King, Suit::Hearts);
        let mut deck = Deck::new_with_seed(9);
        deck.stack(vec![ace, king, ace]);
        deck.reset();
        assert_eq!(deck.deal(2), vec![ace, king]);
        assert_eq!(deck.remaining(), 50);

        // only the next reset is affected
        deck.reset();
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    #[should_panic(expected = "deck exhausted")]
    fn over_dealing_panics() {
        let mut deck = Deck::new_with_seed(1);
        deck.reset();
        deck.deal(50);
        deck.deal(3);
    }
}

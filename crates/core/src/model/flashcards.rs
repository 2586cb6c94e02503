use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Word;

/// Shuffled flashcard run over a unit's vocabulary.
///
/// The cursor may sit one past the last card, which means the run is finished.
#[derive(Debug, Clone)]
pub struct FlashcardDeck {
    cards: Vec<Word>,
    index: usize,
}

impl FlashcardDeck {
    #[must_use]
    pub fn shuffled<R: Rng>(words: &[Word], rng: &mut R) -> Self {
        let mut cards = words.to_vec();
        cards.shuffle(rng);
        Self { cards, index: 0 }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Word> {
        self.cards.get(self.index)
    }

    /// Move to the next card; returns it, or `None` once the run is finished.
    pub fn next_card(&mut self) -> Option<&Word> {
        if self.index < self.cards.len() {
            self.index += 1;
        }
        self.current()
    }

    pub fn previous_card(&mut self) -> Option<&Word> {
        self.index = self.index.saturating_sub(1);
        self.current()
    }

    /// Reshuffle and start over.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.index = 0;
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.index >= self.cards.len()
    }

    /// 1-based position and total, e.g. `(3, 12)` for "Card 3 / 12".
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        ((self.index + 1).min(self.cards.len()), self.cards.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

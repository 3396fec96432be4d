//! Copy practice: random code table entries filtered by category and length.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cw::table::{self, Category, CodeEntry};

/// Which entries a drill may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillFilter {
    /// Letters by code length, index 0 = one symbol
    pub letter_lengths: [bool; 4],
    pub digits: bool,
    pub punctuation: bool,
}

impl Default for DrillFilter {
    fn default() -> Self {
        Self {
            letter_lengths: [true; 4],
            digits: true,
            punctuation: true,
        }
    }
}

impl DrillFilter {
    pub fn allows(&self, entry: &CodeEntry) -> bool {
        match entry.category() {
            Category::Letter => {
                let len = entry.pattern().len();
                (1..=4).contains(&len) && self.letter_lengths[len - 1]
            }
            Category::Digit => self.digits,
            Category::Punctuation => self.punctuation,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Drill {
    filter: DrillFilter,
    previous: Option<char>,
    correct: u32,
    attempted: u32,
}

impl Drill {
    pub fn new(filter: DrillFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Pick the next entry, avoiding an immediate repeat when possible.
    /// `None` if the filter allows nothing.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&'static CodeEntry> {
        let allowed: Vec<&'static CodeEntry> = table::entries()
            .iter()
            .filter(|e| self.filter.allows(e))
            .collect();

        let fresh: Vec<&'static CodeEntry> = allowed
            .iter()
            .copied()
            .filter(|e| Some(e.character()) != self.previous)
            .collect();

        let pool = if fresh.is_empty() { &allowed } else { &fresh };
        let entry = *pool.choose(rng)?;
        self.previous = Some(entry.character());
        Some(entry)
    }

    /// Score an answer keyed in direct mode: the dit/dah glyphs must spell
    /// the expected character's code. Surrounding whitespace is ignored.
    pub fn check(&mut self, expected: char, answer: &str) -> bool {
        let ok = table::encode_pretty(expected)
            .map(|code| answer.trim() == code)
            .unwrap_or(false);
        self.attempted += 1;
        if ok {
            self.correct += 1;
        }
        ok
    }

    /// (correct, attempted)
    pub fn score(&self) -> (u32, u32) {
        (self.correct, self.attempted)
    }

    pub fn filter(&self) -> &DrillFilter {
        &self.filter
    }
}

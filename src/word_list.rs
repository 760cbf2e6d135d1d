use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the `WordList`'s `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a given slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let glyphs = string.chars().collect();
        Word { string, glyphs }
    }

    /// Length in characters, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The candidate words for a fill. Words are trimmed, upper-cased, deduplicated and sorted, so
/// the same set of input words always produces the same `WordId`s regardless of input order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<Word>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    pub fn new<I, S>(words: I) -> WordList
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        let normalized: BTreeSet<String> = words.into_iter().filter_map(|word| {
            let word = word.as_ref().trim();
            if word.is_empty() {
                None
            } else {
                Some(word.to_uppercase())
            }
        }).collect();

        WordList {
            words: normalized.into_iter().map(Word::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn get(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Look up the id of a word, applying the same normalization used when building the list.
    pub fn find(&self, word: &str) -> Option<WordId> {
        let normalized = word.trim().to_uppercase();
        self.words.binary_search_by(|candidate| candidate.string.as_str().cmp(&normalized)).ok()
    }
}

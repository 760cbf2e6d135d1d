use bit_set::BitSet;

use crate::grid::{Crossword, VariableId};
use crate::word_list::WordId;

/// The live set of candidate words for each variable, indexed by `VariableId`. Each domain is a
/// set of `WordId`s, so iteration always follows word list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    domains: Vec<BitSet>,
}

/// An independent copy of every domain, taken before a search branch so that any pruning done
/// on that branch can be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSnapshot {
    domains: Vec<BitSet>,
}

impl Domains {
    /// Start every variable off with the crossword's full word list.
    pub fn new(crossword: &Crossword) -> Domains {
        let word_count = crossword.word_list().len();
        let mut all_words = BitSet::with_capacity(word_count);
        for word_id in 0..word_count {
            all_words.insert(word_id);
        }

        Domains {
            domains: crossword.variables().iter().map(|_| all_words.clone()).collect(),
        }
    }

    pub fn get(&self, variable_id: VariableId) -> &BitSet {
        &self.domains[variable_id]
    }

    pub fn replace(&mut self, variable_id: VariableId, words: BitSet) {
        self.domains[variable_id] = words;
    }

    /// Remove a single word from a domain, returning whether it was present.
    pub fn remove(&mut self, variable_id: VariableId, word_id: WordId) -> bool {
        self.domains[variable_id].remove(word_id)
    }

    pub fn contains(&self, variable_id: VariableId, word_id: WordId) -> bool {
        self.domains[variable_id].contains(word_id)
    }

    /// How many words remain for this variable?
    pub fn len(&self, variable_id: VariableId) -> usize {
        self.domains[variable_id].len()
    }

    pub fn is_empty(&self, variable_id: VariableId) -> bool {
        self.domains[variable_id].is_empty()
    }

    /// The first variable left without any options, if there is one.
    pub fn first_empty(&self) -> Option<VariableId> {
        self.domains.iter().position(|domain| domain.is_empty())
    }

    pub fn any_empty(&self) -> bool {
        self.first_empty().is_some()
    }

    /// Total number of candidate words across every variable.
    pub fn total_len(&self) -> usize {
        self.domains.iter().map(|domain| domain.len()).sum()
    }

    pub fn snapshot(&self) -> DomainSnapshot {
        DomainSnapshot { domains: self.domains.clone() }
    }

    pub fn restore(&mut self, snapshot: DomainSnapshot) {
        self.domains = snapshot.domains;
    }
}

#[cfg(test)]
mod tests {
    use bit_set::BitSet;

    use crate::domains::Domains;
    use crate::grid::generate_crossword_from_template_string;

    #[test]
    fn test_domains_start_with_every_word() {
        let crossword = generate_crossword_from_template_string(
            ["cat", "dog", "bird"],
            "
            ___
            _##
            _##
            ",
        );
        let domains = Domains::new(&crossword);

        assert_eq!(crossword.variables().len(), 2);
        assert_eq!(domains.len(0), 3);
        assert_eq!(domains.len(1), 3);
        assert_eq!(domains.total_len(), 6);
        assert!(!domains.any_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let crossword = generate_crossword_from_template_string(
            ["cat", "dog", "bird"],
            "
            ___
            _##
            _##
            ",
        );
        let mut domains = Domains::new(&crossword);
        let snapshot = domains.snapshot();

        assert!(domains.remove(0, 1));
        assert!(!domains.remove(0, 1));
        domains.replace(1, BitSet::new());
        assert_eq!(domains.len(0), 2);
        assert_eq!(domains.first_empty(), Some(1));

        domains.restore(snapshot.clone());
        assert_eq!(domains.snapshot(), snapshot);
        assert!(domains.contains(0, 1));
        assert_eq!(domains.len(1), 3);
    }
}

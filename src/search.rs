//! Backtracking search over partial assignments. Variables are chosen by fewest remaining values
//! with ties going to the most-crossed slot, and values are tried least-constraining first. The
//! first complete, consistent assignment found is returned.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, info, trace};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::consistency::{enforce_node_consistency, establish_arc_consistency, is_arc_consistent, Arc};
use crate::domains::Domains;
use crate::grid::{Crossword, Variable, VariableId};
use crate::word_list::WordId;
use crate::MAX_SLOT_LENGTH;

/// Optional caps on how much searching we're willing to do. The default is unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_states: Option<u64>,
    pub time_limit: Option<Duration>,
}

/// Settings for a fill operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillOptions {
    /// Re-run arc consistency from each tentatively assigned variable, pruning its neighbors
    /// for the rest of that branch.
    pub maintain_arc_consistency: bool,
    pub limits: SearchLimits,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub values_tried: u64,
    pub revisions: usize,
    pub duration: Duration,
}

/// A struct recording a variable assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub variable_id: VariableId,
    pub word_id: WordId,
}

/// A mapping from variables to chosen words. Each variable appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: BTreeMap<VariableId, WordId>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Does this assignment cover every variable in the crossword?
    pub fn is_complete(&self, crossword: &Crossword) -> bool {
        self.words.len() == crossword.variables().len()
    }

    pub fn get(&self, variable_id: VariableId) -> Option<WordId> {
        self.words.get(&variable_id).copied()
    }

    pub fn contains(&self, variable_id: VariableId) -> bool {
        self.words.contains_key(&variable_id)
    }

    /// Assign a word, returning the word previously assigned to the variable if there was one.
    pub fn insert(&mut self, variable_id: VariableId, word_id: WordId) -> Option<WordId> {
        self.words.insert(variable_id, word_id)
    }

    pub fn remove(&mut self, variable_id: VariableId) -> Option<WordId> {
        self.words.remove(&variable_id)
    }

    /// The choices making up this assignment, in variable order.
    pub fn choices(&self) -> impl Iterator<Item=Choice> + '_ {
        self.words.iter().map(|(&variable_id, &word_id)| Choice { variable_id, word_id })
    }

    /// The word assigned to a variable, looked up structurally.
    pub fn word<'a>(&self, crossword: &'a Crossword, variable: &Variable) -> Option<&'a str> {
        let variable_id = crossword.variable_id(variable)?;
        self.get(variable_id).map(|word_id| crossword.word_list().get(word_id).string.as_str())
    }

    /// Every assigned variable along with its word.
    pub fn words<'a>(&self, crossword: &'a Crossword) -> BTreeMap<Variable, &'a str> {
        self.choices().map(|Choice { variable_id, word_id }| {
            (*crossword.variable(variable_id), crossword.word_list().get(word_id).string.as_str())
        }).collect()
    }
}

/// Is this (possibly partial) assignment consistent? That means all words are distinct, every
/// word fits its variable, and every pair of crossing variables agrees on the shared letter.
pub fn is_consistent(crossword: &Crossword, assignment: &Assignment) -> bool {
    let word_list = crossword.word_list();
    let mut seen: HashSet<WordId> = HashSet::with_capacity(assignment.len());

    for Choice { variable_id, word_id } in assignment.choices() {
        if !seen.insert(word_id) {
            return false;
        }

        let word = word_list.get(word_id);
        if word.len() != crossword.variable(variable_id).length {
            return false;
        }

        for &neighbor_id in crossword.neighbors(variable_id) {
            if let Some(neighbor_word_id) = assignment.get(neighbor_id) {
                let overlap = crossword.overlap(variable_id, neighbor_id)
                    .expect("Neighbors always overlap");
                if word.glyphs.get(overlap.first) != word_list.get(neighbor_word_id).glyphs.get(overlap.second) {
                    return false;
                }
            }
        }
    }

    true
}

/// Would `assignment` stay consistent if `variable_id` took `word_id`? This only checks the new
/// variable against the others, so it matches `is_consistent` as long as the rest of the
/// assignment is already consistent.
pub fn is_consistent_with(
    crossword: &Crossword,
    assignment: &Assignment,
    variable_id: VariableId,
    word_id: WordId,
) -> bool {
    let word_list = crossword.word_list();
    let word = word_list.get(word_id);

    if word.len() != crossword.variable(variable_id).length {
        return false;
    }

    if assignment.choices().any(|choice| choice.variable_id != variable_id && choice.word_id == word_id) {
        return false;
    }

    crossword.neighbors(variable_id).iter().all(|&neighbor_id| {
        match assignment.get(neighbor_id) {
            Some(neighbor_word_id) => {
                let overlap = crossword.overlap(variable_id, neighbor_id)
                    .expect("Neighbors always overlap");
                word.glyphs.get(overlap.first) == word_list.get(neighbor_word_id).glyphs.get(overlap.second)
            }
            None => true,
        }
    })
}

/// Choose the unassigned variable with the fewest remaining options, preferring the one that
/// crosses the most other variables and then the lowest id.
pub fn select_unassigned_variable(
    crossword: &Crossword,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<VariableId> {
    (0..crossword.variables().len())
        .filter(|&variable_id| !assignment.contains(variable_id))
        .min_by_key(|&variable_id| {
            (domains.len(variable_id), Reverse(crossword.degree(variable_id)), variable_id)
        })
}

/// Return the options for `variable_id` ordered by how many options they would rule out for its
/// unassigned neighbors, fewest first. Ties stay in word list order. Domains aren't modified.
pub fn order_domain_values(
    crossword: &Crossword,
    domains: &Domains,
    variable_id: VariableId,
    assignment: &Assignment,
) -> Vec<WordId> {
    let word_list = crossword.word_list();

    // For each unassigned neighbor, count how many of its options put each glyph in the shared
    // cell. A word rules out every option that doesn't share its glyph there.
    let glyph_counts_by_neighbor: SmallVec<[(usize, usize, HashMap<char, usize>); MAX_SLOT_LENGTH]> =
        crossword.neighbors(variable_id).iter()
            .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
            .map(|&neighbor_id| {
                let overlap = crossword.overlap(variable_id, neighbor_id)
                    .expect("Neighbors always overlap");
                let mut glyph_counts: HashMap<char, usize> = HashMap::new();
                for neighbor_word_id in domains.get(neighbor_id) {
                    if let Some(&glyph) = word_list.get(neighbor_word_id).glyphs.get(overlap.second) {
                        *glyph_counts.entry(glyph).or_insert(0) += 1;
                    }
                }
                (overlap.first, domains.len(neighbor_id), glyph_counts)
            })
            .collect();

    let mut values: Vec<(usize, WordId)> = domains.get(variable_id).iter().map(|word_id| {
        let word = word_list.get(word_id);
        let ruled_out: usize = glyph_counts_by_neighbor.iter().map(|(cell_idx, option_count, glyph_counts)| {
            let compatible = word.glyphs.get(*cell_idx)
                .and_then(|glyph| glyph_counts.get(glyph))
                .copied()
                .unwrap_or(0);
            option_count - compatible
        }).sum();
        (ruled_out, word_id)
    }).collect();

    values.sort_by_key(|&(ruled_out, _)| ruled_out);

    values.into_iter().map(|(_, word_id)| word_id).collect()
}

/// A struct representing the results of a fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub assignment: Assignment,
    pub statistics: Statistics,
}

/// Why a fill operation didn't produce an assignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillFailure {
    /// Node or arc consistency left a variable without options, so no search was needed.
    #[error("no candidate words fit {variable:?}")]
    EmptyDomain { variable: Variable },

    /// The search tried everything without finding a consistent assignment.
    #[error("no solution")]
    NoSolution,

    /// The configured state or time limit ran out before the search finished.
    #[error("search limit reached after {states} states")]
    ExhaustedBudget { states: u64 },
}

/// Live state of a single fill operation.
struct Search<'a> {
    crossword: &'a Crossword,
    options: &'a FillOptions,
    domains: Domains,
    assignment: Assignment,
    statistics: Statistics,
    start: Instant,
}

impl<'a> Search<'a> {
    fn check_limits(&self) -> Result<(), FillFailure> {
        let limits = &self.options.limits;
        let out_of_states = limits.max_states
            .map(|max_states| self.statistics.states >= max_states)
            .unwrap_or(false);
        let out_of_time = limits.time_limit
            .map(|time_limit| self.start.elapsed() >= time_limit)
            .unwrap_or(false);

        if out_of_states || out_of_time {
            debug!("Giving up after {} states and {:?}", self.statistics.states, self.start.elapsed());
            return Err(FillFailure::ExhaustedBudget { states: self.statistics.states });
        }
        Ok(())
    }

    /// Apply the consequences of the tentative choice to the neighbors' domains, if we're
    /// maintaining arc consistency. Returns false if some neighbor ran out of options.
    fn propagate(&mut self, choice: Choice) -> bool {
        if !self.options.maintain_arc_consistency {
            return true;
        }

        let mut only_choice = BitSet::with_capacity(choice.word_id + 1);
        only_choice.insert(choice.word_id);
        self.domains.replace(choice.variable_id, only_choice);

        let arcs: Vec<Arc> = self.crossword.neighbors(choice.variable_id).iter()
            .filter(|&&neighbor_id| !self.assignment.contains(neighbor_id))
            .map(|&neighbor_id| (neighbor_id, choice.variable_id))
            .collect();

        match establish_arc_consistency(self.crossword, &mut self.domains, Some(&arcs)) {
            Ok(success) => {
                self.statistics.revisions += success.revisions;
                true
            }
            Err(failure) => {
                self.statistics.revisions += failure.revisions;
                false
            }
        }
    }

    /// Extend the current assignment to a complete one. Returns `Ok(false)` if no extension
    /// exists, leaving the assignment and domains as they were.
    fn backtrack(&mut self) -> Result<bool, FillFailure> {
        if self.assignment.is_complete(self.crossword) {
            return Ok(is_consistent(self.crossword, &self.assignment));
        }

        self.check_limits()?;
        self.statistics.states += 1;

        let variable_id =
            match select_unassigned_variable(self.crossword, &self.domains, &self.assignment) {
                Some(variable_id) => variable_id,
                None => return Ok(false),
            };

        for word_id in order_domain_values(self.crossword, &self.domains, variable_id, &self.assignment) {
            self.statistics.values_tried += 1;

            if !is_consistent_with(self.crossword, &self.assignment, variable_id, word_id) {
                continue;
            }

            // Domains only change during search when we're propagating choices.
            let snapshot = if self.options.maintain_arc_consistency {
                Some(self.domains.snapshot())
            } else {
                None
            };

            let choice = Choice { variable_id, word_id };
            trace!("Trying {} for {:?}", self.crossword.word_list().get(word_id).string, self.crossword.variable(variable_id));
            self.assignment.insert(variable_id, word_id);

            if self.propagate(choice) && self.backtrack()? {
                return Ok(true);
            }

            self.assignment.remove(variable_id);
            if let Some(snapshot) = snapshot {
                self.domains.restore(snapshot);
            }
        }

        self.statistics.backtracks += 1;
        Ok(false)
    }
}

/// Prune every domain down to words that fit their slot and have support in every crossing slot.
/// Fails without searching if that leaves any variable with no options.
fn enforce_initial_consistency(
    crossword: &Crossword,
    statistics: &mut Statistics,
) -> Result<Domains, FillFailure> {
    let mut domains = Domains::new(crossword);

    enforce_node_consistency(crossword, &mut domains);
    if let Some(variable_id) = domains.first_empty() {
        let variable = *crossword.variable(variable_id);
        info!("No words of length {} for {:?}", variable.length, variable);
        return Err(FillFailure::EmptyDomain { variable });
    }

    match establish_arc_consistency(crossword, &mut domains, None) {
        Ok(success) => {
            statistics.revisions += success.revisions;
            Ok(domains)
        }
        Err(failure) => {
            let variable = *crossword.variable(failure.variable_id);
            info!("Arc consistency left no options for {:?}", variable);
            Err(FillFailure::EmptyDomain { variable })
        }
    }
}

/// Search for a valid fill for the given crossword: establish node and arc consistency, then
/// backtrack over what's left.
pub fn find_fill(crossword: &Crossword, options: &FillOptions) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let domains = enforce_initial_consistency(crossword, &mut statistics)?;
    debug_assert!(!domains.any_empty() && is_arc_consistent(crossword, &domains));
    debug!(
        "{} options left across {} variables after initial consistency",
        domains.total_len(),
        crossword.variables().len(),
    );

    let mut search = Search {
        crossword,
        options,
        domains,
        assignment: Assignment::new(),
        statistics,
        start,
    };

    let solved = search.backtrack()?;
    search.statistics.duration = start.elapsed();

    if solved {
        info!("Found a fill: {:?}", search.statistics);
        Ok(FillSuccess {
            assignment: search.assignment,
            statistics: search.statistics,
        })
    } else {
        info!("Exhausted the search: {:?}", search.statistics);
        Err(FillFailure::NoSolution)
    }
}

#[cfg(test)]
mod tests {
    use instant::Duration;

    use crate::consistency::enforce_node_consistency;
    use crate::domains::Domains;
    use crate::grid::Direction::{Across, Down};
    use crate::grid::{generate_crossword_from_template_string, Crossword, Variable};
    use crate::search::{
        find_fill, is_consistent, is_consistent_with, order_domain_values,
        select_unassigned_variable, Assignment, FillFailure, FillOptions, SearchLimits,
    };

    fn word_id(crossword: &Crossword, word: &str) -> usize {
        crossword.word_list().find(word).unwrap()
    }

    fn corner_crossword(words: &[&str]) -> Crossword {
        generate_crossword_from_template_string(
            words.iter().copied(),
            "
            ___
            _##
            _##
            ",
        )
    }

    /// #___#
    /// #_##_
    /// #_##_
    /// #_##_
    /// #____
    fn number_crossword() -> Crossword {
        generate_crossword_from_template_string(
            ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"],
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        )
    }

    #[test]
    fn test_single_slot() {
        let crossword = generate_crossword_from_template_string(["cat", "dog"], "___");

        let result = find_fill(&crossword, &FillOptions::default()).expect("Failed to find a fill");

        assert_eq!(result.assignment.len(), 1);
        let word = result.assignment.word(&crossword, &Variable::new(0, 0, Across, 3)).unwrap();
        assert!(word == "CAT" || word == "DOG");
    }

    #[test]
    fn test_crossing_slots_share_first_letter() {
        let crossword = corner_crossword(&["cat", "car", "arc"]);

        let result = find_fill(&crossword, &FillOptions::default()).expect("Failed to find a fill");
        let across = result.assignment.word(&crossword, &Variable::new(0, 0, Across, 3)).unwrap();
        let down = result.assignment.word(&crossword, &Variable::new(0, 0, Down, 3)).unwrap();

        assert_eq!(down, "CAR");
        assert_eq!(across, "CAT");
        assert!(is_consistent(&crossword, &result.assignment));
    }

    #[test]
    fn test_length_mismatch_fails_before_search() {
        let crossword = generate_crossword_from_template_string(
            ["apple", "mango"],
            "
            ___
            _##
            _##
            _##
            ",
        );

        let failure = find_fill(&crossword, &FillOptions::default()).unwrap_err();

        assert_eq!(failure, FillFailure::EmptyDomain { variable: Variable::new(0, 0, Down, 4) });
    }

    #[test]
    fn test_empty_word_list_fails() {
        let crossword = generate_crossword_from_template_string(Vec::<String>::new(), "__");

        let failure = find_fill(&crossword, &FillOptions::default()).unwrap_err();

        assert_eq!(failure, FillFailure::EmptyDomain { variable: Variable::new(0, 0, Across, 2) });
    }

    #[test]
    fn test_grid_without_slots_is_trivially_filled() {
        let crossword = generate_crossword_from_template_string(Vec::<String>::new(), "_#_");

        let result = find_fill(&crossword, &FillOptions::default()).expect("Failed to find a fill");

        assert!(result.assignment.is_empty());
        assert_eq!(result.statistics.states, 0);
    }

    #[test]
    fn test_arc_consistent_grid_can_still_fail() {
        // Both slots could only take CAT, which would use it twice.
        let crossword = corner_crossword(&["cat"]);

        let failure = find_fill(&crossword, &FillOptions::default()).unwrap_err();

        assert_eq!(failure, FillFailure::NoSolution);
    }

    #[test]
    fn test_number_crossword() {
        let crossword = number_crossword();

        for maintain_arc_consistency in [false, true] {
            let options = FillOptions { maintain_arc_consistency, ..FillOptions::default() };
            let result = find_fill(&crossword, &options).expect("Failed to find a fill");
            let words = result.assignment.words(&crossword);

            assert_eq!(words[&Variable::new(0, 1, Down, 5)], "SEVEN");
            assert_eq!(words[&Variable::new(0, 1, Across, 3)], "SIX");
            assert_eq!(words[&Variable::new(1, 4, Down, 4)], "FIVE");
            assert_eq!(words[&Variable::new(4, 1, Across, 4)], "NINE");
        }
    }

    #[test]
    fn test_fill_is_deterministic() {
        let first = find_fill(&number_crossword(), &FillOptions::default()).unwrap();
        let second = find_fill(&number_crossword(), &FillOptions::default()).unwrap();

        assert_eq!(first.assignment, second.assignment);
        assert_eq!(first.statistics.states, second.statistics.states);
    }

    #[test]
    fn test_state_limit() {
        let crossword = number_crossword();
        let options = FillOptions {
            limits: SearchLimits { max_states: Some(0), time_limit: None },
            ..FillOptions::default()
        };

        let failure = find_fill(&crossword, &options).unwrap_err();

        assert_eq!(failure, FillFailure::ExhaustedBudget { states: 0 });
    }

    #[test]
    fn test_time_limit() {
        let crossword = number_crossword();
        let options = FillOptions {
            limits: SearchLimits { max_states: None, time_limit: Some(Duration::ZERO) },
            ..FillOptions::default()
        };

        let failure = find_fill(&crossword, &options).unwrap_err();

        assert_eq!(failure, FillFailure::ExhaustedBudget { states: 0 });
    }

    #[test]
    fn test_select_prefers_fewest_options_then_degree() {
        let crossword = number_crossword();
        let mut domains = Domains::new(&crossword);
        let assignment = Assignment::new();

        // Before pruning every domain is the same size, so the most-crossed slot wins.
        assert_eq!(select_unassigned_variable(&crossword, &domains, &assignment), Some(0));

        // Afterwards three slots are left with 3 options each. The 4-letter down slot crosses
        // only one other slot, and the 5-letter down slot has a lower id than the bottom one.
        enforce_node_consistency(&crossword, &mut domains);
        assert_eq!(domains.len(0), 3);
        assert_eq!(domains.len(1), 4);
        assert_eq!(domains.len(2), 3);
        assert_eq!(domains.len(3), 3);
        assert_eq!(select_unassigned_variable(&crossword, &domains, &assignment), Some(0));

        let mut assignment = Assignment::new();
        assignment.insert(0, word_id(&crossword, "seven"));
        assert_eq!(select_unassigned_variable(&crossword, &domains, &assignment), Some(3));

        assignment.insert(3, word_id(&crossword, "nine"));
        assert_eq!(select_unassigned_variable(&crossword, &domains, &assignment), Some(2));
    }

    #[test]
    fn test_order_domain_values_least_constraining_first() {
        let crossword = corner_crossword(&["cat", "car", "arc"]);
        let mut domains = Domains::new(&crossword);
        enforce_node_consistency(&crossword, &mut domains);

        let ordered = order_domain_values(&crossword, &domains, 0, &Assignment::new());

        assert_eq!(ordered, vec![
            word_id(&crossword, "car"),
            word_id(&crossword, "cat"),
            word_id(&crossword, "arc"),
        ]);
        assert_eq!(domains.len(1), 3);

        // Assigned neighbors don't count.
        let mut assignment = Assignment::new();
        assignment.insert(1, word_id(&crossword, "cat"));
        let ordered = order_domain_values(&crossword, &domains, 0, &assignment);
        assert_eq!(ordered, vec![
            word_id(&crossword, "arc"),
            word_id(&crossword, "car"),
            word_id(&crossword, "cat"),
        ]);
    }

    #[test]
    fn test_consistency_checks() {
        let crossword = corner_crossword(&["cat", "car", "arc", "cats"]);
        let cat = word_id(&crossword, "cat");
        let car = word_id(&crossword, "car");
        let arc = word_id(&crossword, "arc");
        let cats = word_id(&crossword, "cats");

        let mut assignment = Assignment::new();
        assert!(is_consistent(&crossword, &assignment));

        assignment.insert(0, car);
        assert!(is_consistent(&crossword, &assignment));
        assert!(is_consistent_with(&crossword, &assignment, 1, cat));
        assert!(!is_consistent_with(&crossword, &assignment, 1, arc));
        assert!(!is_consistent_with(&crossword, &assignment, 1, car));
        assert!(!is_consistent_with(&crossword, &assignment, 1, cats));

        for (word_id, expected) in [(cat, true), (arc, false), (car, false), (cats, false)] {
            let mut extended = assignment.clone();
            extended.insert(1, word_id);
            assert_eq!(is_consistent(&crossword, &extended), expected);
        }
    }
}

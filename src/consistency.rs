//! Domain pruning before and during search. Node consistency drops every word whose length
//! doesn't match its slot; arc consistency (AC-3) drops every word that can't agree with at
//! least one remaining word in each crossing slot, and keeps doing so until nothing changes.

use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid::{Crossword, VariableId};
use crate::word_list::WordId;

/// A directed constraint: words for the first variable need support in the second.
pub type Arc = (VariableId, VariableId);

/// Remove every word whose length differs from its variable's length. Returns the number of
/// words removed; running it again afterwards removes nothing.
pub fn enforce_node_consistency(crossword: &Crossword, domains: &mut Domains) -> usize {
    let word_list = crossword.word_list();
    let mut removed = 0;

    for (variable_id, variable) in crossword.variables().iter().enumerate() {
        let mismatched: Vec<WordId> = domains.get(variable_id).iter()
            .filter(|&word_id| word_list.get(word_id).len() != variable.length)
            .collect();

        for word_id in mismatched {
            domains.remove(variable_id, word_id);
            removed += 1;
        }
    }

    debug!("Node consistency removed {} options", removed);

    removed
}

/// Make `x` arc-consistent with `y`: remove every word from `x`'s domain that has no word in
/// `y`'s domain with the same letter in the shared cell. Returns whether anything was removed.
/// Variables that don't cross are trivially consistent.
pub fn revise(crossword: &Crossword, domains: &mut Domains, x: VariableId, y: VariableId) -> bool {
    let overlap = match crossword.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };
    let word_list = crossword.word_list();

    // Which letters does `y` still allow in the shared cell?
    let supported_glyphs: HashSet<char> = domains.get(y).iter()
        .filter_map(|word_id| word_list.get(word_id).glyphs.get(overlap.second).copied())
        .collect();

    let unsupported: Vec<WordId> = domains.get(x).iter()
        .filter(|&word_id| {
            match word_list.get(word_id).glyphs.get(overlap.first) {
                Some(glyph) => !supported_glyphs.contains(glyph),
                None => true,
            }
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    !unsupported.is_empty()
}

/// Work queue of arcs still to be revised. An arc that's already waiting isn't added twice.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<Arc>,
    queued: HashSet<Arc>,
}

impl ArcQueue {
    fn with_initial_queue<Items>(items: Items) -> ArcQueue
        where
            Items: IntoIterator<Item=Arc>
    {
        let mut queue = ArcQueue { queue: VecDeque::new(), queued: HashSet::new() };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Results from a call to `establish_arc_consistency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised before the queue ran dry.
    pub revisions: usize,
}

/// Returned when some variable runs out of options, which means no fill exists for the current
/// domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub variable_id: VariableId,
    pub revisions: usize,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// AC-3. Starting from `arcs`, or from every arc in the crossword if that's `None`, revise arcs
/// until none of them can remove anything. Whenever `x` loses options for an arc `(x, y)`, every
/// other arc pointing at `x` has to be checked again.
pub fn establish_arc_consistency(
    crossword: &Crossword,
    domains: &mut Domains,
    arcs: Option<&[Arc]>,
) -> ArcConsistencyResult {
    let mut queue = match arcs {
        Some(arcs) => ArcQueue::with_initial_queue(arcs.iter().copied()),
        None => ArcQueue::with_initial_queue(crossword.arcs()),
    };
    let mut revisions = 0;

    while let Some((x, y)) = queue.pop_front() {
        revisions += 1;

        if !revise(crossword, domains, x, y) {
            continue;
        }
        trace!("Revised {:?} against {:?}: {} options left", crossword.variable(x), crossword.variable(y), domains.len(x));

        if domains.is_empty(x) {
            debug!("Arc consistency emptied {:?} after {} revisions", crossword.variable(x), revisions);
            return Err(ArcConsistencyFailure { variable_id: x, revisions });
        }

        for &z in crossword.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    debug!("Arc consistency reached after {} revisions", revisions);

    Ok(ArcConsistencySuccess { revisions })
}

/// Is every arc in the crossword already satisfied by the given domains?
pub fn is_arc_consistent(crossword: &Crossword, domains: &Domains) -> bool {
    let mut scratch = domains.clone();
    crossword.arcs().into_iter().all(|(x, y)| !revise(crossword, &mut scratch, x, y))
}

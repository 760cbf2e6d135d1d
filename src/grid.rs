use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::word_list::WordList;
use crate::{MAX_SLOT_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given variable, based on its index in the `Crossword`'s `variables` field.
pub type VariableId = usize;

/// Zero-indexed row and column for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A slot in the grid. Two variables describing the same slot compare and hash equal no matter
/// where they were constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        if length == 0 {
            panic!("Variable at ({}, {}) has zero length", row, col);
        }
        Variable { row, col, direction, length }
    }

    /// Generate the coords for each cell of this variable.
    pub fn cells(&self) -> SmallVec<[GridCoord; MAX_SLOT_LENGTH]> {
        (0..self.length).map(|cell_idx| {
            match self.direction {
                Direction::Across => (self.row, self.col + cell_idx),
                Direction::Down => (self.row + cell_idx, self.col),
            }
        }).collect()
    }
}

/// The shared cell between two variables: letter `first` of the first variable's word has to
/// equal letter `second` of the second variable's word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overlap {
    pub first: usize,
    pub second: usize,
}

impl Overlap {
    /// The same overlap seen from the other variable.
    pub fn flipped(self) -> Overlap {
        Overlap { first: self.second, second: self.first }
    }
}

/// A struct representing the aspects of a crossword that are static during filling: the cell
/// structure, the slots it defines, how they cross, and the candidate words.
pub struct Crossword {
    structure: Vec<Vec<bool>>,
    height: usize,
    width: usize,
    variables: SmallVec<[Variable; MAX_SLOT_COUNT]>,
    variable_ids: HashMap<Variable, VariableId>,
    overlaps: HashMap<(VariableId, VariableId), Overlap>,
    neighbors: Vec<SmallVec<[VariableId; MAX_SLOT_LENGTH]>>,
    word_list: WordList,
}

impl Debug for Crossword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crossword")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("variables", &self.variables)
            .field("overlap_count", &self.overlaps.len())
            .field("word_list", &self.word_list)
            .finish()
    }
}

impl Crossword {
    /// Build a crossword from a rectangular grid, where `true` marks an open cell.
    pub fn new(structure: Vec<Vec<bool>>, word_list: WordList) -> Crossword {
        let height = structure.len();
        let width = structure.first().map(|row| row.len()).unwrap_or(0);
        if structure.iter().any(|row| row.len() != width) {
            panic!("Crossword structure must be rectangular");
        }

        let variables = find_variables(&structure, height, width);
        let variable_ids: HashMap<Variable, VariableId> =
            variables.iter().enumerate().map(|(id, &variable)| (variable, id)).collect();

        // Build a map from cell location to variables involved, which we can then use to
        // calculate overlaps.
        let mut variables_by_cell: HashMap<GridCoord, SmallVec<[(VariableId, usize); 2]>> =
            HashMap::new();
        for (variable_id, variable) in variables.iter().enumerate() {
            for (cell_idx, &loc) in variable.cells().iter().enumerate() {
                variables_by_cell.entry(loc).or_default().push((variable_id, cell_idx));
            }
        }

        let mut overlaps: HashMap<(VariableId, VariableId), Overlap> = HashMap::new();
        for entries in variables_by_cell.values() {
            for &(x, x_cell) in entries {
                for &(y, y_cell) in entries {
                    if x == y {
                        continue;
                    }
                    if overlaps.insert((x, y), Overlap { first: x_cell, second: y_cell }).is_some() {
                        panic!("Variables {:?} and {:?} share more than one cell", variables[x], variables[y]);
                    }
                }
            }
        }

        let neighbors = (0..variables.len()).map(|x| {
            (0..variables.len()).filter(|&y| overlaps.contains_key(&(x, y))).collect()
        }).collect();

        Crossword {
            structure,
            height,
            width,
            variables,
            variable_ids,
            overlaps,
            neighbors,
            word_list,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, variable_id: VariableId) -> &Variable {
        &self.variables[variable_id]
    }

    pub fn variable_id(&self, variable: &Variable) -> Option<VariableId> {
        self.variable_ids.get(variable).copied()
    }

    pub fn word_list(&self) -> &WordList {
        &self.word_list
    }

    /// Is the given cell open (part of some answer) rather than blocked? Cells outside the grid
    /// count as blocked.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.structure.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    /// The overlap between `x` and `y`, if their cells intersect.
    pub fn overlap(&self, x: VariableId, y: VariableId) -> Option<Overlap> {
        self.overlaps.get(&(x, y)).copied()
    }

    /// Every variable sharing a cell with `x`, in ascending id order.
    pub fn neighbors(&self, x: VariableId) -> &[VariableId] {
        &self.neighbors[x]
    }

    /// How many variables cross `x`?
    pub fn degree(&self, x: VariableId) -> usize {
        self.neighbors[x].len()
    }

    /// Every ordered pair of variables with an overlap, in ascending order.
    pub fn arcs(&self) -> Vec<(VariableId, VariableId)> {
        (0..self.variables.len())
            .flat_map(|x| self.neighbors[x].iter().map(move |&y| (x, y)))
            .collect()
    }
}

/// Scan the structure in row-major order, starting a down variable at each open cell with no
/// open cell above it and an across variable at each open cell with no open cell to its left.
fn find_variables(
    structure: &[Vec<bool>],
    height: usize,
    width: usize,
) -> SmallVec<[Variable; MAX_SLOT_COUNT]> {
    let mut variables = SmallVec::new();

    for row in 0..height {
        for col in 0..width {
            if !structure[row][col] {
                continue;
            }

            if row == 0 || !structure[row - 1][col] {
                let length = (row..height).take_while(|&r| structure[r][col]).count();
                if length > 1 {
                    variables.push(Variable::new(row, col, Direction::Down, length));
                }
            }

            if col == 0 || !structure[row][col - 1] {
                let length = (col..width).take_while(|&c| structure[row][c]).count();
                if length > 1 {
                    variables.push(Variable::new(row, col, Direction::Across, length));
                }
            }
        }
    }

    variables
}

/// Generate a crossword from a string template, with `_` representing open cells and anything
/// else representing blocks. Leading and trailing whitespace on each line is ignored, as are
/// blank lines, so templates can be indented inline.
pub fn generate_crossword_from_template_string<I, S>(words: I, template: &str) -> Crossword
    where
        I: IntoIterator<Item=S>,
        S: AsRef<str>,
{
    let structure: Vec<Vec<bool>> =
        template.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.chars().map(|cell| cell == '_').collect())
            }
        }).collect();

    Crossword::new(structure, WordList::new(words))
}

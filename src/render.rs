use crate::grid::Crossword;
use crate::search::Assignment;

/// Glyph drawn for a blocked cell.
pub const BLOCK: char = '█';

/// Project an assignment onto the grid. Blocked cells and open cells that no assigned word
/// covers are `None`.
pub fn letter_grid(crossword: &Crossword, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; crossword.width()]; crossword.height()];

    for choice in assignment.choices() {
        let variable = crossword.variable(choice.variable_id);
        let word = crossword.word_list().get(choice.word_id);

        for (&(row, col), &glyph) in variable.cells().iter().zip(word.glyphs.iter()) {
            letters[row][col] = Some(glyph);
        }
    }

    letters
}

/// Render an assignment as text: a block for each blocked cell, the letter for each filled
/// cell, and a space for open cells left empty.
pub fn render_grid(crossword: &Crossword, assignment: &Assignment) -> String {
    let letters = letter_grid(crossword, assignment);

    letters.iter().enumerate().map(|(row, cells)| {
        cells.iter().enumerate().map(|(col, letter)| {
            match letter {
                Some(glyph) => *glyph,
                None if crossword.is_open(row, col) => ' ',
                None => BLOCK,
            }
        }).collect::<String>()
    }).collect::<Vec<_>>().join("\n")
}

use std::fs;
use std::path::Path;

use crate::errors::ParseError;
use crate::grid::Crossword;
use crate::word_list::WordList;

/// The character marking an open cell in a structure file. Anything else is a block.
pub const OPEN_CELL: char = '_';

/// Parse a structure with one row per line. Trailing whitespace, along with blank lines before
/// the first row and after the last, is ignored; every remaining row has to have the same width.
/// Row numbers in errors count from the first row.
pub fn parse_structure(contents: &str) -> Result<Vec<Vec<bool>>, ParseError> {
    let mut lines: Vec<&str> = contents.lines()
        .map(|line| line.trim_end())
        .skip_while(|line| line.is_empty())
        .collect();
    while lines.last().map(|line| line.is_empty()).unwrap_or(false) {
        lines.pop();
    }

    let structure: Vec<Vec<bool>> = lines.iter()
        .map(|line| line.chars().map(|cell| cell == OPEN_CELL).collect())
        .collect();

    let width = match structure.first() {
        Some(row) if !row.is_empty() => row.len(),
        _ => return Err(ParseError::EmptyStructure),
    };

    for (row, cells) in structure.iter().enumerate() {
        if cells.len() != width {
            return Err(ParseError::InconsistentRowLength { row, expected: width, found: cells.len() });
        }
    }

    Ok(structure)
}

/// Parse a word list with one word per line.
pub fn parse_words(contents: &str) -> WordList {
    WordList::new(contents.lines())
}

fn read(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| ParseError::Io { path: path.to_path_buf(), source })
}

pub fn load_structure(path: &Path) -> Result<Vec<Vec<bool>>, ParseError> {
    parse_structure(&read(path)?)
}

pub fn load_words(path: &Path) -> Result<WordList, ParseError> {
    Ok(parse_words(&read(path)?))
}

/// Load a structure file and a word list file into a crossword.
pub fn load_crossword(structure_path: &Path, words_path: &Path) -> Result<Crossword, ParseError> {
    let structure = load_structure(structure_path)?;
    let word_list = load_words(words_path)?;

    Ok(Crossword::new(structure, word_list))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::errors::ParseError;
    use crate::parse::{load_structure, parse_structure, parse_words};

    #[test]
    fn test_parse_structure() {
        let structure = parse_structure("#__\n_#_\r\n\n").unwrap();

        assert_eq!(structure, vec![
            vec![false, true, true],
            vec![true, false, true],
        ]);
    }

    #[test]
    fn test_parse_structure_with_leading_blank_lines() {
        let structure = parse_structure("\n  \n#___#\n_#_#_\n").unwrap();

        assert_eq!(structure.len(), 2);
        assert_eq!(structure[0], vec![false, true, true, true, false]);

        let error = parse_structure("\n___\n__\n").unwrap_err();
        assert!(matches!(error, ParseError::InconsistentRowLength { row: 1, expected: 3, found: 2 }));
    }

    #[test]
    fn test_parse_empty_structure() {
        assert!(matches!(parse_structure(""), Err(ParseError::EmptyStructure)));
        assert!(matches!(parse_structure("\n\n"), Err(ParseError::EmptyStructure)));
    }

    #[test]
    fn test_parse_ragged_structure() {
        let error = parse_structure("___\n__\n___").unwrap_err();

        assert!(matches!(error, ParseError::InconsistentRowLength { row: 1, expected: 3, found: 2 }));
    }

    #[test]
    fn test_parse_words() {
        let word_list = parse_words("one\ntwo\r\n\nOne\n");

        assert_eq!(word_list.len(), 2);
        assert_eq!(word_list.find("ONE"), Some(0));
    }

    #[test]
    fn test_missing_file() {
        let error = load_structure(Path::new("/nonexistent/structure.txt")).unwrap_err();

        assert_eq!(error.code(), "E001");
    }
}

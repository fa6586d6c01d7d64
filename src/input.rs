use crate::error::ParseError;
use crate::puzzle::Puzzle;

/// Reads a board either as JSON rows (`[[1,2,3],[4,5,6],[7,8,0]]`) or as the
/// plain format: the size `n` followed by `n²` whitespace-separated tiles.
pub fn parse_board(input: &str) -> Result<Puzzle, ParseError> {
    let input = input.trim();
    if input.starts_with('[') {
        return Ok(serde_json::from_str(input)?);
    }

    let mut numbers = input.split_whitespace().map(|token| {
        token
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidNumber(token.to_string()))
    });

    let size = numbers.next().ok_or(ParseError::MissingSize)?? as usize;
    let tiles = numbers.collect::<Result<Vec<_>, _>>()?;

    let expected = size * size;
    if tiles.len() != expected {
        return Err(ParseError::TileCount {
            expected,
            found: tiles.len(),
        });
    }

    Ok(Puzzle::from_tiles(size, tiles)?)
}

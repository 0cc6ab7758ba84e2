use thiserror::Error;
use tracing::warn;

use crate::GridOffset;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::rule_set;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;
use crate::stamp::Offset;
use crate::stamp::PatternStamp;

/// A decoded RLE pattern. Live cells end up in `stamp`, relative to the pattern's top left corner
/// (shifted by any `#P`/`#R` offset), with `y` growing downward.
#[derive(Debug, Default)]
pub struct RleFile {
    pub name: Option<String>,
    pub author: Option<String>,
    pub comments: Vec<String>,

    /// Bounding box from the `x = .., y = ..` header, if there was one
    pub size: Option<(GridOffset, GridOffset)>,

    pub rule: Option<RuleSet>,
    pub stamp: PatternStamp,
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Bad # line: {0}")]
    CommentLine(#[from] RleCommentLineError),

    #[error("Bad header: {0}")]
    HeaderLine(#[from] RleHeaderLineError),

    #[error("Bad cell data: {0}")]
    Encoding(#[from] RleEncodingError),
}

/// Decode a Run Length Encoded pattern: `#` lines, an optional `x = .., y = ..` header, then
/// cell runs up to `!`. Non-ascii text in `#` lines is replaced, not rejected.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle(mut bytes: &[u8]) -> Result<RleFile, RleError> {
    let mut file = RleFile::default();
    let mut offset: Offset = (0, 0);
    let mut has_offset = false;

    // Parse as many comment lines as possible, skipping blank lines between them
    loop {
        let rest = parse_util::take_ws(bytes);
        let Some(b'#') = parse_util::peek_1(rest) else {
            bytes = rest;
            break;
        };

        let (line, rest) = parse_util::take_line(rest);
        bytes = rest;

        match read_line_comment(line)? {
            RleCommentLine::Comment { text } => file.comments.push(text),
            RleCommentLine::Name { name } => {
                if file.name.is_some() {
                    warn!(%name, "pattern named twice, keeping the last name");
                }

                file.name = Some(name);
            }
            RleCommentLine::Author { author } => {
                if file.author.is_some() {
                    warn!(%author, "pattern author given twice, keeping the last one");
                }

                file.author = Some(author);
            }
            RleCommentLine::Offset { x, y } => {
                if has_offset {
                    warn!(x, y, "pattern offset given twice, keeping the last one");
                }

                offset = (x, y);
                has_offset = true;
            }
            RleCommentLine::RuleSet { set } => {
                file.rule = Some(set);
            }
        }
    }

    // The header is optional; cell data may follow the comments directly
    if let Some(b'x') = parse_util::peek_1(bytes) {
        let (line, rest) = parse_util::take_line(bytes);
        let RleHeaderLine { x, y, set } = read_line_header(line)?;

        file.size = Some((x, y));

        if let Some(set) = set {
            if file.rule.is_some_and(|r| r != set) {
                warn!("RLE header rule overrides the #r comment line");
            }

            file.rule = Some(set);
        }

        bytes = rest;
    }

    let cells = read_encoding(bytes, file.size, offset)?;
    file.stamp = PatternStamp::from_offsets(cells);

    Ok(file)
}

enum RleCommentLine {
    Comment { text: String },
    Name { name: String },
    Author { author: String },
    Offset { x: GridOffset, y: GridOffset },
    RuleSet { set: RuleSet },
}

#[derive(Debug, Error)]
pub enum RleCommentLineError {
    #[error("Missing line type after '#'")]
    NoType,

    #[error("#N line without a name")]
    EmptyName,

    #[error("#O line without an author")]
    EmptyAuthor,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Bad offset: {0}")]
    InvalidCoord(#[from] RleCoordError),

    #[error("Unknown line type '#{got}'")]
    InvalidType { got: char },
}

/// Parse a single `#` line, without its line break.
fn read_line_comment(line: &[u8]) -> Result<RleCommentLine, RleCommentLineError> {
    let line = parse_util::expect(b'#', line).map_err(|_| RleCommentLineError::NoType)?;

    let (Some(b), rest) = parse_util::take_1(line) else {
        return Err(RleCommentLineError::NoType);
    };

    let text = || {
        let text = parse_util::take_ws(rest).trim_ascii_end();
        String::from_utf8_lossy(text).to_string()
    };

    match b {
        // Comment line
        b'C' | b'c' => Ok(RleCommentLine::Comment { text: text() }),

        // Pattern name
        b'N' => match text() {
            name if name.is_empty() => Err(RleCommentLineError::EmptyName),
            name => Ok(RleCommentLine::Name { name }),
        },

        // Pattern author
        b'O' => match text() {
            author if author.is_empty() => Err(RleCommentLineError::EmptyAuthor),
            author => Ok(RleCommentLine::Author { author }),
        },

        // Pattern offset, `#P x y`
        b'R' | b'P' => {
            let (x, y) = read_pair(rest)?;

            Ok(RleCommentLine::Offset { x, y })
        }

        // Pattern rules. These list survivals first, e.g. `#r 23/3`.
        b'r' => {
            let bytes = parse_util::take_ws(rest);
            let (set, bytes) = rule_set::parse_nameless_rule(bytes)?;

            let rest = parse_util::take_ws(bytes);
            if !rest.is_empty() {
                let rest = String::from_utf8_lossy(rest).to_string();
                return Err(RuleError::Trailing { rest }.into());
            }

            Ok(RleCommentLine::RuleSet { set })
        }

        b => Err(RleCommentLineError::InvalidType { got: b as char }),
    }
}

struct RleHeaderLine {
    x: GridOffset,
    y: GridOffset,
    set: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleHeaderLineError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid size: {0}")]
    InvalidSize(#[from] RleCoordError),

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Unexpected trailing input \"{rest}\"")]
    Trailing { rest: String },
}

/// Parse a header line, `x = 3, y = 3` with an optional `, rule = B3/S23`.
fn read_line_header(line: &[u8]) -> Result<RleHeaderLine, RleHeaderLineError> {
    let (x, bytes) = read_assignment(b'x', line)?;

    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b',', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    let (y, bytes) = read_assignment(b'y', bytes)?;

    let bytes = parse_util::take_ws(bytes);
    let Ok(bytes) = parse_util::expect(b',', bytes) else {
        return trailing(bytes).map(|()| RleHeaderLine { x, y, set: None });
    };

    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect_slice(b"rule", bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    let (set, bytes) = match parse_util::peek_1(bytes) {
        Some(b'b' | b'B') => rule_set::parse_rule(bytes)?,
        _ => rule_set::parse_nameless_rule(bytes)?,
    };

    trailing(bytes)?;

    Ok(RleHeaderLine {
        x,
        y,
        set: Some(set),
    })
}

fn trailing(bytes: &[u8]) -> Result<(), RleHeaderLineError> {
    let rest = parse_util::take_ws(bytes);

    if rest.is_empty() {
        Ok(())
    } else {
        Err(RleHeaderLineError::Trailing {
            rest: String::from_utf8_lossy(rest).to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum RleEncodingError {
    #[error("Cell data ended before '!'")]
    UnexpectedEof,

    #[error("Bad run count: {0}")]
    RunLength(#[from] ConvertError),

    #[error("Unexpected byte 0x{got:02X} in cell data")]
    UnrecognizedByte { got: u8 },

    #[error("Cell position overflowed")]
    Overflow,

    #[error("Live cell ({x}, {y}) is outside the {width}x{height} header box")]
    OutsideHeader {
        x: GridOffset,
        y: GridOffset,
        width: GridOffset,
        height: GridOffset,
    },

    #[error("Pattern has more than {} live cells", MAX_CELLS)]
    TooManyCells,
}

/// Most live cells a pattern file may hold.
pub const MAX_CELLS: usize = 1 << 24;

/// Decode the run-length body up to and including `!`. Live cells must fit the header box when
/// there is one, and are shifted by `offset`.
fn read_encoding(
    mut bytes: &[u8],
    size: Option<(GridOffset, GridOffset)>,
    offset: Offset,
) -> Result<Vec<Offset>, RleEncodingError> {
    let (dx, dy) = offset;
    let shift = |x: GridOffset, y: GridOffset| -> Result<Offset, RleEncodingError> {
        match (x.checked_add(dx), y.checked_add(dy)) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(RleEncodingError::Overflow),
        }
    };

    let mut cells = Vec::new();
    let mut rep: GridOffset = 1;

    let (mut x, mut y): Offset = (0, 0);

    loop {
        let Some(b) = parse_util::peek_1(bytes) else {
            return Err(RleEncodingError::UnexpectedEof);
        };

        if b.is_ascii_digit() {
            let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes) else {
                unreachable!("peeked a digit")
            };
            bytes = rest;

            rep = parse_util::convert(n)?;
            continue;
        }

        let (_, rest) = parse_util::take_1(bytes);
        bytes = rest;

        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {}

            // End of input
            b'!' => break,

            // Dead cells
            b'b' | b'.' => x = x.checked_add(rep).ok_or(RleEncodingError::Overflow)?,

            // Live cells
            b'o' | b'A' => {
                let end = x.checked_add(rep).ok_or(RleEncodingError::Overflow)?;

                if let Some((width, height)) = size {
                    if rep > 0 && (end > width || y >= height) {
                        return Err(RleEncodingError::OutsideHeader {
                            x: end - 1,
                            y,
                            width,
                            height,
                        });
                    }
                }

                let total = usize::try_from(rep)
                    .ok()
                    .and_then(|rep| cells.len().checked_add(rep))
                    .filter(|&n| n <= MAX_CELLS)
                    .ok_or(RleEncodingError::TooManyCells)?;
                cells.reserve(total - cells.len());

                for cx in x..end {
                    cells.push(shift(cx, y)?);
                }

                x = end;
            }

            // End of line
            b'$' => {
                y = y.checked_add(rep).ok_or(RleEncodingError::Overflow)?;
                x = 0;
            }

            b => return Err(RleEncodingError::UnrecognizedByte { got: b }),
        }

        rep = 1;
    }

    Ok(cells)
}

#[derive(Debug, Error)]
pub enum RleCoordError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Missing x value")]
    NoX,

    #[error("Bad x value: {0}")]
    ParseX(#[source] ConvertError),

    #[error("Missing y value")]
    NoY,

    #[error("Bad y value: {0}")]
    ParseY(#[source] ConvertError),
}

/// Reads `name = value` from the start of `bytes`.
fn read_assignment(name: u8, bytes: &[u8]) -> Result<(GridOffset, &[u8]), RleCoordError> {
    let bytes = parse_util::expect(name, bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    // Values end at `,` or at whitespace before one.
    let p = |b: u8| b == b',' || b.is_ascii_whitespace();
    let (Some(value), bytes) = parse_util::take_until_fn(p, bytes) else {
        return Err(if name == b'x' {
            RleCoordError::NoX
        } else {
            RleCoordError::NoY
        });
    };

    let value = parse_util::convert(value).map_err(|e| {
        if name == b'x' {
            RleCoordError::ParseX(e)
        } else {
            RleCoordError::ParseY(e)
        }
    })?;

    Ok((value, bytes))
}

/// Reads two whitespace separated integers, as found on `#P` lines.
fn read_pair(bytes: &[u8]) -> Result<(GridOffset, GridOffset), RleCoordError> {
    let bytes = parse_util::take_ws(bytes);
    let (Some(x), bytes) = parse_util::take_until_ws(bytes) else {
        return Err(RleCoordError::NoX);
    };

    let bytes = parse_util::take_ws(bytes);
    let (Some(y), _) = parse_util::take_until_ws(bytes) else {
        return Err(RleCoordError::NoY);
    };

    let x = parse_util::convert(x).map_err(RleCoordError::ParseX)?;
    let y = parse_util::convert(y).map_err(RleCoordError::ParseY)?;

    Ok((x, y))
}

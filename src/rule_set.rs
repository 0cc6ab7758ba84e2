use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::parse_util;
use crate::parse_util::ParseError;

/// Conway's Game of Life: born on 3, survives on 2 or 3.
pub const B3S23: RuleSet = RuleSet::new(1 << 3, 1 << 2 | 1 << 3);

/// Birth and survival neighbor counts, packed into one word.
///
/// Bits `16..25` hold the birth set and bits `0..9` the survival set. Bit `n` of a set is on when
/// `n` live neighbors trigger it.
///
/// ```notrust
/// B3/S23       births 0_0000_1000  survivals 0_0000_1100
/// B36/S23      births 0_0100_1000  survivals 0_0000_1100
/// B/S012345678 births 0_0000_0000  survivals 1_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({self})")
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |mask: u16| -> String {
            (0..=8)
                .filter(|&n| mask & (1 << n) != 0)
                .map(|n| char::from(b'0' + n as u8))
                .collect()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}

impl RuleSet {
    const COUNTS: u32 = 0x1FF;

    /// Build from birth and survival bit sets. Bits above 8 are dropped.
    pub const fn new(births: u16, survivals: u16) -> Self {
        let births = births as u32 & Self::COUNTS;
        let survivals = survivals as u32 & Self::COUNTS;

        Self {
            rule: (births << 16) | survivals,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule >> 16) & Self::COUNTS) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & Self::COUNTS) as u16
    }

    /// State of a cell in the next generation, given its current state and the number of live
    /// cells among its 8 neighbors.
    #[inline]
    pub fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        // counts past 8 can't happen on a Moore neighborhood
        let bit = 1u16.checked_shl(neighbors as u32).unwrap_or(0);

        if alive {
            self.survivals() & bit != 0
        } else {
            self.births() & bit != 0
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Expected 'B' or 'b' to start the birth list")]
    NoBirth,

    #[error("Expected 'S' or 's' to start the survival list")]
    NoSurvival,

    #[error("Expected a neighbor count in 0..=8, found '{got}'")]
    InvalidCount { got: char },

    #[error("Unexpected trailing input \"{rest}\"")]
    Trailing { rest: String },
}

impl FromStr for RuleSet {
    type Err = RuleError;

    /// Accepts `B3/S23`, `b3s23` and the nameless, survivals first `23/3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();

        let (set, rest) = match parse_util::peek_1(bytes) {
            Some(b) if b.is_ascii_digit() || b == b'/' => parse_nameless_rule(bytes)?,
            _ => parse_rule(bytes)?,
        };

        if !rest.is_empty() {
            return Err(RuleError::Trailing {
                rest: String::from_utf8_lossy(rest).to_string(),
            });
        }

        Ok(set)
    }
}

/// Parse rules that look like `b3/s23` or `b3s23`.
pub(crate) fn parse_rule(bytes: &[u8]) -> Result<(RuleSet, &[u8]), RuleError> {
    let (Some(b'b' | b'B'), bytes) = parse_util::take_1(bytes) else {
        return Err(RuleError::NoBirth);
    };

    let (b, bytes) = take_counts(bytes)?;

    let bytes = match parse_util::peek_1(bytes) {
        Some(b'/') => parse_util::expect(b'/', bytes)?,
        _ => bytes,
    };

    let (Some(b's' | b'S'), bytes) = parse_util::take_1(bytes) else {
        return Err(RuleError::NoSurvival);
    };

    let (s, bytes) = take_counts(bytes)?;

    Ok((RuleSet::new(b, s), bytes))
}

/// Parse rules that look like `23/3`: survivals, then births. This is the form RLE `#r` lines
/// use.
pub(crate) fn parse_nameless_rule(bytes: &[u8]) -> Result<(RuleSet, &[u8]), RuleError> {
    let (s, bytes) = take_counts(bytes)?;
    let bytes = parse_util::expect(b'/', bytes)?;
    let (b, bytes) = take_counts(bytes)?;

    Ok((RuleSet::new(b, s), bytes))
}

/// Packs the leading run of digits in `bytes` into a neighbor-count bit set. An empty run is an
/// empty set (`B/S23` is a valid rule).
fn take_counts(bytes: &[u8]) -> Result<(u16, &[u8]), RuleError> {
    let end = bytes
        .iter()
        .position(|b| !b.is_ascii_alphanumeric())
        .unwrap_or(bytes.len());

    let mut end = end;
    // stop at the survival marker in the slash-less form
    if let Some(s) = bytes[..end].iter().position(|b| matches!(b, b's' | b'S')) {
        end = s;
    }

    let (counts, rest) = bytes.split_at(end);

    let mut n = 0;
    for &b in counts {
        match b {
            b'0'..=b'8' => n |= 1 << (b - b'0'),
            got => return Err(RuleError::InvalidCount { got: got as char }),
        }
    }

    Ok((n, rest))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn life_table() {
        for n in 0..=8 {
            assert_eq!(B3S23.next_state(true, n), n == 2 || n == 3, "alive with {n}");
            assert_eq!(B3S23.next_state(false, n), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn parse_forms() {
        assert_eq!("B3/S23".parse::<RuleSet>().unwrap(), B3S23);
        assert_eq!("b3s23".parse::<RuleSet>().unwrap(), B3S23);
        assert_eq!("23/3".parse::<RuleSet>().unwrap(), B3S23);

        let highlife: RuleSet = "B36/S23".parse().unwrap();
        assert_eq!(highlife.births(), 0b100_1000);
        assert_eq!(highlife.survivals(), 0b1100);
    }

    #[test]
    fn nameless_is_survivals_first() {
        let highlife: RuleSet = "23/36".parse().unwrap();

        assert_eq!(highlife.to_string(), "B36/S23");
        assert_eq!(highlife, "B36/S23".parse().unwrap());
    }

    #[test]
    fn parse_empty_sets() {
        let seeds: RuleSet = "B2/S".parse().unwrap();
        assert_eq!(seeds.births(), 0b100);
        assert_eq!(seeds.survivals(), 0);
    }

    #[test]
    fn parse_rejects() {
        assert!(matches!(
            "B9/S23".parse::<RuleSet>(),
            Err(RuleError::InvalidCount { got: '9' })
        ));
        assert!(matches!("X3/S23".parse::<RuleSet>(), Err(RuleError::NoBirth)));
        assert!(matches!("B3/23".parse::<RuleSet>(), Err(RuleError::NoSurvival)));
        assert!(matches!(
            "B3/S23 x".parse::<RuleSet>(),
            Err(RuleError::Trailing { .. })
        ));
    }

    #[test]
    fn display_round_trip() {
        assert_eq!(B3S23.to_string(), "B3/S23");

        let rule: RuleSet = "b36s23".parse().unwrap();
        assert_eq!(rule.to_string(), "B36/S23");
    }
}

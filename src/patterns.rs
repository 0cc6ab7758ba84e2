use crate::pattern_codec;
use crate::pattern_codec::CodecError;
use crate::stamp::PatternStamp;

/// A stamp that ships with the application, in offset format.
pub struct NamedPattern {
    pub name: &'static str,
    pub offsets: &'static str,
}

impl NamedPattern {
    pub fn stamp(&self) -> Result<PatternStamp, CodecError> {
        pattern_codec::parse_offsets(self.offsets)
    }
}

// Offsets are relative to the cell under the cursor, roughly centered.
pub const PATTERNS: &[NamedPattern] = &[
    NamedPattern {
        name: "dot",
        offsets: "0,0",
    },
    NamedPattern {
        name: "block",
        offsets: "0,0;1,0;0,1;1,1",
    },
    NamedPattern {
        name: "blinker",
        offsets: "-1,0;0,0;1,0",
    },
    NamedPattern {
        name: "glider",
        offsets: "0,-1;1,0;-1,1;0,1;1,1",
    },
    NamedPattern {
        name: "beehive",
        offsets: "0,-1;1,-1;-1,0;2,0;0,1;1,1",
    },
    NamedPattern {
        name: "toad",
        offsets: "0,0;1,0;2,0;-1,1;0,1;1,1",
    },
    NamedPattern {
        name: "r-pentomino",
        offsets: "0,-1;1,-1;-1,0;0,0;0,1",
    },
    NamedPattern {
        name: "lwss",
        offsets: "-1,-1;2,-1;-2,0;-2,1;2,1;-2,2;-1,2;0,2;1,2",
    },
    NamedPattern {
        name: "acorn",
        offsets: "-2,-1;0,0;-3,1;-2,1;1,1;2,1;3,1",
    },
];

pub fn by_name(name: &str) -> Option<&'static NamedPattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod test {
    use crate::automaton::Automaton;
    use crate::stamp::StampMode;

    use super::*;

    #[test]
    fn all_patterns_parse() {
        for pattern in PATTERNS {
            let stamp = pattern.stamp().unwrap();
            assert!(!stamp.is_empty(), "{} is empty", pattern.name);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(by_name("Glider").map(|p| p.name), Some("glider"));
        assert!(by_name("gun").is_none());
    }

    #[test]
    fn block_is_still_life() {
        let mut a = Automaton::build(6, 6).unwrap();
        let block = by_name("block").unwrap().stamp().unwrap();
        block.apply(&mut a, 2, 2, StampMode::Paint);
        let before = a.to_string();

        a.compute_next_generation();

        assert_eq!(a.to_string(), before);
    }

    #[test]
    fn glider_translates_diagonally() {
        let mut a = Automaton::build(10, 10).unwrap();
        let glider = by_name("glider").unwrap().stamp().unwrap();
        glider.apply(&mut a, 4, 4, StampMode::Paint);

        let mut expected = Automaton::build(10, 10).unwrap();
        glider.apply(&mut expected, 5, 5, StampMode::Paint);

        for _ in 0..4 {
            a.compute_next_generation();
        }

        assert_eq!(a.to_string(), expected.to_string());
    }
}

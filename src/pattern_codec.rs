//! The compact offset format used for stamps: `dx,dy` pairs separated by `;`.
//!
//! ```notrust
//! 0,0;-1,0;1,0
//! ```
//!
//! Whitespace around numbers and a trailing `;` are tolerated. An empty string is the empty stamp.

use thiserror::Error;

use crate::GridOffset;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::stamp::PatternStamp;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Pair {index} (\"{pair}\") is missing a ','")]
    MissingComma { index: usize, pair: String },

    #[error("Pair {index} (\"{pair}\") has more than two components")]
    ExtraComponent { index: usize, pair: String },

    #[error("Pair {index} has an invalid offset: {source}")]
    InvalidOffset {
        index: usize,
        #[source]
        source: ConvertError,
    },
}

/// Decode a stamp from its offset string.
pub fn parse_offsets(s: &str) -> Result<PatternStamp, CodecError> {
    let mut offsets = Vec::new();

    let pairs = s.split(';').map(str::trim).filter(|p| !p.is_empty());

    for (index, pair) in pairs.enumerate() {
        let mut parts = pair.split(',');

        let (Some(dx), Some(dy)) = (parts.next(), parts.next()) else {
            return Err(CodecError::MissingComma {
                index,
                pair: pair.to_string(),
            });
        };

        if parts.next().is_some() {
            return Err(CodecError::ExtraComponent {
                index,
                pair: pair.to_string(),
            });
        }

        let convert = |v: &str| -> Result<GridOffset, CodecError> {
            parse_util::convert(v.as_bytes())
                .map_err(|source| CodecError::InvalidOffset { index, source })
        };

        offsets.push((convert(dx)?, convert(dy)?));
    }

    Ok(PatternStamp::from_offsets(offsets))
}

/// Encode a stamp as an offset string. The inverse of [`parse_offsets`].
pub fn format_offsets(stamp: &PatternStamp) -> String {
    stamp
        .offsets()
        .iter()
        .map(|(dx, dy)| format!("{dx},{dy}"))
        .collect::<Vec<_>>()
        .join(";")
}

use std::str::FromStr;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Ran out of input while looking for '{exp}'")]
    UnexpectedEof { exp: char },

    #[error("Wanted '{exp}', found '{got}'")]
    UnexpectedToken { exp: char, got: char },

    #[error("Wanted \"{exp}\", found \"{got}\"")]
    UnexpectedSlice { exp: String, got: String },
}

/// Skips leading ascii whitespace.
pub fn take_ws(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Splits off the first byte. An empty slice comes back unchanged.
pub const fn take_1(bytes: &[u8]) -> (Option<u8>, &[u8]) {
    let [b, bytes @ ..] = bytes else {
        return (None, bytes);
    };

    (Some(*b), bytes)
}

/// First byte, if any, without consuming it.
pub fn peek_1(bytes: &[u8]) -> Option<u8> {
    bytes.first().copied()
}

/// Consumes `b`, failing on anything else.
pub fn expect(b: u8, bytes: &[u8]) -> ParseResult<&[u8]> {
    let (Some(a), rest) = take_1(bytes) else {
        return Err(ParseError::UnexpectedEof { exp: b as char });
    };

    if a != b {
        return Err(ParseError::UnexpectedToken {
            exp: b as char,
            got: a as char,
        });
    }

    Ok(rest)
}

/// Consumes the prefix `bs`, failing on anything else.
pub fn expect_slice<'a>(bs: &[u8], bytes: &'a [u8]) -> ParseResult<&'a [u8]> {
    match bytes.strip_prefix(bs) {
        Some(rest) => Ok(rest),
        None => {
            let n = bs.len().min(bytes.len());

            Err(ParseError::UnexpectedSlice {
                exp: String::from_utf8_lossy(bs).to_string(),
                got: String::from_utf8_lossy(&bytes[..n]).to_string(),
            })
        }
    }
}

/// Advance the slice until `P` is satisfied, without consuming the matching byte. Returns `None`
/// when nothing was consumed.
///
/// If `P` is never satisfied, the whole slice is taken.
#[inline]
pub fn take_until_fn<P>(p: P, bytes: &[u8]) -> (Option<&[u8]>, &[u8])
where
    P: Fn(u8) -> bool,
{
    let i = bytes.iter().position(|&b| p(b)).unwrap_or(bytes.len());

    if i == 0 {
        (None, bytes)
    } else {
        let (res, bytes) = bytes.split_at(i);

        (Some(res), bytes)
    }
}

/// Like `take_until_fn`, but stops at the first ascii whitespace character.
pub fn take_until_ws(bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    take_until_fn(|a| a.is_ascii_whitespace(), bytes)
}

/// Takes the rest of the current line and consumes its line break (`\n` or `\r\n`), which is not
/// part of the output.
pub fn take_line(bytes: &[u8]) -> (&[u8], &[u8]) {
    let (line, rest) = match bytes.iter().position(|&b| b == b'\n') {
        Some(i) => (&bytes[..i], &bytes[i + 1..]),
        None => (bytes, &bytes[bytes.len()..]),
    };

    let line = line.strip_suffix(b"\r").unwrap_or(line);

    (line, rest)
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Input is not valid UTF-8")]
    InvalidUtf8,

    #[error("Could not read a value from \"{str}\"")]
    ParseError { str: String },
}

/// Reads a `T` from ascii bytes, ignoring surrounding whitespace.
pub fn convert<T: FromStr>(bytes: &[u8]) -> Result<T, ConvertError> {
    let str = std::str::from_utf8(bytes).map_err(|_| ConvertError::InvalidUtf8)?;

    str.trim().parse::<T>().map_err(|_| ConvertError::ParseError {
        str: str.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_take_ws_stops_at_text() {
        assert_eq!(super::take_ws(b" \t\n"), b"");
        assert_eq!(super::take_ws(b"  3o!"), b"3o!");
    }

    #[test]
    fn test_take_until_fn_no_match() {
        let (res, rest) = super::take_until_fn(|b| b == b',', b"12");

        assert_eq!(res, Some(b"12".as_slice()));
        assert_eq!(rest, b"");
    }

    #[test]
    fn test_take_line_crlf() {
        let (line, rest) = super::take_line(b"#N glider\r\nbo$");

        assert_eq!(line, b"#N glider");
        assert_eq!(rest, b"bo$");
    }

    #[test]
    fn test_expect_slice() {
        assert_eq!(super::expect_slice(b"rule", b"rule = b3").unwrap(), b" = b3");
        assert!(super::expect_slice(b"rule", b"ru").is_err());
    }

    #[test]
    fn test_convert_negative() {
        let n: i64 = super::convert(b"-12").unwrap();

        assert_eq!(n, -12);
    }
}

//! Incremental decoder for the device's line protocol.
//!
//! The device writes one record per line:
//!
//! ```text
//! <float>,<float>\r\n
//! ```
//!
//! Numbers follow the scanf `%f` grammar: optional sign, digits, optional
//! fraction, optional exponent. Spaces or tabs may precede each number and a
//! bare `\n` terminator is accepted alongside `\r\n`.
//!
//! # Recovery
//!
//! A line that does not match is dropped up to and including its `\n` and
//! decoding resumes on the next line. A trailing segment without `\n` is
//! returned as the remainder when it can still grow into a record, so a
//! record split across two reads decodes once its terminator arrives.
//!
//! A tail that cannot become a record is dropped and [`Decoded::discarding`]
//! is set: the next chunk starts inside that line, and the caller must skip
//! it up to and including its `\n` before decoding again.
//!
//! The decoder holds no state. Callers own the remainder and the discarding
//! flag and apply both to the next chunk.

// ============================================================================
// Imports
// ============================================================================

use std::iter;
use std::sync::LazyLock;

use regex::bytes::Regex;

use super::Point;

// ============================================================================
// Constants
// ============================================================================

/// Longest unterminated segment kept as a remainder.
///
/// Longer segments cannot be a record and are discarded.
pub const MAX_LINE_LEN: usize = 128;

/// One `%f` token.
const NUMBER: &str = r"[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?";

/// Matches one whole line including its terminator.
static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?-u)\A[ \t]*({NUMBER}),[ \t]*({NUMBER})\r?\n\z");
    Regex::new(&pattern).expect("record pattern is valid")
});

// ============================================================================
// Decoded
// ============================================================================

/// Outcome of one decoder pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<'a> {
    /// Bytes not consumed, to be prepended to the next chunk.
    pub rest: &'a [u8],
    /// Records appended to the bag.
    pub records: usize,
    /// Lines, or unusable tails, discarded.
    pub dropped: usize,
    /// An unterminated tail was dropped mid-line.
    pub discarding: bool,
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes every complete line in `input`, appending records to `bag`.
///
/// Returns the unconsumed tail. The tail is non-empty only when it has no
/// `\n` and may still become a record once more bytes arrive.
pub fn decode<'a, B>(bag: &mut B, input: &'a [u8]) -> Decoded<'a>
where
    B: Extend<Point>,
{
    let mut rest = input;
    let mut records = 0;
    let mut dropped = 0;
    let mut discarding = false;

    while !rest.is_empty() {
        let Some(newline) = rest.iter().position(|&b| b == b'\n') else {
            if !is_partial_record(rest) {
                dropped += 1;
                discarding = true;
                rest = &rest[rest.len()..];
            }
            break;
        };

        let (line, tail) = rest.split_at(newline + 1);
        match parse_record(line) {
            Some(point) => {
                bag.extend(iter::once(point));
                records += 1;
            }
            None => dropped += 1,
        }
        rest = tail;
    }

    Decoded {
        rest,
        records,
        dropped,
        discarding,
    }
}

/// Parses one line as a record.
fn parse_record(line: &[u8]) -> Option<Point> {
    let captures = RECORD.captures(line)?;
    let x = parse_number(captures.get(1)?.as_bytes())?;
    let y = parse_number(captures.get(2)?.as_bytes())?;
    Some(Point::new(x, y))
}

/// Parses a token already matched by [`NUMBER`]. Overflow is rejected.
fn parse_number(token: &[u8]) -> Option<f64> {
    let value: f64 = std::str::from_utf8(token).ok()?.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Returns `true` if `tail` could still grow into a record.
fn is_partial_record(tail: &[u8]) -> bool {
    tail.len() <= MAX_LINE_LEN
        && tail
            .iter()
            .all(|&b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E' | b',' | b' ' | b'\t' | b'\r'))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn points(pairs: &[(f64, f64)]) -> Vec<Point> {
        pairs.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn test_normal_input() {
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, b"43,324\r\n324,2123\r\n4234,2342\r\n");

        assert_eq!(bag, points(&[(43.0, 324.0), (324.0, 2123.0), (4234.0, 2342.0)]));
        assert!(out.rest.is_empty());
        assert_eq!(out.records, 3);
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn test_truncated_first_line() {
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, b"324\r\n324,2123\r\n4234,2342\r\n");

        assert_eq!(bag, points(&[(324.0, 2123.0), (4234.0, 2342.0)]));
        assert!(out.rest.is_empty());
        assert_eq!(out.dropped, 1);
    }

    #[test]
    fn test_invalid_utf8_between_valid_lines() {
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, b"43,324\r\n324,\xa0\xa12123\r\n4234,2342\r\n");

        assert_eq!(bag, points(&[(43.0, 324.0), (4234.0, 2342.0)]));
        assert!(out.rest.is_empty());
        assert_eq!(out.dropped, 1);
    }

    #[test]
    fn test_appends_to_existing_bag() {
        let mut bag = points(&[(1.0, 1.0)]);
        decode(&mut bag, b"2,2\r\n");
        assert_eq!(bag, points(&[(1.0, 1.0), (2.0, 2.0)]));
    }

    #[test]
    fn test_empty_input() {
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, b"");
        assert!(bag.is_empty());
        assert!(out.rest.is_empty());
        assert_eq!(out.records, 0);
        assert_eq!(out.dropped, 0);
        assert!(!out.discarding);
    }

    #[test]
    fn test_trailing_partial_record_is_kept() {
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, b"43,324\r\n324,2123\r\n4234,23");

        assert_eq!(bag, points(&[(43.0, 324.0), (324.0, 2123.0)]));
        assert_eq!(out.rest, b"4234,23");
        assert!(!out.discarding);
    }

    #[test]
    fn test_record_split_across_reads() {
        let mut bag: Vec<Point> = Vec::new();
        let first = decode(&mut bag, b"1,2\r\n4234,23");

        let mut carried = first.rest.to_vec();
        carried.extend_from_slice(b"42\r\n5,6\r\n");
        let second = decode(&mut bag, &carried);

        assert_eq!(bag, points(&[(1.0, 2.0), (4234.0, 2342.0), (5.0, 6.0)]));
        assert!(second.rest.is_empty());
    }

    #[test]
    fn test_split_between_cr_and_lf() {
        let mut bag: Vec<Point> = Vec::new();
        let first = decode(&mut bag, b"7,8\r");
        assert_eq!(first.rest, b"7,8\r");
        assert!(bag.is_empty());

        let mut carried = first.rest.to_vec();
        carried.push(b'\n');
        decode(&mut bag, &carried);
        assert_eq!(bag, points(&[(7.0, 8.0)]));
    }

    #[test]
    fn test_garbage_tail_is_discarded() {
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, b"1,2\r\n\xa0\xa1xyz");

        assert_eq!(bag, points(&[(1.0, 2.0)]));
        assert!(out.rest.is_empty());
        assert_eq!(out.dropped, 1);
        assert!(out.discarding);
    }

    #[test]
    fn test_overlong_tail_is_discarded() {
        let tail = vec![b'1'; MAX_LINE_LEN + 1];
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, &tail);

        assert!(bag.is_empty());
        assert!(out.rest.is_empty());
        assert!(out.discarding);
    }

    #[test]
    fn test_number_grammar() {
        let mut bag: Vec<Point> = Vec::new();
        decode(
            &mut bag,
            b"-1.5,+2\r\n.5,3.\r\n1e3,-2.5E-2\r\n  4,\t5\r\n6,7\n",
        );

        assert_eq!(
            bag,
            points(&[(-1.5, 2.0), (0.5, 3.0), (1000.0, -0.025), (4.0, 5.0), (6.0, 7.0)])
        );
    }

    #[test]
    fn test_rejected_forms() {
        let input: &[u8] = b"1 ,2\r\n1,2,3\r\n.,1\r\n1,2x\r\ninf,1\r\nnan,nan\r\n1e999,1\r\n,\r\n\r\n";
        let mut bag: Vec<Point> = Vec::new();
        let out = decode(&mut bag, input);

        assert!(bag.is_empty());
        assert_eq!(out.dropped, 9);
        assert!(out.rest.is_empty());
    }

    #[test]
    fn test_decodes_into_deque() {
        let mut bag: std::collections::VecDeque<Point> = std::collections::VecDeque::new();
        decode(&mut bag, b"1,2\r\n3,4\r\n");
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.front(), Some(&Point::new(1.0, 2.0)));
    }

    fn record_line() -> impl Strategy<Value = (i32, i32)> {
        (any::<i32>(), any::<i32>())
    }

    fn noise_line() -> impl Strategy<Value = Vec<u8>> {
        // Noise never contains a comma, so it cannot match the record grammar.
        prop::collection::vec(any::<u8>().prop_filter("no comma or newline", |b| *b != b',' && *b != b'\n'), 0..40)
    }

    proptest! {
        #[test]
        fn prop_never_panics_and_shrinks(input in prop::collection::vec(any::<u8>(), 0..512)) {
            let mut bag: Vec<Point> = Vec::new();
            let out = decode(&mut bag, &input);
            prop_assert!(out.rest.len() <= input.len());
            prop_assert!(out.rest.len() <= MAX_LINE_LEN);
            prop_assert!(!out.rest.contains(&b'\n'));
            prop_assert!(input.ends_with(out.rest));
            prop_assert!(!(out.discarding && !out.rest.is_empty()));
        }

        #[test]
        fn prop_resynchronizes_between_noise(
            lines in prop::collection::vec((record_line(), noise_line()), 0..20)
        ) {
            let mut input = Vec::new();
            let mut expected = Vec::new();
            for ((x, y), noise) in &lines {
                input.extend_from_slice(noise);
                input.extend_from_slice(b"\r\n");
                input.extend_from_slice(format!("{x},{y}\r\n").as_bytes());
                expected.push(Point::new(f64::from(*x), f64::from(*y)));
            }

            let mut bag: Vec<Point> = Vec::new();
            let out = decode(&mut bag, &input);
            prop_assert_eq!(bag, expected);
            prop_assert!(out.rest.is_empty());
        }

        #[test]
        fn prop_chunking_preserves_records(
            pairs in prop::collection::vec(record_line(), 0..20),
            split in any::<prop::sample::Index>()
        ) {
            let input: Vec<u8> = pairs
                .iter()
                .flat_map(|(x, y)| format!("{x},{y}\r\n").into_bytes())
                .collect();
            let at = split.index(input.len() + 1);

            let mut bag: Vec<Point> = Vec::new();
            let first = decode(&mut bag, &input[..at]);
            let mut carried = first.rest.to_vec();
            carried.extend_from_slice(&input[at..]);
            let second = decode(&mut bag, &carried);

            let expected: Vec<Point> = pairs
                .iter()
                .map(|(x, y)| Point::new(f64::from(*x), f64::from(*y)))
                .collect();
            prop_assert_eq!(bag, expected);
            prop_assert!(second.rest.is_empty());
        }
    }
}

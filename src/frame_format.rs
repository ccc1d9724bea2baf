//! Text record format for recorded frames.
//!
//! One line per frame. Every landmark contributes `X,Y,Z` with `.` as the
//! decimal point, and the triples are joined with `,` in layout order.

use crate::constants::{COORDS_PER_LANDMARK, NUM_LANDMARKS};
use crate::skeleton::{Frame, FrameSequence};
use crate::{Error, Result};
use nalgebra::Point3;

/// Encode a frame as a single record line (no line terminator)
#[must_use]
pub fn encode_frame(frame: &Frame) -> String {
    frame
        .points()
        .iter()
        .map(|p| format!("{},{},{}", p.x, p.y, p.z))
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode one record line. `line_no` is 1-based and only used for error reporting.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a field is not a number or the field count
/// does not match the reference layout
pub fn decode_frame(line: &str, line_no: usize) -> Result<Frame> {
    let fields: Vec<&str> = line.trim_end_matches('\r').split(',').collect();
    let expected = NUM_LANDMARKS * COORDS_PER_LANDMARK;
    if fields.len() != expected {
        return Err(Error::Parse {
            line: line_no,
            message: format!("expected {expected} fields, found {}", fields.len()),
        });
    }

    let mut values = Vec::with_capacity(expected);
    for (column, field) in fields.iter().enumerate() {
        let value: f64 = field.trim().parse().map_err(|e| Error::Parse {
            line: line_no,
            message: format!("field {} ({field:?}): {e}", column + 1),
        })?;
        values.push(value);
    }

    let points = values
        .chunks_exact(COORDS_PER_LANDMARK)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();
    Frame::new(points)
}

/// Decode a whole recording. Trailing empty lines are ignored; any other
/// malformed line fails the entire load.
///
/// # Errors
///
/// Returns [`Error::Parse`] for the first line that cannot be decoded
pub fn decode_lines<S: AsRef<str>>(lines: &[S]) -> Result<FrameSequence> {
    let content_len = lines
        .iter()
        .rposition(|l| !l.as_ref().trim().is_empty())
        .map_or(0, |last| last + 1);

    let mut sequence = FrameSequence::new();
    for (i, line) in lines[..content_len].iter().enumerate() {
        sequence.push(decode_frame(line.as_ref(), i + 1)?)?;
    }
    Ok(sequence)
}

/// Encode every frame of a sequence, one line each
#[must_use]
pub fn encode_sequence(sequence: &FrameSequence) -> Vec<String> {
    sequence.iter().map(encode_frame).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Landmark;

    fn sample_frame(seed: f64) -> Frame {
        let points = (0..NUM_LANDMARKS)
            .map(|i| {
                let i = i as f64;
                Point3::new(seed + i * 0.013, -seed + i * 0.27, 2.0 + seed * i)
            })
            .collect();
        Frame::new(points).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let frames: Vec<Frame> = (0..4).map(|k| sample_frame(k as f64 * 0.31)).collect();
        let sequence = FrameSequence::try_from(frames).unwrap();

        let lines = encode_sequence(&sequence);
        let decoded = decode_lines(&lines).unwrap();

        assert_eq!(decoded.len(), 4);
        for (a, b) in sequence.iter().zip(decoded.iter()) {
            assert_eq!(b.len(), NUM_LANDMARKS);
            for (p, q) in a.points().iter().zip(b.points()) {
                assert!((p - q).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_uses_decimal_point() {
        let mut frame = Frame::zeroed();
        frame.set_landmark(Landmark::Head, Point3::new(0.5, -1.25, 3.0));
        let line = encode_frame(&frame);
        assert!(line.starts_with("0.5,-1.25,3,"));
        assert_eq!(line.split(',').count(), NUM_LANDMARKS * 3);
    }

    #[test]
    fn test_trailing_empty_line_tolerated() {
        let line = encode_frame(&sample_frame(1.0));
        let lines = vec![line.clone(), line, String::new()];
        assert_eq!(decode_lines(&lines).unwrap().len(), 2);
    }

    #[test]
    fn test_bad_field_fails_whole_load() {
        let good = encode_frame(&sample_frame(0.0));
        let bad = good.replacen("0", "zero", 1);
        let lines = vec![good.clone(), bad, good];
        match decode_lines(&lines) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_short_line_fails() {
        let result = decode_frame("0.1,0.2,0.3", 7);
        assert!(matches!(result, Err(Error::Parse { line: 7, .. })));
    }

    #[test]
    fn test_empty_line_in_the_middle_fails() {
        let good = encode_frame(&sample_frame(0.0));
        let lines = vec![good.clone(), String::new(), good];
        assert!(decode_lines(&lines).is_err());
    }

    #[test]
    fn test_empty_input() {
        let lines: Vec<String> = vec![String::new()];
        assert!(decode_lines(&lines).unwrap().is_empty());
    }
}

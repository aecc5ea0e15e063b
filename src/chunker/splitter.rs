//! Generic paragraph/line size-bounding splitter shared by every
//! structural chunker

use unicode_segmentation::UnicodeSegmentation;

use crate::error::ChunkWarning;

/// One piece handed back by [`split_oversized`], relative to the unit
/// that was split.
pub struct SplitPiece {
    pub content: String,
    /// Byte offset of this piece's start within the unit that was split.
    pub start_in_unit: usize,
    /// Byte offset of this piece's end within the unit that was split.
    pub end_in_unit: usize,
}

/// Split `text` so that no returned piece exceeds `max_chunk_size` bytes,
/// preferring paragraph boundaries, then line boundaries, then emitting a
/// single oversized piece as a last resort (never cutting mid-grapheme).
///
/// `overlap` bytes of the end of each piece (besides the last) are repeated
/// at the start of the next piece, matching the advisory overlap semantics
/// of sub-chunk boundaries.
pub fn split_oversized(
    text: &str,
    max_chunk_size: usize,
    overlap: usize,
    base_offset: usize,
    warnings: &mut Vec<ChunkWarning>,
) -> Vec<SplitPiece> {
    if text.len() <= max_chunk_size {
        return vec![SplitPiece {
            content: text.to_string(),
            start_in_unit: 0,
            end_in_unit: text.len(),
        }];
    }

    let paragraphs: Vec<&str> = split_keep_boundaries(text, "\n\n");
    let mut units: Vec<&str> = Vec::new();
    for para in paragraphs {
        if para.len() > max_chunk_size {
            units.extend(split_keep_boundaries(para, "\n"));
        } else {
            units.push(para);
        }
    }

    let mut pieces: Vec<SplitPiece> = Vec::new();
    let mut buf = String::new();
    let mut buf_start = 0usize;
    let mut cursor = 0usize;

    let mut flush = |buf: &mut String, buf_start: usize, cursor: usize, pieces: &mut Vec<SplitPiece>| {
        if buf.is_empty() {
            return;
        }
        pieces.push(SplitPiece {
            content: std::mem::take(buf),
            start_in_unit: buf_start,
            end_in_unit: cursor,
        });
    };

    for unit in units {
        if unit.len() > max_chunk_size {
            flush(&mut buf, buf_start, cursor, &mut pieces);
            warnings.push(ChunkWarning::new(
                base_offset + cursor,
                "structural unit exceeds max_chunk_size and has no further split boundary",
                "OVERSIZE_LINE",
            ));
            pieces.push(SplitPiece {
                content: unit.to_string(),
                start_in_unit: cursor,
                end_in_unit: cursor + unit.len(),
            });
            cursor += unit.len();
            buf_start = cursor;
            continue;
        }

        if !buf.is_empty() && buf.len() + unit.len() > max_chunk_size {
            flush(&mut buf, buf_start, cursor, &mut pieces);
            buf_start = cursor;
        }
        if buf.is_empty() {
            buf_start = cursor;
        }
        buf.push_str(unit);
        cursor += unit.len();
    }
    flush(&mut buf, buf_start, cursor, &mut pieces);

    if overlap > 0 {
        apply_overlap(&mut pieces, overlap);
    }

    pieces
}

/// Prepend `overlap` trailing grapheme-safe bytes of each piece onto the
/// next piece's content, adjusting that piece's reported start offset back
/// to cover the repeated span.
fn apply_overlap(pieces: &mut [SplitPiece], overlap: usize) {
    for i in (1..pieces.len()).rev() {
        let tail = grapheme_safe_tail(&pieces[i - 1].content, overlap);
        if tail.is_empty() {
            continue;
        }
        let tail_len = tail.len();
        let mut merged = tail.to_string();
        merged.push_str(&pieces[i].content);
        pieces[i].content = merged;
        pieces[i].start_in_unit = pieces[i].start_in_unit.saturating_sub(tail_len);
    }
}

/// Return the longest suffix of `s` that is at most `max_bytes` long and
/// starts on a grapheme boundary.
fn grapheme_safe_tail(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut start = s.len() - max_bytes;
    while start < s.len() && !s.is_char_boundary(start) {
        start += 1;
    }
    // Re-align to the nearest grapheme cluster boundary at or after `start`.
    for (idx, _) in s.grapheme_indices(true) {
        if idx >= start {
            return &s[idx..];
        }
    }
    ""
}

/// Split `text` on occurrences of `sep`, keeping the separator attached to
/// the end of each piece except the last so offsets remain contiguous.
fn split_keep_boundaries<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    if text.is_empty() {
        return vec![];
    }
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find(sep) {
        let end = idx + sep.len();
        out.push(&rest[..end]);
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_under_limit_is_a_single_piece() {
        let mut warnings = Vec::new();
        let pieces = split_oversized("hello world", 100, 0, 0, &mut warnings);
        assert_eq!(pieces.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn splits_on_paragraph_boundaries() {
        let text = "para one here\n\npara two here\n\npara three here";
        let mut warnings = Vec::new();
        let pieces = split_oversized(text, 20, 0, 0, &mut warnings);
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.content.len() <= 20 || warnings.iter().any(|w| w.code == "OVERSIZE_LINE"));
        }
    }

    #[test]
    fn oversized_single_line_emits_warning() {
        let text = "a".repeat(50);
        let mut warnings = Vec::new();
        let pieces = split_oversized(&text, 10, 0, 0, &mut warnings);
        assert_eq!(pieces.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "OVERSIZE_LINE");
    }

    #[test]
    fn overlap_repeats_trailing_bytes() {
        let text = "a".repeat(30) + "\n\n" + &"b".repeat(30);
        let mut warnings = Vec::new();
        let pieces = split_oversized(&text, 30, 5, 0, &mut warnings);
        assert!(pieces.len() >= 2);
        assert!(pieces[1].content.starts_with("aaaaa"));
    }

    #[test]
    fn never_cuts_inside_a_multibyte_character() {
        let text = "π".repeat(20);
        let tail = grapheme_safe_tail(&text, 3);
        assert!(text.is_char_boundary(text.len() - tail.len()));
    }
}

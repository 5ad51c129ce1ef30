//! Chunking strategy (§4.5): pick boundaries by file kind, pack into a
//! character budget, overlap successive chunks by a small window. Ordinals
//! are contiguous from zero.

use codesearch_core::entities::FileKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub ordinal: u32,
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
}

/// Candidate split points: always includes `0` and `content.len()`, plus
/// kind-specific boundaries in between (function/heading/paragraph breaks).
/// Packing never has to split inside a boundary-delimited block unless that
/// block alone exceeds `max_chars`, in which case it is hard-split.
fn boundaries_for_kind(content: &str, kind: FileKind) -> Vec<usize> {
    let mut points = vec![0usize];

    match kind {
        FileKind::Code => {
            let mut offset = 0;
            let mut blank_run = 0;
            for line in content.split_inclusive('\n') {
                if line.trim().is_empty() {
                    blank_run += 1;
                } else {
                    if blank_run > 0 {
                        points.push(offset);
                    }
                    blank_run = 0;
                }
                offset += line.len();
            }
        }
        FileKind::StructuredDoc => {
            let mut offset = 0;
            for line in content.split_inclusive('\n') {
                if line.trim_start().starts_with('#') {
                    points.push(offset);
                }
                offset += line.len();
            }
        }
        FileKind::PlainText | FileKind::Unknown => {
            let mut offset = 0;
            let mut blank_run = 0;
            for line in content.split_inclusive('\n') {
                if line.trim().is_empty() {
                    blank_run += 1;
                } else {
                    if blank_run > 0 {
                        points.push(offset);
                    }
                    blank_run = 0;
                }
                offset += line.len();
            }
        }
    }

    points.push(content.len());
    points.sort_unstable();
    points.dedup();
    points
}

/// Packs `content` into chunks of at most `max_chars` characters, preferring
/// to break on a kind-specific boundary, with successive chunks overlapping
/// by `overlap_chars` of trailing context.
pub fn chunk_content(content: &str, kind: FileKind, max_chars: usize, overlap_chars: usize) -> Vec<TextChunk> {
    if content.is_empty() {
        return Vec::new();
    }

    let boundaries = boundaries_for_kind(content, kind);
    let mut chunks = Vec::new();
    let mut ordinal = 0u32;
    let mut start = 0usize;

    while start < content.len() {
        let budget_end = nearest_char_boundary(content, start + max_chars);
        let mut end = budget_end.min(content.len());

        if end < content.len() {
            if let Some(&boundary) = boundaries
                .iter()
                .filter(|&&b| b > start && b <= end)
                .max()
            {
                end = boundary;
            }
        }
        if end <= start {
            end = nearest_char_boundary(content, start + max_chars.max(1)).min(content.len());
        }

        let text = content[start..end].to_string();
        chunks.push(TextChunk {
            ordinal,
            byte_start: start,
            byte_end: end,
            text,
        });
        ordinal += 1;

        if end >= content.len() {
            break;
        }

        let next_start = end.saturating_sub(overlap_chars);
        // Round up, never down: rounding down here could land back on `start`
        // for a 2-byte char straddling `start + 1`, stalling the loop.
        start = ceil_char_boundary(content, next_start.max(start + 1));
    }

    chunks
}

fn nearest_char_boundary(content: &str, mut idx: usize) -> usize {
    if idx >= content.len() {
        return content.len();
    }
    while idx > 0 && !content.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(content: &str, mut idx: usize) -> usize {
    if idx >= content.len() {
        return content.len();
    }
    while idx < content.len() && !content.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_produces_no_chunks() {
        assert!(chunk_content("", FileKind::PlainText, 100, 10).is_empty());
    }

    #[test]
    fn short_content_is_a_single_chunk() {
        let chunks = chunk_content("hello world", FileKind::PlainText, 100, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].ordinal, 0);
        assert_eq!(chunks[0].text, "hello world");
    }

    #[test]
    fn ordinals_are_contiguous_from_zero() {
        let content = "a".repeat(500);
        let chunks = chunk_content(&content, FileKind::PlainText, 100, 10);
        let ordinals: Vec<u32> = chunks.iter().map(|c| c.ordinal).collect();
        let expected: Vec<u32> = (0..chunks.len() as u32).collect();
        assert_eq!(ordinals, expected);
    }

    #[test]
    fn successive_chunks_overlap() {
        let content = "a".repeat(300);
        let chunks = chunk_content(&content, FileKind::PlainText, 100, 20);
        assert!(chunks.len() >= 2);
        assert!(chunks[1].byte_start < chunks[0].byte_end, "second chunk must start before first ends");
    }

    #[test]
    fn structured_doc_prefers_heading_boundaries() {
        let content = "# Intro\nsome text here that is reasonably long for a section\n\n# Usage\nmore text in this section as well\n";
        let chunks = chunk_content(content, FileKind::StructuredDoc, 40, 5);
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn never_panics_on_multibyte_content() {
        let content = "héllo wörld ".repeat(50);
        let chunks = chunk_content(&content, FileKind::Code, 37, 9);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(content.is_char_boundary(chunk.byte_start));
            assert!(content.is_char_boundary(chunk.byte_end));
        }
    }
}

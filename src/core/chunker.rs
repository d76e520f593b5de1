use unicode_segmentation::UnicodeSegmentation;

/// Maximum segment length accepted by the translation provider per request.
pub const MAX_CHUNK_LEN: usize = 500;

/// Split `text` into ordered, contiguous segments of at most `max_len`
/// grapheme clusters each.
///
/// Concatenating the result reproduces the input exactly; the empty string
/// produces an empty sequence. Lengths are measured in UAX #29 grapheme
/// clusters so a segment boundary can never fall inside a character.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for grapheme in text.graphemes(true) {
        if count == max_len {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push_str(grapheme);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_segmentation::UnicodeSegmentation;

    #[test]
    fn empty_input_produces_no_chunks() {
        assert!(chunk_text("", 500).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        assert_eq!(chunk_text("Hello", 500), vec!["Hello".to_string()]);
    }

    #[test]
    fn concatenation_reproduces_the_input() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = chunk_text(&text, 500);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunk_count_is_ceiling_of_length_over_max() {
        for (len, max, expected) in [(1000, 500, 2), (1001, 500, 3), (500, 500, 1), (499, 500, 1)] {
            let text = "a".repeat(len);
            assert_eq!(chunk_text(&text, max).len(), expected, "len={} max={}", len, max);
        }
    }

    #[test]
    fn no_chunk_exceeds_the_maximum() {
        let text = "x".repeat(1234);
        for chunk in chunk_text(&text, 100) {
            assert!(chunk.graphemes(true).count() <= 100);
        }
    }

    #[test]
    fn multibyte_graphemes_are_never_split() {
        // Family emoji is a single grapheme built from several code points.
        let text = "a\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}b".repeat(5);
        let chunks = chunk_text(&text, 2);
        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(chunk.graphemes(true).count() <= 2);
        }
    }
}

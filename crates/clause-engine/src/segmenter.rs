//! Sentence segmentation with offsets into the original text.
//!
//! A sentence ends at `.`, `!` or `?` followed by whitespace; the punctuation
//! stays with its sentence. Offsets come from the scan position itself, which
//! only moves forward, so a sentence that occurs twice gets two different
//! locations.

use shared_types::Sentence;

/// Fragments must be strictly longer than this (in characters, after
/// trimming) to count as sentences.
pub const MIN_SENTENCE_CHARS: usize = 10;

const TERMINALS: [char; 3] = ['.', '!', '?'];

/// Split `text` into sentences, dropping fragments of `MIN_SENTENCE_CHARS`
/// characters or fewer. Offsets are byte offsets into `text`.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut start = 0;

    while let Some((i, c)) = chars.next() {
        if !TERMINALS.contains(&c) {
            continue;
        }
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }

        push_fragment(text, start, i + c.len_utf8(), &mut sentences);

        // Skip the separating whitespace run
        start = text.len();
        while let Some(&(j, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                start = j;
                break;
            }
            chars.next();
        }
    }

    push_fragment(text, start, text.len(), &mut sentences);
    sentences
}

fn push_fragment<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Sentence<'a>>) {
    if start >= end {
        return;
    }
    let fragment = &text[start..end];
    let trimmed = fragment.trim();
    if trimmed.chars().count() <= MIN_SENTENCE_CHARS {
        return;
    }

    let start_index = start + (fragment.len() - fragment.trim_start().len());
    out.push(Sentence {
        text: trimmed,
        start_index,
        end_index: start_index + trimmed.len(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn texts<'a>(sentences: &[Sentence<'a>]) -> Vec<&'a str> {
        sentences.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let text = "This agreement includes a waiver of liability for all damages. Notices must be sent by mail.";
        let sentences = split_sentences(text);
        assert_eq!(
            texts(&sentences),
            vec![
                "This agreement includes a waiver of liability for all damages.",
                "Notices must be sent by mail."
            ]
        );
        assert_eq!(sentences[0].start_index, 0);
        assert_eq!(sentences[1].start_index, 63);
        assert_eq!(sentences[1].end_index, text.len());
    }

    #[test]
    fn test_keeps_question_and_exclamation_marks() {
        let sentences = split_sentences(
            "Is this clause enforceable? It certainly is binding!\nYes indeed it is.",
        );
        assert_eq!(
            texts(&sentences),
            vec![
                "Is this clause enforceable?",
                "It certainly is binding!",
                "Yes indeed it is."
            ]
        );
    }

    #[test]
    fn test_punctuation_without_whitespace_does_not_split() {
        let sentences = split_sentences("The fee is 3.5 percent of U.S.A. sales per annum.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "The fee is 3.5 percent of U.S.A.");
        assert_eq!(sentences[1].text, "sales per annum.");
    }

    #[test]
    fn test_drops_short_fragments() {
        let sentences = split_sentences("Section 1. Short one. This sentence is long enough.");
        assert_eq!(texts(&sentences), vec!["This sentence is long enough."]);
    }

    #[test]
    fn test_eleven_chars_is_the_shortest_sentence() {
        assert_eq!(texts(&split_sentences("abcdefghi.")), Vec::<&str>::new());
        assert_eq!(texts(&split_sentences("abcdefghij.")), vec!["abcdefghij."]);
    }

    #[test]
    fn test_repeated_sentences_get_distinct_offsets() {
        let text = "Payment is due monthly. Payment is due monthly. Payment is due monthly.";
        let sentences = split_sentences(text);
        let starts: Vec<usize> = sentences.iter().map(|s| s.start_index).collect();
        assert_eq!(starts, vec![0, 24, 48]);
        for s in &sentences {
            assert_eq!(&text[s.start_index..s.end_index], s.text);
        }
    }

    #[test]
    fn test_leading_and_trailing_whitespace_excluded_from_offsets() {
        let text = "   \n  The tenant shall pay rent.   \n\n";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 1);
        assert_eq!(
            &text[sentences[0].start_index..sentences[0].end_index],
            "The tenant shall pay rent."
        );
    }

    #[test]
    fn test_multibyte_text_offsets_stay_on_char_boundaries() {
        let text = "Le fournisseur déclinera toute responsabilité. Über die Kündigung entscheidet der Käufer!";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 2);
        for s in &sentences {
            assert_eq!(&text[s.start_index..s.end_index], s.text);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    proptest! {
        #[test]
        fn offsets_reproduce_sentence_text(text in "[a-zA-Z .!?\n\u{e9}]{0,300}") {
            let sentences = split_sentences(&text);
            let mut cursor = 0;
            for s in &sentences {
                prop_assert!(s.start_index < s.end_index);
                prop_assert!(s.end_index <= text.len());
                prop_assert!(s.start_index >= cursor);
                prop_assert_eq!(&text[s.start_index..s.end_index], s.text);
                prop_assert!(s.text.chars().count() > MIN_SENTENCE_CHARS);
                cursor = s.end_index;
            }
        }
    }
}

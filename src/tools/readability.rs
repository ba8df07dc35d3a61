//! Readability metrics for short UX copy.

use crate::agent::{ParamType, ToolSpec};
use crate::error::ToolFailure;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Average sentence length (in words) above which copy is hard to scan.
pub const MAX_SCANNABLE_SENTENCE_WORDS: f64 = 18.0;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

#[derive(Debug, Deserialize)]
pub struct ReadabilityArgs {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadabilityReport {
    pub sentences: usize,
    pub words: usize,
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    pub assessment: String,
}

pub fn spec() -> ToolSpec {
    ToolSpec::new("compute_readability", "Analyze UX copy readability")
        .required("text", ParamType::String)
        .describe("The UX copy to analyze")
}

pub fn compute_readability(args: ReadabilityArgs) -> Result<ReadabilityReport, ToolFailure> {
    let sentences = args
        .text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    let words: Vec<&str> = WORD_PATTERN.find_iter(&args.text).map(|m| m.as_str()).collect();
    let letters: usize = words.iter().map(|w| w.chars().count()).sum();

    let avg_sentence_length = words.len() as f64 / sentences.max(1) as f64;
    let avg_word_length = letters as f64 / words.len().max(1) as f64;

    let assessment = if avg_sentence_length > MAX_SCANNABLE_SENTENCE_WORDS {
        "Hard to scan – sentences too long."
    } else {
        "Readable UX copy."
    };

    Ok(ReadabilityReport {
        sentences,
        words: words.len(),
        avg_sentence_length: round2(avg_sentence_length),
        avg_word_length: round2(avg_word_length),
        assessment: assessment.to_string(),
    })
}

/// Round to two decimals on the exact binary value, ties to even.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> ReadabilityReport {
        compute_readability(ReadabilityArgs {
            text: text.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_short_copy_is_readable() {
        let report = analyze("Pay now. Free shipping!");
        assert_eq!(report.sentences, 2);
        assert_eq!(report.words, 4);
        assert_eq!(report.avg_sentence_length, 2.0);
        assert_eq!(report.avg_word_length, 4.5);
        assert_eq!(report.assessment, "Readable UX copy.");
    }

    #[test]
    fn test_long_sentence_is_hard_to_scan() {
        let text = "word ".repeat(19);
        let report = analyze(&text);
        assert_eq!(report.sentences, 1);
        assert_eq!(report.words, 19);
        assert!(report.assessment.starts_with("Hard to scan"));
    }

    #[test]
    fn test_empty_text() {
        let report = analyze("   ");
        assert_eq!(report.sentences, 0);
        assert_eq!(report.words, 0);
        assert_eq!(report.avg_sentence_length, 0.0);
        assert_eq!(report.avg_word_length, 0.0);
    }

    #[test]
    fn test_round2_ties_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(17.0 / 3.0), 5.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_unicode_words() {
        let report = analyze("Pokračovať k platbe.");
        assert_eq!(report.words, 3);
        assert_eq!(report.avg_word_length, 5.67);
    }
}

//! Extractive summaries with TextRank.
//!
//! Text is cut into sentences on Chinese and Western sentence-ending
//! punctuation, each sentence is segmented into words with jieba, and the
//! sentences are ranked by PageRank over a word-overlap similarity graph.
//! The best-ranked sentences are returned verbatim, best first.

use itertools::Itertools;
use jieba_rs::Jieba;
use tracing::{debug, instrument};

/// Characters that end a sentence.
const SENTENCE_ENDINGS: [char; 5] = ['。', '！', '？', '!', '?'];

/// Separator used to rebuild the normalized document.
const SENTENCE_SEPARATOR: &str = "。";

const DAMPING: f64 = 0.85;
const EPSILON: f64 = 1e-4;
const ROW_DELTA: f64 = 1e-7;
const MAX_ITERATIONS: usize = 1000;

/// TextRank summarizer holding a loaded jieba dictionary.
pub struct Summarizer {
    jieba: Jieba,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer").finish_non_exhaustive()
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Summarizer {
    /// Load the default jieba dictionary.
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }

    /// Pick the `sentence_count` most central sentences of `text`.
    ///
    /// Returns them joined by `\n` in ranking order. Never returns more
    /// sentences than `text` contains; an empty `text` yields an empty
    /// string.
    #[instrument(level = "debug", skip_all, fields(chars = text.chars().count(), sentence_count = sentence_count))]
    pub fn summarize(&self, text: &str, sentence_count: usize) -> String {
        let document = split_sentences(text).join(SENTENCE_SEPARATOR);
        let sentences = split_sentences(&document);
        if sentences.is_empty() || sentence_count == 0 {
            return String::new();
        }

        let words: Vec<Vec<String>> = sentences.iter().map(|s| self.words(s)).collect();
        let ranks = power_method(&transition_matrix(&words));
        debug!(sentences = sentences.len(), "Ranked sentences");

        // Best first. Selected sentences are not put back into document order.
        (0..sentences.len())
            .sorted_by(|&a, &b| ranks[b].total_cmp(&ranks[a]).then(a.cmp(&b)))
            .take(sentence_count)
            .map(|i| sentences[i])
            .join("\n")
    }

    /// Lowercased word tokens of one sentence; numbers and punctuation are
    /// dropped.
    fn words(&self, sentence: &str) -> Vec<String> {
        self.jieba
            .cut(sentence, true)
            .into_iter()
            .filter(|token| is_word(token))
            .map(str::to_lowercase)
            .collect()
    }
}

/// Split on sentence-ending punctuation, trim, and drop empty pieces.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(SENTENCE_ENDINGS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// A token counts as a word when it starts with a letter and continues with
/// letters, apostrophes, or hyphens.
fn is_word(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {
            chars.all(|c| c.is_alphabetic() || c == '\'' || c == '-')
        }
        _ => false,
    }
}

/// Similarity of two sentences from their shared words, normalized by
/// sentence length.
fn edge_weight(a: &[String], b: &[String]) -> f64 {
    let shared: usize = a
        .iter()
        .map(|w| b.iter().filter(|other| *other == w).count())
        .sum();
    if shared == 0 {
        return 0.0;
    }
    let norm = (a.len() as f64).ln() + (b.len() as f64).ln();
    if norm.abs() < 1e-8 {
        shared as f64
    } else {
        shared as f64 / norm
    }
}

/// Row-stochastic transition matrix with damping applied.
fn transition_matrix(sentences: &[Vec<String>]) -> Vec<Vec<f64>> {
    let n = sentences.len();
    let mut weights = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let w = edge_weight(&sentences[i], &sentences[j]);
            weights[i][j] = w;
            weights[j][i] = w;
        }
    }

    let teleport = (1.0 - DAMPING) / n as f64;
    weights
        .into_iter()
        .map(|row| {
            let sum: f64 = row.iter().sum::<f64>() + ROW_DELTA;
            row.into_iter()
                .map(|w| teleport + DAMPING * (w / sum))
                .collect()
        })
        .collect()
}

/// Stationary distribution of `matrix` by power iteration.
fn power_method(matrix: &[Vec<f64>]) -> Vec<f64> {
    let n = matrix.len();
    let mut p = vec![1.0 / n as f64; n];
    for _ in 0..MAX_ITERATIONS {
        let next: Vec<f64> = (0..n)
            .map(|j| (0..n).map(|i| matrix[i][j] * p[i]).sum())
            .collect();
        let delta = next
            .iter()
            .zip(&p)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();
        p = next;
        if delta <= EPSILON {
            break;
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_handles_mixed_punctuation() {
        let text = "第一句。第二句！第三句？Fourth!Fifth?  。。 ";
        assert_eq!(
            split_sentences(text),
            vec!["第一句", "第二句", "第三句", "Fourth", "Fifth"]
        );
    }

    #[test]
    fn test_split_sentences_trims_surrounding_whitespace() {
        assert_eq!(split_sentences("\n甲乙\n。\n丙丁"), vec!["甲乙", "丙丁"]);
    }

    #[test]
    fn test_is_word_filters_numbers_and_punctuation() {
        assert!(is_word("通知"));
        assert!(is_word("TextRank"));
        assert!(is_word("co-op"));
        assert!(!is_word("2025"));
        assert!(!is_word("，"));
        assert!(!is_word(" "));
        assert!(!is_word(""));
    }

    #[test]
    fn test_words_segments_and_lowercases() {
        let words = Summarizer::new().words("2025年协会发布 TextRank 通知，请查收");
        assert!(!words.is_empty());
        assert!(words.iter().all(|w| is_word(w)));
        assert!(words.contains(&"textrank".to_string()));
        assert!(!words.iter().any(|w| w.contains("2025")));
    }

    #[test]
    fn test_edge_weight_counts_shared_words() {
        let a = vec!["培训".to_string(), "通知".to_string()];
        let b = vec!["通知".to_string(), "通知".to_string(), "会议".to_string()];
        let expected = 2.0 / (2f64.ln() + 3f64.ln());
        assert!((edge_weight(&a, &b) - expected).abs() < 1e-12);
        assert_eq!(edge_weight(&a, &["会议".to_string()]), 0.0);
    }

    #[test]
    fn test_power_method_on_uniform_matrix_stays_uniform() {
        let m = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let p = power_method(&m);
        assert!((p[0] - 0.5).abs() < 1e-9);
        assert!((p[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty_text() {
        let summarizer = Summarizer::new();
        assert_eq!(summarizer.summarize("", 3), "");
        assert_eq!(summarizer.summarize("。！？ ", 3), "");
    }

    #[test]
    fn test_summarize_never_pads_short_texts() {
        let summarizer = Summarizer::new();
        let summary = summarizer.summarize("协会召开年度会议。会议总结了全年工作", 3);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"协会召开年度会议"));
        assert!(lines.contains(&"会议总结了全年工作"));
    }

    #[test]
    fn test_summarize_returns_requested_count() {
        let summarizer = Summarizer::new();
        let text = "协会发布培训通知。培训安排在三月举行。请各单位按时报名参加培训。\
                    报名截止日期为二月底。联系人电话见附件。";
        let summary = summarizer.summarize(text, 3);
        assert_eq!(summary.lines().count(), 3);
        for line in summary.lines() {
            assert!(text.contains(line));
        }
    }

    #[test]
    fn test_summarize_prefers_central_sentence() {
        let summarizer = Summarizer::new();
        let text = "apple banana cherry! apple banana! banana cherry! apple cherry! zebra!";
        let summary = summarizer.summarize(text, 1);
        assert_eq!(summary, "apple banana cherry");
    }
}

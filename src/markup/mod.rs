//! Detectors for the transcription markup conventions
//!
//! Transcribers annotate paragraphs with a handful of inline tags:
//! - speaker turns start with "Parent..." or "Child..."
//! - page boundaries are written `[page 12]` or `[Page 12-a]`
//! - corrected words are kept beside the original as `nake [[snake]]`
//! - de-identified names are written `[child's name]`
//!
//! Each detector works on a single paragraph string.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Speaker;

/// Label that marks a page to leave out of the results
pub const STOP_LABEL: &str = "stop";

/// Number of leading characters inspected for a speaker tag
const SPEAKER_TAG_LEN: usize = 5;

static PAGE_MARKER: OnceLock<Regex> = OnceLock::new();
static CORRECTION: OnceLock<Regex> = OnceLock::new();
static REDACTION: OnceLock<Regex> = OnceLock::new();

fn page_marker() -> &'static Regex {
    PAGE_MARKER.get_or_init(|| {
        Regex::new(r"\[[pP]age (\d+-*\w*|(?i:stop))\]").expect("page marker pattern")
    })
}

fn correction() -> &'static Regex {
    CORRECTION.get_or_init(|| Regex::new(r"\[\[\w+\]\]").expect("correction pattern"))
}

fn redaction() -> &'static Regex {
    REDACTION.get_or_init(|| Regex::new(r"\[[a-zA-Z']+ name\]").expect("redaction pattern"))
}

/// Speaker whose turn this paragraph opens, if any
pub fn detect_speaker(text: &str) -> Option<Speaker> {
    let prefix: String = text.chars().take(SPEAKER_TAG_LEN).collect();
    Speaker::from_tag(&prefix.to_lowercase())
}

/// Label of the first page marker in the paragraph
pub fn find_page_label(text: &str) -> Option<&str> {
    page_marker()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_stop_label(label: &str) -> bool {
    label.eq_ignore_ascii_case(STOP_LABEL)
}

/// Whitespace-delimited tokens
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn count_page_markers(text: &str) -> usize {
    page_marker().find_iter(text).count()
}

pub fn count_corrections(text: &str) -> usize {
    correction().find_iter(text).count()
}

pub fn count_redactions(text: &str) -> usize {
    redaction().find_iter(text).count()
}

/// Net words spoken in a paragraph
///
/// A page marker splits into two tokens that are not speech. A correction
/// stands beside the word it corrects, and a redaction like `[child's name]`
/// is two tokens for one name, so each of those subtracts one. The result can
/// be negative for marker-only paragraphs.
pub fn net_word_count(text: &str) -> i64 {
    let tokens = count_tokens(text) as i64;
    let page_markers = count_page_markers(text) as i64;
    let corrections = count_corrections(text) as i64;
    let redactions = count_redactions(text) as i64;
    tokens - 2 * page_markers - corrections - redactions
}

// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reduce rendered HTML to a single line of readable text.
//!
//! Three passes over a `scraper` document:
//! 1. detach boilerplate elements (scripts, styles, banners, footers, menus),
//! 2. concatenate the remaining text nodes in document order,
//! 3. split into lines, trim, drop blanks, and join with one space.
//!
//! Parsing is html5ever's permissive tree builder, so malformed markup never
//! fails here.

use crate::error::ExtractError;
use scraper::{Html, Selector};
use tracing::debug;

/// Elements whose whole subtree is dropped before text is read.
///
/// `noscript` is included because a script-enabled parser keeps its body as
/// raw markup text.
pub const NOISE_ELEMENTS: &[&str] = &["script", "style", "header", "footer", "nav", "noscript"];

/// Characters of flattened text included in the debug log.
const LOG_PREVIEW_CHARS: usize = 500;

/// Normalized lines included in the debug log.
const LOG_PREVIEW_LINES: usize = 10;

/// Extract normalized plain text from an HTML document.
pub fn extract_text(html: &str) -> Result<String, ExtractError> {
    let mut document = Html::parse_document(html);
    remove_noise(&mut document)?;

    let flattened = flatten_text(&document);
    debug!(
        preview = %preview(&flattened, LOG_PREVIEW_CHARS),
        "flattened page text"
    );

    let lines = normalized_lines(&flattened);
    debug!(
        lines = ?&lines[..lines.len().min(LOG_PREVIEW_LINES)],
        total = lines.len(),
        "normalized lines"
    );

    Ok(lines.join(" "))
}

/// Detach every noise element from the tree.
pub fn remove_noise(document: &mut Html) -> Result<(), ExtractError> {
    let selector = Selector::parse(&NOISE_ELEMENTS.join(", "))
        .map_err(|e| ExtractError::Extraction(format!("noise selector: {e:?}")))?;

    let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    Ok(())
}

/// All text nodes under the root element, concatenated with no separator.
pub fn flatten_text(document: &Html) -> String {
    document.root_element().text().collect()
}

/// Split on every Unicode line boundary, trim, and drop empty lines.
pub fn normalized_lines(text: &str) -> Vec<&str> {
    text.split(is_line_break)
        .map(|line| line.trim_matches(is_blank))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Unicode whitespace plus the unit separator, which counts as blank here.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{1f}'
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{HEADING_PREFIX, Title};
use crate::error::ParseError;

/// A bullet (`-`, `*`, `+`) or a numbered marker (`1.`, `1)`) followed by the entry text.
static ENTRY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.*)$").expect("entry pattern is valid")
});

const KEPT_GLYPH: char = '✅';
const ADDED_GLYPH: char = '➕';
const REMOVED_GLYPH: char = '❌';

/// What a single snapshot line says about its title.
#[derive(Debug, PartialEq, Eq)]
enum Entry<'a> {
    Present(&'a str),
    /// A removal recorded by an earlier run; not part of the prior membership.
    Tombstone,
}

/// Parses a stored snapshot into the titles it lists as present, in document order.
///
/// Headings, blank lines and anything that is not an entry line are skipped. Status
/// glyphs and their markup are stripped, and removed entries are left out so that a
/// rendered snapshot parses back to exactly its current titles.
pub fn parse(text: &str) -> Result<Vec<Title>, ParseError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);

    let mut headings = 0;
    let mut seen = HashSet::new();
    let mut titles = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        if line.contains('\0') {
            return Err(ParseError::Binary { line: line_number });
        }

        if line.trim_start().starts_with(HEADING_PREFIX) {
            headings += 1;
            if headings > 1 {
                return Err(ParseError::MultipleHeadings { line: line_number });
            }
            continue;
        }

        let Some(Entry::Present(raw)) = parse_entry(line) else {
            continue;
        };

        match Title::parse(raw) {
            Ok(title) => {
                if seen.insert(title.clone()) {
                    titles.push(title);
                }
            }
            Err(_) => log::debug!("Skipping empty snapshot entry on line {}", line_number),
        }
    }

    Ok(titles)
}

fn parse_entry(line: &str) -> Option<Entry<'_>> {
    let body = ENTRY_LINE.captures(line)?.get(1)?.as_str();

    if body.starts_with(REMOVED_GLYPH) {
        return Some(Entry::Tombstone);
    }

    if let Some(rest) = body.strip_prefix(KEPT_GLYPH) {
        return Some(Entry::Present(rest.trim_start()));
    }

    if let Some(rest) = body.strip_prefix(ADDED_GLYPH) {
        let rest = rest.trim_start();
        return Some(Entry::Present(unwrap_markup(rest, "**").unwrap_or(rest)));
    }

    // Older documents marked removals with strike-through alone.
    if unwrap_markup(body, "~~").is_some() {
        return Some(Entry::Tombstone);
    }

    Some(Entry::Present(body))
}

/// Strips exactly one pair of `marker` wrapping `text`.
fn unwrap_markup<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    if text.len() < marker.len() * 2 {
        return None;
    }
    text.strip_prefix(marker)?.strip_suffix(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> Vec<String> {
        parse(text)
            .unwrap()
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_canonical_document() {
        let text = "## Playlist: Mix\n\n- ❌ ~~Gone~~\n- ✅ Stays\n- ➕ **Fresh**\n";
        assert_eq!(parsed(text), vec!["Stays", "Fresh"]);
    }

    #[test]
    fn test_parse_plain_bullets() {
        let text = "## Playlist: Mix\n- One\n- Two\n";
        assert_eq!(parsed(text), vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_legacy_numbered_list() {
        let text = "1. ✅ One\n2. ❌ Two\n3. ➕ Three\n10) Four\n";
        assert_eq!(parsed(text), vec!["One", "Three", "Four"]);
    }

    #[test]
    fn test_parse_legacy_strike_through_is_removed() {
        let text = "- ~~Old~~\n- Current\n";
        assert_eq!(parsed(text), vec!["Current"]);
    }

    #[test]
    fn test_parse_skips_non_entry_lines() {
        let text = "Some preamble\n---\n-NoSpace\n# Other heading\n  - Indented\n\n* Star\n";
        assert_eq!(parsed(text), vec!["Indented", "Star"]);
    }

    #[test]
    fn test_parse_deduplicates_keeping_first() {
        let text = "- B\n- A\n- ✅ B\n- B\u{200B}\n";
        assert_eq!(parsed(text), vec!["B", "A"]);
    }

    #[test]
    fn test_parse_handles_crlf_and_bom() {
        let text = "\u{FEFF}## Playlist: Mix\r\n- ✅ One\r\n- ➕ **Two**\r\n";
        assert_eq!(parsed(text), vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_glyph_only_titles_survive() {
        let text = "- ✅ ✅ check\n- ➕ ******\n";
        assert_eq!(parsed(text), vec!["✅ check", "**"]);
    }

    #[test]
    fn test_parse_skips_empty_entries() {
        let text = "- ✅\n- ➕ \n- Real\n";
        assert_eq!(parsed(text), vec!["Real"]);
    }

    #[test]
    fn test_parse_rejects_binary() {
        assert_eq!(
            parse("- One\n- T\0wo\n"),
            Err(ParseError::Binary { line: 2 })
        );
    }

    #[test]
    fn test_parse_rejects_second_heading() {
        let text = "## Playlist: A\n- One\n## Playlist: B\n- Two\n";
        assert_eq!(
            parse(text),
            Err(ParseError::MultipleHeadings { line: 3 })
        );
    }
}

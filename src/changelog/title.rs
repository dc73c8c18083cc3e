use std::fmt;

const BYTE_ORDER_MARK: char = '\u{FEFF}';
const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Raised when a raw title is empty once invisible characters are stripped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Title is empty after normalization")]
pub struct EmptyTitleError;

/// A normalized, non-empty item title.
///
/// Two raw titles that normalize to the same text are the same `Title`.
/// Normalization never folds case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Title(String);

impl Title {
    /// Normalize a raw title.
    ///
    /// - Removes every zero-width space and every control character other than tab and
    ///   line feed (carriage returns and NUL included)
    /// - Folds line feeds to a space, so a title always fits on one snapshot line
    /// - Trims surrounding whitespace, including any leading byte-order marks
    pub fn parse(raw: &str) -> Result<Self, EmptyTitleError> {
        let cleaned: String = raw
            .chars()
            .filter(|&c| c != ZERO_WIDTH_SPACE && !is_stripped_control(c))
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();

        let trimmed = cleaned
            .trim_start_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK)
            .trim_end();

        if trimmed.is_empty() {
            return Err(EmptyTitleError);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_stripped_control(c: char) -> bool {
    c.is_control() && c != '\n' && c != '\t'
}

/// Normalize a raw title into its canonical text.
pub fn normalize(raw: &str) -> Result<Title, EmptyTitleError> {
    Title::parse(raw)
}

/// Normalize every raw title, dropping the ones that end up empty.
///
/// This is the single empty-title policy for all bulk ingestion.
pub(crate) fn normalize_lossy<I, S>(raw: I) -> impl Iterator<Item = Title>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().filter_map(|s| match normalize(s.as_ref()) {
        Ok(title) => Some(title),
        Err(_) => {
            log::debug!("Dropping empty title {:?}", s.as_ref());
            None
        }
    })
}

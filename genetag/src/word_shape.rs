//! Shape classes standing in for rare and unseen tokens.
//!
//! A trigram model estimated from a small corpus has no useful emission
//! statistics for words it saw fewer than [`RARE_THRESHOLD`] times. Such
//! words are pooled into a handful of shape classes so that an unseen
//! token like `p53` can still borrow the statistics of every rare numeric
//! token in the training data.

use crate::count_model::CountModel;

/// Words observed fewer times than this are folded into their shape class.
pub const RARE_THRESHOLD: u64 = 5;

/// Shape class of a token.
///
/// Classification checks the classes in a fixed order and the first match
/// wins: a digit anywhere makes the token [`Numeric`](Self::Numeric) even if
/// the rest of it is upper case.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum WordShape {
    /// Contains at least one ASCII digit.
    Numeric,

    /// Consists entirely of ASCII upper-case letters.
    AllCaps,

    /// Ends with an ASCII upper-case letter.
    LastCap,

    /// Everything else.
    Rare,
}

impl WordShape {
    /// Classifies a token into its shape class.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetag::WordShape;
    ///
    /// assert_eq!(WordShape::Numeric, WordShape::classify("p53"));
    /// assert_eq!(WordShape::AllCaps, WordShape::classify("DNA"));
    /// assert_eq!(WordShape::LastCap, WordShape::classify("GvH"));
    /// assert_eq!(WordShape::Rare, WordShape::classify("kinase"));
    /// ```
    pub fn classify(token: &str) -> Self {
        if token.chars().any(|c| c.is_ascii_digit()) {
            Self::Numeric
        } else if !token.is_empty() && token.chars().all(|c| c.is_ascii_uppercase()) {
            Self::AllCaps
        } else if token.chars().last().map_or(false, |c| c.is_ascii_uppercase()) {
            Self::LastCap
        } else {
            Self::Rare
        }
    }

    /// Returns the pseudo-word standing for this shape class in the counts.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Numeric => "_NUMERIC_",
            Self::AllCaps => "_ALLCAPS_",
            Self::LastCap => "_LASTCAP_",
            Self::Rare => "_RARE_",
        }
    }

    /// Returns the shape class a pseudo-word stands for, if it is one.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "_NUMERIC_" => Some(Self::Numeric),
            "_ALLCAPS_" => Some(Self::AllCaps),
            "_LASTCAP_" => Some(Self::LastCap),
            "_RARE_" => Some(Self::Rare),
            _ => None,
        }
    }
}

/// Maps a token to the word the emission tables are keyed by.
///
/// Frequent words map to themselves. Rare and unseen words map to the
/// pseudo-word of their shape class, and pseudo-words map to themselves, so
/// resolving an already resolved word never changes it.
///
/// # Examples
///
/// ```
/// use genetag::{resolve, CountModel};
///
/// # fn main() -> genetag::Result<()> {
/// let counts = "5 WORDTAG O the\n1 WORDTAG I-GENE p53\n";
/// let model = CountModel::from_counts(counts.as_bytes())?;
///
/// assert_eq!("the", resolve("the", &model));
/// assert_eq!("_NUMERIC_", resolve("p53", &model));
/// assert_eq!("_RARE_", resolve("unseen", &model));
/// assert_eq!("_RARE_", resolve("_RARE_", &model));
/// # Ok(())
/// # }
/// ```
pub fn resolve<'a>(word: &'a str, model: &CountModel) -> &'a str {
    if let Some(shape) = WordShape::from_keyword(word) {
        return shape.keyword();
    }
    if model.word_total(word) >= RARE_THRESHOLD {
        word
    } else {
        WordShape::classify(word).keyword()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_numeric() {
        assert_eq!(WordShape::Numeric, WordShape::classify("12"));
        assert_eq!(WordShape::Numeric, WordShape::classify("p53"));
        assert_eq!(WordShape::Numeric, WordShape::classify("IL-2"));
        assert_eq!(WordShape::Numeric, WordShape::classify("2.5"));
    }

    #[test]
    fn test_classify_all_caps() {
        assert_eq!(WordShape::AllCaps, WordShape::classify("DNA"));
        assert_eq!(WordShape::AllCaps, WordShape::classify("X"));
    }

    #[test]
    fn test_classify_last_cap() {
        assert_eq!(WordShape::LastCap, WordShape::classify("GvH"));
        assert_eq!(WordShape::LastCap, WordShape::classify("anti-CD"));
    }

    #[test]
    fn test_classify_rare() {
        assert_eq!(WordShape::Rare, WordShape::classify("kinase"));
        assert_eq!(WordShape::Rare, WordShape::classify("Gene-x"));
        assert_eq!(WordShape::Rare, WordShape::classify("."));
    }

    #[test]
    fn test_classify_numeric_wins_over_all_caps() {
        // digits disqualify the all-upper-case check even though every
        // letter is upper case
        assert_eq!(WordShape::Numeric, WordShape::classify("CD4"));
    }

    #[test]
    fn test_classify_all_caps_wins_over_last_cap() {
        assert_eq!(WordShape::AllCaps, WordShape::classify("HIV"));
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(WordShape::Rare, WordShape::classify(""));
    }

    #[test]
    fn test_classify_non_ascii() {
        // only ASCII letters count as upper case
        assert_eq!(WordShape::Rare, WordShape::classify("Σ"));
        assert_eq!(WordShape::LastCap, WordShape::classify("ÅNGSTRÖM"));
    }

    #[test]
    fn test_keyword_roundtrip() {
        for shape in [
            WordShape::Numeric,
            WordShape::AllCaps,
            WordShape::LastCap,
            WordShape::Rare,
        ] {
            assert_eq!(Some(shape), WordShape::from_keyword(shape.keyword()));
        }
    }

    #[test]
    fn test_from_keyword_rejects_plain_words() {
        assert_eq!(None, WordShape::from_keyword("RARE"));
        assert_eq!(None, WordShape::from_keyword("_rare_"));
        assert_eq!(None, WordShape::from_keyword(""));
    }

    #[test]
    fn test_resolve_keyword_ignores_frequency() {
        // pseudo-words resolve to themselves even when the tables have
        // no entry for them
        let model = CountModel::default();
        assert_eq!("_NUMERIC_", resolve("_NUMERIC_", &model));
        assert_eq!("_RARE_", resolve("_RARE_", &model));
    }

    #[test]
    fn test_resolve_unseen_word() {
        let model = CountModel::default();
        assert_eq!("_RARE_", resolve("kinase", &model));
        assert_eq!("_NUMERIC_", resolve("p53", &model));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let model = CountModel::default();
        let once = resolve("GvH", &model);
        assert_eq!(once, resolve(once, &model));
    }
}

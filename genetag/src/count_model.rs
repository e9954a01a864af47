//! Count tables of a trained trigram model.
//!
//! The tables are estimated from a counts file of whitespace-separated
//! records, one per line:
//!
//! ```text
//! <count> WORDTAG <tag> <word>
//! <count> <n>-GRAM <tag_1> ... <tag_n>
//! ```
//!
//! `WORDTAG` records count how often a tag emitted a word. `n-GRAM` records
//! count tag n-grams over sentences padded with two [`START_TAG`]s in front
//! and one [`STOP_TAG`] behind. Orders 1 to 3 are accepted and stored, but
//! only bigrams and trigrams are ever queried.

use std::io::BufRead;

use bincode::{Decode, Encode};

use crate::errors::{GenetagError, Result};
use crate::utils::SerializableHashMap;
use crate::word_shape::{WordShape, RARE_THRESHOLD};

/// Pseudo-tag padding the two virtual positions in front of a sentence.
pub const START_TAG: &str = "*";

/// Pseudo-tag padding the virtual position behind a sentence.
pub const STOP_TAG: &str = "STOP";

/// Frequency tables of a trigram hidden Markov model.
///
/// A freshly loaded table keeps words exactly as the counts file spells
/// them. [`CountModel::fold_rare_words`] pools words rarer than
/// [`RARE_THRESHOLD`] into their shape classes; probability queries only
/// become useful for unseen words after that step, which
/// [`Model::from_counts`](crate::Model::from_counts) performs automatically.
#[derive(Debug, Clone, Default, PartialEq, Decode, Encode)]
pub struct CountModel {
    // count(s): how often each tag was observed emitting any word
    pub(crate) tag_totals: SerializableHashMap<String, u64>,

    // count(s -> x): per-tag emission counts, keyed tag first
    pub(crate) emission_counts: SerializableHashMap<String, SerializableHashMap<String, u64>>,

    // tag n-grams keyed by the space-joined tags
    pub(crate) ngram_counts: SerializableHashMap<String, u64>,

    // how often each word was observed under any tag
    pub(crate) word_totals: SerializableHashMap<String, u64>,
}

impl CountModel {
    /// Loads count tables from a counts file.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A reader of the counts file.
    ///
    /// # Returns
    ///
    /// A new [`CountModel`]. Rare words are not folded yet.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidModel`] is returned if a record is malformed,
    /// has a record kind other than `WORDTAG` and `1-GRAM` to `3-GRAM`, or
    /// carries an unparsable count.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetag::CountModel;
    ///
    /// # fn main() -> genetag::Result<()> {
    /// let counts = "\
    /// 8 WORDTAG O the
    /// 2 WORDTAG I-GENE BRCA1
    /// 4 2-GRAM * *
    /// 2 3-GRAM * * O
    /// ";
    /// let model = CountModel::from_counts(counts.as_bytes())?;
    ///
    /// assert_eq!(vec!["I-GENE", "O"], model.known_tags());
    /// assert_eq!(1.0, model.emission_probability("the", "O"));
    /// assert_eq!(0.5, model.transition_probability("O", "*", "*"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_counts<R>(rdr: R) -> Result<Self>
    where
        R: BufRead,
    {
        let mut model = Self::default();
        for (i, line) in rdr.lines().enumerate() {
            let line = line?;
            let lineno = i + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 2 {
                return Err(GenetagError::invalid_model(format!(
                    "line {lineno}: record is too short: {line:?}"
                )));
            }
            let count: u64 = fields[0].parse().map_err(|_| {
                GenetagError::invalid_model(format!(
                    "line {lineno}: invalid count: {:?}",
                    fields[0]
                ))
            })?;
            if fields[1] == "WORDTAG" {
                if fields.len() != 4 {
                    return Err(GenetagError::invalid_model(format!(
                        "line {lineno}: WORDTAG record must be `count WORDTAG tag word`"
                    )));
                }
                model.add_word_tag(count, fields[2], fields[3]);
            } else {
                let n = match fields[1].strip_suffix("-GRAM").map(str::parse::<usize>) {
                    Some(Ok(n)) => n,
                    _ => {
                        return Err(GenetagError::invalid_model(format!(
                            "line {lineno}: unknown record kind: {:?}",
                            fields[1]
                        )))
                    }
                };
                if !(1..=3).contains(&n) {
                    return Err(GenetagError::invalid_model(format!(
                        "line {lineno}: unsupported n-gram order: {n}"
                    )));
                }
                if fields.len() != n + 2 {
                    return Err(GenetagError::invalid_model(format!(
                        "line {lineno}: {n}-GRAM record must list {n} tags"
                    )));
                }
                model.add_ngram(count, &fields[2..]);
            }
        }
        Ok(model)
    }

    pub(crate) fn add_word_tag(&mut self, count: u64, tag: &str, word: &str) {
        *self.tag_totals.entry(tag.to_string()).or_insert(0) += count;
        *self
            .emission_counts
            .entry(tag.to_string())
            .or_default()
            .entry(word.to_string())
            .or_insert(0) += count;
        *self.word_totals.entry(word.to_string()).or_insert(0) += count;
    }

    pub(crate) fn add_ngram(&mut self, count: u64, tags: &[&str]) {
        *self.ngram_counts.entry(tags.join(" ")).or_insert(0) += count;
    }

    /// Returns the maximum-likelihood emission probability e(word | tag).
    ///
    /// The estimate is count(tag -> word) / count(tag). Unseen combinations
    /// and unseen tags yield zero.
    pub fn emission_probability(&self, word: &str, tag: &str) -> f64 {
        let total = match self.tag_totals.get(tag) {
            Some(&total) if total > 0 => total,
            _ => return 0.0,
        };
        self.emission_counts
            .get(tag)
            .and_then(|words| words.get(word))
            .map_or(0.0, |&count| count as f64 / total as f64)
    }

    /// Returns the maximum-likelihood transition probability
    /// q(tag | prior2, prior1).
    ///
    /// The estimate is count(prior2, prior1, tag) / count(prior2, prior1).
    /// An unseen trigram yields zero, as does an unseen conditioning bigram.
    pub fn transition_probability(&self, tag: &str, prior2: &str, prior1: &str) -> f64 {
        let bigram = format!("{prior2} {prior1}");
        let denom = match self.ngram_counts.get(&bigram) {
            Some(&count) if count > 0 => count,
            _ => return 0.0,
        };
        self.ngram_counts
            .get(&format!("{bigram} {tag}"))
            .map_or(0.0, |&count| count as f64 / denom as f64)
    }

    /// Returns every tag observed emitting a word, sorted lexicographically.
    ///
    /// The pseudo-tags [`START_TAG`] and [`STOP_TAG`] are never included.
    pub fn known_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .tag_totals
            .keys()
            .map(String::as_str)
            .filter(|&tag| tag != START_TAG && tag != STOP_TAG)
            .collect();
        tags.sort_unstable();
        tags
    }

    /// Returns how often a word was observed under any tag.
    pub fn word_total(&self, word: &str) -> u64 {
        self.word_totals.get(word).copied().unwrap_or(0)
    }

    /// Returns how often a tag was observed emitting any word.
    pub fn tag_total(&self, tag: &str) -> u64 {
        self.tag_totals.get(tag).copied().unwrap_or(0)
    }

    /// Folds every rare word into the pseudo-word of its shape class.
    ///
    /// Emission and word counts of words observed fewer than
    /// [`RARE_THRESHOLD`] times are removed and added to their shape
    /// pseudo-word, so per-tag totals are preserved. Pseudo-words
    /// themselves are left alone no matter how rare, which makes folding
    /// idempotent.
    pub fn fold_rare_words(&mut self) {
        // snapshot first, the table is modified below
        let rare: Vec<String> = self
            .word_totals
            .iter()
            .filter(|&(word, &total)| {
                total < RARE_THRESHOLD && WordShape::from_keyword(word).is_none()
            })
            .map(|(word, _)| word.clone())
            .collect();
        for word in rare {
            let keyword = WordShape::classify(&word).keyword();
            if let Some(count) = self.word_totals.remove(&word) {
                *self.word_totals.entry(keyword.to_string()).or_insert(0) += count;
            }
            for words in self.emission_counts.values_mut() {
                if let Some(count) = words.remove(&word) {
                    *words.entry(keyword.to_string()).or_insert(0) += count;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTS: &str = "\
6 WORDTAG O the
1 WORDTAG O walaby
2 WORDTAG I-GENE p53
1 WORDTAG I-GENE BRCA
1 WORDTAG O BRCA
3 WORDTAG I-GENE kinase
8 2-GRAM * *
8 3-GRAM * * O
5 2-GRAM O I-GENE
3 3-GRAM O I-GENE STOP
2 1-GRAM O
";

    fn assert_tag_totals_consistent(model: &CountModel) {
        for (tag, &total) in model.tag_totals.iter() {
            let sum: u64 = model
                .emission_counts
                .get(tag)
                .map_or(0, |words| words.values().sum());
            assert_eq!(total, sum, "emission counts of {tag} do not sum up");
        }
    }

    #[test]
    fn test_from_counts() {
        let model = CountModel::from_counts(COUNTS.as_bytes()).unwrap();

        assert_eq!(8, model.tag_total("O"));
        assert_eq!(6, model.tag_total("I-GENE"));
        assert_eq!(6, model.word_total("the"));
        assert_eq!(2, model.word_total("BRCA"));
        assert_eq!(0, model.word_total("unseen"));
        assert_eq!(vec!["I-GENE", "O"], model.known_tags());
        assert_eq!(Some(&2), model.ngram_counts.get("O"));
        assert_tag_totals_consistent(&model);
    }

    #[test]
    fn test_from_counts_skips_blank_lines() {
        let model = CountModel::from_counts("\n5 WORDTAG O the\n\n".as_bytes()).unwrap();
        assert_eq!(5, model.word_total("the"));
    }

    #[test]
    fn test_from_counts_invalid_count() {
        let result = CountModel::from_counts("x WORDTAG O the".as_bytes());
        assert_eq!(
            "InvalidModelError: line 1: invalid count: \"x\"",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_counts_short_record() {
        let result = CountModel::from_counts("5 WORDTAG O the\n7".as_bytes());
        assert_eq!(
            "InvalidModelError: line 2: record is too short: \"7\"",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_counts_wordtag_arity() {
        let result = CountModel::from_counts("5 WORDTAG O".as_bytes());
        assert_eq!(
            "InvalidModelError: line 1: WORDTAG record must be `count WORDTAG tag word`",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_counts_unknown_kind() {
        let result = CountModel::from_counts("5 TRIGRAM A B C".as_bytes());
        assert_eq!(
            "InvalidModelError: line 1: unknown record kind: \"TRIGRAM\"",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_counts_unsupported_order() {
        let result = CountModel::from_counts("5 4-GRAM A B C D".as_bytes());
        assert_eq!(
            "InvalidModelError: line 1: unsupported n-gram order: 4",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_counts_ngram_arity() {
        let result = CountModel::from_counts("5 2-GRAM O".as_bytes());
        assert_eq!(
            "InvalidModelError: line 1: 2-GRAM record must list 2 tags",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_counts_accumulates_repeated_records() {
        let model =
            CountModel::from_counts("2 WORDTAG O the\n3 WORDTAG O the".as_bytes()).unwrap();
        assert_eq!(5, model.word_total("the"));
        assert_eq!(5, model.tag_total("O"));
    }

    #[test]
    fn test_emission_probability() {
        let model = CountModel::from_counts(COUNTS.as_bytes()).unwrap();

        assert_eq!(0.75, model.emission_probability("the", "O"));
        assert_eq!(0.5, model.emission_probability("kinase", "I-GENE"));
        assert_eq!(0.0, model.emission_probability("unseen", "O"));
        assert_eq!(0.0, model.emission_probability("the", "I-GENE"));
        assert_eq!(0.0, model.emission_probability("the", "NOTAG"));
    }

    #[test]
    fn test_transition_probability() {
        let model = CountModel::from_counts(COUNTS.as_bytes()).unwrap();

        assert_eq!(1.0, model.transition_probability("O", "*", "*"));
        assert_eq!(0.6, model.transition_probability("STOP", "O", "I-GENE"));
        // unseen trigram under a seen bigram
        assert_eq!(0.0, model.transition_probability("O", "O", "I-GENE"));
        // unseen conditioning bigram
        assert_eq!(0.0, model.transition_probability("O", "I-GENE", "I-GENE"));
    }

    #[test]
    fn test_known_tags_excludes_pseudo_tags() {
        let counts = "1 WORDTAG * x\n1 WORDTAG STOP y\n5 WORDTAG O the";
        let model = CountModel::from_counts(counts.as_bytes()).unwrap();
        assert_eq!(vec!["O"], model.known_tags());
    }

    #[test]
    fn test_fold_rare_words() {
        let mut model = CountModel::from_counts(COUNTS.as_bytes()).unwrap();
        model.fold_rare_words();

        // walaby(1) and kinase(3) pool into _RARE_, p53(2) into _NUMERIC_,
        // BRCA(2) into _ALLCAPS_
        assert_eq!(0, model.word_total("walaby"));
        assert_eq!(0, model.word_total("kinase"));
        assert_eq!(4, model.word_total("_RARE_"));
        assert_eq!(2, model.word_total("_NUMERIC_"));
        assert_eq!(2, model.word_total("_ALLCAPS_"));
        assert_eq!(6, model.word_total("the"));

        assert_eq!(0.125, model.emission_probability("_RARE_", "O"));
        assert_eq!(0.5, model.emission_probability("_RARE_", "I-GENE"));
        assert_eq!(1.0 / 3.0, model.emission_probability("_NUMERIC_", "I-GENE"));
        assert_eq!(0.125, model.emission_probability("_ALLCAPS_", "O"));
        assert_eq!(0.75, model.emission_probability("the", "O"));
        assert_eq!(0.0, model.emission_probability("walaby", "O"));
    }

    #[test]
    fn test_fold_rare_words_preserves_totals() {
        let mut model = CountModel::from_counts(COUNTS.as_bytes()).unwrap();
        model.fold_rare_words();

        assert_eq!(8, model.tag_total("O"));
        assert_eq!(6, model.tag_total("I-GENE"));
        assert_tag_totals_consistent(&model);
    }

    #[test]
    fn test_fold_rare_words_is_idempotent() {
        let mut model = CountModel::from_counts(COUNTS.as_bytes()).unwrap();
        model.fold_rare_words();
        let folded = model.clone();
        model.fold_rare_words();
        assert_eq!(folded, model);
    }
}

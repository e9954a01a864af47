//! Count collection from labeled corpora.

use std::io::{BufRead, Write};

use hashbrown::HashMap;

use crate::count_model::{CountModel, START_TAG, STOP_TAG};
use crate::errors::{GenetagError, Result};
use crate::model::Model;
use crate::sentence::{Sentence, TaggedSentenceReader};

/// Trainer collecting emission and tag n-gram counts.
///
/// Every added sentence contributes one count per token/tag pair and one
/// count per tag n-gram of orders 1 to 3 over the padded tag sequence
/// `* * y_1 ... y_n STOP`, except that the padding never counts as a
/// unigram. The counts can be written to a counts file or compiled into a
/// [`Model`] directly; both routes produce the same model.
///
/// # Examples
///
/// ```
/// use genetag::{Sentence, Trainer};
///
/// # fn main() -> genetag::Result<()> {
/// let mut trainer = Trainer::new();
/// trainer.add_sentence(&Sentence::from_pairs([("BRCA1", "I-GENE")])?)?;
///
/// let mut counts = vec![];
/// trainer.write_counts(&mut counts)?;
/// assert!(counts.starts_with(b"1 WORDTAG I-GENE BRCA1\n"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    // keyed (tag, word)
    word_tags: HashMap<(String, String), u64>,

    // orders 1 to 3, keyed by the tag sequence
    ngrams: [HashMap<Vec<String>, u64>; 3],
}

impl Trainer {
    /// Creates a new trainer with empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the counts of one tagged sentence.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidArgument`] is returned if the sentence is not
    /// fully tagged.
    pub fn add_sentence(&mut self, sentence: &Sentence) -> Result<()> {
        if sentence.tags().len() != sentence.tokens().len() {
            return Err(GenetagError::invalid_argument(
                "sentence",
                "not every token is tagged",
            ));
        }
        for (token, tag) in sentence.tokens().iter().zip(sentence.tags()) {
            *self
                .word_tags
                .entry((tag.clone(), token.clone()))
                .or_insert(0) += 1;
        }

        let mut padded: Vec<&str> = Vec::with_capacity(sentence.len() + 3);
        padded.push(START_TAG);
        padded.push(START_TAG);
        padded.extend(sentence.tags().iter().map(String::as_str));
        padded.push(STOP_TAG);
        for n in 1..=3 {
            for window in padded.windows(n) {
                if n == 1 && window[0] == START_TAG {
                    continue;
                }
                let key: Vec<String> = window.iter().map(|tag| tag.to_string()).collect();
                *self.ngrams[n - 1].entry(key).or_insert(0) += 1;
            }
        }
        Ok(())
    }

    /// Adds the counts of every sentence of a labeled corpus.
    ///
    /// # Returns
    ///
    /// The number of sentences added.
    ///
    /// # Errors
    ///
    /// Read and format errors of the corpus are returned as is.
    pub fn read_corpus<R>(&mut self, rdr: R) -> Result<usize>
    where
        R: BufRead,
    {
        let mut n_sentences = 0;
        for sentence in TaggedSentenceReader::new(rdr) {
            self.add_sentence(&sentence?)?;
            n_sentences += 1;
        }
        Ok(n_sentences)
    }

    /// Writes the collected counts as a counts file.
    ///
    /// Records are sorted, `WORDTAG` records first, so the output is
    /// reproducible.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write_counts<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let mut word_tags: Vec<_> = self.word_tags.iter().collect();
        word_tags.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for ((tag, word), count) in word_tags {
            writeln!(wtr, "{count} WORDTAG {tag} {word}")?;
        }
        for n in 1..=3 {
            let mut ngrams: Vec<_> = self.ngrams[n - 1].iter().collect();
            ngrams.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (tags, count) in ngrams {
                writeln!(wtr, "{count} {n}-GRAM {}", tags.join(" "))?;
            }
        }
        Ok(())
    }

    /// Compiles the collected counts into a [`Model`], folding rare words.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidModel`] is returned if no sentence has been
    /// added.
    pub fn into_model(self) -> Result<Model> {
        let mut counts = CountModel::default();
        for ((tag, word), count) in self.word_tags {
            counts.add_word_tag(count, &tag, &word);
        }
        for ngrams in self.ngrams {
            for (tags, count) in ngrams {
                let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
                counts.add_ngram(count, &tags);
            }
        }
        Model::from_count_model(counts)
    }
}

//! Tagger compiled from a model.

use std::io::BufRead;

use hashbrown::HashMap;

use crate::count_model::{START_TAG, STOP_TAG};
use crate::errors::{GenetagError, Result};
use crate::model::Model;
use crate::sentence::{Sentence, SentenceReader};
use crate::viterbi;
use crate::word_shape;

/// Tagger.
///
/// A [`Tagger`] compiles a [`Model`] into integer-keyed tables once and
/// then decodes any number of sentences. Tagging never mutates the tagger,
/// so one instance can serve sentences from several threads.
pub struct Tagger {
    model: Model,

    // known tags in sort order; ids are positions in this vector, with
    // the start and stop pseudo-tags occupying the next two ids
    tags: Vec<String>,
    pub(crate) start: u32,
    pub(crate) stop: u32,

    bigrams: HashMap<[u32; 2], u64>,
    trigrams: HashMap<[u32; 3], u64>,

    // tag with the largest total, for per-word fallbacks
    fallback: u32,
}

impl Tagger {
    /// Creates a new tagger.
    ///
    /// # Arguments
    ///
    /// * `model` - A model data.
    ///
    /// # Returns
    ///
    /// A new tagger.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidModel`] is returned if the model contains no
    /// tags.
    pub fn new(model: Model) -> Result<Self> {
        let tags: Vec<String> = model
            .counts()
            .known_tags()
            .into_iter()
            .map(str::to_string)
            .collect();
        if tags.is_empty() {
            return Err(GenetagError::invalid_model("model contains no tags"));
        }
        let start = u32::try_from(tags.len()).map_err(|_| {
            GenetagError::invalid_model("too many distinct tags")
        })?;
        let stop = start + 1;

        // the id map borrows the tag strings, so it must go away before
        // tags moves into the struct below
        let (bigrams, trigrams) = {
            let mut ids: HashMap<&str, u32> = tags
                .iter()
                .enumerate()
                .map(|(i, tag)| (tag.as_str(), i as u32))
                .collect();
            ids.insert(START_TAG, start);
            ids.insert(STOP_TAG, stop);

            let mut bigrams = HashMap::new();
            let mut trigrams = HashMap::new();
            for (key, &count) in model.counts().ngram_counts.iter() {
                // n-grams naming tags outside the alphabet can never take
                // part in a decode and are not compiled
                let symbols: Option<Vec<u32>> =
                    key.split(' ').map(|tag| ids.get(tag).copied()).collect();
                let symbols = match symbols {
                    Some(symbols) => symbols,
                    None => continue,
                };
                match symbols[..] {
                    [w, u] => {
                        bigrams.insert([w, u], count);
                    }
                    [w, u, v] => {
                        trigrams.insert([w, u, v], count);
                    }
                    _ => {}
                }
            }
            (bigrams, trigrams)
        };

        let mut fallback = 0;
        let mut fallback_total = 0;
        for (i, tag) in tags.iter().enumerate() {
            let total = model.counts().tag_total(tag);
            if total > fallback_total {
                fallback_total = total;
                fallback = i as u32;
            }
        }

        Ok(Self {
            model,
            tags,
            start,
            stop,
            bigrams,
            trigrams,
            fallback,
        })
    }

    /// Returns the tag alphabet in the order tag ids are assigned.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the model the tagger was compiled from.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub(crate) fn n_tags(&self) -> usize {
        self.tags.len()
    }

    // q(v | w, u) over compiled tag ids
    pub(crate) fn transition(&self, w: u32, u: u32, v: u32) -> f64 {
        let denom = match self.bigrams.get(&[w, u]) {
            Some(&count) if count > 0 => count,
            _ => return 0.0,
        };
        self.trigrams
            .get(&[w, u, v])
            .map_or(0.0, |&count| count as f64 / denom as f64)
    }

    // e(word | v) for an already resolved word
    pub(crate) fn emission(&self, resolved: &str, v: u32) -> f64 {
        self.model
            .counts()
            .emission_probability(resolved, &self.tags[v as usize])
    }

    /// Tags a sentence with its most probable tag sequence.
    ///
    /// # Arguments
    ///
    /// * `sentence` - A sentence.
    ///
    /// # Returns
    ///
    /// The sentence annotated with the most probable tag sequence and its
    /// probability. If no sequence has positive probability, the tags stay
    /// empty and the probability is zero.
    pub fn tag(&self, mut sentence: Sentence) -> Sentence {
        let (ids, probability) = viterbi::decode(self, sentence.tokens());
        let tags = ids
            .into_iter()
            .map(|id| self.tags[id as usize].clone())
            .collect();
        sentence.set_tags(tags, probability);
        sentence
    }

    /// Returns the most probable tag of a single word by emission
    /// probability alone, ignoring context.
    ///
    /// # Returns
    ///
    /// The best tag and its emission probability, or [`None`] if no tag has
    /// ever emitted the word or its shape class.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetag::{Model, Tagger};
    ///
    /// # fn main() -> genetag::Result<()> {
    /// let counts = "\
    /// 6 WORDTAG O the
    /// 2 WORDTAG O cat
    /// 2 WORDTAG I-GENE the
    /// 6 WORDTAG I-GENE BRCA1
    /// ";
    /// let tagger = Tagger::new(Model::from_counts(counts.as_bytes())?)?;
    ///
    /// assert_eq!(Some(("O", 0.75)), tagger.tag_word("the"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn tag_word(&self, word: &str) -> Option<(&str, f64)> {
        let resolved = word_shape::resolve(word, self.model.counts());
        let mut best: Option<(&str, f64)> = None;
        for tag in &self.tags {
            let p = self.model.counts().emission_probability(resolved, tag);
            if p > best.map_or(0.0, |(_, best_p)| best_p) {
                best = Some((tag.as_str(), p));
            }
        }
        best
    }

    /// Tags every token of a sentence independently with [`Self::tag_word`].
    ///
    /// Tokens no tag has ever emitted receive the tag with the largest
    /// total count, so the sentence always comes back fully tagged. The
    /// probability is the product of the per-token emission probabilities,
    /// zero whenever the fallback was used.
    pub fn baseline(&self, mut sentence: Sentence) -> Sentence {
        let mut probability = 1.0;
        let mut tags = Vec::with_capacity(sentence.len());
        for token in sentence.tokens() {
            match self.tag_word(token) {
                Some((tag, p)) => {
                    probability *= p;
                    tags.push(tag.to_string());
                }
                None => {
                    probability = 0.0;
                    tags.push(self.tags[self.fallback as usize].clone());
                }
            }
        }
        sentence.set_tags(tags, probability);
        sentence
    }

    /// Returns an iterator tagging every sentence of a token-per-line
    /// stream.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A reader of the stream.
    pub fn tag_stream<R>(&self, rdr: R) -> TagStream<'_, R>
    where
        R: BufRead,
    {
        TagStream {
            tagger: self,
            sentences: SentenceReader::new(rdr),
        }
    }
}

/// Iterator created by [`Tagger::tag_stream`].
pub struct TagStream<'a, R> {
    tagger: &'a Tagger,
    sentences: SentenceReader<R>,
}

impl<'a, R> Iterator for TagStream<'a, R>
where
    R: BufRead,
{
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.sentences.next()? {
            Ok(sentence) => Some(Ok(self.tagger.tag(sentence))),
            Err(e) => Some(Err(e)),
        }
    }
}

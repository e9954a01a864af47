//! Sentences and the token-per-line stream format.
//!
//! Sentences travel as blocks of lines, one token per line, separated by
//! blank lines. A labeled corpus uses the same framing with a `token tag`
//! pair per line. The last sentence of a stream may end at the end of the
//! input without a closing blank line.

use std::io::{BufRead, Lines};

use crate::errors::{GenetagError, Result};

/// A tokenized sentence, with tags once it has been tagged.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub(crate) tokens: Vec<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) probability: Option<f64>,
}

impl Sentence {
    /// Creates a new [`Sentence`] from tokens.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Tokens of the sentence.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidArgument`] is returned if `tokens` is empty or
    /// a token is empty or contains whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetag::Sentence;
    ///
    /// let s = Sentence::from_tokens(["BRCA1", "is", "a", "gene"]).unwrap();
    /// assert_eq!(4, s.len());
    /// assert!(s.tags().is_empty());
    /// ```
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(GenetagError::invalid_argument("tokens", "must not be empty"));
        }
        for token in &tokens {
            if token.is_empty() || token.contains(char::is_whitespace) {
                return Err(GenetagError::invalid_argument(
                    "tokens",
                    format!("invalid token: {token:?}"),
                ));
            }
        }
        Ok(Self {
            tokens,
            tags: vec![],
            probability: None,
        })
    }

    /// Creates a new [`Sentence`] from token/tag pairs.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidArgument`] is returned if `pairs` is empty or a
    /// token or tag is empty or contains whitespace.
    pub fn from_pairs<I, S, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let (tokens, tags): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(token, tag)| (token.into(), tag.into()))
            .unzip();
        let mut sentence = Self::from_tokens(tokens)?;
        for tag in &tags {
            if tag.is_empty() || tag.contains(char::is_whitespace) {
                return Err(GenetagError::invalid_argument(
                    "pairs",
                    format!("invalid tag: {tag:?}"),
                ));
            }
        }
        sentence.tags = tags;
        Ok(sentence)
    }

    /// Returns the tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns the tags, or an empty slice if the sentence has not been
    /// tagged or no viable tag sequence exists.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the probability of the tag sequence under the model that
    /// produced it, or [`None`] if the sentence has not been tagged.
    pub fn probability(&self) -> Option<f64> {
        self.probability
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns whether the sentence has no tokens. Constructors never
    /// produce such a sentence.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn set_tags(&mut self, tags: Vec<String>, probability: f64) {
        self.tags = tags;
        self.probability = Some(probability);
    }

    /// Formats the sentence as `token tag` lines without a closing blank
    /// line.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidArgument`] is returned if not every token has
    /// a tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetag::Sentence;
    ///
    /// let s = Sentence::from_pairs([("BRCA1", "I-GENE"), (".", "O")]).unwrap();
    /// assert_eq!("BRCA1 I-GENE\n. O", s.to_tagged_string().unwrap());
    /// ```
    pub fn to_tagged_string(&self) -> Result<String> {
        if self.tags.len() != self.tokens.len() {
            return Err(GenetagError::invalid_argument(
                "sentence",
                "not every token is tagged",
            ));
        }
        let lines: Vec<String> = self
            .tokens
            .iter()
            .zip(&self.tags)
            .map(|(token, tag)| format!("{token} {tag}"))
            .collect();
        Ok(lines.join("\n"))
    }
}

/// Iterator over the sentences of a token-per-line stream.
///
/// Blank lines separate sentences. Leading and repeated blank lines are
/// skipped, and a sentence still open at the end of the input is emitted
/// as if it were followed by a blank line.
pub struct SentenceReader<R> {
    lines: Lines<R>,
}

impl<R> SentenceReader<R>
where
    R: BufRead,
{
    /// Creates a new [`SentenceReader`] reading from `rdr`.
    pub fn new(rdr: R) -> Self {
        Self { lines: rdr.lines() }
    }
}

impl<R> Iterator for SentenceReader<R>
where
    R: BufRead,
{
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tokens = vec![];
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    let token = line.trim();
                    if token.is_empty() {
                        if !tokens.is_empty() {
                            break;
                        }
                    } else {
                        tokens.push(token.to_string());
                    }
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => {
                    if tokens.is_empty() {
                        return None;
                    }
                    break;
                }
            }
        }
        Some(Sentence::from_tokens(tokens))
    }
}

/// Iterator over the sentences of a labeled `token tag` stream.
///
/// The framing is the same as for [`SentenceReader`]; every non-blank line
/// must carry exactly one token and one tag.
pub struct TaggedSentenceReader<R> {
    lines: Lines<R>,
    lineno: usize,
}

impl<R> TaggedSentenceReader<R>
where
    R: BufRead,
{
    /// Creates a new [`TaggedSentenceReader`] reading from `rdr`.
    pub fn new(rdr: R) -> Self {
        Self {
            lines: rdr.lines(),
            lineno: 0,
        }
    }
}

impl<R> Iterator for TaggedSentenceReader<R>
where
    R: BufRead,
{
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut pairs = vec![];
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.lineno += 1;
                    let line = line.trim();
                    if line.is_empty() {
                        if !pairs.is_empty() {
                            break;
                        }
                        continue;
                    }
                    let mut fields = line.split_whitespace();
                    match (fields.next(), fields.next(), fields.next()) {
                        (Some(token), Some(tag), None) => {
                            pairs.push((token.to_string(), tag.to_string()));
                        }
                        _ => {
                            return Some(Err(GenetagError::invalid_argument(
                                "corpus",
                                format!("line {}: expected `token tag`: {line:?}", self.lineno),
                            )))
                        }
                    }
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => {
                    if pairs.is_empty() {
                        return None;
                    }
                    break;
                }
            }
        }
        Some(Sentence::from_pairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tokens_empty() {
        let result = Sentence::from_tokens(Vec::<String>::new());
        assert_eq!(
            "InvalidArgumentError: tokens: must not be empty",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_tokens_whitespace_token() {
        let result = Sentence::from_tokens(["BRCA1", "is a"]);
        assert_eq!(
            "InvalidArgumentError: tokens: invalid token: \"is a\"",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_from_pairs() {
        let s = Sentence::from_pairs([("BRCA1", "I-GENE"), ("gene", "O")]).unwrap();
        assert_eq!(vec!["BRCA1", "gene"], s.tokens());
        assert_eq!(vec!["I-GENE", "O"], s.tags());
        assert_eq!(None, s.probability());
    }

    #[test]
    fn test_to_tagged_string_untagged() {
        let s = Sentence::from_tokens(["BRCA1"]).unwrap();
        assert_eq!(
            "InvalidArgumentError: sentence: not every token is tagged",
            s.to_tagged_string().unwrap_err().to_string()
        );
    }

    #[test]
    fn test_sentence_reader() {
        let text = "The\ncell\n\nBRCA1\n";
        let sentences: Vec<Sentence> = SentenceReader::new(text.as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(2, sentences.len());
        assert_eq!(vec!["The", "cell"], sentences[0].tokens());
        assert_eq!(vec!["BRCA1"], sentences[1].tokens());
    }

    #[test]
    fn test_sentence_reader_flushes_at_eof() {
        // no blank line after the last token
        let sentences: Vec<Sentence> = SentenceReader::new("BRCA1".as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(1, sentences.len());
        assert_eq!(vec!["BRCA1"], sentences[0].tokens());
    }

    #[test]
    fn test_sentence_reader_skips_extra_blank_lines() {
        let text = "\n\nThe\n\n\n\ncell\n\n";
        let sentences: Vec<Sentence> = SentenceReader::new(text.as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(2, sentences.len());
        assert_eq!(vec!["The"], sentences[0].tokens());
        assert_eq!(vec!["cell"], sentences[1].tokens());
    }

    #[test]
    fn test_sentence_reader_empty_input() {
        assert!(SentenceReader::new("".as_bytes()).next().is_none());
        assert!(SentenceReader::new("\n\n".as_bytes()).next().is_none());
    }

    #[test]
    fn test_sentence_reader_trims_carriage_returns() {
        let sentences: Vec<Sentence> = SentenceReader::new("The\r\ncell\r\n\r\n".as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(1, sentences.len());
        assert_eq!(vec!["The", "cell"], sentences[0].tokens());
    }

    #[test]
    fn test_tagged_sentence_reader() {
        let text = "The O\ncell O\n\nBRCA1 I-GENE\n\n";
        let sentences: Vec<Sentence> = TaggedSentenceReader::new(text.as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(2, sentences.len());
        assert_eq!(vec!["The", "cell"], sentences[0].tokens());
        assert_eq!(vec!["O", "O"], sentences[0].tags());
        assert_eq!(vec!["I-GENE"], sentences[1].tags());
    }

    #[test]
    fn test_tagged_sentence_reader_missing_tag() {
        let mut reader = TaggedSentenceReader::new("The O\ncell\n".as_bytes());
        assert_eq!(
            "InvalidArgumentError: corpus: line 2: expected `token tag`: \"cell\"",
            reader.next().unwrap().unwrap_err().to_string()
        );
    }

    #[test]
    fn test_tagged_sentence_reader_extra_field() {
        let mut reader = TaggedSentenceReader::new("The O O\n".as_bytes());
        assert_eq!(
            "InvalidArgumentError: corpus: line 1: expected `token tag`: \"The O O\"",
            reader.next().unwrap().unwrap_err().to_string()
        );
    }

    #[test]
    fn test_tagged_roundtrip() {
        let text = "The O\ncell O\n\nBRCA1 I-GENE\n\n";
        let sentences: Vec<Sentence> = TaggedSentenceReader::new(text.as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        let blocks: Vec<String> = sentences
            .iter()
            .map(|s| s.to_tagged_string().unwrap())
            .collect();
        let rendered = format!("{}\n\n", blocks.join("\n\n"));

        assert_eq!(text, rendered);
    }
}

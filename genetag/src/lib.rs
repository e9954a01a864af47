#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Genetag
//!
//! Genetag is a trigram hidden Markov model tagger for gene-name
//! recognition in tokenized biomedical text. A model is estimated from a
//! counts file, rare words are folded into shape classes, and sentences
//! are decoded with an exact Viterbi search over tag trigrams.
//!
//! ## Examples
//!
//! ```
//! use genetag::{Model, Sentence, Tagger};
//!
//! # fn main() -> genetag::Result<()> {
//! let counts = "\
//! 16 WORDTAG O the
//! 8 WORDTAG O cat
//! 8 WORDTAG O sat
//! 8 WORDTAG I-GENE cat
//! 8 WORDTAG I-GENE BRCA1
//! 32 2-GRAM * *
//! 32 3-GRAM * * O
//! 32 2-GRAM * O
//! 16 3-GRAM * O I-GENE
//! 16 3-GRAM * O O
//! 16 2-GRAM O I-GENE
//! 16 3-GRAM O I-GENE O
//! 32 2-GRAM O O
//! 8 3-GRAM O O O
//! 8 3-GRAM O O STOP
//! 16 2-GRAM I-GENE O
//! 16 3-GRAM I-GENE O STOP
//! ";
//! let model = Model::from_counts(counts.as_bytes())?;
//! let tagger = Tagger::new(model)?;
//!
//! let s = tagger.tag(Sentence::from_tokens(["the", "cat", "sat"])?);
//! assert_eq!(vec!["O", "I-GENE", "O"], s.tags());
//! assert_eq!(Some(0.03125), s.probability());
//! # Ok(())
//! # }
//! ```
//!
//! Model files read and written by the command line tools are created with
//! [`Model::write`]. Training requires **crate feature** `train`. For more
//! details, see [`Trainer`].

mod count_model;
mod errors;
mod model;
mod sentence;
mod tagger;
mod utils;
mod viterbi;
mod word_shape;

#[cfg(feature = "train")]
mod trainer;

pub use count_model::{CountModel, START_TAG, STOP_TAG};
pub use errors::{GenetagError, InvalidArgumentError, InvalidModelError, Result};
pub use model::Model;
pub use sentence::{Sentence, SentenceReader, TaggedSentenceReader};
pub use tagger::{TagStream, Tagger};
pub use word_shape::{resolve, WordShape, RARE_THRESHOLD};

#[cfg(feature = "train")]
pub use trainer::Trainer;

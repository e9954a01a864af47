//! Model data.

use std::io::{BufRead, Read, Write};

use bincode::{Decode, Encode};

use crate::count_model::CountModel;
use crate::errors::{GenetagError, Result};

/// A trained tagging model.
///
/// A [`Model`] is a [`CountModel`] whose rare words have been folded into
/// their shape classes, which is the form the decoder consumes. It can be
/// estimated from a counts file with [`Model::from_counts`], or exchanged
/// in a compact binary form with [`Model::read`] and [`Model::write`].
#[derive(Debug, Clone, PartialEq, Decode, Encode)]
pub struct Model {
    pub(crate) counts: CountModel,
}

impl Model {
    /// Creates a model from a counts file, folding rare words.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A reader of the counts file.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidModel`] is returned if the counts are
    /// malformed or inconsistent.
    pub fn from_counts<R>(rdr: R) -> Result<Self>
    where
        R: BufRead,
    {
        Self::from_count_model(CountModel::from_counts(rdr)?)
    }

    /// Creates a model from already loaded count tables, folding rare
    /// words.
    ///
    /// # Errors
    ///
    /// [`GenetagError::InvalidModel`] is returned if the counts are
    /// inconsistent.
    pub fn from_count_model(mut counts: CountModel) -> Result<Self> {
        counts.fold_rare_words();
        let model = Self { counts };
        model.validate()?;
        Ok(model)
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is. Data that
    /// decodes to inconsistent count tables is rejected with
    /// [`GenetagError::InvalidModel`].
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        model.validate()?;
        Ok(model)
    }

    /// Returns the folded count tables.
    pub fn counts(&self) -> &CountModel {
        &self.counts
    }

    fn validate(&self) -> Result<()> {
        if self.counts.known_tags().is_empty() {
            return Err(GenetagError::invalid_model("no word/tag observations"));
        }
        for (tag, &total) in self.counts.tag_totals.iter() {
            let sum: u64 = self
                .counts
                .emission_counts
                .get(tag)
                .map_or(0, |words| words.values().sum());
            if sum != total {
                return Err(GenetagError::invalid_model(format!(
                    "emission counts of tag {tag:?} do not sum to its total"
                )));
            }
        }
        Ok(())
    }
}

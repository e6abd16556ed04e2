use std::{fs, path::Path};

use log::{debug, info};

use crate::{
    alphabet::Alphabet,
    error::{Error, Result},
};

use super::{BigramProfile, FrequencyProfile, MonogramProfile, NgramCounts};

/// Reads every corpus document fully. The first unreadable document aborts
/// the whole load.
pub fn load_corpus<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let text = fs::read_to_string(path).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("read {} symbols from {}", text.chars().count(), path.display());
            Ok(text)
        })
        .collect()
}

/// Counts units per document, then normalizes by the corpus-wide total.
/// Units never span a document boundary.
pub fn build_profile<S: AsRef<str>, const ARITY: usize>(
    corpus: &[S],
    alphabet: &Alphabet,
) -> Result<FrequencyProfile<ARITY>> {
    let mut counts = NgramCounts::<ARITY>::new(alphabet.len());
    for document in corpus {
        let document = NgramCounts::from_lookups(alphabet.lookup_all(document.as_ref()), alphabet.len());
        counts.merge(&document);
    }
    counts.to_profile()
}

pub fn build_monogram_profile<S: AsRef<str>>(corpus: &[S], alphabet: &Alphabet) -> Result<MonogramProfile> {
    build_profile::<S, 1>(corpus, alphabet)
}

pub fn build_bigram_profile<S: AsRef<str>>(corpus: &[S], alphabet: &Alphabet) -> Result<BigramProfile> {
    build_profile::<S, 2>(corpus, alphabet)
}

/// Reference distributions of a language, shared read-only by every key
/// recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Profiles {
    pub monograms: MonogramProfile,
    pub bigrams: BigramProfile,
}

impl Profiles {
    pub fn build<S: AsRef<str>>(corpus: &[S], alphabet: &Alphabet) -> Result<Self> {
        let profiles = Self {
            monograms: build_monogram_profile(corpus, alphabet)?,
            bigrams: build_bigram_profile(corpus, alphabet)?,
        };
        info!(
            "built profiles from {} documents over {} symbols",
            corpus.len(),
            alphabet.len()
        );
        Ok(profiles)
    }

    pub fn width(&self) -> usize {
        self.monograms.width()
    }
}

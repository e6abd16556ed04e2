use std::cmp::Reverse;

use itertools::Itertools;
use plotlib::{page::Page, repr::BarChart, view::CategoricalView};

use crate::{
    alphabet::Alphabet,
    error::{Error, Result},
};

pub mod cipher;
pub mod profile;

pub use cipher::{key_from_texts, BucketedData, Ciphertext, Key};
pub use profile::{build_bigram_profile, build_monogram_profile, load_corpus, Profiles};

/// Occurrence counts of every `ARITY`-symbol unit over an alphabet of
/// `width` symbols. Units are stored densely, `width^ARITY` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramCounts<const ARITY: usize> {
    width: usize,
    counts: Vec<usize>,
    total: usize,
}

pub type MonogramCounts = NgramCounts<1>;
pub type BigramCounts = NgramCounts<2>;

impl<const ARITY: usize> NgramCounts<ARITY> {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            counts: vec![0; width.pow(ARITY as u32)],
            total: 0,
        }
    }

    /// Counts every window of `ARITY` adjacent symbols of `text`.
    pub fn from_indices(text: &[usize], width: usize) -> Self {
        let mut s = Self::new(width);
        text.windows(ARITY)
            .for_each(|window| s.insert_flat(flat_index(window.iter().copied(), width)));
        s
    }

    /// Counts the windows of `ARITY` adjacent lookups in which every symbol
    /// belongs to the alphabet. Windows touching a `None` are skipped.
    pub fn from_lookups(lookups: impl IntoIterator<Item = Option<usize>>, width: usize) -> Self {
        let mut s = Self::new(width);
        let lookups = lookups.into_iter().collect_vec();
        lookups
            .windows(ARITY)
            .filter_map(|window| window.iter().copied().collect::<Option<Vec<_>>>())
            .for_each(|unit| s.insert_flat(flat_index(unit, width)));
        s
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn insert(&mut self, unit: [usize; ARITY]) {
        self.insert_flat(flat_index(unit, self.width));
    }

    fn insert_flat(&mut self, flat: usize) {
        self.counts[flat] += 1;
        self.total += 1;
    }

    pub fn count(&self, unit: [usize; ARITY]) -> usize {
        self.counts[flat_index(unit, self.width)]
    }

    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.width, other.width);
        self.counts
            .iter_mut()
            .zip(&other.counts)
            .for_each(|(a, b)| *a += b);
        self.total += other.total;
    }

    /// Units with a non-zero count.
    pub fn iter(&self) -> impl Iterator<Item = ([usize; ARITY], usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &n)| n != 0)
            .map(move |(flat, &n)| (unit_of(flat, self.width), n))
    }

    fn frequency_flat(&self, flat: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.counts[flat] as f64 / self.total as f64
        }
    }

    pub fn to_profile(&self) -> Result<FrequencyProfile<ARITY>> {
        if self.total == 0 {
            return Err(Error::EmptyProfile);
        }
        Ok(FrequencyProfile {
            width: self.width,
            freqs: (0..self.counts.len())
                .map(|flat| self.frequency_flat(flat))
                .collect(),
        })
    }

    /// Renders the 32 most frequent units as a text bar chart.
    pub fn histogram(&self, alphabet: &Alphabet) -> Option<String> {
        let mut view = CategoricalView::new();

        let charts = self
            .iter()
            .sorted_by_key(|&(_, n)| Reverse(n))
            .take(32)
            .map(|(unit, n)| {
                let label: String = unit.iter().map(|&i| alphabet.symbol(i)).collect();
                BarChart::new(n as f64).label(format!("{label:?}"))
            })
            .collect_vec();
        if charts.is_empty() {
            return None;
        }
        for chart in charts {
            view = view.add(chart);
        }
        view = view.x_label("Units");
        Page::single(&view).to_text().ok()
    }
}

/// A normalized distribution over every `ARITY`-symbol unit of an alphabet.
/// Units that never occurred are present with probability zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyProfile<const ARITY: usize> {
    width: usize,
    freqs: Vec<f64>,
}

pub type MonogramProfile = FrequencyProfile<1>;
pub type BigramProfile = FrequencyProfile<2>;

impl<const ARITY: usize> FrequencyProfile<ARITY> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    pub fn get(&self, unit: [usize; ARITY]) -> f64 {
        self.freqs[flat_index(unit, self.width)]
    }

    pub fn iter(&self) -> impl Iterator<Item = ([usize; ARITY], f64)> + '_ {
        self.freqs
            .iter()
            .enumerate()
            .map(move |(flat, &f)| (unit_of(flat, self.width), f))
    }

    /// L1 distance between the empirical distribution of `counts` and this
    /// profile, over the full unit set.
    pub fn deviation(&self, counts: &NgramCounts<ARITY>) -> f64 {
        debug_assert_eq!(self.width, counts.width);
        self.freqs
            .iter()
            .enumerate()
            .map(|(flat, &expected)| (counts.frequency_flat(flat) - expected).abs())
            .sum()
    }
}

/// Lower is better; zero is a perfect match.
pub trait ScoreFunction {
    fn score(&self, text: &[usize]) -> f64;
}

impl<const ARITY: usize> ScoreFunction for FrequencyProfile<ARITY> {
    fn score(&self, text: &[usize]) -> f64 {
        self.deviation(&NgramCounts::from_indices(text, self.width))
    }
}

fn flat_index(unit: impl IntoIterator<Item = usize>, width: usize) -> usize {
    unit.into_iter().fold(0, |acc, i| acc * width + i)
}

fn unit_of<const ARITY: usize>(mut flat: usize, width: usize) -> [usize; ARITY] {
    let mut unit = [0; ARITY];
    for slot in unit.iter_mut().rev() {
        *slot = flat % width;
        flat /= width;
    }
    unit
}

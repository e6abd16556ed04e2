//! Kasiski examination: key length inference from the distances between
//! repeated ciphertext substrings.
//!
//! The substring scan is a plain quadratic search repeated for every
//! substring length below a third of the text, so the whole examination is
//! roughly cubic in the text length. It is meant for ciphertexts of a few
//! thousand symbols.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info};
use plotlib::{page::Page, repr::BarChart, view::CategoricalView};
use serde::Serialize;

pub const DEFAULT_MIN_SUBSTRING_LENGTH: usize = 3;

/// Intermediate tallies of an examination along with its result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KasiskiReport {
    /// Distance between consecutive occurrences -> how often it was seen,
    /// in order of first sighting.
    pub distances: IndexMap<usize, usize>,
    /// Divisor of a frequent distance -> number of frequent distances it
    /// divides.
    pub divisors: BTreeMap<usize, usize>,
    /// Probable key lengths, ascending. May contain the trivial length 1.
    pub candidates: Vec<usize>,
}

impl KasiskiReport {
    /// Renders the divisor tally as a text bar chart.
    pub fn histogram(&self) -> Option<String> {
        if self.divisors.is_empty() {
            return None;
        }
        let mut view = CategoricalView::new();
        for (&divisor, &count) in &self.divisors {
            view = view.add(BarChart::new(count as f64).label(divisor.to_string()));
        }
        view = view.x_label("Divisor");
        Page::single(&view).to_text().ok()
    }
}

pub fn find_candidate_key_lengths<T: PartialEq>(text: &[T], min_substring_length: usize) -> Vec<usize> {
    examine(text, min_substring_length).candidates
}

pub fn examine<T: PartialEq>(text: &[T], min_substring_length: usize) -> KasiskiReport {
    let distances = repeat_distances(text, min_substring_length);

    let frequent = above_mean(distances.iter().map(|(&d, &n)| (d, n)), 1.0);
    let mut divisors = BTreeMap::new();
    frequent
        .iter()
        .flat_map(|&distance| factors(distance))
        .for_each(|divisor| *divisors.entry(divisor).or_insert(0) += 1);

    let tally = || divisors.iter().map(|(&d, &n)| (d, n));
    let mut candidates = above_mean(tally(), 2.0);
    if candidates.is_empty() {
        candidates = above_mean(tally(), 1.0);
    }

    info!(
        "kasiski: {} distinct distances, {} frequent, candidates {:?}",
        distances.len(),
        frequent.len(),
        candidates
    );
    KasiskiReport {
        distances,
        divisors,
        candidates,
    }
}

/// For every substring length `l` from `min_substring_length` while
/// `l < len / 3`, and every start `i`, collects the later non-overlapping
/// starts `j >= i + l` holding the same substring. Substrings seen more than
/// twice contribute the gaps between consecutive occurrences.
///
/// Neither `i` nor `j` ever reaches the last possible start `len - l`.
fn repeat_distances<T: PartialEq>(text: &[T], min_substring_length: usize) -> IndexMap<usize, usize> {
    let len = text.len();
    let mut distances = IndexMap::new();

    for l in (min_substring_length.max(1)..).take_while(|&l| l < len / 3) {
        for i in 0..len - l {
            let needle = &text[i..i + l];
            let positions = std::iter::once(i)
                .chain((i + l..len - l).filter(|&j| &text[j..j + l] == needle))
                .collect_vec();

            if positions.len() > 2 {
                positions
                    .iter()
                    .tuple_windows()
                    .for_each(|(a, b)| *distances.entry(b - a).or_insert(0) += 1);
            }
        }
        debug!("kasiski: substring length {l}, {} distances so far", distances.len());
    }
    distances
}

/// Keys whose tally is strictly above `factor` times the mean tally.
fn above_mean(tally: impl Iterator<Item = (usize, usize)> + Clone, factor: f64) -> Vec<usize> {
    let (count, sum) = tally.clone().fold((0, 0), |(c, s), (_, n)| (c + 1, s + n));
    if count == 0 {
        return vec![];
    }
    let mean = sum as f64 / count as f64;
    tally
        .filter(|&(_, n)| n as f64 > mean * factor)
        .map(|(key, _)| key)
        .collect()
}

/// All positive divisors of `n`, ascending.
pub fn factors(n: usize) -> impl Iterator<Item = usize> {
    (1..=n).filter(move |i| n % i == 0)
}

use std::fmt::Display;

use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    alphabet::Alphabet,
    config::CrackConfig,
    kasiski::{self, KasiskiReport},
    recover::{KeyRecoverer, Recovered},
    separator,
    text::{key_from_texts, Ciphertext, Key, Profiles},
};

const REPORT_WIDTH: usize = 44;

/// The lowest-deviation decryption across all candidate key lengths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub key_length: usize,
    pub key: Key,
    /// The key as alphabet symbols, read back off the ciphertext and the
    /// recovered plaintext.
    pub key_symbols: String,
    pub ratio: f64,
    pub plaintext: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub kasiski: KasiskiReport,
    /// `None` when Kasiski examination produced no usable key length.
    pub outcome: Option<Outcome>,
}

/// Console report: the recovered key and plaintext framed by separator
/// lines, or a notice that no key length was found.
impl Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line = separator('=', REPORT_WIDTH);
        match &self.outcome {
            Some(outcome) => {
                writeln!(f, "{line}\nDone!\nResult:")?;
                writeln!(f, "Key length: {}", outcome.key_length)?;
                writeln!(f, "Key: {}", outcome.key_symbols)?;
                writeln!(f, "Ratio: {:.5}\n{line}", outcome.ratio)?;
                write!(f, "{}\n{line}", outcome.plaintext)
            }
            None => write!(f, "{line}\nNo candidate key lengths found\n{line}"),
        }
    }
}

pub fn crack(
    ciphertext: &Ciphertext,
    alphabet: &Alphabet,
    profiles: &Profiles,
    config: &CrackConfig,
) -> Analysis {
    let kasiski = kasiski::examine(&ciphertext[..], config.min_substring_length);
    let outcome = crack_lengths(ciphertext, &kasiski.candidates, alphabet, profiles, config);
    Analysis { kasiski, outcome }
}

/// Recovers a key for every length above 1, longest first, and keeps the
/// strictly lowest ratio. Equal ratios keep the longer length.
pub fn crack_lengths(
    ciphertext: &Ciphertext,
    lengths: &[usize],
    alphabet: &Alphabet,
    profiles: &Profiles,
    config: &CrackConfig,
) -> Option<Outcome> {
    let lengths = lengths
        .iter()
        .copied()
        .filter(|&length| length > 1)
        .sorted_by(|a, b| b.cmp(a))
        .dedup()
        .collect_vec();
    if lengths.is_empty() {
        info!("no candidate key lengths");
        return None;
    }
    info!("trying key lengths {lengths:?}");

    let recoverer = KeyRecoverer::new(ciphertext, profiles).with_budget(config.budget);
    let attempt = |&length: &usize| {
        let recovered = recoverer.recover(length);
        debug!("length {length}: ratio {:.5}", recovered.ratio);
        (length, recovered)
    };
    let results: Vec<(usize, Recovered)> = if config.parallel {
        lengths.par_iter().map(attempt).collect()
    } else {
        lengths.iter().map(attempt).collect()
    };

    let (key_length, best) = results.into_iter().reduce(|best, next| {
        if next.1.ratio < best.1.ratio {
            next
        } else {
            best
        }
    })?;
    info!("best key length {key_length} with ratio {:.5}", best.ratio);

    let key_symbols =
        key_from_texts(ciphertext, &best.plaintext, key_length, alphabet.len()).to_symbols(alphabet);
    Some(Outcome {
        key_length,
        key: best.key,
        key_symbols,
        ratio: best.ratio,
        plaintext: alphabet.decode(&best.plaintext),
    })
}

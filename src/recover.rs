//! Key recovery for one candidate key length: a closed-form per-column
//! estimate refined by coordinate hill-climbing on the bigram deviation.

use float_ord::FloatOrd;
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::SearchBudget,
    text::{Ciphertext, Key, MonogramCounts, Profiles, ScoreFunction},
};

/// Outcome of a key recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub plaintext: Vec<usize>,
    pub key: Key,
    /// L1 distance of the plaintext's bigram distribution from the reference
    /// profile.
    pub ratio: f64,
}

pub struct KeyRecoverer<'a> {
    ciphertext: &'a Ciphertext,
    profiles: &'a Profiles,
    budget: SearchBudget,
}

impl<'a> KeyRecoverer<'a> {
    pub fn new(ciphertext: &'a Ciphertext, profiles: &'a Profiles) -> Self {
        debug_assert_eq!(ciphertext.width(), profiles.width());
        Self {
            ciphertext,
            profiles,
            budget: SearchBudget::default(),
        }
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    fn width(&self) -> usize {
        self.ciphertext.width()
    }

    /// Initial estimate, local search, then any configured restarts.
    pub fn recover(&self, length: usize) -> Recovered {
        let initial = self.initial_key(length);
        let mut best = self.refine(initial);
        debug!(
            "length {length}: converged to {} with ratio {:.5}",
            best.key, best.ratio
        );

        if self.budget.restarts > 0 && self.width() > 1 && length > 0 {
            let mut rng = StdRng::seed_from_u64(self.budget.seed ^ length as u64);
            for round in 0..self.budget.restarts {
                let position = rng.gen_range(0..length);
                let delta = rng.gen_range(1..self.width());
                let candidate = self.refine(best.key.nudged(position, delta, self.width()));
                if candidate.ratio < best.ratio {
                    debug!(
                        "length {length}: restart {round} escaped to ratio {:.5}",
                        candidate.ratio
                    );
                    best = candidate;
                }
            }
        }
        best
    }

    /// Per column, the shift whose removal brings the column's symbol
    /// distribution closest to the monogram profile. Ties go to the
    /// smallest shift.
    pub fn initial_key(&self, length: usize) -> Key {
        Key::new(
            self.ciphertext
                .columns(length)
                .blocks()
                .map(|column| self.best_shift(column))
                .collect(),
        )
    }

    pub fn best_shift(&self, column: &[usize]) -> usize {
        let width = self.width();
        (0..width)
            .min_by_key(|&shift| {
                let mut counts = MonogramCounts::new(width);
                column
                    .iter()
                    .for_each(|&c| counts.insert([(c + width - shift) % width]));
                FloatOrd(self.profiles.monograms.deviation(&counts))
            })
            .unwrap_or(0)
    }

    pub fn evaluate(&self, key: &Key) -> Recovered {
        let plaintext = self.ciphertext.decrypt(key);
        let ratio = self.profiles.bigrams.score(&plaintext);
        Recovered {
            plaintext,
            key: key.clone(),
            ratio,
        }
    }

    /// Coordinate hill-climbing from `key`. Every pass tries each delta
    /// `1..width` at each position against the current best key and adopts
    /// a trial as soon as it scores strictly lower. Passes repeat until one
    /// makes no move or the pass budget runs out.
    pub fn refine(&self, key: Key) -> Recovered {
        let width = self.width();
        let mut best = self.evaluate(&key);
        let mut trial = Vec::with_capacity(self.ciphertext.len());
        let mut passes = 0;

        loop {
            if self.budget.max_passes.map_or(false, |max| passes >= max) {
                debug!("pass budget of {passes} exhausted at ratio {:.5}", best.ratio);
                break;
            }
            passes += 1;

            let mut improved = false;
            for delta in 1..width {
                for position in 0..best.key.len() {
                    let key = best.key.nudged(position, delta, width);
                    self.ciphertext.decrypt_into(&key, &mut trial);
                    let ratio = self.profiles.bigrams.score(&trial);
                    if ratio < best.ratio {
                        trace!("pass {passes}: {key} lowers ratio to {ratio:.5}");
                        std::mem::swap(&mut best.plaintext, &mut trial);
                        best.key = key;
                        best.ratio = ratio;
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
        }
        best
    }
}

/// Recovers the most probable key of the given length.
pub fn recover(ciphertext: &Ciphertext, length: usize, profiles: &Profiles) -> Recovered {
    KeyRecoverer::new(ciphertext, profiles).recover(length)
}

#[cfg(test)]
mod tests {
    use crate::alphabet::Alphabet;

    use super::*;

    const SAMPLE: &str = include_str!("../inputs/corpus.txt");

    fn prefix(symbols: usize) -> String {
        SAMPLE.chars().take(symbols).collect()
    }

    /// `sentence` repeated so that every key column sees each position of
    /// the sentence equally often.
    fn balanced(sentence: &str, key_length: usize) -> String {
        sentence.repeat(key_length * 2)
    }

    #[test]
    fn toy_alphabet_recovers_uniform_key() {
        let alphabet: Alphabet = "абв".parse().unwrap();
        let plain = "аабав".repeat(15);
        let profiles = Profiles::build(&[&plain], &alphabet).unwrap();
        let key = Key::new(vec![1, 1, 1]);
        let cipher = Ciphertext::from_indices(
            key.encrypt(&alphabet.encode(&plain).unwrap(), alphabet.len()),
            alphabet.len(),
        );

        let recovered = recover(&cipher, 3, &profiles);
        assert_eq!(recovered.key, key);
        assert_eq!(alphabet.decode(&recovered.plaintext), plain);
        assert!(recovered.ratio < 1e-9);
    }

    #[test]
    fn recovers_key_when_columns_match_profile() {
        let alphabet = Alphabet::russian();
        let sentence = alphabet.clean("Незнакомец ел медленно, как едят люди, которые знают цену хлебу.");
        let plain = balanced(&sentence, 5);
        let profiles = Profiles::build(&[&plain], &alphabet).unwrap();
        let key = Key::from_symbols("шифры", &alphabet).unwrap();
        let cipher = Ciphertext::from_indices(
            key.encrypt(&alphabet.encode(&plain).unwrap(), alphabet.len()),
            alphabet.len(),
        );

        let recoverer = KeyRecoverer::new(&cipher, &profiles);
        assert_eq!(recoverer.initial_key(5), key);
        let recovered = recoverer.recover(5);
        assert_eq!(recovered.key, key);
        assert_eq!(alphabet.decode(&recovered.plaintext), plain);

        for wrong in ["шифра", "щифры", "ключи"] {
            let wrong = Key::from_symbols(wrong, &alphabet).unwrap();
            assert!(recoverer.evaluate(&wrong).ratio > recovered.ratio);
        }
    }

    #[test]
    fn refined_key_is_a_fixed_point() {
        let alphabet = Alphabet::russian();
        let profiles = Profiles::build(&[SAMPLE], &alphabet).unwrap();
        let plain = alphabet.encode(&alphabet.clean(&prefix(1200))).unwrap();
        let key = Key::from_symbols("тайна", &alphabet).unwrap();
        let cipher = Ciphertext::from_indices(key.encrypt(&plain, 36), 36);

        let recoverer = KeyRecoverer::new(&cipher, &profiles);
        let first = recoverer.recover(5);
        let again = recoverer.refine(first.key.clone());
        assert_eq!(again.key, first.key);
        assert_eq!(again.ratio, first.ratio);
        assert!(first.ratio <= recoverer.evaluate(&recoverer.initial_key(5)).ratio);
    }

    #[test]
    fn best_shift_prefers_first_minimum() {
        let alphabet: Alphabet = "аб".parse().unwrap();
        let profiles = Profiles::build(&["абба"], &alphabet).unwrap();
        let cipher = Ciphertext::from_indices(vec![0, 1], 2);
        // both shifts give the same column distribution
        assert_eq!(KeyRecoverer::new(&cipher, &profiles).best_shift(&[0, 1]), 0);
    }

    #[test]
    fn pass_budget_stops_the_climb() {
        let alphabet = Alphabet::russian();
        let profiles = Profiles::build(&[SAMPLE], &alphabet).unwrap();
        let plain = alphabet.encode(&alphabet.clean(&prefix(800))).unwrap();
        let cipher = Ciphertext::from_indices(Key::new(vec![3, 7, 11]).encrypt(&plain, 36), 36);

        let recoverer = KeyRecoverer::new(&cipher, &profiles).with_budget(SearchBudget {
            max_passes: Some(0),
            ..Default::default()
        });
        let start = Key::new(vec![0, 0, 0]);
        let stopped = recoverer.refine(start.clone());
        assert_eq!(stopped.key, start);
    }

    #[test]
    fn single_pass_stops_before_convergence() {
        let alphabet = Alphabet::russian();
        let profiles = Profiles::build(&[SAMPLE], &alphabet).unwrap();
        let plain = alphabet.encode(&alphabet.clean(&prefix(800))).unwrap();
        let key = Key::new(vec![3, 7, 11]);
        let cipher = Ciphertext::from_indices(key.encrypt(&plain, 36), 36);
        let start = Key::new(vec![0, 0, 0]);
        let with_passes = |max_passes| {
            KeyRecoverer::new(&cipher, &profiles)
                .with_budget(SearchBudget {
                    max_passes,
                    ..Default::default()
                })
                .refine(start.clone())
        };

        let unbounded = with_passes(None);
        assert_eq!(unbounded.key, key);

        // the first pass only reaches [3, 7, 6]; the last shift needs another
        let one = with_passes(Some(1));
        assert_eq!(one.key, Key::new(vec![3, 7, 6]));
        assert!(one.ratio > unbounded.ratio);

        assert_eq!(with_passes(Some(2)), unbounded);
        assert_eq!(with_passes(Some(100)), unbounded);
    }

    #[test]
    fn zero_length_leaves_text_unshifted() {
        let alphabet: Alphabet = "аб".parse().unwrap();
        let profiles = Profiles::build(&["абба"], &alphabet).unwrap();
        let cipher = Ciphertext::from_indices(vec![0, 1, 1], 2);
        let recovered = recover(&cipher, 0, &profiles);
        assert!(recovered.key.is_empty());
        assert_eq!(recovered.plaintext, vec![0, 1, 1]);
    }

    #[test]
    fn restarts_never_make_things_worse() {
        let alphabet = Alphabet::russian();
        let profiles = Profiles::build(&[SAMPLE], &alphabet).unwrap();
        let plain = alphabet.encode(&alphabet.clean(&prefix(600))).unwrap();
        let cipher = Ciphertext::from_indices(Key::new(vec![5, 1, 20, 9]).encrypt(&plain, 36), 36);

        let plain_run = KeyRecoverer::new(&cipher, &profiles).recover(4);
        let budget = SearchBudget {
            restarts: 3,
            seed: 42,
            ..Default::default()
        };
        let restarted = KeyRecoverer::new(&cipher, &profiles)
            .with_budget(budget)
            .recover(4);
        assert!(restarted.ratio <= plain_run.ratio);
        let repeated = KeyRecoverer::new(&cipher, &profiles)
            .with_budget(budget)
            .recover(4);
        assert_eq!(repeated, restarted);
    }
}

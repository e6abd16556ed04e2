use std::{fmt::Display, ops::Deref};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{alphabet::Alphabet, error::Result};

/// Repeating key of per-position shifts, each in `[0, width)`.
///
/// Encryption adds the shift aligned by `position mod len`, decryption
/// subtracts it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(Vec<usize>);

impl Key {
    pub fn new(shifts: Vec<usize>) -> Self {
        Self(shifts)
    }

    pub fn from_symbols(symbols: &str, alphabet: &Alphabet) -> Result<Self> {
        alphabet.encode(symbols).map(Key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn shifts(&self) -> &[usize] {
        &self.0
    }

    /// Copy of this key with position `k` advanced by `delta` (mod `width`).
    pub fn nudged(&self, k: usize, delta: usize, width: usize) -> Self {
        let mut shifts = self.0.clone();
        shifts[k] = (shifts[k] + delta) % width;
        Self(shifts)
    }

    pub fn to_symbols(&self, alphabet: &Alphabet) -> String {
        alphabet.decode(&self.0)
    }

    pub fn encrypt(&self, plaintext: &[usize], width: usize) -> Vec<usize> {
        plaintext
            .iter()
            .zip(self.0.iter().cycle())
            .map(|(p, k)| (p + k) % width)
            .collect_vec()
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

/// Alphabet-clean ciphertext, held as symbol indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    data: Vec<usize>,
    width: usize,
}

impl Ciphertext {
    /// Fails with `InvalidSymbol` on the first symbol outside `alphabet`.
    pub fn parse(text: &str, alphabet: &Alphabet) -> Result<Self> {
        Ok(Self {
            data: alphabet.encode(text)?,
            width: alphabet.len(),
        })
    }

    pub fn from_indices(data: Vec<usize>, width: usize) -> Self {
        debug_assert!(data.iter().all(|&i| i < width));
        Self { data, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn decrypt(&self, key: &Key) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.data.len());
        self.decrypt_into(key, &mut out);
        out
    }

    /// An empty key leaves the text as it is.
    pub fn decrypt_into(&self, key: &Key, out: &mut Vec<usize>) {
        out.clear();
        if key.is_empty() {
            out.extend_from_slice(&self.data);
            return;
        }
        out.extend(
            self.data
                .iter()
                .zip(key.shifts().iter().cycle())
                .map(|(&c, &k)| (c + self.width - k % self.width) % self.width),
        );
    }

    pub fn columns(&self, length: usize) -> BucketedData {
        BucketedData::bucket(&self.data, length)
    }
}

impl Deref for Ciphertext {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.data.as_ref()
    }
}

/// Symbols grouped by `position mod n`, i.e. the positions sharing one key
/// shift.
pub struct BucketedData {
    buckets: Vec<Vec<usize>>,
}

impl BucketedData {
    /// No buckets at all when `n` is zero.
    pub fn bucket<S: AsRef<[usize]>>(input: S, n: usize) -> Self {
        if n == 0 {
            return Self { buckets: vec![] };
        }
        let mut buckets = vec![vec![]; n];
        input
            .as_ref()
            .iter()
            .enumerate()
            .for_each(|(i, &b)| buckets[i % n].push(b));
        Self { buckets }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.buckets.iter().map(Vec::as_slice)
    }
}

/// Reads the key back off the first `length` positions of a ciphertext and
/// its decryption: `alphabet[(cipher_i - plain_i + N) mod N]`.
pub fn key_from_texts(cipher: &[usize], plain: &[usize], length: usize, width: usize) -> Key {
    Key(cipher
        .iter()
        .zip(plain)
        .take(length)
        .map(|(&c, &p)| (c + width - p) % width)
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn encrypts_with_repeating_key() {
        let alphabet = Alphabet::russian();
        let plain = alphabet.encode("абв абв").unwrap();
        let key = Key::from_symbols("бв", &alphabet).unwrap();
        let cipher = key.encrypt(&plain, alphabet.len());
        assert_eq!(alphabet.decode(&cipher), "бгг.бгг");
        let cipher = Ciphertext::from_indices(cipher, alphabet.len());
        assert_eq!(cipher.decrypt(&key), plain);
    }

    #[test]
    fn parse_rejects_foreign_symbols() {
        let alphabet = Alphabet::russian();
        assert!(Ciphertext::parse("шифр", &alphabet).is_ok());
        assert!(Ciphertext::parse("шифр\n", &alphabet).is_err());
    }

    #[test]
    fn buckets_by_position() {
        let data = BucketedData::bucket([0, 1, 2, 3, 4, 5, 6], 3);
        let blocks = data.blocks().collect_vec();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], [0, 3, 6]);
        assert_eq!(blocks[1], [1, 4]);
        assert_eq!(blocks[2], [2, 5]);
    }

    #[test]
    fn nudge_wraps() {
        let key = Key::new(vec![1, 35]);
        assert_eq!(key.nudged(1, 2, 36), Key::new(vec![1, 1]));
        assert_eq!(key.to_string(), "[1, 35]");
    }

    #[test]
    fn key_is_read_back_from_texts() {
        let alphabet = Alphabet::russian();
        let key = Key::from_symbols("ключ", &alphabet).unwrap();
        let plain = alphabet.encode("в лесу родилась ёлочка").unwrap();
        let cipher = key.encrypt(&plain, alphabet.len());
        let found = key_from_texts(&cipher, &plain, key.len(), alphabet.len());
        assert_eq!(found.to_symbols(&alphabet), "ключ");
    }

    proptest! {
        #[test]
        fn decrypt_inverts_encrypt(
            plain in proptest::collection::vec(0..36_usize, 1..200),
            shifts in proptest::collection::vec(0..36_usize, 1..12),
        ) {
            let key = Key::new(shifts);
            let cipher = Ciphertext::from_indices(key.encrypt(&plain, 36), 36);
            prop_assert_eq!(cipher.decrypt(&key), plain);
        }
    }
}

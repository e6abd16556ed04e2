use std::{collections::HashMap, fmt::Display, str::FromStr};

use crate::error::{Error, Result};

pub mod russian;

/// A fixed, ordered set of symbols with cyclic shifting.
///
/// Symbols are stored in their canonical (lower-case) form and every lookup
/// folds its argument first, so `'А'` and `'а'` resolve to the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self> {
        let mut distinct = Vec::new();
        for symbol in symbols.into_iter().map(fold) {
            if distinct.contains(&symbol) {
                return Err(Error::DuplicateSymbol(symbol));
            }
            distinct.push(symbol);
        }
        if distinct.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        Ok(Self::from_distinct(distinct))
    }

    fn from_distinct(symbols: Vec<char>) -> Self {
        let index = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { symbols, index }
    }

    pub fn russian() -> Self {
        russian::RUSSIAN.clone()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn symbol(&self, index: usize) -> char {
        self.symbols[index]
    }

    pub fn lookup(&self, symbol: char) -> Option<usize> {
        self.index.get(&fold(symbol)).copied()
    }

    pub fn index_of(&self, symbol: char) -> Result<usize> {
        self.lookup(symbol)
            .ok_or(Error::UnknownSymbol(symbol))
    }

    /// `alphabet[(index_of(symbol) + n) mod N]`
    pub fn shift(&self, symbol: char, n: usize) -> Result<char> {
        let index = self.index_of(symbol)?;
        Ok(self.symbol(self.shift_index(index, n)))
    }

    pub fn shift_index(&self, index: usize, n: usize) -> usize {
        (index + n % self.len()) % self.len()
    }

    pub fn unshift_index(&self, index: usize, n: usize) -> usize {
        (index + self.len() - n % self.len()) % self.len()
    }

    /// Folds `text` and drops every symbol outside the alphabet.
    pub fn clean(&self, text: &str) -> String {
        text.chars()
            .map(fold)
            .filter(|&c| self.index.contains_key(&c))
            .collect()
    }

    /// Maps every symbol of `text` to its index, failing on the first symbol
    /// outside the alphabet.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        text.chars()
            .enumerate()
            .map(|(position, symbol)| {
                self.lookup(symbol)
                    .ok_or(Error::InvalidSymbol { symbol, position })
            })
            .collect()
    }

    pub fn decode(&self, indices: &[usize]) -> String {
        indices.iter().map(|&i| self.symbol(i)).collect()
    }

    /// Folded lookups for every symbol of `text`, `None` where the symbol is
    /// outside the alphabet.
    pub fn lookup_all<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Option<usize>> + 'a {
        text.chars().map(move |c| self.lookup(c))
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::russian()
    }
}

impl FromStr for Alphabet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.chars())
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// Canonical case of a symbol. Symbols whose lower-case form is not a single
/// `char` are left as they are.
pub fn fold(symbol: char) -> char {
    let mut lower = symbol.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(c), None) => c,
        _ => symbol,
    }
}

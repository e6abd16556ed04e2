pub mod alphabet;
pub mod config;
pub mod crack;
pub mod error;
pub mod kasiski;
pub mod recover;
pub mod text;

pub use alphabet::Alphabet;
pub use config::{CrackConfig, SearchBudget};
pub use crack::{crack, crack_lengths, Analysis, Outcome};
pub use error::{Error, Result};
pub use recover::{recover, KeyRecoverer, Recovered};
pub use text::{Ciphertext, Key, Profiles};

/// Fixed-width line framing the console report.
pub fn separator(c: char, width: usize) -> String {
    std::iter::repeat(c).take(width).collect()
}

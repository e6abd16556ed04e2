use once_cell::sync::Lazy;

use super::Alphabet;

/// Lower-case Cyrillic letters including `ё`, followed by space, comma and period.
pub const RUSSIAN_SYMBOLS: &str = "абвгдеёжзийклмнопрстуфхцчшщъыьэюя ,.";

pub(super) static RUSSIAN: Lazy<Alphabet> =
    Lazy::new(|| Alphabet::from_distinct(RUSSIAN_SYMBOLS.chars().collect()));

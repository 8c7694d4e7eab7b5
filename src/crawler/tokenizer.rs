//! # Tokenizer
//! src/crawler/tokenizer.rs
//!
//! Divide el texto de un archivo en términos para el índice.

use regex::Regex;
use std::sync::LazyLock;

/// Delimitadores: espacio, CR, LF, tab, tab vertical, `,` `.` `:` `;` `?` `!`
static DELIMITERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \r\n\t\x0B,.:;?!]+").expect("delimiter pattern is valid")
});

/// Tokeniza `text` en términos en minúsculas
///
/// Un término aparece en la salida una vez por cada ocurrencia en el texto,
/// en el orden original. Los tokens vacíos se descartan.
///
/// # Ejemplo
/// ```
/// use search_server::crawler::tokenize;
///
/// assert_eq!(tokenize("Cat cat dog."), vec!["cat", "cat", "dog"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    DELIMITERS
        .split(text)
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

//! # Índice Invertido
//! src/index/mod.rs
//!
//! Mapa de término → (documento → ocurrencias). Se construye una sola vez
//! durante el crawl (un solo thread) y después se comparte en solo-lectura
//! entre todas las conexiones mediante `Arc<WordIndex>`, sin locks.
//!
//! ```text
//! "dog" → { "docs/a.txt": 1, "docs/b.txt": 2 }
//! "cat" → { "docs/a.txt": 2 }
//! ```

pub mod word_index;

pub use word_index::{SearchResult, WordIndex};

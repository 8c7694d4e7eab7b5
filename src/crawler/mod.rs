//! # Crawler
//! src/crawler/mod.rs
//!
//! Fase de ingesta: directorio → tokens → `WordIndex`.
//!
//! - `fs`: el trait `FileSystem` y su implementación local
//! - `tokenizer`: separación del texto en términos
//! - `crawl`: el recorrido recursivo y su política de errores

pub mod crawl;
pub mod fs;
pub mod tokenizer;

pub use crawl::{crawl_filetree, CrawlStats, Crawler, DirErrorPolicy};
pub use fs::{DirEntry, FileSystem, LocalFs};
pub use tokenizer::tokenize;

//! # Crawler de Directorios
//! src/crawler/crawl.rs
//!
//! Recorre recursivamente un directorio, tokeniza cada archivo y llena un
//! `WordIndex`. Corre en un solo thread antes de que el servidor acepte
//! conexiones.
//!
//! ## Política de errores
//!
//! - Archivo ilegible → se salta, el crawl sigue.
//! - Bytes que no son UTF-8 → se reemplazan por U+FFFD y el archivo se
//!   indexa igual.
//! - Directorio raíz ilegible → error fatal.
//! - Subdirectorio ilegible → depende de `DirErrorPolicy`
//!   (`Abort` por defecto: el crawl completo falla).

use super::fs::{DirEntry, FileSystem, LocalFs};
use super::tokenizer::tokenize;
use crate::error::CrawlError;
use crate::index::WordIndex;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info, warn};

/// Qué hacer cuando un subdirectorio no se puede listar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DirErrorPolicy {
    /// Abortar el crawl completo
    #[default]
    Abort,

    /// Registrar un warning y seguir con el resto del árbol
    Skip,
}

/// Contadores de un crawl
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub dirs_visited: usize,
    pub dirs_skipped: usize,
    pub tokens_recorded: usize,
}

/// Crawler sobre un `FileSystem`
#[derive(Debug, Clone)]
pub struct Crawler<F = LocalFs> {
    fs: F,
    dir_policy: DirErrorPolicy,
}

impl Crawler<LocalFs> {
    /// Crawler sobre el disco local con la política por defecto
    pub fn local() -> Self {
        Self::new(LocalFs)
    }
}

impl<F: FileSystem> Crawler<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            dir_policy: DirErrorPolicy::default(),
        }
    }

    pub fn with_dir_policy(mut self, policy: DirErrorPolicy) -> Self {
        self.dir_policy = policy;
        self
    }

    /// Construye el índice de todos los archivos bajo `root`
    pub fn crawl(&self, root: impl AsRef<Path>) -> Result<WordIndex, CrawlError> {
        self.crawl_with_stats(root).map(|(index, _)| index)
    }

    /// Igual que `crawl`, pero también retorna los contadores
    pub fn crawl_with_stats(
        &self,
        root: impl AsRef<Path>,
    ) -> Result<(WordIndex, CrawlStats), CrawlError> {
        let root = root.as_ref();
        info!(root = %root.display(), "Iniciando crawl");

        // La raíz siempre es fatal, sin importar la política
        let entries = self
            .fs
            .read_dir(root)
            .map_err(|source| CrawlError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            })?;

        let mut index = WordIndex::new();
        let mut stats = CrawlStats::default();
        stats.dirs_visited += 1;
        self.visit_entries(root, entries, &mut index, &mut stats)?;

        info!(
            files = stats.files_indexed,
            skipped = stats.files_skipped,
            dirs = stats.dirs_visited,
            words = index.num_words(),
            "Crawl terminado"
        );

        Ok((index, stats))
    }

    fn handle_dir(
        &self,
        dir: &Path,
        index: &mut WordIndex,
        stats: &mut CrawlStats,
    ) -> Result<(), CrawlError> {
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => match self.dir_policy {
                DirErrorPolicy::Abort => {
                    return Err(CrawlError::DirectoryUnreadable {
                        path: dir.to_path_buf(),
                        source,
                    });
                }
                DirErrorPolicy::Skip => {
                    warn!(dir = %dir.display(), error = %source, "Directorio ilegible, se omite");
                    stats.dirs_skipped += 1;
                    return Ok(());
                }
            },
        };

        stats.dirs_visited += 1;
        self.visit_entries(dir, entries, index, stats)
    }

    fn visit_entries(
        &self,
        dir: &Path,
        entries: Vec<DirEntry>,
        index: &mut WordIndex,
        stats: &mut CrawlStats,
    ) -> Result<(), CrawlError> {
        for entry in entries {
            if entry.name == "." || entry.name == ".." {
                continue;
            }

            let path = dir.join(&entry.name);
            if entry.is_dir {
                self.handle_dir(&path, index, stats)?;
            } else {
                self.handle_file(&path, index, stats);
            }
        }

        Ok(())
    }

    fn handle_file(&self, path: &Path, index: &mut WordIndex, stats: &mut CrawlStats) {
        let bytes = match self.fs.read_file(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "No se pudo leer el archivo, se omite");
                stats.files_skipped += 1;
                return;
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        if matches!(text, Cow::Owned(_)) {
            debug!(file = %path.display(), "El archivo no es UTF-8 válido, se decodifica con pérdida");
        }

        let doc_name = path.to_string_lossy();
        let tokens = tokenize(&text);
        for token in &tokens {
            index.record(token, &doc_name);
        }

        debug!(file = %doc_name, tokens = tokens.len(), "Archivo indexado");
        stats.files_indexed += 1;
        stats.tokens_recorded += tokens.len();
    }
}

/// Crawl de `root` en el disco local, abortando ante cualquier directorio
/// ilegible
pub fn crawl_filetree(root: impl AsRef<Path>) -> Result<WordIndex, CrawlError> {
    Crawler::local().crawl(root)
}

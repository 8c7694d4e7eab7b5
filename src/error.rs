//! # Errores del Servidor
//! src/error.rs
//!
//! Tipos de error de cada etapa del arranque. Los errores por conexión o por
//! archivo no aparecen aquí: se registran con `tracing` y no se propagan.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errores fatales del crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    /// El directorio raíz no existe o no se puede listar
    #[error("cannot crawl root directory {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Un subdirectorio no se pudo listar (política `Abort`)
    #[error("cannot list directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errores del pool de workers
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("thread pool needs at least one worker")]
    NoWorkers,

    /// El sistema operativo no pudo crear un thread
    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("thread pool is shut down")]
    ShutDown,
}

/// Errores de arranque y del accept loop
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de búsqueda con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./search_server --port 8080 \
//!   --root ./corpus \
//!   --workers 8 \
//!   --dir-errors skip
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 SEARCH_ROOT=./corpus WORKERS=8 ./search_server
//! ```

use crate::crawler::DirErrorPolicy;
use crate::http::socket::DEFAULT_MAX_HEADER_BYTES;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Headers más chicos que esto no alcanzan ni para una request line normal
const MIN_HEADER_BYTES: usize = 1024;

/// Configuración del servidor de búsqueda
#[derive(Debug, Clone, Parser)]
#[command(name = "search_server")]
#[command(about = "Servidor de búsqueda: indexa un directorio y responde consultas por HTTP")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio que se indexa y desde el que se sirve `/static/`
    #[arg(short, long, default_value = "./data", env = "SEARCH_ROOT")]
    pub root: PathBuf,

    /// Número de workers que atienden conexiones
    #[arg(short, long, default_value = "4", env = "WORKERS")]
    pub workers: usize,

    /// Tamaño máximo de un bloque de headers, en bytes
    #[arg(long = "max-header-bytes", default_value_t = DEFAULT_MAX_HEADER_BYTES, env = "MAX_HEADER_BYTES")]
    pub max_header_bytes: usize,

    /// Qué hacer con un subdirectorio que no se puede listar durante el crawl
    #[arg(long = "dir-errors", value_enum, default_value = "abort", env = "DIR_ERRORS")]
    pub dir_errors: DirErrorPolicy,
}

impl Config {
    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use search_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna un mensaje si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }

        if self.max_header_bytes < MIN_HEADER_BYTES {
            return Err(format!("Max header bytes must be >= {}", MIN_HEADER_BYTES));
        }

        if self.root.as_os_str().is_empty() {
            return Err("Search root must not be empty".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        info!(
            address = %self.address(),
            root = %self.root.display(),
            workers = self.workers,
            max_header_bytes = self.max_header_bytes,
            dir_errors = ?self.dir_errors,
            "Configuración del servidor"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            root: PathBuf::from("./data"),
            workers: 4,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            dir_errors: DirErrorPolicy::Abort,
        }
    }
}

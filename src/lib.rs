//! # Search Server
//! src/lib.rs
//!
//! Servidor de búsqueda sobre un directorio de archivos de texto. Al
//! arrancar indexa recursivamente el directorio raíz; después atiende
//! consultas HTTP concurrentes con un pool de threads de tamaño fijo.
//!
//! ## Arquitectura
//!
//! - `crawler`: recorre el directorio y tokeniza cada archivo
//! - `index`: índice invertido término → documento → ocurrencias
//! - `pool`: pool de workers con cola FIFO
//! - `http`: framing de requests (con pipelining), parsing y responses
//! - `router`: rutas `/`, `/static/`, `/query` y `/metrics`
//! - `server`: arranque y accept loop
//! - `metrics`: contadores y latencias
//! - `config`: argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use search_server::config::Config;
//! use search_server::server::Server;
//!
//! let config = Config {
//!     root: "./corpus".into(),
//!     ..Config::default()
//! };
//! let mut server = Server::new(config).expect("no se pudo indexar");
//! server.run().expect("error en el accept loop");
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod http;
pub mod index;
pub mod metrics;
pub mod pool;
pub mod router;
pub mod server;

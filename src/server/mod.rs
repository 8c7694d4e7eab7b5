//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: arranque (crawl + pool) y accept loop
//! - `connection`: el loop de requests de cada conexión, que corre en un
//!   worker del pool

pub mod connection;
pub mod tcp;

pub use connection::handle_connection;
pub use tcp::Server;

//! # Pool de Workers
//! src/pool/mod.rs
//!
//! El accept loop entrega cada conexión como una tarea; el pool limita
//! cuántas se atienden en paralelo. Las demás esperan en la cola.

pub mod thread_pool;

pub use thread_pool::{PoolMonitor, Task, ThreadPool};

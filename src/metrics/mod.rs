//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección de métricas del servidor, expuestas en `/metrics`:
//! - Contadores de requests por status y por ruta
//! - Latencias (p50, p95, p99)
//! - Conexiones abiertas

pub mod collector;

pub use collector::{LatencyStats, MetricsCollector, MetricsSnapshot};

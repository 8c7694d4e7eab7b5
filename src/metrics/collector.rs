//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Cuenta requests por status y por ruta, mantiene una ventana de latencias
//! para los percentiles y el número de conexiones abiertas.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Latencias que se guardan para calcular percentiles
const MAX_LATENCIES: usize = 10_000;

/// Rutas que aparecen en `top_paths`
const TOP_PATHS: usize = 10;

/// Rutas distintas que se cuentan por separado
const MAX_TRACKED_PATHS: usize = 256;

/// Bucket para las rutas que llegan con la tabla llena
const OTHER_PATHS: &str = "<other>";

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

struct MetricsData {
    total_requests: u64,

    status_codes: HashMap<u16, u64>,

    /// Últimas latencias en microsegundos, la más antigua al frente
    latencies: VecDeque<u64>,

    /// A lo sumo `MAX_TRACKED_PATHS` rutas más `OTHER_PATHS`
    requests_per_path: HashMap<String, u64>,

    active_connections: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                total_requests: 0,
                status_codes: HashMap::new(),
                latencies: VecDeque::with_capacity(MAX_LATENCIES),
                requests_per_path: HashMap::new(),
                active_connections: 0,
            })),
            start_time: Instant::now(),
        }
    }

    /// Un panic en otro thread no debe apagar las métricas
    fn lock(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registra un request atendido
    pub fn record_request(&self, path: &str, status_code: u16, latency: Duration) {
        let mut data = self.lock();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;

        if data.latencies.len() >= MAX_LATENCIES {
            data.latencies.pop_front();
        }
        data.latencies
            .push_back(u64::try_from(latency.as_micros()).unwrap_or(u64::MAX));

        let paths = &mut data.requests_per_path;
        if let Some(count) = paths.get_mut(path) {
            *count += 1;
        } else if paths.len() < MAX_TRACKED_PATHS {
            paths.insert(path.to_string(), 1);
        } else {
            *paths.entry(OTHER_PATHS.to_string()).or_insert(0) += 1;
        }
    }

    pub fn connection_opened(&self) {
        self.lock().active_connections += 1;
    }

    pub fn connection_closed(&self) {
        let mut data = self.lock();
        data.active_connections = data.active_connections.saturating_sub(1);
    }

    pub fn active_connections(&self) -> u64 {
        self.lock().active_connections
    }

    /// Métricas actuales como documento JSON
    pub fn to_json(&self) -> Value {
        let data = self.lock();
        let latencies: Vec<u64> = data.latencies.iter().copied().collect();
        let stats = LatencyStats::from_samples(&latencies);

        let status_codes: serde_json::Map<String, Value> = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), json!(count)))
            .collect();

        let mut paths: Vec<(&String, &u64)> = data.requests_per_path.iter().collect();
        paths.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top_paths: Vec<Value> = paths
            .into_iter()
            .take(TOP_PATHS)
            .map(|(path, count)| json!({ "path": path, "count": count }))
            .collect();

        json!({
            "server": {
                "uptime_seconds": self.start_time.elapsed().as_secs(),
                "active_connections": data.active_connections,
            },
            "requests": {
                "total": data.total_requests,
                "status_codes": status_codes,
                "top_paths": top_paths,
            },
            "latency_us": stats,
        })
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.lock();
        let latencies: Vec<u64> = data.latencies.iter().copied().collect();

        MetricsSnapshot {
            total_requests: data.total_requests,
            active_connections: data.active_connections,
            uptime_secs: self.start_time.elapsed().as_secs(),
            latency: LatencyStats::from_samples(&latencies),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Resumen de la ventana de latencias, en microsegundos
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg: u64,
    pub stddev: f64,
    pub samples: usize,
}

impl LatencyStats {
    fn from_samples(latencies: &[u64]) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        let mut sorted = latencies.to_vec();
        sorted.sort_unstable();

        let len = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let avg = sum / len as u64;

        let variance = sorted
            .iter()
            .map(|&x| {
                let diff = x as f64 - avg as f64;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;

        Self {
            p50: sorted[len * 50 / 100],
            p95: sorted[len * 95 / 100],
            p99: sorted[len * 99 / 100],
            avg,
            stddev: variance.sqrt(),
            samples: len,
        }
    }
}

/// Snapshot de métricas para uso externo
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub active_connections: u64,
    pub uptime_secs: u64,
    pub latency: LatencyStats,
}

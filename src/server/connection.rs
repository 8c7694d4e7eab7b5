//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Cuerpo de cada tarea del pool. Atiende todos los requests de una
//! conexión, en orden, hasta que:
//!
//! - el cliente cierra el socket (o hay un error de lectura)
//! - el cliente pide `Connection: close`
//! - falla la escritura de una respuesta
//! - llega un request que no se puede parsear (se responde 400)
//!
//! Ningún error se propaga: todo se registra con `tracing`.

use crate::http::{HttpSocket, Method, Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::router::Router;
use std::io::{Read, Write};
use std::time::Instant;
use tracing::{debug, warn};

/// Marca la conexión como abierta mientras vive, incluso si el handler
/// hace panic
struct ConnectionGuard<'a> {
    metrics: &'a MetricsCollector,
}

impl<'a> ConnectionGuard<'a> {
    fn open(metrics: &'a MetricsCollector) -> Self {
        metrics.connection_opened();
        Self { metrics }
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.metrics.connection_closed();
    }
}

/// Atiende una conexión completa
///
/// Retorna cuántos requests se respondieron.
pub fn handle_connection<S: Read + Write>(
    stream: S,
    router: &Router,
    max_header_bytes: usize,
) -> usize {
    let metrics = &router.context().metrics;
    let _guard = ConnectionGuard::open(metrics);

    let mut socket = HttpSocket::new(stream).with_max_header_bytes(max_header_bytes);
    let mut served = 0;

    while let Some(raw) = socket.next_request() {
        let start = Instant::now();

        let (response, path, close) = match Request::parse(&raw) {
            Ok(request) => {
                debug!(method = request.method().as_str(), target = request.target(), "Request");
                let response = router.route(&request);
                let response = if request.method() == Method::HEAD {
                    response.strip_body()
                } else {
                    response
                };
                (response, request.path().to_string(), request.wants_close())
            }
            Err(e) => {
                warn!(error = %e, "Request inválido, se cierra la conexión");
                let response =
                    Response::error(StatusCode::BadRequest, &format!("Invalid request: {}", e));
                (response, "<invalid>".to_string(), true)
            }
        };

        let response = if close {
            response.with_header("Connection", "close")
        } else {
            response
        };

        let written = socket.write_response(&response.to_bytes());
        metrics.record_request(&path, response.status().as_u16(), start.elapsed());
        served += 1;

        if let Err(e) = written {
            debug!(error = %e, "No se pudo escribir la respuesta");
            break;
        }
        if close {
            break;
        }
    }

    debug!(requests = served, "Conexión terminada");
    served
}

//! # Handlers del Servidor de Búsqueda
//! src/router/handlers.rs
//!
//! Cada handler recibe el request ya parseado y el contexto compartido, y
//! siempre produce una respuesta; los errores se traducen a 4xx/5xx aquí.

use super::SearchContext;
use crate::http::utils::escape_html;
use crate::http::{Request, Response, StatusCode};
use crate::index::SearchResult;
use serde_json::json;
use std::fmt::Write as _;
use std::path::{Component, Path};
use tracing::debug;

/// Prefijo de los archivos estáticos
pub const STATIC_PREFIX: &str = "/static/";

/// Página a la que se redirige `/`
pub const INDEX_PAGE: &str = "/static/index.html";

/// `GET /` → 302 a la página principal
pub fn root(_request: &Request, _ctx: &SearchContext) -> Response {
    Response::redirect(INDEX_PAGE)
}

/// `GET /static/<rel>` → contenido de `<root>/<rel>`
///
/// Solo se aceptan paths relativos sin `..`; cualquier otro, o un archivo
/// que no se puede leer, es 404.
pub fn static_file(request: &Request, ctx: &SearchContext) -> Response {
    let rel = request
        .path()
        .strip_prefix(STATIC_PREFIX)
        .unwrap_or_default();

    if !is_safe_relative(rel) {
        debug!(path = request.path(), "Path estático rechazado");
        return Response::not_found();
    }

    let full_path = ctx.static_root.join(rel);
    match std::fs::read(&full_path) {
        Ok(contents) => Response::new(StatusCode::Ok)
            .with_header("Content-Type", content_type_for(&full_path))
            .with_body_bytes(contents),
        Err(e) => {
            debug!(path = %full_path.display(), error = %e, "Archivo estático no disponible");
            Response::not_found()
        }
    }
}

/// `GET /query?terms=a+b` → página HTML con los documentos que contienen
/// todos los términos
pub fn query(request: &Request, ctx: &SearchContext) -> Response {
    let Some(raw_terms) = request.query_param("terms") else {
        return Response::error(StatusCode::BadRequest, "missing 'terms' parameter");
    };

    let terms = normalize_terms(raw_terms);
    let results = ctx.index.lookup_query(&terms);
    debug!(?terms, hits = results.len(), "Consulta resuelta");

    Response::html(&render_results(&terms, &results))
}

/// `GET /metrics` → contadores del servidor, tamaño del índice y del pool
pub fn metrics(_request: &Request, ctx: &SearchContext) -> Response {
    let mut payload = ctx.metrics.to_json();

    payload["index"] = json!({
        "words": ctx.index.num_words(),
        "documents": ctx.index.num_documents(),
    });
    payload["pool"] = match &ctx.pool {
        Some(pool) => json!({ "workers": pool.size(), "queued": pool.queued() }),
        None => serde_json::Value::Null,
    };

    Response::json(&payload.to_string())
}

/// Separa por espacios, pasa a minúsculas y quita la puntuación de los
/// extremos; los términos que quedan vacíos se descartan
pub fn normalize_terms(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

fn render_results(terms: &[String], results: &[SearchResult]) -> String {
    let mut body = String::from("<html><head><title>Results</title></head><body>\n");
    let _ = writeln!(
        body,
        "<p>{} result(s) for <b>{}</b></p>",
        results.len(),
        escape_html(&terms.join(" "))
    );

    body.push_str("<ul>\n");
    for result in results {
        let _ = writeln!(
            body,
            "<li>{} [{}]</li>",
            escape_html(&result.doc_name),
            result.rank
        );
    }
    body.push_str("</ul>\n</body></html>\n");
    body
}

fn is_safe_relative(rel: &str) -> bool {
    !rel.is_empty()
        && Path::new(rel)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        _ => "text/plain; charset=utf-8",
    }
}

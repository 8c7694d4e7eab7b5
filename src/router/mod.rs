//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea el path de cada request a un handler.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler(&Request, &SearchContext) → Response
//! ```
//!
//! Las rutas pueden ser exactas (`/query`) o por prefijo (`/static/`). Se
//! prueban en el orden en que se registraron; si ninguna coincide se
//! retorna 404 Not Found.

pub mod handlers;

use crate::http::{Request, Response};
use crate::index::WordIndex;
use crate::metrics::MetricsCollector;
use crate::pool::PoolMonitor;
use std::path::PathBuf;
use std::sync::Arc;

/// Lo que los handlers necesitan del servidor
///
/// Todo es de solo lectura o internamente sincronizado, así que un mismo
/// contexto se comparte entre todas las conexiones.
#[derive(Clone)]
pub struct SearchContext {
    /// Índice congelado después del crawl
    pub index: Arc<WordIndex>,

    /// Directorio que se indexó; también es la raíz de `/static/`
    pub static_root: PathBuf,

    pub metrics: MetricsCollector,

    /// Estado del pool, si el servidor ya lo creó
    pub pool: Option<PoolMonitor>,
}

impl SearchContext {
    pub fn new(index: Arc<WordIndex>, static_root: impl Into<PathBuf>) -> Self {
        Self {
            index,
            static_root: static_root.into(),
            metrics: MetricsCollector::new(),
            pool: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_pool(mut self, pool: PoolMonitor) -> Self {
        self.pool = Some(pool);
        self
    }
}

/// Tipo de función handler
pub type Handler = fn(&Request, &SearchContext) -> Response;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Exact(String),
    Prefix(String),
}

impl Pattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(route) => route == path,
            Pattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// Router que mapea paths a handlers
pub struct Router {
    routes: Vec<(Pattern, Handler)>,
    context: SearchContext,
}

impl Router {
    /// Router vacío: todo request recibe 404
    pub fn new(context: SearchContext) -> Self {
        Self {
            routes: Vec::new(),
            context,
        }
    }

    /// Router con las rutas del servidor de búsqueda
    ///
    /// | Path            | Handler                          |
    /// |-----------------|----------------------------------|
    /// | `/`             | redirect a `/static/index.html`  |
    /// | `/static/<rel>` | archivo bajo la raíz indexada    |
    /// | `/query`        | búsqueda AND sobre el índice     |
    /// | `/metrics`      | métricas en JSON                 |
    pub fn search(context: SearchContext) -> Self {
        let mut router = Self::new(context);
        router.register("/", handlers::root);
        router.register_prefix(handlers::STATIC_PREFIX, handlers::static_file);
        router.register("/query", handlers::query);
        router.register("/metrics", handlers::metrics);
        router
    }

    /// Registra una ruta exacta
    ///
    /// # Ejemplo
    /// ```
    /// use search_server::http::{Request, Response, StatusCode};
    /// use search_server::index::WordIndex;
    /// use search_server::router::{Router, SearchContext};
    /// use std::sync::Arc;
    ///
    /// fn hello(_req: &Request, _ctx: &SearchContext) -> Response {
    ///     Response::html("<p>hello</p>")
    /// }
    ///
    /// let context = SearchContext::new(Arc::new(WordIndex::new()), "./data");
    /// let mut router = Router::new(context);
    /// router.register("/hello", hello);
    ///
    /// let request = Request::parse(b"GET /hello HTTP/1.1\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&request).status(), StatusCode::Ok);
    /// ```
    pub fn register(&mut self, path: &str, handler: Handler) {
        self.routes.push((Pattern::Exact(path.to_string()), handler));
    }

    /// Registra una ruta que atiende todo path que empiece con `prefix`
    pub fn register_prefix(&mut self, prefix: &str, handler: Handler) {
        self.routes.push((Pattern::Prefix(prefix.to_string()), handler));
    }

    /// Ejecuta el primer handler cuyo patrón coincida con el path
    pub fn route(&self, request: &Request) -> Response {
        let path = request.path();

        let mut response = self
            .routes
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, handler)| handler(request, &self.context))
            .unwrap_or_else(Response::not_found);

        self.add_common_headers(&mut response);
        response
    }

    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", "search-server");
    }
}

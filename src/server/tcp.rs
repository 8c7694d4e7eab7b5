//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Arranque en dos fases:
//!
//! 1. **Crawl**: se indexa el directorio raíz en un solo thread. El índice
//!    terminado se congela en un `Arc<WordIndex>` y no vuelve a mutar.
//! 2. **Serve**: el accept loop entrega cada conexión al pool; las
//!    conexiones comparten el índice sin locks.

use super::connection::handle_connection;
use crate::config::Config;
use crate::crawler::Crawler;
use crate::error::ServerError;
use crate::metrics::MetricsCollector;
use crate::pool::ThreadPool;
use crate::router::{Router, SearchContext};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Servidor de búsqueda
pub struct Server {
    config: Config,
    router: Arc<Router>,
    pool: ThreadPool,
    listener: Option<TcpListener>,
}

impl Server {
    /// Valida la configuración, indexa la raíz y crea el pool
    ///
    /// Cualquier falla aquí es fatal: el servidor no arranca con un índice
    /// parcial ni sin workers.
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let (index, stats) = Crawler::local()
            .with_dir_policy(config.dir_errors)
            .crawl_with_stats(&config.root)?;
        info!(
            words = index.num_words(),
            documents = index.num_documents(),
            tokens = stats.tokens_recorded,
            "Índice listo"
        );

        let pool = ThreadPool::new(config.workers)?;

        let context = SearchContext::new(Arc::new(index), config.root.clone())
            .with_metrics(MetricsCollector::new())
            .with_pool(pool.monitor());

        Ok(Self {
            config,
            router: Arc::new(Router::search(context)),
            pool,
            listener: None,
        })
    }

    /// Abre el socket de escucha y retorna la dirección real
    ///
    /// Con `port = 0` el sistema elige un puerto libre.
    pub fn bind(&mut self) -> Result<SocketAddr, ServerError> {
        let (listener, local) = self.open_listener()?;
        self.listener = Some(listener);
        Ok(local)
    }

    fn open_listener(&self) -> Result<(TcpListener, SocketAddr), ServerError> {
        let address = self.config.address();
        let bind_error = |source| ServerError::Bind {
            address: address.clone(),
            source,
        };

        let listener = TcpListener::bind(&address).map_err(bind_error)?;
        let local = listener.local_addr().map_err(bind_error)?;
        info!(address = %local, "Servidor escuchando");

        Ok((listener, local))
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Accept loop; bloquea el thread actual
    ///
    /// Hace `bind` si todavía no se hizo. Solo retorna si el pool deja de
    /// aceptar tareas.
    pub fn run(&mut self) -> Result<(), ServerError> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => self.open_listener()?.0,
        };
        self.serve(&listener)
    }

    fn serve(&self, listener: &TcpListener) -> Result<(), ServerError> {
        let max_header_bytes = self.config.max_header_bytes;

        info!(workers = self.pool.size(), "Aceptando conexiones");

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "Error al aceptar conexión");
                    continue;
                }
            };

            if let Ok(peer) = stream.peer_addr() {
                debug!(%peer, queued = self.pool.queued(), "Nueva conexión");
            }

            let router = Arc::clone(&self.router);
            self.pool
                .dispatch(move || {
                    handle_connection(stream, &router, max_header_bytes);
                })
                .map_err(|e| {
                    error!(error = %e, "El pool ya no acepta conexiones");
                    e
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::DirErrorPolicy;
    use crate::error::{CrawlError, PoolError};
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::path::Path;
    use std::thread;

    fn config_for(root: &Path) -> Config {
        Config {
            port: 0,
            root: root.to_path_buf(),
            workers: 2,
            ..Config::default()
        }
    }

    #[test]
    fn test_new_builds_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "Cat cat dog.").unwrap();

        let server = Server::new(config_for(dir.path())).unwrap();
        let index = &server.router().context().index;
        assert_eq!(index.num_words(), 2);
        assert_eq!(index.num_documents(), 1);
        assert!(server.local_addr().is_none());
    }

    #[test]
    fn test_new_fails_on_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = Server::new(config_for(&dir.path().join("missing")));
        assert!(matches!(
            result,
            Err(ServerError::Crawl(CrawlError::RootUnreadable { .. }))
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.workers = 0;
        assert!(matches!(Server::new(config), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_pool_error_converts() {
        let err: ServerError = PoolError::NoWorkers.into();
        assert!(matches!(err, ServerError::Pool(PoolError::NoWorkers)));
    }

    #[test]
    fn test_skip_policy_reaches_crawler() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "words").unwrap();

        let mut config = config_for(dir.path());
        config.dir_errors = DirErrorPolicy::Skip;
        assert!(Server::new(config).is_ok());
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new(config_for(dir.path())).unwrap();

        let addr = server.bind().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.local_addr(), Some(addr));
    }

    #[test]
    fn test_bind_error_names_address() {
        let dir = tempfile::tempdir().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let mut config = config_for(dir.path());
        config.port = port;

        let mut server = Server::new(config).unwrap();
        let err = server.bind().unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
        assert!(err.to_string().contains(&format!("127.0.0.1:{}", port)));
    }

    #[test]
    fn test_run_without_bind_reports_bind_error() {
        let dir = tempfile::tempdir().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = config_for(dir.path());
        config.port = taken.local_addr().unwrap().port();

        let mut server = Server::new(config).unwrap();
        assert!(matches!(server.run(), Err(ServerError::Bind { .. })));
    }

    #[test]
    fn test_run_serves_queries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "Cat cat dog.").unwrap();
        let doc = dir.path().join("a.txt").to_string_lossy().into_owned();

        let mut server = Server::new(config_for(dir.path())).unwrap();
        let addr = server.bind().unwrap();
        thread::spawn(move || server.run());

        let mut client = TcpStream::connect(addr).unwrap();
        client
            .write_all(b"GET /query?terms=cat HTTP/1.1\r\nConnection: close\r\n\r\n")
            .unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains(&format!("<li>{} [2]</li>", doc)));
    }
}

//! # Framing de Requests sobre un Socket
//! src/http/socket.rs
//!
//! `HttpSocket` envuelve un stream (normalmente un `TcpStream`) y entrega un
//! bloque de headers completo por llamada a `next_request`, terminado en
//! `\r\n\r\n`.
//!
//! Los bytes leídos después del terminador pertenecen al siguiente request
//! (pipelining) y se guardan en `buffer` para la próxima llamada. Si el
//! siguiente request ya está completo en el buffer, no se vuelve a leer
//! del socket.

use std::io::{self, ErrorKind, Read, Write};
use tracing::{debug, warn};

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Tamaño de cada lectura del socket
pub const READ_CHUNK_SIZE: usize = 8192;

/// Límite por defecto del tamaño de un bloque de headers
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

/// Conexión HTTP con buffer propio
pub struct HttpSocket<S> {
    stream: S,

    /// Bytes recibidos que todavía no se entregaron
    buffer: Vec<u8>,

    /// Prefijo de `buffer` en el que ya se buscó el terminador sin éxito
    scanned: usize,

    max_header_bytes: usize,

    /// El peer cerró o hubo un error fatal; no hay más requests
    closed: bool,
}

impl<S: Read + Write> HttpSocket<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(READ_CHUNK_SIZE),
            scanned: 0,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            closed: false,
        }
    }

    /// Cambia el tamaño máximo aceptado para un bloque de headers
    pub fn with_max_header_bytes(mut self, limit: usize) -> Self {
        self.max_header_bytes = limit;
        self
    }

    /// Retorna el siguiente bloque de headers, incluyendo `\r\n\r\n`
    ///
    /// `None` cuando el peer cerró la conexión, hubo un error de I/O fatal
    /// o el bloque excede el límite. Después de un `None`, todas las
    /// llamadas siguientes también retornan `None`.
    pub fn next_request(&mut self) -> Option<Vec<u8>> {
        if self.closed {
            return None;
        }

        loop {
            if let Some(end) = self.find_header_end() {
                let request: Vec<u8> = self.buffer.drain(..end).collect();
                self.scanned = 0;
                return Some(request);
            }

            if self.buffer.len() > self.max_header_bytes {
                warn!(
                    buffered = self.buffer.len(),
                    limit = self.max_header_bytes,
                    "Headers demasiado grandes, se cierra la conexión"
                );
                return self.close();
            }

            match self.read_chunk() {
                Ok(0) => {
                    debug!(pending = self.buffer.len(), "El peer cerró la conexión");
                    return self.close();
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "Error leyendo del socket");
                    return self.close();
                }
            }
        }
    }

    /// Escribe la respuesta completa
    ///
    /// `write_all` ya reintenta escrituras parciales e interrupciones.
    pub fn write_response(&mut self, response: &[u8]) -> io::Result<()> {
        self.stream.write_all(response)?;
        self.stream.flush()
    }

    /// Bytes recibidos que aún no forman un request completo
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Posición justo después del terminador, si ya llegó
    fn find_header_end(&mut self) -> Option<usize> {
        // Retroceder 3 bytes por si el terminador quedó partido entre lecturas
        let start = self.scanned.saturating_sub(HEADER_END.len() - 1);
        let found = self.buffer[start..]
            .windows(HEADER_END.len())
            .position(|window| window == HEADER_END)
            .map(|pos| start + pos + HEADER_END.len());

        if found.is_none() {
            self.scanned = self.buffer.len();
        }
        found
    }

    /// Una lectura del socket, reintentando EINTR / EAGAIN
    fn read_chunk(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn close(&mut self) -> Option<Vec<u8>> {
        self.closed = true;
        self.buffer.clear();
        self.scanned = 0;
        None
    }
}

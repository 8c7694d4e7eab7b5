//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parsea el bloque de headers que entrega `HttpSocket::next_request`.
//!
//! ```text
//! GET /query?terms=cat+dog HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Connection: close\r\n
//! \r\n
//! ```
//!
//! 1. **Request Line**: `METHOD /path?query VERSION`
//! 2. **Headers**: pares `Name: Value`, uno por línea
//! 3. **Línea vacía**: fin del request

use super::utils::decode_uri;
use std::collections::HashMap;
use thiserror::Error;

/// Métodos HTTP soportados
///
/// Solo métodos sin cuerpo: el framer no lee bodies, así que cualquier
/// otro método se rechaza con 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
        }
    }
}

/// Un request HTTP parseado (solo la cabecera)
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Target tal como llegó (ej: "/query?terms=cat+dog")
    target: String,

    /// Path decodificado (ej: "/query")
    path: String,

    /// Query parameters decodificados (ej: {"terms": "cat dog"})
    query_params: HashMap<String, String>,

    /// Headers con el nombre en minúsculas
    headers: HashMap<String, String>,

    version: String,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Request is not valid UTF-8")]
    InvalidEncoding,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl Request {
    /// Parsea un bloque de headers completo
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use search_server::http::Request;
    ///
    /// let raw = b"GET /query?terms=cat+dog HTTP/1.1\r\nConnection: Close\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/query");
    /// assert_eq!(request.query_param("terms"), Some("cat dog"));
    /// assert!(request.wants_close());
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let request_str = std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidEncoding)?;

        if request_str.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = request_str.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;

        let (method, target, version) = Self::parse_request_line(request_line)?;
        let (path, query_params) = Self::parse_target(&target);
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            target,
            path,
            query_params,
            headers,
            version,
        })
    }

    /// Formato: `GET /path?query HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::parse(parts[0])?;

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, parts[1].to_string(), version))
    }

    /// Separa path y query string, decodificando ambos
    fn parse_target(target: &str) -> (String, HashMap<String, String>) {
        let Some((raw_path, query)) = target.split_once('?') else {
            return (decode_uri(target), HashMap::new());
        };

        let mut params = HashMap::new();
        for param in query.split('&').filter(|p| !p.is_empty()) {
            match param.split_once('=') {
                Some((key, value)) => {
                    params.insert(decode_uri(key), decode_uri(value));
                }
                None => {
                    params.insert(decode_uri(param), String::new());
                }
            }
        }

        (decode_uri(raw_path), params)
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            // La línea vacía marca el fin de los headers
            if line.trim().is_empty() {
                break;
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        Ok(headers)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Target sin decodificar
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Busca un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `true` si el header `Connection` incluye el token `close`
    ///
    /// El cliente no enviará más requests por esta conexión.
    pub fn wants_close(&self) -> bool {
        self.header("connection").is_some_and(|value| {
            value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("close"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.query_params().is_empty());
        assert!(!request.wants_close());
    }

    #[test]
    fn test_parse_query_terms() {
        let request = Request::parse(b"GET /query?terms=Cat+dog%21 HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.path(), "/query");
        assert_eq!(request.target(), "/query?terms=Cat+dog%21");
        assert_eq!(request.query_param("terms"), Some("Cat dog!"));
    }

    #[test]
    fn test_parse_param_without_value() {
        let request = Request::parse(b"GET /query?terms HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.query_param("terms"), Some(""));
    }

    #[test]
    fn test_parse_static_path_is_decoded() {
        let request = Request::parse(b"GET /static/my%20file.txt HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/static/my file.txt");
    }

    #[test]
    fn test_headers_case_insensitive() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:8080\r\nUser-Agent: test\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("Host"), Some("localhost:8080"));
        assert_eq!(request.header("user-agent"), Some("test"));
    }

    #[test]
    fn test_wants_close_variants() {
        for raw in [
            &b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n"[..],
            &b"GET / HTTP/1.1\r\nconnection: Close\r\n\r\n"[..],
            &b"GET / HTTP/1.1\r\nCONNECTION: keep-alive, CLOSE\r\n\r\n"[..],
        ] {
            assert!(Request::parse(raw).unwrap().wants_close());
        }

        let keep = Request::parse(b"GET / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n").unwrap();
        assert!(!keep.wants_close());
    }

    #[test]
    fn test_invalid_version() {
        let result = Request::parse(b"GET / HTTP/2.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_unsupported_method() {
        let result = Request::parse(b"BREW / HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ParseError::UnsupportedMethod(_))));
    }

    #[test]
    fn test_methods_with_body_are_rejected() {
        for method in ["POST", "PUT"] {
            let raw = format!("{} /query HTTP/1.1\r\nContent-Length: 5\r\n\r\n", method);
            assert_eq!(
                Request::parse(raw.as_bytes()).unwrap_err(),
                ParseError::UnsupportedMethod(method.to_string())
            );
        }
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b"").unwrap_err(), ParseError::EmptyRequest);
        assert_eq!(Request::parse(b"\r\n\r\n").unwrap_err(), ParseError::EmptyRequest);
    }

    #[test]
    fn test_invalid_request_line() {
        let result = Request::parse(b"GET\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::InvalidRequestLine);
    }

    #[test]
    fn test_invalid_header() {
        let result = Request::parse(b"GET / HTTP/1.1\r\nNoColonHere\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
    }

    #[test]
    fn test_non_utf8_request() {
        let result = Request::parse(b"\xff\xfe / HTTP/1.1\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::InvalidEncoding);
    }
}

//! # Módulo HTTP
//!
//! Lo mínimo de HTTP/1.1 que necesita el servidor de búsqueda, sin
//! librerías de alto nivel:
//!
//! - Framing de requests sobre un stream, con soporte de pipelining
//! - Parsing de la request line y los headers
//! - Construcción de responses
//! - Decodificación de URIs y escape de HTML
//!
//! ### Formato de Request
//!
//! ```text
//! GET /query?terms=cat+dog HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! Un cliente puede mandar varios requests seguidos por la misma conexión;
//! la conexión se cierra cuando el cliente envía `Connection: close` o
//! cierra el socket.

pub mod request;
pub mod response;
pub mod socket;
pub mod status;
pub mod utils;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use socket::HttpSocket;
pub use status::StatusCode;

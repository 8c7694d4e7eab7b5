//! # Utilidades HTTP/HTML
//! src/http/utils.rs
//!
//! Decodificación de URIs y escape de HTML.

/// Decodifica secuencias `%XY` y convierte `+` en espacio
///
/// Solo se decodifican códigos entre 32 y 127; cualquier otra secuencia se
/// deja tal cual.
///
/// # Ejemplo
/// ```
/// use search_server::http::utils::decode_uri;
///
/// assert_eq!(decode_uri("hello%20world+again"), "hello world again");
/// assert_eq!(decode_uri("100%"), "100%");
/// ```
pub fn decode_uri(from: &str) -> String {
    let bytes = from.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'+' => {
                out.push(b' ');
                pos += 1;
            }
            b'%' => match decode_escape(bytes.get(pos + 1..pos + 3)) {
                Some(code) => {
                    out.push(code);
                    pos += 3;
                }
                None => {
                    out.push(b'%');
                    pos += 1;
                }
            },
            other => {
                out.push(other);
                pos += 1;
            }
        }
    }

    // Los códigos decodificados son ASCII y el resto viene de un &str
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Interpreta los dos dígitos hex de un escape; `None` si no aplica
fn decode_escape(digits: Option<&[u8]>) -> Option<u8> {
    let digits = digits?;
    let text = std::str::from_utf8(digits).ok()?;
    let code = u8::from_str_radix(text, 16).ok()?;
    (32..=127).contains(&code).then_some(code)
}

/// Escapa los cinco caracteres peligrosos de HTML
///
/// # Ejemplo
/// ```
/// use search_server::http::utils::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
/// ```
pub fn escape_html(from: &str) -> String {
    let mut out = String::with_capacity(from.len());
    for c in from.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

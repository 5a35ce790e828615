mod error;
pub mod headers;
pub mod request;
pub mod request_line;
pub mod response;

pub use error::ParseError;
pub use headers::Headers;
pub use request::{decode, decode_with_config, ParserState, Request};
pub use request_line::RequestLine;
pub use response::{ResponseWriter, StatusCode};

const CRLF: &[u8] = b"\r\n";

fn end_of_line(line: &[u8]) -> Option<usize> {
    line.windows(CRLF.len())
        .enumerate()
        .find(|(_, w)| w.eq(&CRLF))
        .map(|(i, _)| i)
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

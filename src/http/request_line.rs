use super::{end_of_line, is_whitespace, ParseError, CRLF};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    http_version: String,
}

impl RequestLine {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }
}

/// Parses the start line of a request.
///
/// Returns `Ok(None)` while `data` holds no complete line. On success the
/// second value is the number of bytes taken, CRLF included.
pub fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(end_of_line) = end_of_line(data) else {
        return Ok(None);
    };
    let line =
        std::str::from_utf8(&data[..end_of_line]).map_err(|_| ParseError::MalformedRequestLine)?;
    let request_line = request_line_from_str(line)?;
    Ok(Some((request_line, end_of_line + CRLF.len())))
}

fn request_line_from_str(line: &str) -> Result<RequestLine, ParseError> {
    let parts: [&str; 3] = line
        .split(' ')
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| ParseError::MalformedRequestLine)?;
    let [method, target, version] = parts;

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::MalformedMethod);
    }

    let http_version = match version.split('/').collect::<Vec<_>>().as_slice() {
        ["HTTP", "1.1"] => "1.1",
        _ => return Err(ParseError::UnsupportedHttpVersion),
    };

    if !target.starts_with('/') || target.bytes().any(is_whitespace) {
        return Err(ParseError::MalformedTarget);
    }

    Ok(RequestLine {
        method: method.to_owned(),
        target: target.to_owned(),
        http_version: http_version.to_owned(),
    })
}

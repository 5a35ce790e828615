use std::collections::BTreeMap;

use super::{end_of_line, is_whitespace, ParseError, CRLF};

static TOKEN_CHARS: [bool; 256] = token_chars();

const fn token_chars() -> [bool; 256] {
    let mut table = [false; 256];
    let mut c = 0;
    while c < 256 {
        let b = c as u8;
        table[c] = b.is_ascii_alphanumeric();
        c += 1;
    }
    let punct = b"!#$%&'*+-.^_`|~";
    let mut i = 0;
    while i < punct.len() {
        table[punct[i] as usize] = true;
        i += 1;
    }
    table
}

fn is_token(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().all(|&b| TOKEN_CHARS[b as usize])
}

/// Header fields keyed by lowercase name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Adds a value, joining it to an existing one with `,`.
    pub fn add(&mut self, name: &str, value: &str) {
        self.fields
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }

    /// Replaces any existing value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses at most one field line from `data`.
    ///
    /// Returns the number of bytes consumed and whether the blank line ending
    /// the header section was reached. `(0, false)` means more data is needed.
    /// The blank line itself is reported with `(0, true)` and is left for the
    /// caller to consume.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(end_of_line) = end_of_line(data) else {
            return Ok((0, false));
        };
        if end_of_line == 0 {
            return Ok((0, true));
        }

        let line = &data[..end_of_line];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(ParseError::MalformedFieldName)?;
        let name = field_name(&line[..colon])?;
        let value = field_value(&line[colon + 1..])?;
        log::trace!("header field {name}: {value}");
        self.add(name, value);

        Ok((end_of_line + CRLF.len(), false))
    }
}

fn field_name(raw: &[u8]) -> Result<&str, ParseError> {
    let start = raw
        .iter()
        .position(|&b| !is_whitespace(b))
        .unwrap_or(raw.len());
    let name = &raw[start..];
    if !is_token(name) {
        return Err(ParseError::MalformedFieldName);
    }
    // token bytes are ASCII
    std::str::from_utf8(name).map_err(|_| ParseError::MalformedFieldName)
}

fn field_value(raw: &[u8]) -> Result<&str, ParseError> {
    let value = match raw.iter().position(|&b| !is_whitespace(b)) {
        Some(start) => {
            let end = raw.iter().rposition(|&b| !is_whitespace(b)).unwrap_or(start);
            &raw[start..=end]
        }
        None => &raw[..0],
    };
    if value.iter().copied().any(is_whitespace) {
        return Err(ParseError::MalformedFieldValue);
    }
    std::str::from_utf8(value).map_err(|_| ParseError::MalformedFieldValue)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn valid_single_header() {
        let mut headers = Headers::new();
        let data = b"Host: localhost:42069\r\n\r\n";
        let (n, done) = headers.parse(data).unwrap();
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 23);
        assert!(!done);
    }

    #[test]
    fn valid_single_header_with_extra_whitespace() {
        let mut headers = Headers::new();
        let data = b"   Host:   localhost:42069   \r\n\r\n";
        let (n, done) = headers.parse(data).unwrap();
        assert_eq!(headers.get("Host"), Some("localhost:42069"));
        assert_eq!(n, data.len() - 2);
        assert!(!done);
    }

    #[test]
    fn valid_two_headers_with_existing_headers() {
        let mut headers = Headers::new();
        headers.set("accept", "*/*");
        let data = b"Host: localhost:42069\r\nUser-Agent: curl/7.81.0\r\n\r\n";

        let (n, done) = headers.parse(data).unwrap();
        assert!(!done);
        let (m, done) = headers.parse(&data[n..]).unwrap();
        assert!(!done);
        let (k, done) = headers.parse(&data[n + m..]).unwrap();
        assert!(done);
        assert_eq!(k, 0);

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("accept"), Some("*/*"));
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(headers.get("user-agent"), Some("curl/7.81.0"));
    }

    #[test]
    fn blank_line_is_done() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse(b"\r\n").unwrap(), (0, true));
        assert_eq!(headers.parse(b"\r\nGET").unwrap(), (0, true));
        assert!(headers.is_empty());
    }

    #[test]
    fn incomplete_line_needs_more_data() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse(b"Host: localhost").unwrap(), (0, false));
        assert_eq!(headers.parse(b"Host: localhost\r").unwrap(), (0, false));
        assert_eq!(headers.parse(b"Host: localhost\n\n").unwrap(), (0, false));
        assert_eq!(headers.parse(b"").unwrap(), (0, false));
        assert!(headers.is_empty());
    }

    #[test]
    fn space_before_colon_is_rejected() {
        let mut headers = Headers::new();
        let data = b"       Host : localhost:42069       \r\n\r\n";
        assert!(matches!(
            headers.parse(data),
            Err(ParseError::MalformedFieldName)
        ));
    }

    #[test]
    fn space_inside_name_is_rejected() {
        let mut headers = Headers::new();
        assert!(matches!(
            headers.parse(b"Foo Bar: baz\r\n"),
            Err(ParseError::MalformedFieldName)
        ));
    }

    #[test]
    fn invalid_token_character() {
        let mut headers = Headers::new();
        for data in [
            &b"H\xa9st: localhost:42069\r\n"[..],
            b"Ho(st): x\r\n",
            b"Ho\"st: x\r\n",
            b": x\r\n",
            b"no-colon-here\r\n",
        ] {
            assert!(matches!(
                headers.parse(data),
                Err(ParseError::MalformedFieldName)
            ));
        }
    }

    #[test]
    fn every_token_punctuation_is_accepted() {
        let mut headers = Headers::new();
        headers.parse(b"!#$%&'*+-.^_`|~09az: x\r\n").unwrap();
        assert_eq!(headers.get("!#$%&'*+-.^_`|~09az"), Some("x"));
    }

    #[test]
    fn internal_space_in_value_is_rejected() {
        let mut headers = Headers::new();
        assert!(matches!(
            headers.parse(b"Foo: a b\r\n"),
            Err(ParseError::MalformedFieldValue)
        ));
        assert!(matches!(
            headers.parse(b"Foo: a\tb\r\n"),
            Err(ParseError::MalformedFieldValue)
        ));
    }

    #[test]
    fn empty_value_is_kept() {
        let mut headers = Headers::new();
        headers.parse(b"X-Empty:\r\n").unwrap();
        assert_eq!(headers.get("x-empty"), Some(""));
    }

    #[test]
    fn duplicate_headers_are_joined_without_space() {
        let mut headers = Headers::new();
        let data = b"X-Foo: bar\r\nX-Foo: baz\r\n\r\n";
        let (n, _) = headers.parse(data).unwrap();
        let (m, _) = headers.parse(&data[n..]).unwrap();
        assert_eq!(headers.parse(&data[n + m..]).unwrap(), (0, true));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-foo"), Some("bar,baz"));
    }

    #[test]
    fn name_casing_collapses_to_one_key() {
        let mut headers = Headers::new();
        for data in [
            &b"Content-Type: a\r\n"[..],
            b"CONTENT-TYPE: b\r\n",
            b"content-type: c\r\n",
        ] {
            headers.parse(data).unwrap();
        }
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.iter().next(), Some(("content-type", "a,b,c")));
    }

    #[test]
    fn set_replaces_and_iter_is_sorted() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/html");
        headers.set("content-type", "text/plain");
        headers.set("Connection", "close");
        let fields: Vec<_> = headers.iter().collect();
        assert_eq!(
            fields,
            vec![("connection", "close"), ("content-type", "text/plain")]
        );
    }
}

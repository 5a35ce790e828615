use std::io;

use thiserror::Error;

use super::request::ParserState;
use super::response::StatusCode;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("malformed method in request line")]
    MalformedMethod,
    #[error("unsupported HTTP version")]
    UnsupportedHttpVersion,
    #[error("malformed target in request line")]
    MalformedTarget,
    #[error("malformed field-name")]
    MalformedFieldName,
    #[error("malformed field-value")]
    MalformedFieldValue,
    #[error("incomplete request, stream ended in state {state:?} with {unparsed} unparsed bytes")]
    IncompleteRequest { state: ParserState, unparsed: usize },
    #[error("request header too large, should be less than {0} bytes")]
    RequestHeaderTooLarge(usize),
    #[error("request in error state")]
    RequestInErrorState,
    #[error("read from byte source failed: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// Status to answer with, `None` when the connection should just be dropped.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ParseError::MalformedRequestLine
            | ParseError::MalformedMethod
            | ParseError::MalformedTarget
            | ParseError::MalformedFieldName
            | ParseError::MalformedFieldValue => Some(StatusCode::BadRequest),
            ParseError::UnsupportedHttpVersion => Some(StatusCode::HttpVersionNotSupported),
            ParseError::RequestHeaderTooLarge(_) | ParseError::RequestInErrorState => {
                Some(StatusCode::InternalServerError)
            }
            ParseError::IncompleteRequest { .. } | ParseError::Io(_) => None,
        }
    }
}

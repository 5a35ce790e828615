mod bbuf;
pub mod config;
pub mod http;
pub mod server;
mod source;

pub use config::{DecoderConfig, ServerConfig};
pub use http::{decode, decode_with_config, Headers, ParseError, ParserState, Request, RequestLine};
pub use server::{Handler, HandlerError, Server};
pub use source::{ByteSource, ReadOutcome};

//! Incremental HTTP/1.0 request parser.
//!
//! The parser is fed whatever bytes a read produced, one chunk at a time, and
//! fills a [`Request`] in place. It keeps no copy of the input: the only thing
//! carried between calls is the current [`State`], so a chunk boundary may
//! fall anywhere (mid-token, mid-digit, between `\r` and `\n`).

use crate::http::request::{Header, Request};

/// Outcome of feeding a chunk to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    /// More input is needed
    Indeterminate,
    /// The blank line ending the header block was consumed
    Complete,
    /// The input is not a well-formed request
    Invalid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    // GET /index.html
    #[default]
    MethodStart,
    Method,
    Uri,

    // HTTP/1.0
    HttpVersionH,
    HttpVersionT1,
    HttpVersionT2,
    HttpVersionP,
    HttpVersionSlash,
    HttpVersionMajorStart,
    HttpVersionMajor,
    HttpVersionMinorStart,
    HttpVersionMinor,
    HttpVersionEnd,

    // Name: Value
    HeaderLineStart,
    HeaderName,
    HeaderNameEnd,
    HeaderValue,
    HeaderValueEnd,

    RequestEnd,

    // terminal until reset
    Complete,
    Failed,
}

impl State {
    fn result(self) -> ParseResult {
        match self {
            State::Complete => ParseResult::Complete,
            State::Failed => ParseResult::Invalid,
            _ => ParseResult::Indeterminate,
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestParser {
    state: State,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `input` to the state machine, mutating `request` as tokens grow.
    ///
    /// Stops at the first byte that completes or invalidates the request;
    /// the rest of the chunk is left unread. Empty input is `Indeterminate`.
    pub fn parse(&mut self, request: &mut Request, input: &[u8]) -> ParseResult {
        for &byte in input {
            let result = self.consume(request, byte);
            if result != ParseResult::Indeterminate {
                return result;
            }
        }
        ParseResult::Indeterminate
    }

    /// Returns to the initial state. The request is not touched.
    pub fn reset(&mut self) {
        self.state = State::MethodStart;
    }

    fn consume(&mut self, req: &mut Request, byte: u8) -> ParseResult {
        use State::*;

        let next = match self.state {
            MethodStart if byte.is_ascii_alphabetic() => {
                req.method.push(char::from(byte));
                Method
            }

            Method if byte == b' ' => Uri,
            Method if is_token(byte) => {
                req.method.push(char::from(byte));
                Method
            }

            Uri if byte == b' ' => HttpVersionH,
            Uri if byte.is_ascii() && !is_control(byte) => {
                req.uri.push(char::from(byte));
                Uri
            }

            HttpVersionH if byte == b'H' => HttpVersionT1,
            HttpVersionT1 if byte == b'T' => HttpVersionT2,
            HttpVersionT2 if byte == b'T' => HttpVersionP,
            HttpVersionP if byte == b'P' => HttpVersionSlash,
            HttpVersionSlash if byte == b'/' => HttpVersionMajorStart,

            HttpVersionMajorStart if byte.is_ascii_digit() => {
                req.version.major = u32::from(byte - b'0');
                HttpVersionMajor
            }
            HttpVersionMajor if byte == b'.' => HttpVersionMinorStart,
            HttpVersionMajor if byte.is_ascii_digit() => match accumulate(req.version.major, byte) {
                Some(major) => {
                    req.version.major = major;
                    HttpVersionMajor
                }
                None => Failed,
            },

            HttpVersionMinorStart if byte.is_ascii_digit() => {
                req.version.minor = u32::from(byte - b'0');
                HttpVersionMinor
            }
            HttpVersionMinor if byte == b'\r' => HttpVersionEnd,
            HttpVersionMinor if byte.is_ascii_digit() => match accumulate(req.version.minor, byte) {
                Some(minor) => {
                    req.version.minor = minor;
                    HttpVersionMinor
                }
                None => Failed,
            },

            HttpVersionEnd if byte == b'\n' => HeaderLineStart,

            HeaderLineStart if byte == b'\r' => RequestEnd,
            HeaderLineStart if is_token(byte) => {
                req.headers.push(Header {
                    name: char::from(byte).to_string(),
                    value: String::new(),
                });
                HeaderName
            }

            HeaderName if byte == b':' => HeaderNameEnd,
            HeaderName if is_token(byte) => match req.headers.last_mut() {
                Some(header) => {
                    header.name.push(char::from(byte));
                    HeaderName
                }
                None => Failed,
            },

            HeaderNameEnd if byte == b' ' => HeaderValue,

            HeaderValue if byte == b'\r' => HeaderValueEnd,
            HeaderValue if byte == b' ' || !is_control(byte) => match req.headers.last_mut() {
                Some(header) => {
                    // bytes >= 0x80 map to the Latin-1 character of the same code
                    header.value.push(char::from(byte));
                    HeaderValue
                }
                None => Failed,
            },

            HeaderValueEnd if byte == b'\n' => HeaderLineStart,

            RequestEnd if byte == b'\n' => Complete,

            Complete => return ParseResult::Complete,
            Failed => return ParseResult::Invalid,

            _ => Failed,
        };

        self.state = next;
        next.result()
    }
}

fn accumulate(value: u32, digit: u8) -> Option<u32> {
    value.checked_mul(10)?.checked_add(u32::from(digit - b'0'))
}

fn is_control(byte: u8) -> bool {
    byte <= 32 || byte == 127
}

fn is_special(byte: u8) -> bool {
    b"(){}[]<>@,\";:\\/?= \t".contains(&byte)
}

/// Characters allowed in a method or a header name.
fn is_token(byte: u8) -> bool {
    byte.is_ascii() && !is_control(byte) && !is_special(byte)
}

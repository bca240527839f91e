//! Text protocol spoken by the demo server and client.
//!
//! One request per connection, words separated by spaces:
//!
//! ```text
//! get <key>
//! set <key> <value> [ttl_secs]
//! delete <key>
//! ping
//! stats
//! ```
//!
//! A TTL of 0 means the entry never expires; a negative TTL is rejected.
//!
//! The server answers with a single line:
//!
//! | request  | response                                           |
//! |----------|----------------------------------------------------|
//! | `get`    | the value, or an empty line on a miss               |
//! | `set`    | `Ok` for a new key, `r Ok` when a live key was replaced |
//! | `delete` | `Ok` if the key existed, otherwise an empty line    |
//! | `ping`   | `PONG`                                             |
//! | `stats`  | space-separated `name:value` pairs                 |
//!
//! Malformed requests get `ERR <reason>`.

use std::fmt;
use std::time::Duration;

use bytes::{Buf, BytesMut};

use crate::error::{CacheError, CacheResult};

/// A parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Get { key: String },
    Set {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    Delete { key: String },
    Ping,
    Stats,
}

impl Request {
    /// Consume `buf` and parse it as a request.
    pub fn decode(buf: &mut BytesMut) -> CacheResult<Request> {
        Self::parse(&split_words(buf))
    }

    /// Parse already split words. The command name is case-insensitive.
    pub fn parse(words: &[String]) -> CacheResult<Request> {
        let (command, args) = match words.split_first() {
            Some(split) => split,
            None => return Err(CacheError::ParseError("empty command".to_string())),
        };

        match command.to_ascii_lowercase().as_str() {
            "get" => Ok(Request::Get {
                key: required(args, 0, "key")?,
            }),
            "set" => {
                let ttl = match args.get(2) {
                    Some(raw) => Some(parse_ttl(raw)?),
                    None => None,
                };
                Ok(Request::Set {
                    key: required(args, 0, "key")?,
                    value: required(args, 1, "value")?,
                    ttl,
                })
            }
            "delete" | "del" => Ok(Request::Delete {
                key: required(args, 0, "key")?,
            }),
            "ping" => Ok(Request::Ping),
            "stats" | "info" => Ok(Request::Stats),
            _ => Err(CacheError::InvalidCommand(command.clone())),
        }
    }
}

impl fmt::Display for Request {
    /// Wire form of the request.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Get { key } => write!(f, "get {}", key),
            Request::Set { key, value, ttl } => match ttl {
                Some(ttl) => write!(f, "set {} {} {}", key, value, wire_secs(*ttl)),
                None => write!(f, "set {} {}", key, value),
            },
            Request::Delete { key } => write!(f, "delete {}", key),
            Request::Ping => f.write_str("ping"),
            Request::Stats => f.write_str("stats"),
        }
    }
}

/// Whole seconds for the wire, rounded up so a sub-second TTL never
/// becomes 0 (no expiration).
fn wire_secs(ttl: Duration) -> u64 {
    if ttl.subsec_nanos() > 0 {
        ttl.as_secs().saturating_add(1)
    } else {
        ttl.as_secs()
    }
}

/// Convert a signed TTL in seconds. Zero means no expiration.
pub fn ttl_from_secs(secs: i64) -> CacheResult<Duration> {
    u64::try_from(secs)
        .map(Duration::from_secs)
        .map_err(|_| CacheError::InvalidTtl(format!("{} is negative", secs)))
}

fn parse_ttl(raw: &str) -> CacheResult<Duration> {
    let secs = raw
        .parse::<i64>()
        .map_err(|_| CacheError::InvalidTtl(format!("'{}' is not a number of seconds", raw)))?;
    ttl_from_secs(secs)
}

fn required(args: &[String], idx: usize, name: &str) -> CacheResult<String> {
    args.get(idx)
        .cloned()
        .ok_or_else(|| CacheError::ParseError(format!("missing {} argument", name)))
}

/// Split the buffer on spaces, consuming it. Runs of spaces count as one
/// separator and trailing line endings are ignored.
pub fn split_words(buf: &mut BytesMut) -> Vec<String> {
    let raw = buf.split_to(buf.len());
    raw.chunk()
        .split(|b| *b == b' ' || *b == b'\r' || *b == b'\n')
        .filter(|word| !word.is_empty())
        .map(|word| String::from_utf8_lossy(word).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> CacheResult<Request> {
        Request::decode(&mut BytesMut::from(s))
    }

    #[test]
    fn test_split_words() {
        let mut buf = BytesMut::from("set  key   value\r\n");
        assert_eq!(split_words(&mut buf), vec!["set", "key", "value"]);
        assert!(buf.is_empty());
        assert!(split_words(&mut BytesMut::new()).is_empty());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(decode("GET k").unwrap(), Request::Get { key: "k".into() });
        assert_eq!(decode("del k").unwrap(), Request::Delete { key: "k".into() });
        assert_eq!(decode("ping").unwrap(), Request::Ping);
        assert_eq!(decode("info").unwrap(), Request::Stats);
        assert_eq!(
            decode("set k v").unwrap(),
            Request::Set {
                key: "k".into(),
                value: "v".into(),
                ttl: None
            }
        );
        assert_eq!(
            decode("set k v 30").unwrap(),
            Request::Set {
                key: "k".into(),
                value: "v".into(),
                ttl: Some(Duration::from_secs(30))
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(decode(""), Err(CacheError::ParseError(_))));
        assert!(matches!(decode("get"), Err(CacheError::ParseError(_))));
        assert!(matches!(decode("set k"), Err(CacheError::ParseError(_))));
        assert!(matches!(decode("flush"), Err(CacheError::InvalidCommand(c)) if c == "flush"));
        assert!(matches!(decode("set k v -1"), Err(CacheError::InvalidTtl(_))));
        assert!(matches!(decode("set k v soon"), Err(CacheError::InvalidTtl(_))));
    }

    #[test]
    fn test_ttl_from_secs() {
        assert_eq!(ttl_from_secs(0).unwrap(), Duration::ZERO);
        assert_eq!(ttl_from_secs(5).unwrap(), Duration::from_secs(5));
        assert!(ttl_from_secs(-5).is_err());
    }

    #[test]
    fn test_display_is_wire_form() {
        let request = Request::Set {
            key: "k".into(),
            value: "v".into(),
            ttl: Some(Duration::from_secs(9)),
        };
        assert_eq!(request.to_string(), "set k v 9");
        assert_eq!(decode(&request.to_string()).unwrap(), request);
    }

    #[test]
    fn test_display_rounds_sub_second_ttl_up() {
        let request = Request::Set {
            key: "k".into(),
            value: "v".into(),
            ttl: Some(Duration::from_millis(500)),
        };
        assert_eq!(request.to_string(), "set k v 1");

        let request = Request::Set {
            key: "k".into(),
            value: "v".into(),
            ttl: Some(Duration::from_millis(2_001)),
        };
        assert_eq!(request.to_string(), "set k v 3");

        let request = Request::Set {
            key: "k".into(),
            value: "v".into(),
            ttl: Some(Duration::ZERO),
        };
        assert_eq!(request.to_string(), "set k v 0");
    }
}

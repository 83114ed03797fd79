//! URI value type.
//!
//! # Responsibilities
//! - Restrict scheme to http/https and port to 1-65535
//! - Derive the authority, omitting the scheme's standard port
//! - Store path/query/fragment raw and percent-encode them on read
//!
//! # Design Decisions
//! - Encoding never touches stored values; each getter encodes a fresh copy
//! - `%` is encoded like any other byte, so stored values must be decoded text;
//!   request boundaries decode with [`percent_decode`] before building a Uri

use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::message::error::{MessageError, MessageResult};

/// Characters never encoded in any component.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const PATH: &AsciiSet = &UNRESERVED
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

const QUERY: &AsciiSet = &PATH.remove(b'?');

const FRAGMENT: &AsciiSet = &QUERY.remove(b'#');

/// Supported URI schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn standard_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl FromStr for Scheme {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(MessageError::Uri(format!("The {s} scheme is invalid."))),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw URI components as received from the hosting environment.
#[derive(Debug, Clone, Default)]
pub struct UriParts {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

/// An immutable http(s) URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    scheme: Scheme,
    user_info: String,
    host: String,
    port: u16,
    path: String,
    query: String,
    fragment: String,
}

impl Uri {
    /// `scheme://host` on the scheme's standard port with an empty path.
    pub fn new(scheme: &str, host: &str) -> MessageResult<Self> {
        let scheme: Scheme = scheme.parse()?;
        Ok(Self {
            scheme,
            user_info: String::new(),
            host: sanitize(host).to_ascii_lowercase(),
            port: scheme.standard_port(),
            path: String::new(),
            query: String::new(),
            fragment: String::new(),
        })
    }

    /// Build from decoded environment-provided parts. The host is sanitized and control
    /// characters are dropped from path, query and fragment.
    pub fn from_parts(parts: UriParts) -> MessageResult<Self> {
        let uri = Self::new(&parts.scheme, &parts.host)?;
        let port = match parts.port {
            Some(port) => validate_port(port)?,
            None => uri.scheme.standard_port(),
        };
        Ok(Self {
            port,
            path: strip_controls(&parts.path),
            query: strip_controls(&parts.query),
            fragment: strip_controls(&parts.fragment),
            ..uri
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn user_info(&self) -> &str {
        &self.user_info
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port, or `None` when it is the scheme's standard port.
    pub fn port(&self) -> Option<u16> {
        (self.port != self.scheme.standard_port()).then_some(self.port)
    }

    /// `[user_info@]host[:port]`, the port only when non-standard.
    pub fn authority(&self) -> String {
        if self.host.is_empty() {
            return String::new();
        }
        let mut authority = String::new();
        if !self.user_info.is_empty() {
            authority.push_str(&self.user_info);
            authority.push('@');
        }
        authority.push_str(&self.host);
        if let Some(port) = self.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        authority
    }

    pub fn path(&self) -> String {
        encode(&self.path, PATH)
    }

    pub fn query(&self) -> String {
        encode(&self.query, QUERY)
    }

    pub fn fragment(&self) -> String {
        encode(&self.fragment, FRAGMENT)
    }

    pub fn raw_path(&self) -> &str {
        &self.path
    }

    pub fn raw_query(&self) -> &str {
        &self.query
    }

    pub fn with_scheme(&self, scheme: &str) -> MessageResult<Self> {
        let scheme: Scheme = scheme.parse()?;
        Ok(Self {
            scheme,
            ..self.clone()
        })
    }

    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        let user_info = match password {
            Some(password) if !user.is_empty() => format!("{user}:{password}"),
            _ => user.to_string(),
        };
        Self {
            user_info,
            ..self.clone()
        }
    }

    pub fn with_host(&self, host: &str) -> MessageResult<Self> {
        if host.is_empty() {
            return Err(MessageError::Uri("The host must not be empty.".into()));
        }
        Ok(Self {
            host: sanitize(host).to_ascii_lowercase(),
            ..self.clone()
        })
    }

    /// `None` resets to the scheme's standard port.
    pub fn with_port(&self, port: Option<u16>) -> MessageResult<Self> {
        let port = match port {
            Some(port) => validate_port(port)?,
            None => self.scheme.standard_port(),
        };
        Ok(Self {
            port,
            ..self.clone()
        })
    }

    pub fn with_path(&self, path: &str) -> MessageResult<Self> {
        if path.contains(['?', '#']) {
            return Err(MessageError::Uri(
                "The path cannot contain query or fragment delimiters.".into(),
            ));
        }
        Ok(Self {
            path: path.to_string(),
            ..self.clone()
        })
    }

    pub fn with_query(&self, query: &str) -> MessageResult<Self> {
        if query.contains('#') {
            return Err(MessageError::Uri(
                "Query strings cannot contain a fragment delimiter.".into(),
            ));
        }
        Ok(Self {
            query: query.to_string(),
            ..self.clone()
        })
    }

    pub fn with_fragment(&self, fragment: &str) -> MessageResult<Self> {
        if fragment.contains('#') {
            return Err(MessageError::Uri(
                "Fragments cannot contain a fragment delimiter.".into(),
            ));
        }
        Ok(Self {
            fragment: fragment.to_string(),
            ..self.clone()
        })
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        let authority = self.authority();
        let path = self.path();
        if !authority.is_empty() {
            write!(f, "//{authority}")?;
            if !path.is_empty() && !path.starts_with('/') {
                f.write_str("/")?;
            }
            f.write_str(&path)?;
        } else if path.starts_with("//") {
            write!(f, "/{}", path.trim_start_matches('/'))?;
        } else {
            f.write_str(&path)?;
        }
        let query = self.query();
        if !query.is_empty() {
            write!(f, "?{query}")?;
        }
        let fragment = self.fragment();
        if !fragment.is_empty() {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

fn validate_port(port: u16) -> MessageResult<u16> {
    if port == 0 {
        return Err(MessageError::Uri(format!("The port {port} is invalid.")));
    }
    Ok(port)
}

/// Drop every character outside the URL-safe printable ASCII set.
fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=".contains(*c)
        })
        .collect()
}

fn strip_controls(input: &str) -> String {
    input.chars().filter(|c| !c.is_control()).collect()
}

/// Percent-encode every byte outside `set`, `%` included.
fn encode(input: &str, set: &'static AsciiSet) -> String {
    utf8_percent_encode(input, set).to_string()
}

/// Decode `%XX` escapes from received URI text; invalid UTF-8 is replaced.
pub fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(scheme: &str, port: Option<u16>) -> UriParts {
        UriParts {
            scheme: scheme.into(),
            host: "Example.COM".into(),
            port,
            path: "/users/42".into(),
            query: "a=1&b=2".into(),
            fragment: String::new(),
        }
    }

    #[test]
    fn test_standard_port_omitted() {
        let uri = Uri::from_parts(parts("https", Some(443))).unwrap();
        assert_eq!(uri.authority(), "example.com");
        assert_eq!(uri.port(), None);

        let uri = Uri::from_parts(parts("https", Some(8443))).unwrap();
        assert_eq!(uri.authority(), "example.com:8443");
        assert_eq!(uri.port(), Some(8443));

        let uri = Uri::from_parts(parts("http", Some(80))).unwrap();
        assert_eq!(uri.to_string(), "http://example.com/users/42?a=1&b=2");
    }

    #[test]
    fn test_rejects_bad_scheme_and_port() {
        assert!(Uri::from_parts(parts("ftp", None)).is_err());
        assert!(Uri::from_parts(parts("http", Some(0))).is_err());

        let uri = Uri::new("http", "example.com").unwrap();
        assert!(uri.with_scheme("gopher").is_err());
        assert!(uri.with_port(Some(0)).is_err());
        assert_eq!(uri.with_port(Some(8080)).unwrap().authority(), "example.com:8080");
        assert_eq!(uri.with_scheme("HTTPS").unwrap().scheme(), Scheme::Https);
    }

    #[test]
    fn test_encoding_on_read_only() {
        let uri = Uri::new("http", "example.com")
            .unwrap()
            .with_path("/a b/ü;x=1")
            .unwrap()
            .with_query("q=a b&x=[1]?")
            .unwrap()
            .with_fragment("sec tion/?")
            .unwrap();

        assert_eq!(uri.path(), "/a%20b/%C3%BC;x=1");
        assert_eq!(uri.raw_path(), "/a b/ü;x=1");
        assert_eq!(uri.query(), "q=a%20b&x=%5B1%5D?");
        assert_eq!(uri.fragment(), "sec%20tion/?");
    }

    #[test]
    fn test_percent_is_always_encoded() {
        let uri = Uri::new("http", "example.com").unwrap();
        assert_eq!(uri.with_path("/100%25").unwrap().path(), "/100%2525");
        assert_eq!(uri.with_path("/100%").unwrap().path(), "/100%25");
        assert_eq!(uri.with_query("rate=5%").unwrap().query(), "rate=5%25");
    }

    #[test]
    fn test_decoded_parts_encode_once() {
        let path = percent_decode("/john%20doe/%C3%BC%3F");
        assert_eq!(path, "/john doe/ü?");

        let uri = Uri::from_parts(UriParts {
            scheme: "http".into(),
            host: "example.com".into(),
            path,
            query: percent_decode("q=a%20b"),
            ..UriParts::default()
        })
        .unwrap();
        assert_eq!(uri.raw_path(), "/john doe/ü?");
        assert_eq!(uri.path(), "/john%20doe/%C3%BC%3F");
        assert_eq!(uri.query(), "q=a%20b");
        assert_eq!(percent_decode("/bad%FF"), "/bad\u{FFFD}");
    }

    #[test]
    fn test_delimiters_rejected() {
        let uri = Uri::new("https", "example.com").unwrap();
        assert!(uri.with_path("/a?b").is_err());
        assert!(uri.with_path("/a#b").is_err());
        assert!(uri.with_query("a=1#frag").is_err());
        assert!(uri.with_fragment("a#b").is_err());
        assert!(uri.with_host("").is_err());
    }

    #[test]
    fn test_with_is_copy_on_write() {
        let uri = Uri::new("http", "example.com").unwrap();
        let other = uri.with_host("Other.org").unwrap().with_user_info("bob", Some("pw"));
        assert_eq!(uri.host(), "example.com");
        assert_eq!(other.host(), "other.org");
        assert_eq!(other.authority(), "bob:pw@other.org");
    }

    #[test]
    fn test_host_sanitized() {
        let uri = Uri::new("http", "exa mple\u{7}.com").unwrap();
        assert_eq!(uri.host(), "example.com");
    }
}

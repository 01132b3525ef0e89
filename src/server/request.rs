use super::http_status::HttpStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Get,
    Head,
    Other(String),
}

impl Method {
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            other => Method::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Percent-decoded path, always starting with `/`.
    pub path: String,
    pub query: Option<String>,
    headers: Vec<(String, String)>,
}

impl Request {
    /// Parses a request head (request line plus header lines).
    pub fn parse(head: &str) -> Result<Self, HttpStatus> {
        let mut lines = head.lines();

        let request_line = lines.next().ok_or(HttpStatus::BadRequest)?;
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(HttpStatus::BadRequest);
        }

        let method = Method::from_token(parts[0]);
        let target = strip_origin(parts[1]);

        let target = target.split('#').next().unwrap_or_default();
        let (raw_path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };

        if !raw_path.starts_with('/') {
            return Err(HttpStatus::BadRequest);
        }

        let path = percent_decode(raw_path).ok_or(HttpStatus::BadRequest)?;
        if path.contains('\0') {
            return Err(HttpStatus::BadRequest);
        }

        let headers = lines
            .take_while(|line| !line.is_empty())
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect();

        Ok(Self {
            method,
            path,
            query,
            headers,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// `http://host/path` -> `/path`
fn strip_origin(target: &str) -> &str {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = target.strip_prefix(scheme) {
            return match rest.find('/') {
                Some(idx) => &rest[idx..],
                None => "/",
            };
        }
    }
    target
}

pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

pub fn percent_encode_path(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ByteRange {
    /// No usable range: send the whole file.
    Full,
    /// Inclusive byte offsets.
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

impl ByteRange {
    /// Interprets a `Range` header against a file of `size` bytes.
    ///
    /// Only a single `bytes=` range is honoured. Multiple ranges, other units
    /// and malformed specs fall back to `Full`.
    pub fn parse(value: &str, size: u64) -> Self {
        let Some(spec) = value.trim().strip_prefix("bytes=") else {
            return ByteRange::Full;
        };
        if spec.contains(',') {
            return ByteRange::Full;
        }
        let Some((start, end)) = spec.trim().split_once('-') else {
            return ByteRange::Full;
        };
        let (start, end) = (start.trim(), end.trim());

        if start.is_empty() {
            let Ok(suffix) = end.parse::<u64>() else {
                return ByteRange::Full;
            };
            if suffix == 0 || size == 0 {
                return ByteRange::Unsatisfiable;
            }
            return ByteRange::Partial {
                start: size.saturating_sub(suffix),
                end: size - 1,
            };
        }

        let Ok(start) = start.parse::<u64>() else {
            return ByteRange::Full;
        };
        let end = if end.is_empty() {
            None
        } else {
            match end.parse::<u64>() {
                Ok(end) if end >= start => Some(end),
                _ => return ByteRange::Full,
            }
        };

        if start >= size {
            return ByteRange::Unsatisfiable;
        }

        ByteRange::Partial {
            start,
            end: end.map_or(size - 1, |end| end.min(size - 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_headers() {
        let req = Request::parse("GET /index.html HTTP/1.1\r\nHost: localhost\r\nRange: bytes=0-1\r\n\r\n")
            .unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/index.html");
        assert_eq!(req.header("host"), Some("localhost"));
        assert_eq!(req.header("RANGE"), Some("bytes=0-1"));
        assert_eq!(req.header("Accept"), None);
    }

    #[test]
    fn splits_query_and_decodes_path() {
        let req = Request::parse("HEAD /my%20page.html?v=2#top HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Head);
        assert_eq!(req.path, "/my page.html");
        assert_eq!(req.query.as_deref(), Some("v=2"));
    }

    #[test]
    fn absolute_form_target() {
        let req = Request::parse("GET http://localhost:3000/a.css HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "/a.css");
    }

    #[test]
    fn rejects_malformed_requests() {
        assert_eq!(Request::parse("").unwrap_err(), HttpStatus::BadRequest);
        assert_eq!(Request::parse("GET\r\n").unwrap_err(), HttpStatus::BadRequest);
        assert_eq!(
            Request::parse("GET index.html HTTP/1.1\r\n").unwrap_err(),
            HttpStatus::BadRequest
        );
        assert_eq!(
            Request::parse("GET /%zz HTTP/1.1\r\n").unwrap_err(),
            HttpStatus::BadRequest
        );
        assert_eq!(
            Request::parse("GET /a%00b HTTP/1.1\r\n").unwrap_err(),
            HttpStatus::BadRequest
        );
    }

    #[test]
    fn keeps_unknown_methods() {
        let req = Request::parse("POST / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Other("POST".to_string()));
    }

    #[test]
    fn encodes_listing_links() {
        assert_eq!(percent_encode_path("a b/c#d.txt"), "a%20b/c%23d.txt");
        assert_eq!(percent_encode_path("plain-name_1.js"), "plain-name_1.js");
    }

    #[test]
    fn byte_ranges() {
        assert_eq!(ByteRange::parse("bytes=0-4", 10), ByteRange::Partial { start: 0, end: 4 });
        assert_eq!(ByteRange::parse("bytes=5-", 10), ByteRange::Partial { start: 5, end: 9 });
        assert_eq!(ByteRange::parse("bytes=-3", 10), ByteRange::Partial { start: 7, end: 9 });
        assert_eq!(ByteRange::parse("bytes=-30", 10), ByteRange::Partial { start: 0, end: 9 });
        assert_eq!(ByteRange::parse("bytes=2-100", 10), ByteRange::Partial { start: 2, end: 9 });
    }

    #[test]
    fn unsatisfiable_and_ignored_ranges() {
        assert_eq!(ByteRange::parse("bytes=10-", 10), ByteRange::Unsatisfiable);
        assert_eq!(ByteRange::parse("bytes=-0", 10), ByteRange::Unsatisfiable);
        assert_eq!(ByteRange::parse("bytes=0-1", 0), ByteRange::Unsatisfiable);
        assert_eq!(ByteRange::parse("bytes=0-1,3-4", 10), ByteRange::Full);
        assert_eq!(ByteRange::parse("items=0-1", 10), ByteRange::Full);
        assert_eq!(ByteRange::parse("bytes=5-2", 10), ByteRange::Full);
        assert_eq!(ByteRange::parse("bytes=abc", 10), ByteRange::Full);
    }
}

//! Directory-backed file handler.
//!
//! Maps a request path onto a file below `root`. The path is cleaned
//! lexically before it touches the filesystem, so `..` can never climb above
//! the root. Directories are served through their `index.html` or, failing
//! that, as a generated listing.

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use super::http_status::HttpStatus;
use super::request::{percent_encode_path, ByteRange, Request};
use super::response::Response;

const INDEX_FILE: &str = "index.html";
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn serve(&self, request: &Request) -> Response {
        let segments = clean_path(&request.path);
        if segments.iter().any(|s| s.contains('\\')) {
            return Response::error(HttpStatus::NotFound);
        }

        let fs_path = segments
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment));
        let url_path = format!("/{}", segments.join("/"));

        let meta = match fs::metadata(&fs_path) {
            Ok(meta) => meta,
            Err(e) => return io_error_response(&fs_path, e),
        };

        if meta.is_dir() {
            if !request.path.ends_with('/') {
                let location = redirect_target(&url_path, true, request.query.as_deref());
                return Response::redirect(&location);
            }

            let index = fs_path.join(INDEX_FILE);
            match fs::metadata(&index) {
                Ok(index_meta) if index_meta.is_file() => {
                    self.serve_file(&index, &index_meta, request)
                }
                _ => self.list_dir(&fs_path, &url_path),
            }
        } else {
            if request.path.ends_with('/') {
                let location = redirect_target(&url_path, false, request.query.as_deref());
                return Response::redirect(&location);
            }
            self.serve_file(&fs_path, &meta, request)
        }
    }

    fn serve_file(&self, path: &Path, meta: &Metadata, request: &Request) -> Response {
        let size = meta.len();
        let last_modified = meta.modified().ok().map(DateTime::<Utc>::from);
        let last_modified_str = last_modified.map(|t| t.format(HTTP_DATE).to_string());

        if let (Some(mtime), Some(since)) = (
            last_modified,
            request.header("If-Modified-Since").and_then(parse_http_date),
        ) {
            if mtime.timestamp() <= since.timestamp() {
                debug!("Not modified: {:?}", path);
                let mut response = Response::new(HttpStatus::NotModified);
                if let Some(lm) = &last_modified_str {
                    response = response.header("Last-Modified", lm.as_str());
                }
                return response;
            }
        }

        let range = match request.header("Range") {
            Some(value) if if_range_matches(request, last_modified_str.as_deref()) => {
                ByteRange::parse(value, size)
            }
            _ => ByteRange::Full,
        };

        if range == ByteRange::Unsatisfiable {
            return Response::error(HttpStatus::RangeNotSatisfiable)
                .header("Content-Range", format!("bytes */{}", size));
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => return io_error_response(path, e),
        };

        let mut response = match range {
            ByteRange::Partial { start, end } => Response::new(HttpStatus::PartialContent)
                .header("Content-Range", format!("bytes {}-{}/{}", start, end, size))
                .with_file(file, start, end - start + 1),
            _ => Response::new(HttpStatus::Ok).with_file(file, 0, size),
        };

        response = response
            .header("Content-Type", content_type(path))
            .header("Accept-Ranges", "bytes");
        if let Some(lm) = last_modified_str {
            response = response.header("Last-Modified", lm);
        }
        response
    }

    fn list_dir(&self, dir: &Path, url_path: &str) -> Response {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => return io_error_response(dir, e),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let mut name = entry.file_name().to_string_lossy().into_owned();
                if fs::metadata(entry.path()).is_ok_and(|m| m.is_dir()) {
                    name.push('/');
                }
                name
            })
            .collect();
        names.sort();

        debug!("Listing {} entries for {}", names.len(), url_path);

        let mut html = String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n");
        for name in &names {
            html.push_str(&format!(
                "<a href=\"{}\">{}</a>\n",
                html_escape(&percent_encode_path(name)),
                html_escape(name)
            ));
        }
        html.push_str("</pre>\n");

        Response::new(HttpStatus::Ok).with_bytes(html, "text/html; charset=utf-8")
    }
}

/// Splits a decoded URL path into segments, dropping `.` and resolving `..`
/// without ever going above the root.
pub fn clean_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}

fn redirect_target(url_path: &str, trailing_slash: bool, query: Option<&str>) -> String {
    let mut location = percent_encode_path(url_path);
    if trailing_slash && !location.ends_with('/') {
        location.push('/');
    }
    if let Some(query) = query {
        location.push('?');
        location.push_str(query);
    }
    location
}

fn content_type(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    }
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// A `Range` is only honoured when `If-Range` is absent or names the current
/// `Last-Modified` date.
fn if_range_matches(request: &Request, last_modified: Option<&str>) -> bool {
    match request.header("If-Range") {
        None => true,
        Some(value) => last_modified == Some(value),
    }
}

fn io_error_response(path: &Path, e: io::Error) -> Response {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            debug!("Not found: {:?}", path);
            Response::error(HttpStatus::NotFound)
        }
        io::ErrorKind::PermissionDenied => {
            warn!("Permission denied: {:?}", path);
            Response::error(HttpStatus::Forbidden)
        }
        _ => {
            error!("Error accessing {:?}: {}", path, e);
            Response::error(HttpStatus::InternalServerError)
        }
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

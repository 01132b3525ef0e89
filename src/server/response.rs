use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};

use super::http_status::HttpStatus;

const CHUNK_SIZE: usize = 65536;

#[derive(Debug)]
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    File { file: File, offset: u64, len: u64 },
}

impl Body {
    fn len(&self) -> u64 {
        match self {
            Body::Empty => 0,
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }
}

#[derive(Debug)]
pub struct Response {
    status: HttpStatus,
    headers: Vec<(String, String)>,
    body: Body,
}

impl Response {
    pub fn new(status: HttpStatus) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn error(status: HttpStatus) -> Self {
        Self::new(status).with_bytes(status.error_body(), "text/plain; charset=utf-8")
    }

    pub fn redirect(location: &str) -> Self {
        Self::new(HttpStatus::MovedPermanently).header("Location", location)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_bytes(self, body: impl Into<Vec<u8>>, content_type: &str) -> Self {
        let mut response = self.header("Content-Type", content_type);
        response.body = Body::Bytes(body.into());
        response
    }

    pub fn with_file(mut self, file: File, offset: u64, len: u64) -> Self {
        self.body = Body::File { file, offset, len };
        self
    }

    pub fn status(&self) -> HttpStatus {
        self.status
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn head(&self) -> String {
        let mut head = self.status.as_response_line();
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        if self.status != HttpStatus::NotModified {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        head.push_str("Connection: close\r\n\r\n");
        head
    }

    /// Writes the response. With `head_only` the body is skipped but the
    /// headers still describe it.
    pub fn write_to<W: Write>(self, writer: W, head_only: bool) -> io::Result<u64> {
        let mut writer = BufWriter::new(writer);
        writer.write_all(self.head().as_bytes())?;

        let sent = if head_only {
            0
        } else {
            match self.body {
                Body::Empty => 0,
                Body::Bytes(bytes) => {
                    writer.write_all(&bytes)?;
                    bytes.len() as u64
                }
                Body::File {
                    mut file,
                    offset,
                    len,
                } => {
                    file.seek(SeekFrom::Start(offset))?;
                    copy_exact(&mut file, &mut writer, len)?
                }
            }
        };

        writer.flush()?;
        Ok(sent)
    }
}

fn copy_exact<R: Read, W: Write>(reader: &mut R, writer: &mut W, len: u64) -> io::Result<u64> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut remaining = len;

    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        match reader.read(&mut buffer[..want]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "file shrank while sending",
                ));
            }
            Ok(n) => {
                writer.write_all(&buffer[..n])?;
                remaining -= n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(len)
}

use log::{debug, warn};
use std::io::{self, Read};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use super::files::StaticFiles;
use super::http_status::HttpStatus;
use super::request::{Method, Request};
use super::response::Response;

const MAX_HEAD_SIZE: usize = 8192;
const MAX_DRAIN_SIZE: usize = 65536;
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq)]
enum HeadRead {
    Complete(Vec<u8>),
    Closed,
    TooLarge,
}

/// Serves one request. Reads and writes give up after `io_timeout`, so an
/// idle client cannot hold a worker indefinitely.
pub fn handle_client(mut stream: TcpStream, files: &StaticFiles, io_timeout: Duration) {
    let peer_addr = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(_) => "unknown".to_string(),
    };

    if let Err(e) = stream
        .set_read_timeout(Some(io_timeout))
        .and_then(|_| stream.set_write_timeout(Some(io_timeout)))
    {
        warn!("Failed to set timeouts for {}: {}", peer_addr, e);
        return;
    }

    debug!(
        "[Thread {:?}] Handling connection from {}",
        std::thread::current().id(),
        peer_addr
    );

    let head = match read_request_head(&mut stream) {
        Ok(HeadRead::Complete(head)) => head,
        Ok(HeadRead::Closed) => {
            debug!("Connection closed by client {}", peer_addr);
            return;
        }
        Ok(HeadRead::TooLarge) => {
            warn!("Request head too large from {}", peer_addr);
            send(&mut stream, Response::error(HttpStatus::BadRequest), false, &peer_addr);
            close(stream, &peer_addr);
            return;
        }
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            debug!("Timed out waiting for request from {}", peer_addr);
            return;
        }
        Err(e) => {
            warn!("Error reading from {}: {}", peer_addr, e);
            return;
        }
    };

    let request_head = String::from_utf8_lossy(&head);
    let (response, head_only) = respond(&request_head, files);

    debug!(
        "{} \"{}\" {}",
        peer_addr,
        request_head.lines().next().unwrap_or_default(),
        response.status().code()
    );

    send(&mut stream, response, head_only, &peer_addr);
    close(stream, &peer_addr);
}

/// Builds the response for one request head. The flag tells the caller to
/// omit the body (HEAD).
pub fn respond(request_head: &str, files: &StaticFiles) -> (Response, bool) {
    let request = match Request::parse(request_head) {
        Ok(request) => request,
        Err(status) => return (Response::error(status), false),
    };

    match &request.method {
        Method::Get => (files.serve(&request), false),
        Method::Head => (files.serve(&request), true),
        Method::Other(method) => {
            debug!("Unsupported method {}", method);
            (
                Response::error(HttpStatus::MethodNotAllowed).header("Allow", "GET, HEAD"),
                false,
            )
        }
    }
}

fn send(stream: &mut TcpStream, response: Response, head_only: bool, peer_addr: &str) {
    match response.write_to(&mut *stream, head_only) {
        Ok(bytes) => debug!("Sent {} body bytes to {}", bytes, peer_addr),
        Err(e) => warn!("Error sending response to {}: {}", peer_addr, e),
    }
}

/// Half-closes the connection and discards whatever the client still sends,
/// so unread input does not turn the close into a reset that cuts off the
/// response.
fn close(mut stream: TcpStream, peer_addr: &str) {
    if let Err(e) = stream.shutdown(Shutdown::Write) {
        debug!("Shutdown failed for {}: {}", peer_addr, e);
        return;
    }
    if stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_err() {
        return;
    }
    let drained = drain(&mut stream, MAX_DRAIN_SIZE);
    debug!("Drained {} bytes from {}", drained, peer_addr);
}

fn drain<R: Read>(reader: &mut R, limit: usize) -> usize {
    let mut buffer = [0u8; 4096];
    let mut total = 0;
    while total < limit {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    total
}

fn read_request_head<R: Read>(reader: &mut R) -> io::Result<HeadRead> {
    let mut buffer = vec![0u8; MAX_HEAD_SIZE];
    let mut len = 0;

    loop {
        if len == buffer.len() {
            return Ok(HeadRead::TooLarge);
        }

        match reader.read(&mut buffer[len..]) {
            Ok(0) => return Ok(HeadRead::Closed),
            Ok(n) => len += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }

        if let Some(end) = head_end(&buffer[..len]) {
            buffer.truncate(end);
            return Ok(HeadRead::Complete(buffer));
        }
    }
}

/// Offset just past the blank line ending the head, if present.
fn head_end(buffer: &[u8]) -> Option<usize> {
    let crlf = buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

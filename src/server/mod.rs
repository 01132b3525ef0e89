pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod http_status;
pub mod request;
pub mod resolver;
pub mod response;

use log::{error, info};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;
use threadpool::ThreadPool;

use config::ServerConfig;
use error::ServerError;
use files::StaticFiles;
use handlers::handle_client;

pub const WORKER_THREADS: usize = 16;
pub const IO_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpServer {
    listener: TcpListener,
    files: Arc<StaticFiles>,
    thread_pool: ThreadPool,
    io_timeout: Duration,
}

impl HttpServer {
    /// Binds the listener. Fails with `ServerError::Bind` if the port string
    /// does not resolve or the address is unavailable.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr).map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        info!("Listening on {}, serving {:?}", addr, config.directory);

        Ok(Self {
            listener,
            files: Arc::new(StaticFiles::new(config.directory.clone())),
            thread_pool: ThreadPool::new(WORKER_THREADS),
            io_timeout: IO_TIMEOUT,
        })
    }

    /// How long a connection may stay silent before its worker drops it.
    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever, handing each one to the worker pool.
    pub fn run(&self) {
        info!("Server running with {} threads", WORKER_THREADS);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let files = Arc::clone(&self.files);
                    let io_timeout = self.io_timeout;
                    self.thread_pool.execute(move || {
                        handle_client(stream, &files, io_timeout);
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

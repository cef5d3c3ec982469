use std::io;
use std::net::SocketAddr;
use thiserror::Error;

// Failures that stop the server. Request-level failures never get here:
// rejections are 429s and missing files are 404s.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

pub mod assets;
mod status;

pub use status::status_handler;

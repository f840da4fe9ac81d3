pub mod codec;
pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod ident;
pub mod io;
pub mod model;
pub mod paths;
pub mod source;
pub mod writer;

pub use error::{Result, SwatchError};

pub mod cluster;
pub mod error;
pub mod results;
pub mod status;

pub use cluster::*;
pub use error::*;
pub use results::*;
pub use status::*;

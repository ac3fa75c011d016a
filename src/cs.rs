pub mod compression;

pub use compression::{Algorithm, Compression};

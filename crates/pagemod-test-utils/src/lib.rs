pub mod sandbox;
pub mod snapdir;

pub use sandbox::Sandbox;
pub use snapdir::dir_manifest;

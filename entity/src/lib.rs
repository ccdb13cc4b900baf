pub mod album;
pub mod metadata;
pub mod prelude;

//! Client-side persistence for the custom session

pub mod file;

pub use file::FileSessionStorage;

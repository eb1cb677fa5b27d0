//! Ready-made producers for [`Catalogue`](crate::Catalogue).

pub mod files;

pub use files::{FileSource, IGNORE_FILE, expand_tilde};

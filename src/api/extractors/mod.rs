mod viewer;

pub use viewer::{CurrentUser, Viewer};

pub mod reader;

pub use reader::{read, SdfEntry};

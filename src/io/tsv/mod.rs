pub mod reader;

pub use reader::{read, TsvRow, TsvTable};

mod tool;
pub use tool::*;

mod error;
pub use error::*;

mod schema;
pub use schema::*;

pub mod fs;
pub use fs::{fs_tools, GrepTool, LsTool, TreeTool};

pub mod article;
pub mod enums;
pub mod report;

pub use article::*;
pub use enums::*;
pub use report::*;

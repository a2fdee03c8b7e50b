pub mod error;
pub mod group;
pub mod schedule;
pub mod student;
pub mod subject;

pub use error::*;
pub use group::*;
pub use schedule::*;
pub use student::*;
pub use subject::*;

//! Data models

pub mod point;
pub mod scan;
pub mod history;
pub mod user;
pub mod dashboard;

pub use point::*;
pub use scan::*;
pub use history::*;
pub use user::*;
pub use dashboard::*;

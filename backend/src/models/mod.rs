pub mod schedule;
pub mod time;
pub mod timezone;

pub use schedule::*;
pub use time::*;
pub use timezone::*;

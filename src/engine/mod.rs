pub mod classify;
pub mod daily;
pub mod day_key;
pub mod range;
pub mod vacation;

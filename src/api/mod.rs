pub mod attendance;
pub mod settings;
pub mod stats;
pub mod vacation;

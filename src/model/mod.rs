pub mod group;
pub mod location;
pub mod scan_event;
pub mod status;
pub mod user;
pub mod vacation;

pub mod calendars;
pub mod health;
pub mod status;

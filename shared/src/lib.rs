//! Types and pure ICS transformations shared by the icsfilter server.

pub mod api;
pub mod ics;
pub mod models;

pub mod api;
pub mod board;
pub mod participant;
pub mod snapshot;

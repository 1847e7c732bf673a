pub mod boards;
pub mod fallback;
pub mod health;
pub mod metrics;
pub mod queue;
pub mod students;
pub mod tas;

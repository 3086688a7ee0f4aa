//! HRMS - A human resources management backend
//!
//! Departments, ranks, staff, passwords, authority rules, notifications,
//! salary configuration and monthly salary records. Every branch company
//! keeps its data in its own database; the session decides which one a
//! request works on.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payroll;
pub mod routes;
pub mod state;
pub mod util;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;

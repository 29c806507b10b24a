//! Test utilities: in-memory repository implementations, a mock payment
//! gateway, and fixtures for building an `AppState` without Postgres or
//! the real gateway.

mod billing_mocks;
mod factories;

pub use billing_mocks::*;
pub use factories::*;

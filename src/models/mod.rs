//! Data models for LendHub

pub mod inventory;
pub mod loan;

// Re-export commonly used types
pub use inventory::{Channel, Direction, ItemInventory, Movement};
pub use loan::{Borrowing, LateFee};

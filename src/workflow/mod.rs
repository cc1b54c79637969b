pub mod check_flow;

pub use check_flow::{CheckFlow, CheckOutcome, CycleReport};

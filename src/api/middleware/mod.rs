//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: bearer token → `DoctorContext`
//! 2. Access logger: runs after auth, so it sees the doctor id

pub mod audit;
pub mod auth;

pub mod enums;
pub mod filters;
pub mod lab;
pub mod medication;
pub mod patient;
pub mod prescription;
pub mod user;

pub use enums::*;
pub use filters::*;
pub use lab::*;
pub use medication::*;
pub use patient::*;
pub use prescription::*;
pub use user::*;

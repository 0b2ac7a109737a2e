pub mod category;
pub mod participant;

pub use category::*;
pub use participant::*;

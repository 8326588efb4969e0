mod constants;
mod fake;
mod pods;

pub use constants::*;
pub use fake::*;
pub use pods::*;

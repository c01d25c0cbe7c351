pub mod backend;
pub mod error;
pub mod logic;
pub mod router;

pub use backend::*;
pub use error::*;
pub use logic::*;
pub use router::*;

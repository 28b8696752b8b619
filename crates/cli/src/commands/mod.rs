pub mod extract;
pub mod runs;
pub mod show;

pub use extract::*;
pub use runs::*;
pub use show::*;

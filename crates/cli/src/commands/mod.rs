pub mod cases;
pub mod config;
pub mod diff;
pub mod run;
pub mod summary;
pub mod sweep;
pub mod util;

pub use cases::*;
pub use config::*;
pub use diff::*;
pub use run::*;
pub use summary::*;
pub use sweep::*;
pub use util::*;

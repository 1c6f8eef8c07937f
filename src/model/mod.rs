pub use date::*;
pub use item::*;
pub use seed::*;
pub use snapshot::*;
pub use status::*;
pub use timestamp::*;

mod date;
mod item;
mod seed;
mod snapshot;
mod status;
mod timestamp;

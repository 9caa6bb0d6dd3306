pub mod clock;
pub mod codegen;
pub mod memory;
pub mod sweeper;
pub mod trait_def;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::MemoryStorage;
pub use sweeper::Sweeper;
pub use trait_def::{Storage, StoreError, StoreResult};

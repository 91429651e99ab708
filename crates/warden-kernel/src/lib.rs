// state module
pub mod state;
pub use state::*;

// verdict module
pub mod verdict;
pub use verdict::*;

// policy module
pub mod policy;
pub use policy::*;

// clock module
pub mod clock;
pub use clock::*;

// storage module
pub mod storage;
pub use storage::*;

// error module
pub mod error;

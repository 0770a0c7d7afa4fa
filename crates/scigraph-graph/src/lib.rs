pub mod analysis;
pub mod builder;
pub mod exchange;
pub mod minter;
pub mod opportunities;
pub mod records;
pub mod store;

pub use analysis::*;
pub use builder::*;
pub use exchange::GraphFormat;
pub use minter::*;
pub use opportunities::*;
pub use records::*;
pub use store::*;

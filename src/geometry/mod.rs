pub mod types;
pub mod viewport;
pub mod measure;
pub mod mapper;
pub mod page;

pub use types::*;
pub use viewport::*;
pub use measure::*;
pub use mapper::*;
pub use page::*;

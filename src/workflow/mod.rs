pub mod conversion;
pub mod definition;
pub mod parameter;
pub mod status;

pub use conversion::*;
pub use definition::*;
pub use parameter::*;
pub use status::*;

pub mod parcel;
pub mod report;
pub mod ux1;
pub mod ux2;
pub mod values;

pub use parcel::*;
pub use report::*;
pub use ux1::*;
pub use ux2::*;
pub use values::*;

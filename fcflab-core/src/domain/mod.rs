//! Domain types: fundamentals, prices, aligned rows, growth windows.

pub mod fundamental;
pub mod price;
pub mod row;
pub mod window;

pub use fundamental::{FundamentalRecord, FundamentalRow};
pub use price::{PriceBook, PricePoint, PriceRecord};
pub use row::{AlignedRecord, DatasetRow};
pub use window::{GrowthRatios, GrowthWindow};

pub mod order;
pub mod raw_row;
pub mod table;

pub use order::{
    Day, Fulfillment, NormalizedOrder, Order, Preparation, SweetLiters, ERROR_MARKER, NO_ADDRESS,
    PIECES_PER_TRAY,
};
pub use raw_row::{RawField, RawRow, MIN_POSITIONS, SIGNIFICANT_POSITIONS};
pub use table::{Cell, ReportSet, ResultTable, ViewName};

//! Core DIST-ALERT processing modules

pub mod dates;
pub mod extent;
pub mod stack;

// Re-export main types
pub use dates::{date_for_day, day_index, parse_standard_date, reference_date, standard_date};
pub use extent::{
    area_label, burned_area_km2, extent_mask, DistBandNames, ExtentParams, ExtentSnapshot,
    ExtentTimeSeries, SubWindow,
};
pub use stack::{BandStack, BandStacker, StackParams};

pub mod clock;
pub mod extractor;
pub mod jwt;
pub mod test_utils;

pub use clock::{Clock, FixedClock, SystemClock};

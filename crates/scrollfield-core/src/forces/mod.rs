/// Real-time interaction forces layered on interpolated positions.
pub mod pointer;

//! H.264 (MPEG-4 AVC) NAL 单元与访问单元.

pub mod access_unit;
pub mod nal;

pub use access_unit::{AccessUnit, AccessUnitReader, PrimaryPicture, SliceHomogeneity};
pub use nal::{NalUnit, NalUnitReader, NalUnitType, SliceInfo, SliceType};

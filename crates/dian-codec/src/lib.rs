//! # dian-codec
//!
//! Dian 点迹工具编码层: 从 ES 单元组装出各码流的结构单位.
//!
//! - H.262: 一个 ES 单元即一个条目, 图像头带编码类型;
//! - AVS: 图像头与随后条带组装为帧;
//! - H.264: ES 单元即 NAL, NAL 进一步组装为访问单元.

pub mod avs;
pub mod h262;
pub mod h264;

pub use avs::{AvsFrame, AvsFrameReader, AvsPictureType};
pub use h262::{H262Item, H262ItemReader, H262PictureCoding};
pub use h264::{AccessUnit, AccessUnitReader, NalUnitReader, SliceHomogeneity};

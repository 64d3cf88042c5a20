//! # dian-core
//!
//! Dian 点迹工具核心库, 提供基础类型定义、错误处理和位流读取.

pub mod bitreader;
pub mod error;
pub mod video_type;

// 重导出常用类型
pub use bitreader::BitReader;
pub use error::{DianError, DianResult};
pub use video_type::{Granularity, VideoType};

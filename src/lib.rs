//! # Dian (点)
//!
//! 纯 Rust 实现的视频基本流结构点迹查看器: 把 H.262 (MPEG-2)、
//! H.264 (MPEG-4/AVC) 或 AVS 基本流的每个结构单位映射为单个字符,
//! 不解码像素即可一眼看出流的结构.
//!
//! # 快速开始
//!
//! ```rust
//! use dian::core::{Granularity, VideoType};
//! use dian::format::{ByteSource, EsInput, EsUnitReader};
//! use dian::report::{run_dots, DotsOptions, DotsRequest};
//!
//! // 一个最小的 H.262 流: 序列头 + 序列结束
//! let data = vec![0x00, 0x00, 0x01, 0xB3, 0x12, 0x00, 0x00, 0x01, 0xB7];
//! let input = EsInput {
//!     video_type: VideoType::H262,
//!     reader: EsUnitReader::new(ByteSource::from_data(data)),
//! };
//! let request = DotsRequest {
//!     granularity: Granularity::Aggregated,
//!     options: DotsOptions::default(),
//! };
//!
//! let mut out = Vec::new();
//! run_dots(&mut out, input, &request).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "[]\nFound 2 MPEG2 items\n");
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `dian-core` | 错误类型、位流读取与基础类型 |
//! | `dian-format` | 字节源、ES 单元扫描与 TS 前端 |
//! | `dian-codec` | H.262 条目、AVS 帧与 H.264 访问单元 |
//! | `dian-report` | 符号分类与点迹报告循环 |

/// 错误类型、位流读取与基础类型
pub use dian_core as core;

/// 输入层: 字节源、ES 单元扫描与 TS 前端
pub use dian_format as format;

/// 编码层: 各码流的结构单位组装
pub use dian_codec as codec;

/// 核心: 符号分类与点迹报告循环
pub use dian_report as report;

/// 获取 Dian 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! # dian-format
//!
//! Dian 点迹工具输入层: 字节源、ES 单元扫描与 MPEG-TS 前端.

pub mod es;
pub mod io;
pub mod open;
pub mod ts;

pub use es::{probe_video_type, EsUnit, EsUnitReader};
pub use io::ByteSource;
pub use open::{open_input, EsInput, InputSpec};
pub use ts::TsByteSource;

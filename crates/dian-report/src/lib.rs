//! # dian-report
//!
//! Dian 点迹工具核心: 把码流结构单位映射为单字符符号, 按四种粒度
//! 输出点迹、分钟标记与汇总行.

pub mod classify;
pub mod dispatch;
pub mod engine;
pub mod state;

pub use classify::Dot;
pub use dispatch::{run_dots, DotsRequest};
pub use engine::{
    report_access_unit_dots, report_avs_dots, report_es_unit_dots, report_h262_dots, DotsOptions,
};
pub use state::StreamCursor;

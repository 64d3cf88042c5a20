//! 粒度与码流类型的调度.

use std::io::Write;

use dian_core::{DianResult, Granularity, VideoType};
use dian_format::EsInput;
use log::debug;

use dian_codec::avs::AvsFrameReader;
use dian_codec::h262::H262ItemReader;
use dian_codec::h264::{AccessUnitReader, NalUnitReader};

use crate::engine::{
    report_access_unit_dots, report_avs_dots, report_es_unit_dots, report_h262_dots, DotsOptions,
};

/// 一次点迹运行的请求
#[derive(Debug, Clone, Copy)]
pub struct DotsRequest {
    /// 报告粒度
    pub granularity: Granularity,
    /// 循环选项
    pub options: DotsOptions,
}

/// 按码流类型与粒度选择报告循环并执行
///
/// 不支持的组合 (H.264 的 ES 单元粒度) 在产生任何输出之前拒绝.
pub fn run_dots<W: Write>(out: &mut W, input: EsInput, request: &DotsRequest) -> DianResult<()> {
    let EsInput { video_type, reader } = input;
    debug!("点迹运行: 类型={video_type}, 粒度={:?}", request.granularity);

    match (request.granularity, video_type) {
        (Granularity::EsUnits, vt) => {
            let mut es = reader;
            report_es_unit_dots(out, vt, &mut es, &request.options)
        }
        (Granularity::Aggregated, VideoType::H262) => {
            let mut items = H262ItemReader::new(reader);
            report_h262_dots(out, &mut items, &request.options)
        }
        (Granularity::Aggregated, VideoType::H264) => {
            let mut units = AccessUnitReader::new(NalUnitReader::new(reader));
            report_access_unit_dots(out, &mut units, &request.options)
        }
        (Granularity::Aggregated, VideoType::Avs) => {
            let mut frames = AvsFrameReader::new(reader);
            report_avs_dots(out, &mut frames, &request.options)
        }
    }
}

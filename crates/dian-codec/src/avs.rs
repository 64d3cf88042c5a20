//! AVS (GB/T 20090.2) 帧组装.
//!
//! AVS 的图像由图像头 (I 图像头 0xB3 或 PB 图像头 0xB6) 加随后的若干
//! 条带单元 (起始码 < 0xB0) 构成. 帧读取器把它们组装为一帧; 其余单元
//! (序列头、扩展等) 作为独立的非帧条目返回.

use log::debug;

use dian_core::{BitReader, DianError, DianResult};
use dian_format::{EsUnit, EsUnitReader};

/// I 图像起始码
pub const AVS_I_PICTURE: u8 = 0xB3;
/// PB 图像起始码
pub const AVS_PB_PICTURE: u8 = 0xB6;
/// 序列头起始码
pub const AVS_SEQ_HEADER: u8 = 0xB0;

/// AVS 图像类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvsPictureType {
    I,
    P,
    B,
    /// 保留或无法解析
    Unknown,
}

/// 从 PB 图像头提取图像类型
///
/// picture_coding_type 是 bbv_delay(16) 之后的 2 位, 即 `data[6]` 的
/// 高 2 位: 1=P, 2=B. 数据不足时无法解析.
pub fn pb_picture_type(unit: &EsUnit) -> AvsPictureType {
    if unit.data.len() < 7 {
        return AvsPictureType::Unknown;
    }
    match unit.data[6] >> 6 {
        1 => AvsPictureType::P,
        2 => AvsPictureType::B,
        _ => AvsPictureType::Unknown,
    }
}

/// 从序列头提取 frame_rate_code
///
/// 字段在序列头载荷中位于 profile_id(8) + level_id(8) 之后的
/// progressive_sequence(1)、宽高(28)、chroma_format(2)、
/// sample_precision(3)、aspect_ratio(4) 共 38 位之后, 宽 4 位.
pub fn seq_header_frame_rate_code(unit: &EsUnit) -> Option<u8> {
    if unit.start_code != AVS_SEQ_HEADER {
        return None;
    }
    let payload = unit.data.get(6..)?;
    let mut r = BitReader::new(payload);
    r.skip_bits(38).ok()?;
    let code = r.read_bits(4).ok()? as u8;
    Some(code)
}

/// frame_rate_code 对应的帧率
///
/// 保留值返回 None, 调用方保持原有估计不变.
pub fn frame_rate_from_code(code: u8) -> Option<f64> {
    match code {
        1 => Some(24000.0 / 1001.0),
        2 => Some(24.0),
        3 => Some(25.0),
        4 => Some(30000.0 / 1001.0),
        5 => Some(30.0),
        6 => Some(50.0),
        7 => Some(60000.0 / 1001.0),
        8 => Some(60.0),
        _ => None,
    }
}

/// 一个 AVS 条目: 一帧或一个独立单元
#[derive(Debug, Clone)]
pub enum AvsFrame {
    /// 完整的一帧 (图像头 + 条带)
    Frame {
        /// 图像类型
        picture_type: AvsPictureType,
        /// 该帧包含的 ES 单元数 (图像头 + 条带)
        unit_count: u64,
    },
    /// 不属于任何帧的独立单元
    Unit {
        /// 起始码
        start_code: u8,
        /// 序列头携带的 frame_rate_code
        frame_rate_code: Option<u8>,
    },
}

impl AvsFrame {
    /// 是否为一帧
    pub fn is_frame(&self) -> bool {
        matches!(self, Self::Frame { .. })
    }
}

/// AVS 帧读取器
///
/// 组装规则: 图像头开启一帧, 随后的条带单元 (< 0xB0) 归入该帧, 遇到
/// 下一个非条带单元时收帧并把该单元回推. 帧外的条带单元 (流开头的
/// 残帧) 作为独立单元返回.
pub struct AvsFrameReader {
    es: EsUnitReader,
    /// 回推的下一个单元
    pending: Option<EsUnit>,
    /// 已消耗的 ES 单元总数
    units_read: u64,
    /// 已组装的帧数
    frames_read: u64,
}

impl AvsFrameReader {
    /// 创建帧读取器
    pub fn new(es: EsUnitReader) -> Self {
        Self {
            es,
            pending: None,
            units_read: 0,
            frames_read: 0,
        }
    }

    fn fetch(&mut self) -> DianResult<EsUnit> {
        if let Some(u) = self.pending.take() {
            return Ok(u);
        }
        let u = self.es.next_unit()?;
        self.units_read += 1;
        Ok(u)
    }

    /// 读取下一帧或独立单元
    ///
    /// 输入耗尽时返回 `Err(DianError::Eof)`.
    pub fn next_frame(&mut self) -> DianResult<AvsFrame> {
        let first = self.fetch()?;

        match first.start_code {
            AVS_I_PICTURE | AVS_PB_PICTURE => {
                let picture_type = if first.start_code == AVS_I_PICTURE {
                    AvsPictureType::I
                } else {
                    pb_picture_type(&first)
                };

                let mut unit_count = 1u64;
                loop {
                    match self.fetch() {
                        Ok(u) if u.start_code < 0xB0 => unit_count += 1,
                        Ok(u) => {
                            self.pending = Some(u);
                            break;
                        }
                        Err(DianError::Eof) => break,
                        Err(e) => return Err(e),
                    }
                }

                self.frames_read += 1;
                Ok(AvsFrame::Frame {
                    picture_type,
                    unit_count,
                })
            }
            sc => {
                let frame_rate_code = seq_header_frame_rate_code(&first);
                if let Some(code) = frame_rate_code {
                    debug!("AVS 序列头: frame_rate_code={code}");
                }
                Ok(AvsFrame::Unit {
                    start_code: sc,
                    frame_rate_code,
                })
            }
        }
    }

    /// 已消耗的 ES 单元总数
    pub fn units_read(&self) -> u64 {
        self.units_read
    }

    /// 已组装的帧数
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

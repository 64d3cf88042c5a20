//! H.264 访问单元 (access unit) 组装.
//!
//! 一个访问单元对应一幅解码图像: 主图像的条带 NAL 加上前导的参数集、
//! SEI、AUD 等. 组装规则:
//! - first_mb_in_slice 为 0 的 VCL NAL 在已有条带之后出现时, 开启下一
//!   个访问单元 (该 NAL 回推);
//! - 条带之后的非 VCL NAL 同样属于下一个访问单元;
//! - 序列结束 (EndOfSeq) 收尾当前单元;
//! - 流结束 (EndOfStream) 收尾当前单元并置位 `end_of_stream`, 由调用
//!   方决定停止还是通过 [`AccessUnitReader::acknowledge_and_resume`]
//!   继续读后续拼接的流.

use dian_core::{DianError, DianResult};

use super::nal::{NalUnit, NalUnitReader, NalUnitType, SliceType};

/// 访问单元内条带类型的同质性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceHomogeneity {
    /// 全部为 I (含 SI)
    AllI,
    /// 全部为 P (含 SP)
    AllP,
    /// 全部为 B
    AllB,
    /// 混合或无条带
    Mixed,
}

/// 主图像描述
///
/// NAL 类型完整保留: 主图像可能是数据分区条带 (DPA), 分类时
/// 需要与 IDR / 非 IDR 区分.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryPicture {
    /// 首个条带 NAL 的 nal_ref_idc
    pub ref_idc: u8,
    /// 首个条带 NAL 的类型
    pub nal_type: NalUnitType,
}

/// 一个访问单元
#[derive(Debug, Clone)]
pub struct AccessUnit {
    /// 主图像 (没有条带的单元为 None)
    pub primary: Option<PrimaryPicture>,
    /// 条带类型同质性
    pub homogeneity: SliceHomogeneity,
    /// 本单元包含的 NAL 数
    pub nal_count: u64,
}

/// 访问单元读取器
pub struct AccessUnitReader {
    nals: NalUnitReader,
    /// 回推的下一个 NAL
    pending: Option<NalUnit>,
    /// 访问单元计数
    units_read: u64,
    /// 读到了流结束 NAL
    end_of_stream: bool,
    /// 输入已耗尽
    no_more_data: bool,
}

impl AccessUnitReader {
    /// 创建访问单元读取器
    pub fn new(nals: NalUnitReader) -> Self {
        Self {
            nals,
            pending: None,
            units_read: 0,
            end_of_stream: false,
            no_more_data: false,
        }
    }

    fn fetch(&mut self) -> DianResult<NalUnit> {
        if let Some(n) = self.pending.take() {
            return Ok(n);
        }
        self.nals.next_nal()
    }

    /// 读取下一个访问单元
    ///
    /// 输入耗尽且无未收尾的单元时返回 `Err(DianError::Eof)`.
    /// `end_of_stream` 置位期间同样返回 `Err(DianError::Eof)`, 直到
    /// 调用方确认继续.
    pub fn next_access_unit(&mut self) -> DianResult<AccessUnit> {
        if self.end_of_stream || (self.no_more_data && self.pending.is_none()) {
            return Err(DianError::Eof);
        }

        let mut nal_count = 0u64;
        let mut primary: Option<PrimaryPicture> = None;
        let mut first_class: Option<SliceType> = None;
        let mut mixed = false;
        let mut has_vcl = false;

        loop {
            let nal = match self.fetch() {
                Ok(n) => n,
                Err(DianError::Eof) => {
                    self.no_more_data = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            if nal.nal_type.is_vcl() {
                let info = nal.slice_info()?;
                if has_vcl && info.first_mb_in_slice == 0 {
                    // 新图像的第一个条带, 归下一个访问单元
                    self.pending = Some(nal);
                    break;
                }

                if primary.is_none() {
                    primary = Some(PrimaryPicture {
                        ref_idc: nal.ref_idc,
                        nal_type: nal.nal_type,
                    });
                }
                let class = info.slice_type.homogeneity_class();
                match first_class {
                    None => first_class = Some(class),
                    Some(c) if c != class => mixed = true,
                    _ => {}
                }
                has_vcl = true;
                nal_count += 1;
                continue;
            }

            match nal.nal_type {
                NalUnitType::EndOfSequence => {
                    nal_count += 1;
                    break;
                }
                NalUnitType::EndOfStream => {
                    nal_count += 1;
                    self.end_of_stream = true;
                    break;
                }
                _ if has_vcl => {
                    // 条带之后的参数集/SEI/AUD 属于下一个单元
                    self.pending = Some(nal);
                    break;
                }
                _ => nal_count += 1,
            }
        }

        if nal_count == 0 {
            return Err(DianError::Eof);
        }

        let homogeneity = if mixed {
            SliceHomogeneity::Mixed
        } else {
            match first_class {
                Some(SliceType::I) => SliceHomogeneity::AllI,
                Some(SliceType::P) => SliceHomogeneity::AllP,
                Some(SliceType::B) => SliceHomogeneity::AllB,
                _ => SliceHomogeneity::Mixed,
            }
        };

        self.units_read += 1;
        Ok(AccessUnit {
            primary,
            homogeneity,
            nal_count,
        })
    }

    /// 是否读到了流结束 NAL
    pub fn end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// 输入是否已耗尽
    pub fn no_more_data(&self) -> bool {
        self.no_more_data
    }

    /// 确认流结束并继续读取 (拼接流场景)
    ///
    /// 同时清除 `end_of_stream` 与 `no_more_data`.
    pub fn acknowledge_and_resume(&mut self) {
        self.end_of_stream = false;
        self.no_more_data = false;
    }

    /// 已读出的 NAL 总数
    pub fn nals_read(&self) -> u64 {
        self.nals.nals_read()
    }

    /// 已读出的访问单元数
    pub fn units_read(&self) -> u64 {
        self.units_read
    }
}

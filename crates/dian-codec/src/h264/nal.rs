//! H.264 NAL (Network Abstraction Layer) 单元解析.
//!
//! # NAL 头部 (1 字节)
//! ```text
//! ┌─────────────────────────────────────┐
//! │ forbidden(1) | ref_idc(2) | type(5) │
//! └─────────────────────────────────────┘
//! ```
//!
//! 点迹工具只需要头部字段与条带头开头的两个 ue(v) 字段
//! (first_mb_in_slice 和 slice_type), 不解析参数集.

use dian_core::{BitReader, DianError, DianResult};
use dian_format::EsUnitReader;

/// NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NalUnitType {
    /// 非 IDR 图像切片 (P/B slice)
    Slice,
    /// 数据分区 A (DPA)
    SliceDpa,
    /// 数据分区 B (DPB)
    SliceDpb,
    /// 数据分区 C (DPC)
    SliceDpc,
    /// IDR 图像切片 (关键帧)
    SliceIdr,
    /// 增补增强信息 (SEI)
    Sei,
    /// 序列参数集 (SPS)
    Sps,
    /// 图像参数集 (PPS)
    Pps,
    /// 访问单元分隔符 (AUD)
    Aud,
    /// 序列结束
    EndOfSequence,
    /// 流结束
    EndOfStream,
    /// 填充数据
    FillerData,
    /// 未知类型
    Unknown(u8),
}

impl NalUnitType {
    /// 从 NAL 类型编号创建
    pub fn from_type_id(type_id: u8) -> Self {
        match type_id {
            1 => Self::Slice,
            2 => Self::SliceDpa,
            3 => Self::SliceDpb,
            4 => Self::SliceDpc,
            5 => Self::SliceIdr,
            6 => Self::Sei,
            7 => Self::Sps,
            8 => Self::Pps,
            9 => Self::Aud,
            10 => Self::EndOfSequence,
            11 => Self::EndOfStream,
            12 => Self::FillerData,
            _ => Self::Unknown(type_id),
        }
    }

    /// 是否为 VCL (Video Coding Layer) NAL
    pub fn is_vcl(&self) -> bool {
        matches!(
            self,
            Self::Slice | Self::SliceDpa | Self::SliceDpb | Self::SliceDpc | Self::SliceIdr
        )
    }

    /// 是否为关键帧 (IDR)
    pub fn is_idr(&self) -> bool {
        matches!(self, Self::SliceIdr)
    }
}

impl std::fmt::Display for NalUnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slice => write!(f, "Slice"),
            Self::SliceDpa => write!(f, "SliceDPA"),
            Self::SliceDpb => write!(f, "SliceDPB"),
            Self::SliceDpc => write!(f, "SliceDPC"),
            Self::SliceIdr => write!(f, "IDR"),
            Self::Sei => write!(f, "SEI"),
            Self::Sps => write!(f, "SPS"),
            Self::Pps => write!(f, "PPS"),
            Self::Aud => write!(f, "AUD"),
            Self::EndOfSequence => write!(f, "EndOfSeq"),
            Self::EndOfStream => write!(f, "EndOfStream"),
            Self::FillerData => write!(f, "Filler"),
            Self::Unknown(id) => write!(f, "Unknown({id})"),
        }
    }
}

/// 条带类型 (slice_type 模 5 之后)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceType {
    P,
    B,
    I,
    Sp,
    Si,
}

impl SliceType {
    /// 按同质性归类: SP 归入 P, SI 归入 I
    pub fn homogeneity_class(&self) -> SliceType {
        match self {
            Self::Sp => Self::P,
            Self::Si => Self::I,
            other => *other,
        }
    }
}

/// 条带头开头的两个字段
#[derive(Debug, Clone, Copy)]
pub struct SliceInfo {
    /// first_mb_in_slice, 为 0 表示图像的第一个条带
    pub first_mb_in_slice: u32,
    /// 条带类型
    pub slice_type: SliceType,
}

/// 解析后的 NAL 单元
#[derive(Debug, Clone)]
pub struct NalUnit {
    /// NAL 单元类型
    pub nal_type: NalUnitType,
    /// nal_ref_idc (参考重要性, 0-3)
    pub ref_idc: u8,
    /// NAL 单元原始数据 (不含起始码, 含 NAL 头部字节)
    pub data: Vec<u8>,
}

impl NalUnit {
    /// 从 NAL 数据 (含头部字节) 解析
    pub fn parse(data: &[u8]) -> DianResult<Self> {
        if data.is_empty() {
            return Err(DianError::InvalidData("H.264: NAL 单元数据为空".into()));
        }

        let header = data[0];
        let forbidden = (header >> 7) & 1;
        if forbidden != 0 {
            return Err(DianError::InvalidData(format!(
                "H.264: forbidden_zero_bit 非法, value={forbidden}"
            )));
        }
        let ref_idc = (header >> 5) & 0x03;
        let type_id = header & 0x1F;

        Ok(Self {
            nal_type: NalUnitType::from_type_id(type_id),
            ref_idc,
            data: data.to_vec(),
        })
    }

    /// 获取 RBSP (Raw Byte Sequence Payload) 数据
    ///
    /// 移除 NAL 头部字节和 emulation prevention 字节 (0x03).
    pub fn rbsp(&self) -> Vec<u8> {
        remove_emulation_prevention(&self.data[1..])
    }

    /// 解析条带头开头的 first_mb_in_slice 和 slice_type
    ///
    /// 仅对 VCL NAL 有意义. slice_type 的 5-9 与 0-4 含义相同
    /// (模 5 归一): 0=P, 1=B, 2=I, 3=SP, 4=SI.
    pub fn slice_info(&self) -> DianResult<SliceInfo> {
        if !self.nal_type.is_vcl() {
            return Err(DianError::InvalidData(format!(
                "H.264: {} 不是 VCL NAL, 没有条带头",
                self.nal_type
            )));
        }

        let rbsp = self.rbsp();
        let mut r = BitReader::new(&rbsp);
        let first_mb_in_slice = r.read_ue()?;
        let slice_type_raw = r.read_ue()?;

        let slice_type = match slice_type_raw % 5 {
            0 => SliceType::P,
            1 => SliceType::B,
            2 => SliceType::I,
            3 => SliceType::Sp,
            _ => SliceType::Si,
        };

        Ok(SliceInfo {
            first_mb_in_slice,
            slice_type,
        })
    }
}

/// NAL 单元读取器
///
/// 每个 ES 单元对应一个 NAL: 单元的起始码字节就是 NAL 头.
pub struct NalUnitReader {
    es: EsUnitReader,
    nals_read: u64,
}

impl NalUnitReader {
    /// 创建 NAL 读取器
    pub fn new(es: EsUnitReader) -> Self {
        Self { es, nals_read: 0 }
    }

    /// 读取下一个 NAL 单元
    ///
    /// 输入耗尽时返回 `Err(DianError::Eof)`.
    pub fn next_nal(&mut self) -> DianResult<NalUnit> {
        let unit = self.es.next_unit()?;
        // data[3..] = NAL 头字节 (即起始码) + 载荷
        let nal = NalUnit::parse(&unit.data[3..])?;
        self.nals_read += 1;
        Ok(nal)
    }

    /// 已读出的 NAL 单元数
    pub fn nals_read(&self) -> u64 {
        self.nals_read
    }
}

/// 移除 emulation prevention 字节 (0x00 0x00 0x03 → 0x00 0x00)
fn remove_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut rbsp = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let is_emulation_prevention =
            i + 2 < data.len() && data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x03;
        if is_emulation_prevention {
            rbsp.push(0x00);
            rbsp.push(0x00);
            i += 3; // 跳过 0x03
        } else {
            rbsp.push(data[i]);
            i += 1;
        }
    }

    rbsp
}

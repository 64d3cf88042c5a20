//! 视频码流类型.

/// 基本流的编码标准
///
/// 三种码流族共用 `00 00 01` 起始码前缀, 但起始码取值与单元粒度不同:
/// H.262 与 AVS 按起始码直接分类, H.264 则以 NAL 单元为最小粒度.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoType {
    /// H.262 (MPEG-2 视频)
    H262,
    /// H.264 (MPEG-4/AVC)
    H264,
    /// AVS (GB/T 20090.2 视频)
    Avs,
}

impl std::fmt::Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::H262 => write!(f, "H.262"),
            Self::H264 => write!(f, "H.264"),
            Self::Avs => write!(f, "AVS"),
        }
    }
}

/// 报告粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// 聚合粒度: H.262 条目 / AVS 帧 / H.264 访问单元
    Aggregated,
    /// 原始 ES 单元粒度 (H.264 不支持)
    EsUnits,
}

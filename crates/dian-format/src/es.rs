//! 基本流 (ES) 单元扫描.
//!
//! H.262 / H.264 (Annex B) / AVS 共用 `00 00 01` 起始码前缀, 其后一个
//! 字节为起始码 (H.264 中即 NAL 头字节). 字节对齐的 `00 00 01` 在这
//! 三种码流中都不会出现在单元内部 (H.264 有防竞争字节保证), 因此扫描
//! 器只需要逐字节匹配前缀.

use log::debug;

use dian_core::{DianError, DianResult, VideoType};

use crate::io::ByteSource;

/// 一个 ES 单元
///
/// `data` 含 3 字节起始码前缀与起始码字节本身, 即 `data[4..]` 为单元
/// 载荷. 图像头字段的固定偏移提取 (如 H.262 的 picture_coding_type)
/// 依赖这一布局.
#[derive(Debug, Clone)]
pub struct EsUnit {
    /// 起始码 (前缀后的一个字节)
    pub start_code: u8,
    /// 原始数据 (含 `00 00 01` 前缀)
    pub data: Vec<u8>,
}

/// ES 单元读取器
///
/// 单遍前向扫描: 首个起始码之前的字节被丢弃, 每个单元延伸到下一个
/// 起始码前缀或输入末尾.
pub struct EsUnitReader {
    source: ByteSource,
    /// 已读出但尚未归属单元的下一个起始码
    pending_start: Option<u8>,
    /// 输入已耗尽
    exhausted: bool,
}

impl EsUnitReader {
    /// 创建 ES 单元读取器
    pub fn new(source: ByteSource) -> Self {
        Self {
            source,
            pending_start: None,
            exhausted: false,
        }
    }

    /// 读取下一个 ES 单元
    ///
    /// # 返回
    /// - `Ok(unit)`: 成功读取一个单元
    /// - `Err(DianError::Eof)`: 输入已耗尽
    pub fn next_unit(&mut self) -> DianResult<EsUnit> {
        if self.exhausted {
            return Err(DianError::Eof);
        }

        let start_code = match self.pending_start.take() {
            Some(sc) => sc,
            None => match self.scan_first_start_code() {
                Ok(sc) => sc,
                Err(DianError::Eof) => {
                    self.exhausted = true;
                    return Err(DianError::Eof);
                }
                Err(e) => return Err(e),
            },
        };

        let mut data = vec![0x00, 0x00, 0x01, start_code];

        loop {
            let b = match self.source.read_u8() {
                Ok(b) => b,
                Err(DianError::Eof) => {
                    // 末尾数据归属最后一个单元
                    self.exhausted = true;
                    break;
                }
                Err(e) => return Err(e),
            };
            data.push(b);

            // 窗口不覆盖本单元自身的前缀与起始码字节 (索引 0..4)
            let n = data.len();
            if n >= 7 && data[n - 3] == 0x00 && data[n - 2] == 0x00 && data[n - 1] == 0x01 {
                // 命中下一个起始码前缀
                match self.source.read_u8() {
                    Ok(sc) => {
                        data.truncate(n - 3);
                        self.pending_start = Some(sc);
                        break;
                    }
                    Err(DianError::Eof) => {
                        // 前缀被截断, 保留为末尾数据
                        self.exhausted = true;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(EsUnit { start_code, data })
    }

    /// 扫描到第一个起始码, 返回起始码字节
    fn scan_first_start_code(&mut self) -> DianResult<u8> {
        let mut zeros = 0usize;
        loop {
            let b = self.source.read_u8()?;
            match b {
                0x00 => zeros += 1,
                0x01 if zeros >= 2 => return self.source.read_u8(),
                _ => zeros = 0,
            }
        }
    }
}

/// 从流的开头字节探测视频类型
///
/// 只看第一个起始码: H.262 流通常以序列头 (0xB3) 或其他 0xB0 以上的
/// 码开头; H.264 流的首字节是 forbidden_zero_bit 为 0 的 NAL 头.
/// AVS 与 H.262 的起始码空间重叠, 无法自动区分, 需要调用方强制指定.
/// 探测失败时回落到 H.262.
pub fn probe_video_type(prefix: &[u8]) -> VideoType {
    for i in 0..prefix.len().saturating_sub(3) {
        if prefix[i] == 0x00 && prefix[i + 1] == 0x00 && prefix[i + 2] == 0x01 {
            let sc = prefix[i + 3];
            let guess = guess_from_start_code(sc);
            debug!("探测: 首个起始码 0x{sc:02X} → {guess}");
            return guess;
        }
    }
    debug!("探测: 未找到起始码, 回落到 H.262");
    VideoType::H262
}

/// 按单个起始码字节猜测码流类型
fn guess_from_start_code(sc: u8) -> VideoType {
    if sc >= 0xB0 {
        return VideoType::H262;
    }
    // NAL 头: forbidden(1) | ref_idc(2) | type(5)
    if sc & 0x80 == 0 {
        let nal_type = sc & 0x1F;
        if matches!(nal_type, 1 | 5 | 6 | 7 | 8 | 9) {
            return VideoType::H264;
        }
    }
    VideoType::H262
}

//! H.262 (MPEG-2 视频) 条目读取.
//!
//! H.262 粒度下一个"条目"就是一个 ES 单元; 图像头 (起始码 0x00) 额外
//! 解出 picture_coding_type, 供符号分类使用.

use dian_core::DianResult;
use dian_format::{EsUnit, EsUnitReader};

/// H.262 图像起始码
pub const H262_PICTURE_START: u8 = 0x00;

/// 图像编码类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum H262PictureCoding {
    /// 帧内编码 (I)
    I,
    /// 前向预测 (P)
    P,
    /// 双向预测 (B)
    B,
    /// 直流分量 (D, 仅 MPEG-1)
    D,
    /// 保留或非法值
    Invalid,
}

impl H262PictureCoding {
    /// 从 picture_coding_type 字段值创建
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::I,
            2 => Self::P,
            3 => Self::B,
            4 => Self::D,
            _ => Self::Invalid,
        }
    }
}

/// 从图像头单元提取 picture_coding_type
///
/// 字段位于 temporal_reference(10) 之后, 即 `data[5]` 的 bit 5..3.
/// 数据不足时按非法值处理.
pub fn picture_coding_of(unit: &EsUnit) -> H262PictureCoding {
    if unit.start_code != H262_PICTURE_START || unit.data.len() < 6 {
        return H262PictureCoding::Invalid;
    }
    H262PictureCoding::from_code((unit.data[5] & 0x38) >> 3)
}

/// 一个 H.262 条目
#[derive(Debug, Clone)]
pub struct H262Item {
    /// 对应的 ES 单元
    pub unit: EsUnit,
    /// 图像头的编码类型 (仅起始码 0x00)
    pub coding: Option<H262PictureCoding>,
}

impl H262Item {
    /// 是否为图像头
    pub fn is_picture(&self) -> bool {
        self.unit.start_code == H262_PICTURE_START
    }
}

/// H.262 条目读取器
pub struct H262ItemReader {
    es: EsUnitReader,
    items_read: u64,
}

impl H262ItemReader {
    /// 创建条目读取器
    pub fn new(es: EsUnitReader) -> Self {
        Self { es, items_read: 0 }
    }

    /// 读取下一个条目
    ///
    /// 输入耗尽时返回 `Err(DianError::Eof)`.
    pub fn next_item(&mut self) -> DianResult<H262Item> {
        let unit = self.es.next_unit()?;
        self.items_read += 1;

        let coding = if unit.start_code == H262_PICTURE_START {
            Some(picture_coding_of(&unit))
        } else {
            None
        };

        Ok(H262Item { unit, coding })
    }

    /// 已读出的条目数
    pub fn items_read(&self) -> u64 {
        self.items_read
    }
}

#[cfg(test)]
mod tests {
    use dian_core::DianError;
    use dian_format::ByteSource;

    use super::*;

    fn reader(data: &[u8]) -> H262ItemReader {
        H262ItemReader::new(EsUnitReader::new(ByteSource::from_data(data.to_vec())))
    }

    /// 构造图像头单元字节 (picture_coding_type 在 data[5] 的 bit 5..3)
    fn picture_bytes(coding_type: u8) -> Vec<u8> {
        vec![0x00, 0x00, 0x01, 0x00, 0x00, coding_type << 3]
    }

    #[test]
    fn test_图像编码类型提取() {
        for (code, expect) in [
            (1, H262PictureCoding::I),
            (2, H262PictureCoding::P),
            (3, H262PictureCoding::B),
            (4, H262PictureCoding::D),
            (0, H262PictureCoding::Invalid),
            (7, H262PictureCoding::Invalid),
        ] {
            let mut r = reader(&picture_bytes(code));
            let item = r.next_item().unwrap();
            assert!(item.is_picture());
            assert_eq!(item.coding, Some(expect));
        }
    }

    #[test]
    fn test_非图像单元无编码类型() {
        let data = [0x00, 0x00, 0x01, 0xB3, 0x12, 0x34];
        let mut r = reader(&data);
        let item = r.next_item().unwrap();
        assert!(!item.is_picture());
        assert_eq!(item.coding, None);
    }

    #[test]
    fn test_图像头数据不足按非法处理() {
        let data = [0x00, 0x00, 0x01, 0x00];
        let mut r = reader(&data);
        let item = r.next_item().unwrap();
        assert_eq!(item.coding, Some(H262PictureCoding::Invalid));
    }

    #[test]
    fn test_条目计数() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0x11]);
        data.extend_from_slice(&picture_bytes(1));
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB7]);

        let mut r = reader(&data);
        while r.next_item().is_ok() {}
        assert!(matches!(r.next_item(), Err(DianError::Eof)));
        assert_eq!(r.items_read(), 3);
    }
}

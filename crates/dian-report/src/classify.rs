//! 符号分类表.
//!
//! 把各码流的结构单位映射到单个输出符号. 所有函数都是纯函数,
//! 对任意输入总能给出确定的结果.

use dian_codec::avs::{pb_picture_type, AvsFrame, AvsPictureType};
use dian_codec::h262::{picture_coding_of, H262Item, H262PictureCoding, H262_PICTURE_START};
use dian_codec::h264::{AccessUnit, NalUnitType, SliceHomogeneity};
use dian_format::EsUnit;

/// 一个输出符号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dot {
    /// 单个 ASCII 字符
    Char(char),
    /// 无名起始码的转义形式, 渲染为 `<xx>` (小写十六进制)
    Code(u8),
}

impl std::fmt::Display for Dot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Code(sc) => write!(f, "<{sc:x}>"),
        }
    }
}

/// H.262 条目的符号
///
/// 条带 (0x01-0xAF) 在条目粒度下不产生符号.
pub fn classify_h262_item(item: &H262Item) -> Option<Dot> {
    let dot = match item.unit.start_code {
        H262_PICTURE_START => match item.coding {
            Some(H262PictureCoding::I) => Dot::Char('i'),
            Some(H262PictureCoding::P) => Dot::Char('p'),
            Some(H262PictureCoding::B) => Dot::Char('b'),
            Some(H262PictureCoding::D) => Dot::Char('d'),
            _ => Dot::Char('x'),
        },
        0x01..=0xAF => return None, // 条带不单独显示
        0xB0 | 0xB1 | 0xB6 => Dot::Char('R'), // 保留
        0xB2 => Dot::Char('U'),               // 用户数据
        0xB3 => Dot::Char('['),               // 序列头
        0xB4 => Dot::Char('X'),               // 序列错误
        0xB5 => Dot::Char('E'),               // 扩展起始
        0xB7 => Dot::Char(']'),               // 序列结束
        0xB8 => Dot::Char('>'),               // 图像组起始
        _ => Dot::Char('?'),
    };
    Some(dot)
}

/// H.262 原始 ES 单元的符号
///
/// 与条目粒度的区别: 条带显示为 `_`, 非法图像编码类型显示为 `!`.
pub fn classify_h262_es_unit(unit: &EsUnit) -> Dot {
    match unit.start_code {
        H262_PICTURE_START => match picture_coding_of(unit) {
            H262PictureCoding::I => Dot::Char('i'),
            H262PictureCoding::P => Dot::Char('p'),
            H262PictureCoding::B => Dot::Char('b'),
            H262PictureCoding::D => Dot::Char('d'),
            H262PictureCoding::Invalid => Dot::Char('!'),
        },
        0x01..=0xAF => Dot::Char('_'),
        0xB0 | 0xB1 | 0xB6 => Dot::Char('R'),
        0xB2 => Dot::Char('U'),
        0xB3 => Dot::Char('['),
        0xB4 => Dot::Char('X'),
        0xB5 => Dot::Char('E'),
        0xB7 => Dot::Char(']'),
        0xB8 => Dot::Char('>'),
        _ => Dot::Char('?'),
    }
}

/// AVS 帧或独立单元的符号
pub fn classify_avs_frame(frame: &AvsFrame) -> Dot {
    match frame {
        AvsFrame::Frame { picture_type, .. } => match picture_type {
            AvsPictureType::I => Dot::Char('i'),
            AvsPictureType::P => Dot::Char('p'),
            AvsPictureType::B => Dot::Char('b'),
            AvsPictureType::Unknown => Dot::Char('!'),
        },
        AvsFrame::Unit { start_code, .. } => match start_code {
            sc if *sc < 0xB0 => Dot::Char('_'), // 帧外条带
            0xB0 => Dot::Char('['),             // 序列头
            0xB1 => Dot::Char(']'),             // 序列结束
            0xB2 => Dot::Char('U'),             // 用户数据
            0xB5 => Dot::Char('E'),             // 扩展起始
            0xB7 => Dot::Char('V'),             // 视频编辑
            sc => Dot::Code(*sc),
        },
    }
}

/// AVS 原始 ES 单元的符号
///
/// 与帧粒度的区别: 无名起始码显示为普通 `?` 而非 `<xx>` 转义.
pub fn classify_avs_es_unit(unit: &EsUnit) -> Dot {
    match unit.start_code {
        0xB3 => Dot::Char('i'),
        0xB6 => match pb_picture_type(unit) {
            AvsPictureType::P => Dot::Char('p'),
            AvsPictureType::B => Dot::Char('b'),
            _ => Dot::Char('!'),
        },
        0xB0 => Dot::Char('['),
        0xB1 => Dot::Char(']'),
        0xB2 => Dot::Char('U'),
        0xB5 => Dot::Char('E'),
        0xB7 => Dot::Char('V'),
        sc if sc < 0xB0 => Dot::Char('_'),
        _ => Dot::Char('?'),
    }
}

/// H.264 访问单元的符号
///
/// 判定次序固定: 无主图像, 非参考图像, IDR, 非 IDR, 其他.
pub fn classify_access_unit(au: &AccessUnit) -> Dot {
    let Some(primary) = au.primary else {
        return Dot::Char('_');
    };

    if primary.ref_idc == 0 {
        return match au.homogeneity {
            SliceHomogeneity::AllI => Dot::Char('i'),
            SliceHomogeneity::AllP => Dot::Char('p'),
            SliceHomogeneity::AllB => Dot::Char('b'),
            SliceHomogeneity::Mixed => Dot::Char('x'),
        };
    }

    match primary.nal_type {
        NalUnitType::SliceIdr => match au.homogeneity {
            SliceHomogeneity::AllI => Dot::Char('D'),
            _ => Dot::Char('d'),
        },
        NalUnitType::Slice => match au.homogeneity {
            SliceHomogeneity::AllI => Dot::Char('I'),
            SliceHomogeneity::AllP => Dot::Char('P'),
            SliceHomogeneity::AllB => Dot::Char('B'),
            SliceHomogeneity::Mixed => Dot::Char('X'),
        },
        // 主图像是数据分区等其他 VCL 类型
        _ => Dot::Char('?'),
    }
}

//! 点迹报告循环.
//!
//! 四种粒度各一个循环, 都泛化在 `io::Write` 上: 每输出一个符号立即
//! flush, 使管道下游能实时看到进度. 源返回 `Eof` 是正常收尾, 其他
//! 错误向上传播.

use std::io::Write;

use dian_core::{DianError, DianResult, VideoType};
use dian_format::EsUnitReader;

use dian_codec::avs::{AvsFrame, AvsFrameReader};
use dian_codec::h262::H262ItemReader;
use dian_codec::h264::AccessUnitReader;

use crate::classify::{
    classify_access_unit, classify_avs_es_unit, classify_avs_frame, classify_h262_es_unit,
    classify_h262_item,
};
use crate::state::{minute_line, StreamCursor};

/// 报告循环的公共选项
#[derive(Debug, Clone, Copy, Default)]
pub struct DotsOptions {
    /// 读取上限, 0 表示不限
    pub max: u64,
    /// 输出前打印符号说明
    pub verbose: bool,
    /// 遇到流结束 NAL 时打印 `#` 并继续 (仅 H.264)
    pub hash_eos: bool,
}

fn plural(n: u64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

const H262_LEGEND: &str = "\n\
Each character represents a single H.262 item\n\
Pictures are represented according to their picture coding\n\
type, and the slices within a picture are not shown.\n\
\x20   i means an I picture\n\
\x20   p means a  P picture\n\
\x20   b means a  B picture\n\
\x20   d means a  D picture (these should not occur in MPEG-2)\n\
\x20   x means some other picture (such should not occur)\n\
Other items are represented as follows:\n\
\x20   [ means a  Sequence header\n\
\x20   > means a  Group Start header\n\
\x20   E means an Extension start header\n\
\x20   U means a  User data header\n\
\x20   X means a  Sequence Error\n\
\x20   ] means a  Sequence End\n\
\x20   R means a  Reserved item\n\
\x20   ? means something else. This may indicate that the stream\n\
\x20     is not an ES representing H.262 (it might, for instance\n\
\x20     be PES)\n\
\n";

/// H.262 条目粒度的点迹
pub fn report_h262_dots<W: Write>(
    out: &mut W,
    items: &mut H262ItemReader,
    opts: &DotsOptions,
) -> DianResult<()> {
    if opts.verbose {
        write!(out, "{H262_LEGEND}")?;
    }

    let mut cursor = StreamCursor::new();

    loop {
        let item = match items.next_item() {
            Ok(item) => item,
            Err(DianError::Eof) => break,
            Err(e) => return Err(e),
        };
        cursor.units_read += 1;

        if item.is_picture() {
            if let Some(minutes) = cursor.note_h262_picture() {
                write!(out, "{}", minute_line(minutes))?;
            }
        }

        if let Some(dot) = classify_h262_item(&item) {
            write!(out, "{dot}")?;
            out.flush()?;
        }

        if opts.max > 0 && cursor.units_read >= opts.max {
            write!(
                out,
                "\nStopping because {} items have been read\n",
                cursor.units_read
            )?;
            break;
        }
    }

    write!(
        out,
        "\nFound {} MPEG2 item{}\n",
        cursor.units_read,
        plural(cursor.units_read)
    )?;
    Ok(())
}

const AVS_LEGEND: &str = "\n\
Each character represents a single AVS item\n\
Frames are represented according to their picture coding\n\
type, and the slices within a frame are not shown.\n\
\x20   i means an I frame\n\
\x20   p means a  P frame\n\
\x20   b means a  B frame\n\
\x20   _ means a (stray) slice, normally only at the start of a stream\n\
\x20   ! means something else (this should not be possible)\n\
Other items are represented as follows:\n\
\x20   [ means a  Sequence header\n\
\x20   E means an Extension start header\n\
\x20   U means a  User data header\n\
\x20   ] means a  Sequence End\n\
\x20   V means a  Video edit item\n\
\x20   ? means something else. This may indicate that the stream\n\
\x20     is not an ES representing AVS (it might, for instance\n\
\x20     be PES)\n\
\n";

/// AVS 帧粒度的点迹
pub fn report_avs_dots<W: Write>(
    out: &mut W,
    frames: &mut AvsFrameReader,
    opts: &DotsOptions,
) -> DianResult<()> {
    if opts.verbose {
        write!(out, "{AVS_LEGEND}")?;
    }

    let mut cursor = StreamCursor::new();

    loop {
        let frame = match frames.next_frame() {
            Ok(f) => f,
            Err(DianError::Eof) => break,
            Err(e) => return Err(e),
        };
        cursor.units_read += 1;

        // 序列头先更新帧率估计, 再输出符号
        if let AvsFrame::Unit {
            frame_rate_code: Some(code),
            ..
        } = &frame
        {
            cursor.update_frame_rate(*code);
        }

        write!(out, "{}", classify_avs_frame(&frame))?;

        // 粗略的时间标记, 假定帧率恒定; 分钟行在帧符号之后
        if frame.is_frame() {
            if let Some(minutes) = cursor.note_avs_frame() {
                write!(out, "{}", minute_line(minutes))?;
            }
        }
        out.flush()?;

        if opts.max > 0 && cursor.frames_read >= opts.max {
            write!(
                out,
                "\nStopping because {} frames have been read\n",
                cursor.frames_read
            )?;
            break;
        }
    }

    write!(
        out,
        "\nFound {} frame{} in {} AVS item{}\n",
        cursor.frames_read,
        plural(cursor.frames_read),
        cursor.units_read,
        plural(cursor.units_read)
    )?;
    Ok(())
}

const H264_LEGEND: &str = "\n\
Each character represents a single access unit\n\
\n\
\x20   D       means an IDR.\n\
\x20   d       means an IDR that is not all I slices.\n\
\x20   I, P, B means all slices of the primary picture are I, P or B,\n\
\x20           and this is a reference picture.\n\
\x20   i, p, b means all slices of the primary picture are I, P or B,\n\
\x20           and this is NOT a reference picture.\n\
\x20   X or x  means that not all slices are of the same type.\n\
\x20   ?       means some other type of access unit.\n\
\x20   _       means that the access unit doesn't contain a primary picture.\n\
\n\
If --hash-eos was specified:\n\
\x20   # means an EOS (end-of-stream) NAL unit.\n\
\n";

/// H.264 访问单元粒度的点迹
pub fn report_access_unit_dots<W: Write>(
    out: &mut W,
    units: &mut AccessUnitReader,
    opts: &DotsOptions,
) -> DianResult<()> {
    if opts.verbose {
        write!(out, "{H264_LEGEND}")?;
    }

    loop {
        let au = match units.next_access_unit() {
            Ok(au) => au,
            Err(DianError::Eof) => break,
            Err(e) => return Err(e),
        };

        write!(out, "{}", classify_access_unit(&au))?;
        out.flush()?;

        // 逻辑流是否在该访问单元之后结束?
        if units.end_of_stream() {
            if opts.hash_eos {
                write!(out, "#")?;
                out.flush()?;
                units.acknowledge_and_resume();
            } else {
                write!(out, "\nStopping because found end-of-stream NAL unit\n")?;
                break;
            }
        }

        if opts.max > 0 && units.nals_read() >= opts.max {
            write!(
                out,
                "\nStopping because {} NAL units have been read\n",
                units.nals_read()
            )?;
            break;
        }
    }

    write!(
        out,
        "\nFound {} NAL unit{} in {} access unit{}\n",
        units.nals_read(),
        plural(units.nals_read()),
        units.units_read(),
        plural(units.units_read())
    )?;
    Ok(())
}

const ES_LEGEND_HEAD: &str = "\nEach character represents a single ES unit\n";

const ES_LEGEND_H262: &str = "\
Pictures are represented according to their picture coding\n\
type, and the slices within a picture are not shown.\n\
\x20   i means an I picture\n\
\x20   p means a  P picture\n\
\x20   b means a  B picture\n\
\x20   d means a  D picture (these should not occur in MPEG-2)\n\
\x20   ! means some other picture (such should not occur)\n\
Other items are represented as follows:\n\
\x20   [ means a  Sequence header\n\
\x20   > means a  Group Start header\n\
\x20   E means an Extension start header\n\
\x20   U means a  User data header\n\
\x20   X means a  Sequence Error\n\
\x20   ] means a  Sequence End\n\
\x20   R means a  Reserved item\n";

const ES_LEGEND_AVS: &str = "\
Frames are represented according to their picture coding\n\
type, and the slices within a frame are not shown.\n\
\x20   i means an I frame\n\
\x20   p means a  P frame\n\
\x20   b means a  B frame\n\
\x20   _ means a slice\n\
\x20   ! means something else (this should not be possible)\n\
Other items are represented as follows:\n\
\x20   [ means a  Sequence header\n\
\x20   E means an Extension start header\n\
\x20   U means a  User data header\n\
\x20   ] means a  Sequence End\n\
\x20   V means a  Video edit item\n";

/// 原始 ES 单元粒度的点迹 (H.262 与 AVS)
///
/// H.264 在这一粒度不受支持, 由调度层在进入循环前拒绝.
pub fn report_es_unit_dots<W: Write>(
    out: &mut W,
    video_type: VideoType,
    es: &mut EsUnitReader,
    opts: &DotsOptions,
) -> DianResult<()> {
    if video_type == VideoType::H264 {
        return Err(DianError::Unsupported(
            "ES 单元粒度不支持 H.264".into(),
        ));
    }

    if opts.verbose {
        let body = match video_type {
            VideoType::H262 => ES_LEGEND_H262,
            _ => ES_LEGEND_AVS,
        };
        write!(
            out,
            "{ES_LEGEND_HEAD}{body}\
\x20   ? means something else. This may indicate that the stream\n\
\x20     is not an ES representing {video_type} (it might, for instance\n\
\x20     be PES)\n\n"
        )?;
    }

    let mut count = 0u64;

    loop {
        let unit = match es.next_unit() {
            Ok(u) => u,
            Err(DianError::Eof) => break,
            Err(e) => return Err(e),
        };

        let dot = match video_type {
            VideoType::H262 => classify_h262_es_unit(&unit),
            _ => classify_avs_es_unit(&unit),
        };
        write!(out, "{dot}")?;
        out.flush()?;
        count += 1;

        if opts.max > 0 && count >= opts.max {
            write!(out, "\nStopping because {count} ES units have been read\n")?;
            break;
        }
    }

    write!(out, "\nFound {count} ES unit{}\n", plural(count))?;
    Ok(())
}

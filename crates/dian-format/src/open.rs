//! 输入打开与码流类型探测.

use log::info;

use dian_core::{DianResult, VideoType};

use crate::es::{probe_video_type, EsUnitReader};
use crate::io::ByteSource;
use crate::ts::TsByteSource;

/// 探测时读取的开头字节数
const PROBE_PREFIX_LEN: usize = 1024;

/// 输入来源
#[derive(Debug, Clone)]
pub enum InputSpec {
    /// 文件路径
    File(String),
    /// 标准输入
    Stdin,
}

/// 打开后的 ES 输入
pub struct EsInput {
    /// 探测或强制指定的码流类型
    pub video_type: VideoType,
    /// ES 单元读取器
    pub reader: EsUnitReader,
}

/// 打开输入并确定码流类型
///
/// `wrap_ts` 为真时先经过 TS 前端还原视频 ES. `forced` 给定时跳过
/// 探测; 否则从开头字节的第一个起始码猜测 (AVS 与 H.262 无法自动
/// 区分, 只能强制指定).
pub fn open_input(
    spec: &InputSpec,
    wrap_ts: bool,
    forced: Option<VideoType>,
) -> DianResult<EsInput> {
    let raw: Box<dyn std::io::Read + Send> = match spec {
        InputSpec::File(path) => Box::new(std::fs::File::open(path)?),
        InputSpec::Stdin => Box::new(std::io::stdin()),
    };

    let mut source = if wrap_ts {
        ByteSource::new(Box::new(TsByteSource::new(raw)))
    } else {
        ByteSource::new(raw)
    };

    let video_type = match forced {
        Some(t) => t,
        None => {
            let prefix = source.probe_prefix(PROBE_PREFIX_LEN)?;
            probe_video_type(prefix)
        }
    };
    info!("输入码流类型: {video_type}");

    Ok(EsInput {
        video_type,
        reader: EsUnitReader::new(source),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_打开文件并探测() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0x00, 0x00, 0x01, 0xB3, 0x12, 0x34]).unwrap();

        let spec = InputSpec::File(f.path().to_string_lossy().into_owned());
        let mut input = open_input(&spec, false, None).unwrap();
        assert_eq!(input.video_type, VideoType::H262);

        // 探测不消耗数据
        let u = input.reader.next_unit().unwrap();
        assert_eq!(u.start_code, 0xB3);
        assert_eq!(u.data, vec![0x00, 0x00, 0x01, 0xB3, 0x12, 0x34]);
    }

    #[test]
    fn test_强制类型跳过探测() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0x00, 0x00, 0x01, 0xB3]).unwrap();

        let spec = InputSpec::File(f.path().to_string_lossy().into_owned());
        let input = open_input(&spec, false, Some(VideoType::Avs)).unwrap();
        assert_eq!(input.video_type, VideoType::Avs);
    }

    #[test]
    fn test_文件不存在() {
        let spec = InputSpec::File("/no/such/dian/input".into());
        assert!(open_input(&spec, false, None).is_err());
    }
}

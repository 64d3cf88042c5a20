//! 端到端点迹管道测试: 合成码流写入临时文件, 走打开/探测/报告全流程.

use std::io::Write;

use dian::core::{Granularity, VideoType};
use dian::format::{open_input, InputSpec};
use dian::report::{run_dots, DotsOptions, DotsRequest};

fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(data).unwrap();
    f
}

fn run_pipeline(
    data: &[u8],
    forced: Option<VideoType>,
    granularity: Granularity,
    options: DotsOptions,
) -> String {
    let f = write_temp(data);
    let spec = InputSpec::File(f.path().to_string_lossy().into_owned());
    let input = open_input(&spec, false, forced).unwrap();

    let mut out = Vec::new();
    run_dots(&mut out, input, &DotsRequest { granularity, options }).unwrap();
    String::from_utf8(out).unwrap()
}

fn h262_picture(coding_type: u8) -> Vec<u8> {
    vec![0x00, 0x00, 0x01, 0x00, 0x00, coding_type << 3]
}

#[test]
fn test_h262_探测并输出点迹() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0x12]); // 序列头
    data.extend(h262_picture(1));
    data.extend(h262_picture(2));
    data.extend(h262_picture(3));
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB7]); // 序列结束

    let text = run_pipeline(&data, None, Granularity::Aggregated, DotsOptions::default());
    assert_eq!(text, "[\n0 minutes\nipb]\nFound 5 MPEG2 items\n");
}

#[test]
fn test_h262_每_1500_幅图像一条分钟线() {
    let mut data = Vec::new();
    for _ in 0..1501 {
        data.extend(h262_picture(2));
    }

    let text = run_pipeline(&data, None, Granularity::Aggregated, DotsOptions::default());
    let expected = format!(
        "\n0 minutes\n{}\n1 minute\np\nFound 1501 MPEG2 items\n",
        "p".repeat(1500)
    );
    assert_eq!(text, expected);
}

#[test]
fn test_h262_上限精确为_max() {
    let mut data = Vec::new();
    for _ in 0..10 {
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB2, 0x55]);
    }

    let options = DotsOptions {
        max: 3,
        ..Default::default()
    };
    let text = run_pipeline(&data, None, Granularity::Aggregated, options);
    assert_eq!(
        text,
        "UUU\nStopping because 3 items have been read\n\nFound 3 MPEG2 items\n"
    );
}

/// 编码一个小值的 ue(v)
fn ue_bits(v: u32) -> Vec<bool> {
    let code = v + 1;
    let len = 32 - code.leading_zeros() as usize;
    let mut bits = vec![false; len - 1];
    for i in (0..len).rev() {
        bits.push((code >> i) & 1 == 1);
    }
    bits
}

fn slice_unit(header: u8, first_mb: u32, slice_type: u32) -> Vec<u8> {
    let mut bits = ue_bits(first_mb);
    bits.extend(ue_bits(slice_type));
    bits.push(true);

    let mut out = vec![0x00, 0x00, 0x01, header];
    for chunk in bits.chunks(8) {
        let mut b = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                b |= 1 << (7 - i);
            }
        }
        out.push(b);
    }
    out
}

#[test]
fn test_h264_探测并输出点迹() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x67, 0x42, 0x00]); // SPS, 探测为 H.264
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x68, 0xCE]); // PPS
    data.extend(slice_unit(0x65, 0, 2)); // IDR
    data.extend(slice_unit(0x41, 0, 0)); // 参考 P
    data.extend(slice_unit(0x01, 0, 1)); // 非参考 B

    let text = run_pipeline(&data, None, Granularity::Aggregated, DotsOptions::default());
    assert_eq!(text, "DPb\nFound 5 NAL units in 3 access units\n");
}

#[test]
fn test_h264_流结束的井号续读() {
    // 两段拼接的流, 各自以 EndOfStream 结束
    let mut data = Vec::new();
    data.extend(slice_unit(0x65, 0, 2));
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x0B]); // EOS
    data.extend(slice_unit(0x65, 0, 2));
    data.extend(slice_unit(0x41, 0, 0));
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x0B]); // EOS

    let options = DotsOptions {
        hash_eos: true,
        ..Default::default()
    };
    let text = run_pipeline(&data, None, Granularity::Aggregated, options);
    assert_eq!(text, "D#DP#\nFound 5 NAL units in 3 access units\n");
}

#[test]
fn test_h264_流结束默认停止() {
    let mut data = Vec::new();
    data.extend(slice_unit(0x65, 0, 2));
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x0B]); // EOS
    data.extend(slice_unit(0x65, 0, 2)); // 不应读到

    let text = run_pipeline(&data, None, Granularity::Aggregated, DotsOptions::default());
    assert_eq!(
        text,
        "D\nStopping because found end-of-stream NAL unit\n\nFound 2 NAL units in 1 access unit\n"
    );
}

fn avs_seq_header(frame_rate_code: u8) -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x01, 0xB0, 0x48, 0x40];
    let mut payload = [0u8; 6];
    payload[4] = (frame_rate_code >> 2) & 0x03;
    payload[5] = (frame_rate_code & 0x03) << 6;
    data.extend_from_slice(&payload);
    data
}

#[test]
fn test_avs_必须强制指定() {
    let mut data = Vec::new();
    data.extend(avs_seq_header(3));
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0xAA]); // I 图像头
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x11]); // 条带
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB6, 0x00, 0x00, 0x40]); // P 图像头
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB1]); // 序列结束

    // 不强制时按起始码被探测为 H.262
    let f = write_temp(&data);
    let spec = InputSpec::File(f.path().to_string_lossy().into_owned());
    let input = open_input(&spec, false, None).unwrap();
    assert_eq!(input.video_type, VideoType::H262);

    // 强制 AVS 后得到帧粒度的点迹
    let text = run_pipeline(
        &data,
        Some(VideoType::Avs),
        Granularity::Aggregated,
        DotsOptions::default(),
    );
    assert_eq!(text, "[ip]\nFound 2 frames in 4 AVS items\n");
}

#[test]
fn test_avs_50fps_分钟线在第_3000_帧() {
    // 触发周期取序列头的 50 fps, 显示值仍按 25 fps 折算
    let mut data = Vec::new();
    data.extend(avs_seq_header(6)); // 50 fps
    for _ in 0..3000 {
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0xAA]);
    }

    let text = run_pipeline(
        &data,
        Some(VideoType::Avs),
        Granularity::Aggregated,
        DotsOptions::default(),
    );
    let expected = format!(
        "[{}\n2 minutes\n\nFound 3000 frames in 3001 AVS items\n",
        "i".repeat(3000)
    );
    assert_eq!(text, expected);
    // 第 1500 帧处没有分钟线
    assert!(!text.contains("\n1 minute\n"));
}

#[test]
fn test_es_粒度全流程() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0x12]);
    data.extend(h262_picture(1));
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x01, 0xAA]); // 条带, ES 粒度下可见
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB7]);

    let text = run_pipeline(&data, None, Granularity::EsUnits, DotsOptions::default());
    assert_eq!(text, "[i_]\nFound 4 ES units\n");
}

#[test]
fn test_h264_es_粒度被拒绝() {
    let data = [0x00, 0x00, 0x01, 0x67, 0x42];
    let f = write_temp(&data);
    let spec = InputSpec::File(f.path().to_string_lossy().into_owned());
    let input = open_input(&spec, false, None).unwrap();
    assert_eq!(input.video_type, VideoType::H264);

    let mut out = Vec::new();
    let err = run_dots(
        &mut out,
        input,
        &DotsRequest {
            granularity: Granularity::EsUnits,
            options: DotsOptions::default(),
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("不支持"));
    assert!(out.is_empty());
}

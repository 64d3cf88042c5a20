//! TS 容器抽取管道测试: 合成 PAT/PMT/PES 传输流, 经 --ts 路径还原
//! 视频 ES 并产出点迹.

use std::io::Write;

use dian::core::{Granularity, VideoType};
use dian::format::{open_input, InputSpec};
use dian::report::{run_dots, DotsOptions, DotsRequest};

const TS_PACKET_SIZE: usize = 188;

fn build_ts_packet(pid: u16, pusi: bool, payload: &[u8]) -> [u8; TS_PACKET_SIZE] {
    let mut pkt = [0xFFu8; TS_PACKET_SIZE];
    pkt[0] = 0x47;
    pkt[1] = if pusi { 0x40 } else { 0x00 } | ((pid >> 8) as u8 & 0x1F);
    pkt[2] = pid as u8;
    pkt[3] = 0x10; // payload only

    let copy_len = payload.len().min(TS_PACKET_SIZE - 4);
    pkt[4..4 + copy_len].copy_from_slice(&payload[..copy_len]);
    pkt
}

fn build_pat(pmt_pid: u16) -> [u8; TS_PACKET_SIZE] {
    let mut section = vec![
        0x00, // pointer_field
        0x00, // table_id
        0xB0, 13, // section_length
        0x00, 0x01, // transport_stream_id
        0xC1, 0x00, 0x00,
    ];
    section.extend_from_slice(&[0x00, 0x01]); // program_number = 1
    section.push(0xE0 | ((pmt_pid >> 8) as u8 & 0x1F));
    section.push(pmt_pid as u8);
    section.extend_from_slice(&[0x00; 4]); // CRC32 占位

    build_ts_packet(0x0000, true, &section)
}

fn build_pmt(pmt_pid: u16, entries: &[(u8, u16)]) -> [u8; TS_PACKET_SIZE] {
    let section_length = 9 + entries.len() * 5 + 4;
    let mut section = vec![
        0x00, // pointer_field
        0x02, // table_id
        0xB0 | ((section_length >> 8) as u8 & 0x0F),
        section_length as u8,
        0x00,
        0x01, // program_number
        0xC1,
        0x00,
        0x00,
    ];
    let pcr_pid = entries.first().map_or(0x1FFF, |e| e.1);
    section.push(0xE0 | ((pcr_pid >> 8) as u8 & 0x1F));
    section.push(pcr_pid as u8);
    section.extend_from_slice(&[0xF0, 0x00]); // program_info_length = 0

    for &(stream_type, es_pid) in entries {
        section.push(stream_type);
        section.push(0xE0 | ((es_pid >> 8) as u8 & 0x1F));
        section.push(es_pid as u8);
        section.extend_from_slice(&[0xF0, 0x00]);
    }
    section.extend_from_slice(&[0x00; 4]); // CRC32 占位

    build_ts_packet(pmt_pid, true, &section)
}

fn build_pes(stream_id: u8, data: &[u8]) -> Vec<u8> {
    let mut pes = vec![0x00, 0x00, 0x01, stream_id];
    let pes_length = 3 + data.len();
    pes.push((pes_length >> 8) as u8);
    pes.push(pes_length as u8);
    pes.push(0x80); // '10' 标志位
    pes.push(0x00); // 无 PTS/DTS
    pes.push(0x00); // PES_header_data_length = 0
    pes.extend_from_slice(data);
    pes
}

fn run_ts_pipeline(ts: &[u8], forced: Option<VideoType>) -> (VideoType, String) {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(ts).unwrap();

    let spec = InputSpec::File(f.path().to_string_lossy().into_owned());
    let input = open_input(&spec, true, forced).unwrap();
    let video_type = input.video_type;

    let mut out = Vec::new();
    run_dots(
        &mut out,
        input,
        &DotsRequest {
            granularity: Granularity::Aggregated,
            options: DotsOptions::default(),
        },
    )
    .unwrap();
    (video_type, String::from_utf8(out).unwrap())
}

#[test]
fn test_ts_抽取_h262_并探测() {
    let pmt_pid = 0x100;
    let video_pid = 0x101;

    // ES: 序列头 + I 图像 + 序列结束
    let mut es = Vec::new();
    es.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0x12]);
    es.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x00, 1 << 3]);
    es.extend_from_slice(&[0x00, 0x00, 0x01, 0xB7]);

    let mut ts = Vec::new();
    ts.extend_from_slice(&build_pat(pmt_pid));
    ts.extend_from_slice(&build_pmt(pmt_pid, &[(0x02, video_pid)]));
    ts.extend_from_slice(&build_ts_packet(video_pid, true, &build_pes(0xE0, &es)));

    let (video_type, text) = run_ts_pipeline(&ts, None);
    assert_eq!(video_type, VideoType::H262);
    // 包尾的 0xFF 填充归入最后一个单元, 不产生额外符号
    assert_eq!(text, "[\n0 minutes\ni]\nFound 3 MPEG2 items\n");
}

#[test]
fn test_ts_跳过音频选中视频流() {
    let pmt_pid = 0x100;
    let audio_pid = 0x102;
    let video_pid = 0x103;

    let mut es = Vec::new();
    es.extend_from_slice(&[0x00, 0x00, 0x01, 0x67, 0x42]); // SPS

    let mut ts = Vec::new();
    ts.extend_from_slice(&build_pat(pmt_pid));
    ts.extend_from_slice(&build_pmt(
        pmt_pid,
        &[(0x0F, audio_pid), (0x1B, video_pid)],
    ));
    ts.extend_from_slice(&build_ts_packet(
        audio_pid,
        true,
        &build_pes(0xC0, &[0xCA, 0xFE]),
    ));
    ts.extend_from_slice(&build_ts_packet(video_pid, true, &build_pes(0xE0, &es)));

    let (video_type, text) = run_ts_pipeline(&ts, None);
    assert_eq!(video_type, VideoType::H264);
    assert_eq!(text, "_\nFound 1 NAL unit in 1 access unit\n");
}

#[test]
fn test_ts_跨包拼接的_es() {
    let pmt_pid = 0x100;
    let video_pid = 0x101;

    // 一个横跨两个 TS 包的 PES: 第一包装不下全部 ES
    let mut es = Vec::new();
    es.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3]);
    es.extend(std::iter::repeat_n(0x55u8, 200)); // 序列头的长载荷
    es.extend_from_slice(&[0x00, 0x00, 0x01, 0xB7]);

    let pes = build_pes(0xE0, &es);
    let (first, rest) = pes.split_at(TS_PACKET_SIZE - 4);

    let mut ts = Vec::new();
    ts.extend_from_slice(&build_pat(pmt_pid));
    ts.extend_from_slice(&build_pmt(pmt_pid, &[(0x02, video_pid)]));
    ts.extend_from_slice(&build_ts_packet(video_pid, true, first));
    ts.extend_from_slice(&build_ts_packet(video_pid, false, rest));

    let (_, text) = run_ts_pipeline(&ts, None);
    assert_eq!(text, "[]\nFound 2 MPEG2 items\n");
}

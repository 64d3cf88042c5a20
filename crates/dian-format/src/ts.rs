//! MPEG-TS 容器前端.
//!
//! 把一个传输流还原成视频基本流的字节序列: 同步到 188 字节包边界,
//! 解析 PAT → PMT 选出第一条视频流, 在 PUSI 处剥掉 PES 头部, 把载荷
//! 按序拼接. 点迹工具不关心时间戳, PTS/DTS 字段只用于确定头部长度.
//!
//! # TS 包结构 (188 字节)
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ 同步字节 (0x47)                    1 byte│
//! │ TEI(1) + PUSI(1) + Priority(1) +         │
//! │   PID(13)                         2 bytes│
//! │ TSC(2) + AFC(2) + CC(4)           1 byte │
//! │ [Adaptation Field]                可变   │
//! │ [Payload]                         可变   │
//! └──────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::io::{self, Read};

use log::debug;

/// TS 包大小
const TS_PACKET_SIZE: usize = 188;
/// TS 同步字节
const TS_SYNC_BYTE: u8 = 0x47;
/// PAT PID
const PID_PAT: u16 = 0x0000;
/// 空包 PID
const PID_NULL: u16 = 0x1FFF;

/// PMT stream_type 是否为本工具认识的视频流
///
/// 0x01/0x02 = MPEG-1/2 视频, 0x1B = H.264, 0x42 = AVS.
fn is_video_stream_type(stream_type: u8) -> bool {
    matches!(stream_type, 0x01 | 0x02 | 0x1B | 0x42)
}

/// TS → 视频 ES 字节源
///
/// 实现 `io::Read`: 读出的内容就是所选视频流的 ES 字节.
pub struct TsByteSource {
    inner: Box<dyn Read + Send>,
    /// 是否已同步到包边界
    synced: bool,
    /// PMT PID (从 PAT 获取, 0 表示未知)
    pmt_pid: u16,
    /// 选中的视频 ES PID
    video_pid: Option<u16>,
    /// 是否位于 PES 载荷中 (首个 PUSI 之前的续包丢弃)
    in_pes: bool,
    /// 已还原的 ES 字节
    out: VecDeque<u8>,
}

impl TsByteSource {
    /// 包装一个传输流读取器
    pub fn new(inner: Box<dyn Read + Send>) -> Self {
        Self {
            inner,
            synced: false,
            pmt_pid: 0,
            video_pid: None,
            in_pes: false,
            out: VecDeque::new(),
        }
    }

    /// 同步到第一个有效的 TS 包 (当前字节即同步字节)
    fn sync(&mut self) -> io::Result<bool> {
        let max_search = 65536;
        let mut b = [0u8; 1];
        for _ in 0..max_search {
            if self.inner.read(&mut b)? == 0 {
                return Ok(false);
            }
            if b[0] == TS_SYNC_BYTE {
                self.synced = true;
                return Ok(true);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "TS: 找不到同步字节",
        ))
    }

    /// 读取一个 TS 包 (同步字节已消耗, 补齐余下 187 字节)
    ///
    /// 末尾残缺的包按流结束处理.
    fn read_packet(&mut self) -> io::Result<Option<[u8; TS_PACKET_SIZE]>> {
        if !self.synced {
            if !self.sync()? {
                return Ok(None);
            }
        } else {
            let mut b = [0u8; 1];
            if self.inner.read(&mut b)? == 0 {
                return Ok(None);
            }
            if b[0] != TS_SYNC_BYTE {
                // 失步, 重新搜索
                self.synced = false;
                if !self.sync()? {
                    return Ok(None);
                }
            }
        }

        let mut pkt = [0u8; TS_PACKET_SIZE];
        pkt[0] = TS_SYNC_BYTE;
        let mut filled = 1;
        while filled < TS_PACKET_SIZE {
            let got = self.inner.read(&mut pkt[filled..])?;
            if got == 0 {
                return Ok(None);
            }
            filled += got;
        }
        Ok(Some(pkt))
    }

    /// 解析 TS 包头 (4 字节), 返回 (PID, PUSI, AFC)
    fn parse_ts_header(pkt: &[u8; TS_PACKET_SIZE]) -> (u16, bool, u8) {
        let pid = (u16::from(pkt[1] & 0x1F) << 8) | u16::from(pkt[2]);
        let pusi = (pkt[1] & 0x40) != 0;
        let afc = (pkt[3] >> 4) & 0x03;
        (pid, pusi, afc)
    }

    /// 获取 payload 的偏移
    fn payload_offset(pkt: &[u8; TS_PACKET_SIZE], afc: u8) -> usize {
        let mut offset = 4;

        if (afc == 2 || afc == 3) && offset < TS_PACKET_SIZE {
            let af_len = pkt[offset] as usize;
            offset += 1 + af_len;
        }

        if afc == 1 || afc == 3 {
            offset
        } else {
            TS_PACKET_SIZE // 无 payload
        }
    }

    /// 解析 PAT, 记录 PMT PID
    fn parse_pat(&mut self, payload: &[u8]) {
        if self.pmt_pid != 0 || payload.len() < 12 {
            return;
        }
        let section_length = (u16::from(payload[1] & 0x0F) << 8 | u16::from(payload[2])) as usize;

        let entries_start = 8;
        let entries_end = (3 + section_length).min(payload.len()).saturating_sub(4);
        if entries_end <= entries_start {
            return;
        }

        // 每个条目 4 字节: program_number(2) + PID(2)
        for chunk in payload[entries_start..entries_end].chunks_exact(4) {
            let program_number = u16::from(chunk[0]) << 8 | u16::from(chunk[1]);
            let pid = (u16::from(chunk[2] & 0x1F) << 8) | u16::from(chunk[3]);
            if program_number != 0 {
                self.pmt_pid = pid;
                debug!("TS PAT: program={program_number} PMT_PID={pid:#06X}");
                break; // 只取第一个节目
            }
        }
    }

    /// 解析 PMT, 选出第一条视频流
    fn parse_pmt(&mut self, payload: &[u8]) {
        if self.video_pid.is_some() || payload.len() < 12 {
            return;
        }
        let section_length = (u16::from(payload[1] & 0x0F) << 8 | u16::from(payload[2])) as usize;
        let prog_info_len = (u16::from(payload[10] & 0x0F) << 8 | u16::from(payload[11])) as usize;

        let mut pos = 12 + prog_info_len;
        let section_end = (3 + section_length).min(payload.len()).saturating_sub(4);

        while pos + 5 <= section_end {
            let stream_type = payload[pos];
            let es_pid = (u16::from(payload[pos + 1] & 0x1F) << 8) | u16::from(payload[pos + 2]);
            let es_info_len =
                (u16::from(payload[pos + 3] & 0x0F) << 8 | u16::from(payload[pos + 4])) as usize;

            if is_video_stream_type(stream_type) {
                debug!("TS PMT: 选中视频流 stream_type=0x{stream_type:02X} PID={es_pid:#06X}");
                self.video_pid = Some(es_pid);
                break;
            }

            pos += 5 + es_info_len;
        }
    }

    /// 处理一个 TS 包, 把视频载荷写入输出队列
    fn process_packet(&mut self, pkt: &[u8; TS_PACKET_SIZE]) {
        let (pid, pusi, afc) = Self::parse_ts_header(pkt);

        if pid == PID_NULL {
            return;
        }

        let payload_off = Self::payload_offset(pkt, afc);
        if payload_off >= TS_PACKET_SIZE {
            return;
        }
        let payload = &pkt[payload_off..];

        if pid == PID_PAT {
            if pusi && !payload.is_empty() {
                let pointer = payload[0] as usize;
                let section_start = 1 + pointer;
                if section_start < payload.len() {
                    self.parse_pat(&payload[section_start..]);
                }
            }
            return;
        }

        if pid == self.pmt_pid && self.pmt_pid != 0 {
            if pusi && !payload.is_empty() {
                let pointer = payload[0] as usize;
                let section_start = 1 + pointer;
                if section_start < payload.len() {
                    self.parse_pmt(&payload[section_start..]);
                }
            }
            return;
        }

        if Some(pid) != self.video_pid {
            return;
        }

        if pusi {
            // PES 包开始: 剥掉 PES 头部
            let skip = pes_header_len(payload).unwrap_or(0);
            self.in_pes = true;
            if skip < payload.len() {
                self.out.extend(&payload[skip..]);
            }
        } else if self.in_pes {
            self.out.extend(payload);
        }
    }
}

impl Read for TsByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.out.is_empty() {
            match self.read_packet()? {
                Some(pkt) => self.process_packet(&pkt),
                None => return Ok(0),
            }
        }

        let mut n = 0;
        while n < buf.len() {
            match self.out.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

/// 计算 PES 头部长度 (起始码 + 可选头部)
///
/// 载荷不以 PES 起始码开头时返回 None.
fn pes_header_len(data: &[u8]) -> Option<usize> {
    if data.len() < 9 || data[0] != 0x00 || data[1] != 0x00 || data[2] != 0x01 {
        return None;
    }

    // data[3] = stream_id, data[4..6] = PES_packet_length
    // data[6]: '10' 标志位 → 存在可选头部
    if (data[6] & 0xC0) != 0x80 {
        return Some(6);
    }

    let pes_header_data_len = data[8] as usize;
    Some((9 + pes_header_data_len).min(data.len()))
}

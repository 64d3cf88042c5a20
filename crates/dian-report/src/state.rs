//! 流游标: 报告循环的计数与分钟标记.

use dian_codec::avs::frame_rate_from_code;

/// 分钟标记的显示周期 (按 25 fps 计一分钟的图像数)
const MINUTE_DISPLAY_PERIOD: u64 = 25 * 60;

/// 一次报告运行的游标
///
/// 随运行创建, 运行结束即丢弃.
#[derive(Debug)]
pub struct StreamCursor {
    /// 已输出的实体数 (条目/帧/访问单元/ES 单元)
    pub units_read: u64,
    /// 已见到的图像/帧数
    pub frames_read: u64,
    /// 帧率估计, 来自 AVS 序列头, 无序列头时取 25
    pub frame_rate_estimate: f64,
}

impl Default for StreamCursor {
    fn default() -> Self {
        Self {
            units_read: 0,
            frames_read: 0,
            frame_rate_estimate: 25.0,
        }
    }
}

impl StreamCursor {
    /// 创建新游标
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一幅 H.262 图像, 返回应打印的分钟数
    ///
    /// 判定在计数递增之前, 因此第一幅图像会给出 "0 minutes" 标记.
    pub fn note_h262_picture(&mut self) -> Option<u64> {
        let mark = if self.frames_read % MINUTE_DISPLAY_PERIOD == 0 {
            Some(self.frames_read / MINUTE_DISPLAY_PERIOD)
        } else {
            None
        };
        self.frames_read += 1;
        mark
    }

    /// 记录一帧 AVS, 返回应打印的分钟数
    ///
    /// 判定在计数递增之后, 触发周期取实时帧率估计, 但显示值固定按
    /// 25 fps 折算. 帧率不是 25 时触发点与显示值并不一致, 这里保持
    /// 该历史行为不变.
    pub fn note_avs_frame(&mut self) -> Option<u64> {
        self.frames_read += 1;
        let trigger = (self.frame_rate_estimate * 60.0) as u64;
        if trigger != 0 && self.frames_read % trigger == 0 {
            Some(self.frames_read / MINUTE_DISPLAY_PERIOD)
        } else {
            None
        }
    }

    /// 用 AVS 序列头的 frame_rate_code 更新帧率估计
    ///
    /// 保留值不改变现有估计.
    pub fn update_frame_rate(&mut self, code: u8) {
        if let Some(rate) = frame_rate_from_code(code) {
            self.frame_rate_estimate = rate;
        }
    }
}

/// 分钟标记行, 单复数随分钟数变化
pub fn minute_line(minutes: u64) -> String {
    format!(
        "\n{} minute{}\n",
        minutes,
        if minutes == 1 { "" } else { "s" }
    )
}

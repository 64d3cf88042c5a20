//! dian - 视频基本流点迹查看器
//!
//! 把 H.264 (MPEG-4/AVC)、H.262 (MPEG-2) 或 AVS 基本流的结构以每个
//! 单位一个字符的形式打印出来: 访问单元 / MPEG-2 条目 / AVS 条目,
//! 或加 --es 后的原始 ES 单元.

mod logging;

use clap::Parser;
use std::io::Write;
use std::process;
use tracing::info;

use dian_core::{Granularity, VideoType};
use dian_format::{open_input, InputSpec};
use dian_report::{run_dots, DotsOptions, DotsRequest};

#[derive(Parser, Debug)]
#[command(name = "dian", version, about = "视频基本流结构点迹查看器")]
struct Cli {
    /// 输入的基本流文件 (或使用 --stdin)
    input: Option<String>,

    /// 从标准输入读取. 此时无法自动探测码流类型, 未强制指定时按
    /// H.262 处理
    #[arg(long)]
    stdin: bool,

    /// 强制按 H.262 (MPEG-2) 解析
    #[arg(long, group = "stream_type")]
    h262: bool,

    /// 强制按 H.264 (MPEG-4/AVC) 解析
    #[arg(long, group = "stream_type")]
    h264: bool,

    /// 强制按 AVS 解析. AVS 无法自动探测, 必须使用本开关
    #[arg(long, group = "stream_type")]
    avs: bool,

    /// 按原始 ES 单元报告, 而非更高层的单位
    #[arg(long)]
    es: bool,

    /// 输入为 MPEG-TS 容器, 先抽取视频基本流
    #[arg(long)]
    ts: bool,

    /// 读取上限 (条目/帧/NAL 单元/ES 单元数), 0 表示不限
    #[arg(short = 'm', long = "max", default_value_t = 0)]
    max: u64,

    /// 遇到流结束 NAL 时打印 # 并继续, 而非停止 (仅 H.264)
    #[arg(long = "hash-eos")]
    hash_eos: bool,

    /// 输出前打印符号说明
    #[arg(short, long)]
    verbose: bool,

    /// 日志级别 (-d debug, -dd trace)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count)]
    debug: u8,
}

fn main() {
    let cli = Cli::parse();
    logging::init("dian", cli.debug);

    let spec = if cli.stdin {
        if cli.input.is_some() {
            eprintln!("错误: --stdin 与输入文件不能同时指定");
            process::exit(1);
        }
        InputSpec::Stdin
    } else if let Some(path) = cli.input.clone() {
        InputSpec::File(path)
    } else {
        eprintln!("错误: 未指定输入文件 (或使用 --stdin)");
        process::exit(1);
    };

    let mut forced = match (cli.h262, cli.h264, cli.avs) {
        (true, _, _) => Some(VideoType::H262),
        (_, true, _) => Some(VideoType::H264),
        (_, _, true) => Some(VideoType::Avs),
        _ => None,
    };
    // 标准输入无法回看文件开头, 未强制时默认 H.262
    if forced.is_none() && matches!(spec, InputSpec::Stdin) {
        forced = Some(VideoType::H262);
    }

    let input = match open_input(&spec, cli.ts, forced) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("错误: 无法打开输入: {e}");
            process::exit(1);
        }
    };

    let request = DotsRequest {
        granularity: if cli.es {
            Granularity::EsUnits
        } else {
            Granularity::Aggregated
        },
        options: DotsOptions {
            max: cli.max,
            verbose: cli.verbose,
            hash_eos: cli.hash_eos,
        },
    };
    info!(
        "开始点迹: 类型={}, 粒度={:?}, max={}",
        input.video_type, request.granularity, cli.max
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run_dots(&mut out, input, &request) {
        eprintln!("错误: 生成点迹失败: {e}");
        process::exit(1);
    }
    let _ = out.flush();
}

//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use super::constants::{defaults, parallel_limits};
use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 工程目录（单工程模式）或扫描目录（批量模式）
    pub input_path: PathBuf,

    /// 是否显示详细信息（区域、效果器参数）
    pub verbose: bool,

    /// 输出文件路径（可选）
    pub output_path: Option<PathBuf>,

    /// 以JSON输出报告
    pub json: bool,

    /// 是否校验bin内容哈希
    pub verify: bool,

    /// bin并行校验并发度（None表示串行）
    pub parallel_files: Option<usize>,

    /// 哈希校验的读取块大小
    pub chunk_size: usize,
}

impl AppConfig {
    /// 输入是目录且本身不是工程时进入批量模式
    #[inline]
    pub fn is_batch_mode(&self) -> bool {
        self.input_path.is_dir() && !super::utils::is_project_dir(&self.input_path)
    }

    /// 单工程默认配置
    pub fn for_project(input_path: PathBuf) -> Self {
        Self {
            input_path,
            verbose: false,
            output_path: None,
            json: false,
            verify: true,
            parallel_files: Some(defaults::PARALLEL_FILES_DEGREE),
            chunk_size: defaults::VERIFY_CHUNK_BYTES,
        }
    }
}

/// 解析命令行参数并创建配置
pub fn parse_args() -> AppConfig {
    let matches = Command::new("mtdaw-inspect")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("MacinMeter Team")
        .arg(
            Arg::new("INPUT")
                .help("工程目录（*.mtdaw）或包含多个工程的目录。如果不指定，将扫描当前目录")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示区域与效果器详细参数")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("输出结果到文件")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("以JSON格式输出报告")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-verify")
                .long("no-verify")
                .help("跳过bin内容哈希校验")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("serial")
                .long("serial")
                .help("串行校验bin（禁用并行）")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("parallel-files")
                .long("parallel-files")
                .help("bin并行校验并发度（1-16）")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .help("哈希校验读取块大小（字节）")
                .value_name("BYTES")
                .value_parser(value_parser!(usize)),
        )
        .get_matches();

    let input_path = matches
        .get_one::<String>("INPUT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let parallel_files = if matches.get_flag("serial") {
        None
    } else {
        let degree = matches
            .get_one::<usize>("parallel-files")
            .copied()
            .unwrap_or(defaults::PARALLEL_FILES_DEGREE);
        Some(degree.clamp(
            parallel_limits::MIN_PARALLEL_DEGREE,
            parallel_limits::MAX_PARALLEL_DEGREE,
        ))
    };

    let chunk_size = matches
        .get_one::<usize>("chunk-size")
        .copied()
        .unwrap_or(defaults::VERIFY_CHUNK_BYTES)
        .max(parallel_limits::MIN_CHUNK_BYTES);

    AppConfig {
        input_path,
        verbose: matches.get_flag("verbose"),
        output_path: matches.get_one::<String>("output").map(PathBuf::from),
        json: matches.get_flag("json"),
        verify: !matches.get_flag("no-verify"),
        parallel_files,
        chunk_size,
    }
}

/// 显示程序启动信息（JSON模式下不输出）
pub fn show_startup_info(config: &AppConfig) {
    if config.json {
        return;
    }
    println!("🚀 MTDAW Inspect v{VERSION} 启动");
    println!("📝 {DESCRIPTION}");
    if config.verbose {
        match config.parallel_files {
            Some(degree) => println!("⚡ bin校验并发度: {degree}"),
            None => println!("🐢 bin校验: 串行"),
        }
    }
    println!();
}

/// 显示程序完成信息
pub fn show_completion_info(config: &AppConfig) {
    if config.verbose && !config.json {
        println!("✅ 所有任务处理完成！");
    }
}

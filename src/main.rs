//! MTDAW Inspect - 主程序入口
//!
//! 纯流程控制器，负责协调各个工具模块完成工程检查任务。

use mtdaw_inspect::{
    error::{ErrorCategory, InspectError},
    tools::{self, AppConfig},
};
use std::process;

/// 退出码定义
mod exit_codes {
    /// 通用错误
    pub const GENERAL_ERROR: i32 = 1;
    /// 工程文件缺失/不兼容
    pub const PROJECT_ERROR: i32 = 2;
    /// 存在哈希不匹配或无法解码的bin
    pub const INTEGRITY_FAILURE: i32 = 3;
    /// 资源/并发错误
    pub const RESOURCE_ERROR: i32 = 5;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &InspectError) -> &'static str {
    match error {
        InspectError::InvalidInput(_) => {
            "检查命令行参数是否正确，使用 --help 查看完整用法 / Check if command-line arguments are correct, use --help to see full usage"
        }
        InspectError::ResourceError(_) => {
            "资源不可用，请重试；若持续失败请使用 --serial 串行模式 / Resource unavailable, retry or use --serial"
        }
        InspectError::IncompatibleProjectVersion { .. } => {
            "工程由过旧版本的应用创建，请先在应用中打开并保存 / Project was created by an old app version, open and save it in the app first"
        }
        _ => match ErrorCategory::from_inspect_error(error) {
            ErrorCategory::Io => {
                "检查路径是否正确，文件是否存在且可读 / Check if the path is correct and readable"
            }
            ErrorCategory::Project => {
                "确认输入是完整的 .mtdaw 工程目录 / Make sure the input is a complete .mtdaw project folder"
            }
            ErrorCategory::Format | ErrorCategory::Integrity | ErrorCategory::Other => {
                "请检查输入工程和参数设置 / Please check the input project and parameters"
            }
        },
    }
}

/// 错误处理和建议
fn handle_error(error: InspectError) -> ! {
    eprintln!("[ERROR] 错误 / Error: {error}");
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));

    let exit_code = match &error {
        InspectError::ResourceError(_) => exit_codes::RESOURCE_ERROR,
        _ => match ErrorCategory::from_inspect_error(&error) {
            ErrorCategory::Project => exit_codes::PROJECT_ERROR,
            ErrorCategory::Format | ErrorCategory::Integrity => exit_codes::INTEGRITY_FAILURE,
            ErrorCategory::Io | ErrorCategory::Other => exit_codes::GENERAL_ERROR,
        },
    };

    process::exit(exit_code);
}

/// 批量检查目录下的所有工程；返回是否全部通过
fn process_batch_mode(config: &AppConfig) -> Result<bool, InspectError> {
    let projects = tools::scan_projects(&config.input_path)?;
    tools::show_scan_results(config, &projects);

    if projects.is_empty() {
        return Ok(true);
    }

    let (_, snapshot) = tools::process_batch(&projects, config)?;
    Ok(snapshot.is_clean())
}

/// 单工程模式；返回是否全部通过
fn process_single_mode(config: &AppConfig) -> Result<bool, InspectError> {
    let report = tools::process_single_project(&config.input_path, config)?;
    Ok(report.is_clean())
}

/// 应用程序主逻辑
fn run() -> Result<bool, InspectError> {
    let config = tools::parse_args();
    tools::show_startup_info(&config);

    let clean = if config.is_batch_mode() {
        process_batch_mode(&config)?
    } else {
        process_single_mode(&config)?
    };

    tools::show_completion_info(&config);
    Ok(clean)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(exit_codes::INTEGRITY_FAILURE),
        Err(error) => handle_error(error),
    }
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use dxfsvg_config::{AppConfig, ConfigError};
use dxfsvg_core::document::Document;
use dxfsvg_engine::{ConvertOptions, convert_document};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod error;
mod svg;

use error::AppError;

const USAGE: &str = "用法: dxfsvg-app [--config <PATH>] [--output <PATH>] <INPUT.json>";

fn main() {
    let mut args = std::env::args().skip(1);
    let mut config_override: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("`--config` 需要提供配置文件路径");
                    std::process::exit(1);
                };
                config_override = Some(PathBuf::from(path));
            }
            "--output" | "-o" => {
                let Some(path) = args.next() else {
                    eprintln!("`--output` 需要提供输出文件路径");
                    std::process::exit(1);
                };
                output = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                return;
            }
            other if other.starts_with('-') => {
                eprintln!("未知参数：{other}");
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
            other => {
                if input.is_some() {
                    eprintln!("只能指定一个输入文件：{other}");
                    std::process::exit(1);
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    let Some(input) = input else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let config = load_configuration(config_override);
    init_logging(&config);
    info!(input = %input.display(), "开始转换图纸");

    if let Err(err) = run(&input, output.as_deref(), &config) {
        error!(error = %err, "转换失败");
        std::process::exit(1);
    }
}

fn run(input: &Path, output: Option<&Path>, config: &AppConfig) -> Result<(), AppError> {
    let content = fs::read_to_string(input).map_err(|source| AppError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    let document: Document =
        serde_json::from_str(&content).map_err(|source| AppError::ParseInput {
            path: input.to_path_buf(),
            source,
        })?;

    let options = ConvertOptions {
        layers: config.conversion.layers.clone(),
        associate_descriptions: config.conversion.associate_descriptions,
    };
    let layers = convert_document(&document, &options)?;
    let paths: usize = layers.iter().map(|layer| layer.entities.len()).sum();
    info!(layers = layers.len(), paths, "转换完成");

    let markup = svg::render_svg(&document, &layers, &config.conversion.description_attribute);
    match output {
        Some(path) => fs::write(path, markup).map_err(|source| AppError::WriteOutput {
            target: path.display().to_string(),
            source,
        }),
        None => std::io::stdout()
            .lock()
            .write_all(markup.as_bytes())
            .map_err(|source| AppError::WriteOutput {
                target: "stdout".to_string(),
                source,
            }),
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

/// 日志写到标准错误，标准输出留给 SVG。
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

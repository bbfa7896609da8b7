// 该文件是 Tuyu （图语） 项目的一部分。
// src/bin/caption_local.rs - 本地目录批量描述
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use tuyu::{
  config::{ModelArgs, ModelConfig, PipelineArgs, PipelineConfig, http_client, init_tracing},
  output::LOCAL_OUTPUT,
  pipeline::Pipeline,
  source::{IMAGE_EXTENSIONS, SourceError, SourceWrapper},
  task::interrupt_flag,
};

/// 为本地目录中的图片批量生成描述
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 图片目录
  #[arg(long, default_value = "images", value_name = "DIR")]
  pub dir: PathBuf,
  /// 输出文件路径
  #[arg(long, default_value = LOCAL_OUTPUT, value_name = "FILE")]
  pub output: PathBuf,
  #[command(flatten)]
  pub model: ModelArgs,
  #[command(flatten)]
  pub pipeline: PipelineArgs,
}

fn main() -> Result<()> {
  init_tracing();

  let args = Args::parse();

  info!("图片目录: {}", args.dir.display());
  info!("输出文件: {}", args.output.display());

  let model_config = ModelConfig::from(&args.model);
  let pipeline_config = PipelineConfig::from(&args.pipeline);
  let client = http_client(&pipeline_config.user_agent)?;
  let captioner = model_config.captioner(&client, pipeline_config.max_new_tokens)?;
  info!("已加载描述模型: {}", model_config.caption_endpoint);

  let summary = Pipeline::new(pipeline_config, client, captioner)
    .with_stop_flag(Some(interrupt_flag()?))
    .run(SourceWrapper::local_dir(&args.dir), &args.output)
    .inspect_err(|err| {
      if let Some(SourceError::DirectoryNotFound(dir)) = err.downcast_ref::<SourceError>() {
        error!(
          "请创建目录 '{}' 并放入图片 ({})",
          dir.display(),
          IMAGE_EXTENSIONS.map(|ext| format!(".{}", ext)).join(", ")
        );
      }
    })?;

  info!("完成: {}", summary);
  Ok(())
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/bin/caption_page.rs - 网页图片批量描述
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
use tracing::info;
use url::Url;

use tuyu::{
  config::{ModelArgs, ModelConfig, PipelineArgs, PipelineConfig, http_client, init_tracing},
  output::PAGE_OUTPUT,
  pipeline::Pipeline,
  source::SourceWrapper,
  task::interrupt_flag,
};

/// 抓取网页中的图片并批量生成描述
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 网页地址
  #[arg(long, default_value = "https://en.wikipedia.org/wiki/IBM", value_name = "URL")]
  pub url: Url,
  /// 输出文件路径
  #[arg(long, default_value = PAGE_OUTPUT, value_name = "FILE")]
  pub output: PathBuf,
  #[command(flatten)]
  pub model: ModelArgs,
  #[command(flatten)]
  pub pipeline: PipelineArgs,
}

fn main() -> Result<()> {
  init_tracing();

  let args = Args::parse();

  info!("抓取页面: {}", args.url);
  info!("输出文件: {}", args.output.display());

  let model_config = ModelConfig::from(&args.model);
  let pipeline_config = PipelineConfig::from(&args.pipeline);
  let client = http_client(&pipeline_config.user_agent)?;
  let captioner = model_config.captioner(&client, pipeline_config.max_new_tokens)?;

  let summary = Pipeline::new(pipeline_config, client, captioner)
    .with_stop_flag(Some(interrupt_flag()?))
    .run(SourceWrapper::web_page(args.url), &args.output)?;

  info!("完成: {}", summary);
  info!("描述已保存到 {}", args.output.display());
  Ok(())
}

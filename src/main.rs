// 该文件是 Tuyu （图语） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tuyu::{
  FromUrl,
  config::{ModelConfig, PipelineConfig, http_client, init_tracing},
  pipeline::Pipeline,
  source::SourceWrapper,
  task::interrupt_flag,
};

fn main() -> Result<()> {
  init_tracing();

  let args = args::Args::parse();
  let output = args.output_path();
  let model_config = ModelConfig::from(&args.model);
  let pipeline_config = PipelineConfig::from(&args.pipeline);

  info!("描述模型: {}", model_config.caption_endpoint);
  info!("输出文件: {}", output.display());

  let source = match (&args.local_dir, &args.url) {
    (Some(dir), _) => SourceWrapper::local_dir(dir),
    (None, Some(url)) => SourceWrapper::from_url(url)?,
    (None, None) => anyhow::bail!("必须提供 --local-dir 或 --url"),
  };

  let client = http_client(&pipeline_config.user_agent)?;
  let captioner = model_config.captioner(&client, pipeline_config.max_new_tokens)?;
  let stop = interrupt_flag()?;

  let summary = Pipeline::new(pipeline_config, client, captioner)
    .with_stop_flag(Some(stop))
    .run(source, &output)?;

  info!("完成: {}", summary);
  info!("描述已保存到 {}", output.display());
  Ok(())
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/bin/caption_studio.rs - 单张图片描述与分类
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

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use tuyu::{
  config::{ModelArgs, ModelConfig, default_user_agent, http_client, init_tracing},
  fetch::ImageFetcher,
  output::ConsoleOutput,
  source::ImageSource,
  task::{OneShotTask, Task},
};

/// 对单张图片生成描述或进行分类
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
  #[command(flatten)]
  pub model: ModelArgs,
  /// 图片下载超时（秒）
  #[arg(long, default_value = "10", value_name = "SECONDS")]
  pub image_timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 生成图像描述
  Caption {
    /// 图片路径或 http(s) 地址
    #[arg(value_name = "IMAGE")]
    image: String,
    /// 生成长度上限，缺省不限制
    #[arg(long, value_name = "COUNT")]
    max_new_tokens: Option<u32>,
  },
  /// 图像分类，输出置信度最高的几个标签
  Classify {
    /// 图片路径或 http(s) 地址
    #[arg(value_name = "IMAGE")]
    image: String,
    /// 输出的标签数量
    #[arg(long, default_value = "3", value_name = "K")]
    top_k: usize,
  },
}

fn main() -> Result<()> {
  init_tracing();

  let args = Args::parse();
  let model_config = ModelConfig::from(&args.model);
  let client = http_client(default_user_agent())?;
  // 上传的图片不做尺寸限制
  let fetcher = ImageFetcher::new(client.clone())
    .with_timeout(std::time::Duration::from_secs(args.image_timeout_secs))
    .with_min_dimension(0);

  match args.command {
    Command::Caption {
      image,
      max_new_tokens,
    } => {
      info!("描述模型: {}", model_config.caption_endpoint);
      let source = ImageSource::from_location(&image)?;
      let captioner = model_config.captioner(&client, max_new_tokens)?;
      OneShotTask::new(fetcher).run_task([source], captioner, ConsoleOutput::stdout())?;
    }
    Command::Classify { image, top_k } => {
      info!("分类模型: {}", model_config.classify_endpoint);
      let source = ImageSource::from_location(&image)?;
      let classifier = model_config.classifier(&client, None)?;
      OneShotTask::new(fetcher).run_task(
        [source],
        classifier,
        ConsoleOutput::stdout().with_top_k(top_k),
      )?;
    }
  }

  Ok(())
}

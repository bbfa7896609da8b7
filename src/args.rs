// 该文件是 Tuyu （图语） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::{ArgGroup, Parser};
use tuyu::config::{ModelArgs, PipelineArgs};
use tuyu::output::{CLI_LOCAL_OUTPUT, CLI_URL_OUTPUT};
use url::Url;

/// Tuyu 图像描述命令行工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["local_dir", "url"])))]
pub struct Args {
  /// 本地图片目录（处理 *.jpg, *.jpeg, *.png）
  #[arg(long = "local-dir", alias = "local_dir", value_name = "DIR")]
  pub local_dir: Option<PathBuf>,

  /// 要抓取图片的网页地址，也接受 file:// 目录
  #[arg(long, value_name = "URL")]
  pub url: Option<Url>,

  /// 输出文件路径
  /// 默认:
  /// - --local-dir: local_captions.txt
  /// - --url: url_captions.txt
  #[arg(long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  #[command(flatten)]
  pub model: ModelArgs,

  #[command(flatten)]
  pub pipeline: PipelineArgs,
}

impl Args {
  pub fn output_path(&self) -> PathBuf {
    match (&self.output, &self.local_dir) {
      (Some(output), _) => output.clone(),
      (None, Some(_)) => PathBuf::from(CLI_LOCAL_OUTPUT),
      (None, None) => PathBuf::from(CLI_URL_OUTPUT),
    }
  }
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/pipeline.rs - 批量描述流水线
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

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::{
  config::PipelineConfig,
  fetch::ImageFetcher,
  frame::DecodedImage,
  model::Model,
  output::CaptionFileOutput,
  source::{Discover, SourceWrapper},
  task::{CaptionTask, RunSummary, Task},
};

/// 来源发现 → 获取校验 → 生成描述 → 写入文件
///
/// 模型与 HTTP 客户端在启动时构造一次后注入，整个运行期间只读。
pub struct Pipeline<M> {
  config: PipelineConfig,
  client: Client,
  captioner: M,
  stop: Option<Arc<AtomicBool>>,
}

impl<M, ME> Pipeline<M>
where
  M: Model<Input = DecodedImage, Output = String, Error = ME>,
  ME: std::error::Error + Send + Sync + 'static,
{
  pub fn new(config: PipelineConfig, client: Client, captioner: M) -> Self {
    Self {
      config,
      client,
      captioner,
      stop: None,
    }
  }

  pub fn with_stop_flag(mut self, stop: Option<Arc<AtomicBool>>) -> Self {
    self.stop = stop;
    self
  }

  pub fn fetcher(&self) -> ImageFetcher {
    ImageFetcher::new(self.client.clone())
      .with_timeout(self.config.image_timeout)
      .with_min_dimension(self.config.min_dimension)
  }

  /// 来源发现失败会中止运行；单张图像的失败不会
  pub fn run(self, source: SourceWrapper, output: impl AsRef<Path>) -> anyhow::Result<RunSummary> {
    let source = source.with_page_timeout(self.config.page_timeout);
    info!("处理来源: {}", source.describe());

    let sources = source
      .discover(&self.client)
      .with_context(|| format!("无法枚举图像来源: {}", source.describe()))?;
    if sources.is_empty() {
      warn!("未找到任何图像");
    } else {
      info!("找到 {} 张图像，开始生成描述...", sources.len());
    }

    let output = output.as_ref();
    let writer = CaptionFileOutput::create(output)
      .with_context(|| format!("无法创建输出文件: {}", output.display()))?;

    let fetcher = self.fetcher();
    CaptionTask::new(fetcher)
      .with_stop_flag(self.stop)
      .run_task(sources, self.captioner, writer)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::SourceError;
  use image::RgbImage;
  use std::convert::Infallible;

  struct Constant;

  impl Model for Constant {
    type Input = DecodedImage;
    type Output = String;
    type Error = Infallible;

    fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
      Ok("a photo".to_string())
    }
  }

  #[test]
  fn directory_run_writes_one_line_per_valid_image() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    RgbImage::new(200, 200).save(images.join("a.png")).unwrap();
    RgbImage::new(50, 50).save(images.join("b.png")).unwrap();
    std::fs::write(images.join("readme.txt"), "x").unwrap();
    let out = dir.path().join("local_captions.txt");

    let summary = Pipeline::new(PipelineConfig::default(), Client::new(), Constant)
      .run(SourceWrapper::local_dir(&images), &out)
      .unwrap();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.written, 1);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "a.png: a photo\n");
  }

  #[test]
  fn interrupted_run_reports_unprocessed_images() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    RgbImage::new(200, 200).save(images.join("a.png")).unwrap();
    RgbImage::new(200, 200).save(images.join("b.jpg")).unwrap();
    let out = dir.path().join("local_captions.txt");

    let summary = Pipeline::new(PipelineConfig::default(), Client::new(), Constant)
      .with_stop_flag(Some(Arc::new(AtomicBool::new(true))))
      .run(SourceWrapper::local_dir(&images), &out)
      .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.processed, 0);
  }

  #[test]
  fn missing_directory_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("local_captions.txt");

    let err = Pipeline::new(PipelineConfig::default(), Client::new(), Constant)
      .run(SourceWrapper::local_dir(dir.path().join("nope")), &out)
      .unwrap_err();

    assert!(matches!(
      err.downcast_ref::<SourceError>(),
      Some(SourceError::DirectoryNotFound(_))
    ));
    assert!(!out.exists());
  }

  #[test]
  fn empty_directory_leaves_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("local_captions.txt");

    let summary = Pipeline::new(PipelineConfig::default(), Client::new(), Constant)
      .run(SourceWrapper::local_dir(dir.path()), &out)
      .unwrap();

    assert_eq!(summary, RunSummary::default());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
  }
}

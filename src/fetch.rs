// 该文件是 Tuyu （图语） 项目的一部分。
// src/fetch.rs - 图像获取与校验
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
use std::time::Duration;

use image::ImageReader;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
  ErrorKind,
  frame::{DecodedImage, DEFAULT_MIN_DIMENSION},
  source::{ImageSource, Origin},
};

const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum FetchError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("请求失败: {0}")]
  RequestError(#[from] reqwest::Error),
  #[error("HTTP 状态异常: {0}")]
  StatusError(reqwest::StatusCode),
  #[error("图像解码失败: {0}")]
  DecodeError(#[from] image::ImageError),
  #[error("图像尺寸过小: {width}x{height} (下限 {minimum}px)")]
  TooSmall {
    width: u32,
    height: u32,
    minimum: u32,
  },
}

impl FetchError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      FetchError::IoError(_) | FetchError::RequestError(_) | FetchError::StatusError(_) => {
        ErrorKind::Fetch
      }
      FetchError::DecodeError(_) => ErrorKind::Decode,
      FetchError::TooSmall { .. } => ErrorKind::SizeRejected,
    }
  }

  pub fn is_retryable(&self) -> bool {
    match self {
      FetchError::RequestError(err) => crate::is_retryable_request(err),
      FetchError::StatusError(status) => crate::is_retryable_status(*status),
      FetchError::IoError(err) => matches!(
        err.kind(),
        std::io::ErrorKind::Interrupted | std::io::ErrorKind::TimedOut
      ),
      FetchError::DecodeError(_) | FetchError::TooSmall { .. } => false,
    }
  }
}

/// 把图像来源解析为像素数据，并拒绝尺寸过小的图像
#[derive(Debug, Clone)]
pub struct ImageFetcher {
  client: Client,
  timeout: Duration,
  min_dimension: u32,
}

impl ImageFetcher {
  pub fn new(client: Client) -> Self {
    Self {
      client,
      timeout: DEFAULT_IMAGE_TIMEOUT,
      min_dimension: DEFAULT_MIN_DIMENSION,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_min_dimension(mut self, min_dimension: u32) -> Self {
    self.min_dimension = min_dimension;
    self
  }

  pub fn fetch(&self, source: &ImageSource) -> Result<DecodedImage, FetchError> {
    let image = match source.origin() {
      Origin::Local(path) => self.load_local(path)?,
      Origin::Remote(url) => self.download(url)?,
    };
    self.validate(image)
  }

  fn load_local(&self, path: &Path) -> Result<DecodedImage, FetchError> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image.into())
  }

  fn download(&self, url: &Url) -> Result<DecodedImage, FetchError> {
    let response = self
      .client
      .get(url.clone())
      .timeout(self.timeout)
      .send()?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::StatusError(status));
    }

    let bytes = response.bytes()?;
    debug!("下载 {} 字节: {}", bytes.len(), url);
    let image = image::load_from_memory(&bytes)?;
    Ok(image.into())
  }

  fn validate(&self, image: DecodedImage) -> Result<DecodedImage, FetchError> {
    if !image.meets_minimum(self.min_dimension) {
      let (width, height) = image.dimensions();
      return Err(FetchError::TooSmall {
        width,
        height,
        minimum: self.min_dimension,
      });
    }
    Ok(image)
  }
}

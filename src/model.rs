// 该文件是 Tuyu （图语） 项目的一部分。
// src/model.rs - 模型
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

use thiserror::Error;

/// 同步推理接口，调用可能耗时数秒
///
/// 描述模型为 `Model<Input = DecodedImage, Output = String>`，
/// 分类模型为 `Model<Input = DecodedImage, Output = Classification>`。
pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("推理请求失败: {0}")]
  RequestError(#[from] reqwest::Error),
  #[error("推理服务返回状态 {status}: {body}")]
  StatusError {
    status: reqwest::StatusCode,
    body: String,
  },
  #[error("推理服务响应无法解析: {0}")]
  ResponseError(#[from] serde_json::Error),
  #[error("推理服务未返回结果")]
  EmptyResponse,
  #[error("图像编码失败: {0}")]
  EncodeError(#[from] image::ImageError),
  #[error("模型地址无效: {0}")]
  EndpointError(String),
}

impl ModelError {
  pub fn is_retryable(&self) -> bool {
    match self {
      ModelError::RequestError(err) => crate::is_retryable_request(err),
      ModelError::StatusError { status, .. } => crate::is_retryable_status(*status),
      _ => false,
    }
  }
}

mod classification;
pub use self::classification::{Classification, Prediction};

mod remote;
pub use self::remote::{
  DEFAULT_CAPTION_ENDPOINT, DEFAULT_CLASSIFY_ENDPOINT, RemoteCaptioner, RemoteClassifier,
  RemoteModelBuilder,
};

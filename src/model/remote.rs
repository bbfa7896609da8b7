// 该文件是 Tuyu （图语） 项目的一部分。
// src/model/remote.rs - 远程推理服务
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

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl,
  frame::DecodedImage,
  model::{Classification, Model, ModelError, Prediction},
};

pub const DEFAULT_CAPTION_ENDPOINT: &str =
  "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-base";
pub const DEFAULT_CLASSIFY_ENDPOINT: &str =
  "https://api-inference.huggingface.co/models/microsoft/resnet-18";

const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct InferenceRequest<P> {
  inputs: String,
  parameters: P,
  options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
  wait_for_model: bool,
}

#[derive(Serialize)]
struct CaptionParameters {
  #[serde(skip_serializing_if = "Option::is_none")]
  max_new_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ClassifyParameters {
  #[serde(skip_serializing_if = "Option::is_none")]
  top_k: Option<usize>,
}

#[derive(Deserialize)]
struct GeneratedText {
  generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CaptionResponse {
  List(Vec<GeneratedText>),
  Single(GeneratedText),
}

impl CaptionResponse {
  fn into_caption(self) -> Option<String> {
    let generated = match self {
      CaptionResponse::List(list) => list.into_iter().next()?,
      CaptionResponse::Single(single) => single,
    };
    Some(generated.generated_text.trim().to_string())
  }
}

/// 推理服务端点，持有共享的 HTTP 客户端
#[derive(Debug, Clone)]
struct Endpoint {
  client: Client,
  url: Url,
  token: Option<String>,
  timeout: Duration,
}

impl Endpoint {
  fn post<P: Serialize>(&self, image: &DecodedImage, parameters: P) -> Result<String, ModelError> {
    let png = image.encode_png()?;
    let payload = InferenceRequest {
      inputs: STANDARD.encode(&png),
      parameters,
      options: InferenceOptions {
        wait_for_model: true,
      },
    };

    let mut request = self
      .client
      .post(self.url.clone())
      .timeout(self.timeout)
      .json(&payload);
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let now = std::time::Instant::now();
    let response = request.send()?;
    let status = response.status();
    let body = response.text()?;
    debug!("推理服务响应 {}，耗时: {:.2?}", status, now.elapsed());

    if !status.is_success() {
      return Err(ModelError::StatusError { status, body });
    }
    Ok(body)
  }
}

/// 远程模型构建器，模型地址必须是 http/https
pub struct RemoteModelBuilder {
  url: Url,
  token: Option<String>,
  timeout: Duration,
  client: Option<Client>,
}

impl FromUrl for RemoteModelBuilder {
  type Error = ModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if !matches!(url.scheme(), "http" | "https") {
      return Err(ModelError::EndpointError(format!(
        "模型地址必须使用 http 或 https 方案: {}",
        url
      )));
    }

    Ok(RemoteModelBuilder {
      url: url.clone(),
      token: None,
      timeout: DEFAULT_MODEL_TIMEOUT,
      client: None,
    })
  }
}

impl RemoteModelBuilder {
  pub fn token(mut self, token: Option<String>) -> Self {
    self.token = token.filter(|t| !t.is_empty());
    self
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn client(mut self, client: Client) -> Self {
    self.client = Some(client);
    self
  }

  fn build_endpoint(self) -> Result<Endpoint, ModelError> {
    let client = match self.client {
      Some(client) => client,
      None => Client::builder().build()?,
    };
    info!("使用推理服务: {}", self.url);
    Ok(Endpoint {
      client,
      url: self.url,
      token: self.token,
      timeout: self.timeout,
    })
  }

  /// `max_new_tokens` 为 None 时不限制生成长度
  pub fn build_captioner(self, max_new_tokens: Option<u32>) -> Result<RemoteCaptioner, ModelError> {
    Ok(RemoteCaptioner {
      endpoint: self.build_endpoint()?,
      max_new_tokens,
    })
  }

  pub fn build_classifier(self, top_k: Option<usize>) -> Result<RemoteClassifier, ModelError> {
    Ok(RemoteClassifier {
      endpoint: self.build_endpoint()?,
      top_k,
    })
  }
}

#[derive(Debug, Clone)]
pub struct RemoteCaptioner {
  endpoint: Endpoint,
  max_new_tokens: Option<u32>,
}

impl Model for RemoteCaptioner {
  type Input = DecodedImage;
  type Output = String;
  type Error = ModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let body = self.endpoint.post(
      input,
      CaptionParameters {
        max_new_tokens: self.max_new_tokens,
      },
    )?;
    let response: CaptionResponse = serde_json::from_str(&body)?;
    response.into_caption().ok_or(ModelError::EmptyResponse)
  }
}

#[derive(Debug, Clone)]
pub struct RemoteClassifier {
  endpoint: Endpoint,
  top_k: Option<usize>,
}

impl Model for RemoteClassifier {
  type Input = DecodedImage;
  type Output = Classification;
  type Error = ModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let body = self
      .endpoint
      .post(input, ClassifyParameters { top_k: self.top_k })?;
    let predictions: Vec<Prediction> = serde_json::from_str(&body)?;
    if predictions.is_empty() {
      return Err(ModelError::EmptyResponse);
    }
    Ok(Classification::from(predictions))
  }
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/config.rs - 参数与配置
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

use clap::Args;
use reqwest::blocking::Client;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
  FromUrl,
  frame::DEFAULT_MIN_DIMENSION,
  model::{
    DEFAULT_CAPTION_ENDPOINT, DEFAULT_CLASSIFY_ENDPOINT, ModelError, RemoteCaptioner,
    RemoteClassifier, RemoteModelBuilder,
  },
};

/// 批处理默认的生成长度上限
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 50;

const DEFAULT_USER_AGENT: &str = concat!("tuyu/", env!("CARGO_PKG_VERSION"));

/// 推理服务参数
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
  /// 图像描述模型地址
  #[arg(
    long,
    env = "TUYU_CAPTION_ENDPOINT",
    default_value = DEFAULT_CAPTION_ENDPOINT,
    value_name = "URL"
  )]
  pub caption_endpoint: Url,

  /// 图像分类模型地址
  #[arg(
    long,
    env = "TUYU_CLASSIFY_ENDPOINT",
    default_value = DEFAULT_CLASSIFY_ENDPOINT,
    value_name = "URL"
  )]
  pub classify_endpoint: Url,

  /// 推理服务访问令牌
  #[arg(long, env = "HF_TOKEN", hide_env_values = true, value_name = "TOKEN")]
  pub api_token: Option<String>,

  /// 单次推理请求超时（秒）
  #[arg(long, default_value = "120", value_name = "SECONDS")]
  pub model_timeout_secs: u64,
}

/// 批处理参数
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
  /// 图像宽高下限（像素）
  #[arg(long, default_value_t = DEFAULT_MIN_DIMENSION, value_name = "PIXELS")]
  pub min_dimension: u32,

  /// 单张图像下载超时（秒）
  #[arg(long, default_value = "5", value_name = "SECONDS")]
  pub image_timeout_secs: u64,

  /// 页面抓取超时（秒）
  #[arg(long, default_value = "10", value_name = "SECONDS")]
  pub page_timeout_secs: u64,

  /// 生成描述的最大新 token 数
  #[arg(long, default_value_t = DEFAULT_MAX_NEW_TOKENS, value_name = "COUNT")]
  pub max_new_tokens: u32,

  /// HTTP User-Agent
  #[arg(long, default_value = DEFAULT_USER_AGENT, value_name = "AGENT")]
  pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
  pub caption_endpoint: Url,
  pub classify_endpoint: Url,
  pub api_token: Option<String>,
  pub timeout: Duration,
}

impl From<&ModelArgs> for ModelConfig {
  fn from(args: &ModelArgs) -> Self {
    Self {
      caption_endpoint: args.caption_endpoint.clone(),
      classify_endpoint: args.classify_endpoint.clone(),
      api_token: args.api_token.clone(),
      timeout: Duration::from_secs(args.model_timeout_secs),
    }
  }
}

impl ModelConfig {
  fn builder(&self, endpoint: &Url, client: &Client) -> Result<RemoteModelBuilder, ModelError> {
    Ok(
      RemoteModelBuilder::from_url(endpoint)?
        .token(self.api_token.clone())
        .timeout(self.timeout)
        .client(client.clone()),
    )
  }

  pub fn captioner(
    &self,
    client: &Client,
    max_new_tokens: Option<u32>,
  ) -> Result<RemoteCaptioner, ModelError> {
    self
      .builder(&self.caption_endpoint, client)?
      .build_captioner(max_new_tokens)
  }

  pub fn classifier(
    &self,
    client: &Client,
    top_k: Option<usize>,
  ) -> Result<RemoteClassifier, ModelError> {
    self
      .builder(&self.classify_endpoint, client)?
      .build_classifier(top_k)
  }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
  pub min_dimension: u32,
  pub image_timeout: Duration,
  pub page_timeout: Duration,
  pub max_new_tokens: Option<u32>,
  pub user_agent: String,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      min_dimension: DEFAULT_MIN_DIMENSION,
      image_timeout: Duration::from_secs(5),
      page_timeout: Duration::from_secs(10),
      max_new_tokens: Some(DEFAULT_MAX_NEW_TOKENS),
      user_agent: DEFAULT_USER_AGENT.to_string(),
    }
  }
}

impl From<&PipelineArgs> for PipelineConfig {
  fn from(args: &PipelineArgs) -> Self {
    Self {
      min_dimension: args.min_dimension,
      image_timeout: Duration::from_secs(args.image_timeout_secs),
      page_timeout: Duration::from_secs(args.page_timeout_secs),
      // 0 表示不限制
      max_new_tokens: Some(args.max_new_tokens).filter(|n| *n > 0),
      user_agent: args.user_agent.clone(),
    }
  }
}

/// 共享的阻塞 HTTP 客户端，超时按请求单独设置
pub fn http_client(user_agent: &str) -> reqwest::Result<Client> {
  Client::builder().user_agent(user_agent).build()
}

pub fn default_user_agent() -> &'static str {
  DEFAULT_USER_AGENT
}

/// 初始化日志，默认 info 级别，可用 RUST_LOG 覆盖
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

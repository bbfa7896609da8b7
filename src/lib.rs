// 该文件是 Tuyu （图语） 项目的一部分。
// src/lib.rs - 库主文件
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

pub mod config;
pub mod fetch;
pub mod frame;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod task;

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 单张图像处理失败的阶段分类
///
/// 批处理中每张图像的失败都会归入其中一类，仅用于统计与日志，
/// 不会中断整个任务。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// 网络请求或文件读取失败
  Fetch,
  /// 图像数据无法解码
  Decode,
  /// 图像尺寸小于下限
  SizeRejected,
  /// 模型生成失败
  Generate,
}

impl std::fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      ErrorKind::Fetch => "fetch",
      ErrorKind::Decode => "decode",
      ErrorKind::SizeRejected => "size-rejected",
      ErrorKind::Generate => "generate",
    };
    f.write_str(name)
  }
}

/// 判断一次 HTTP 失败是否值得重试：超时、连接失败、429 与 5xx。
pub(crate) fn is_retryable_request(err: &reqwest::Error) -> bool {
  if err.is_timeout() || err.is_connect() {
    return true;
  }
  err.status().is_some_and(is_retryable_status)
}

pub(crate) fn is_retryable_status(status: reqwest::StatusCode) -> bool {
  status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/source.rs - 图像来源枚举
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

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use thiserror::Error;
use url::Url;

use crate::FromUrl;

#[cfg(feature = "local_dir")]
mod local_dir;
#[cfg(feature = "local_dir")]
pub use self::local_dir::{IMAGE_EXTENSIONS, LocalDirSource};

#[cfg(feature = "web_page")]
mod web_page;
#[cfg(feature = "web_page")]
pub use self::web_page::{WebPageSource, extract_image_urls, normalize_src};

/// 图像所在位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
  Local(PathBuf),
  Remote(Url),
}

/// 一个待处理的图像来源
///
/// `id` 是写入结果文件时使用的标识：本地文件取文件名，远程图像取链接原文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
  id: String,
  origin: Origin,
}

impl ImageSource {
  pub fn local(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let id = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.display().to_string());
    Self {
      id,
      origin: Origin::Local(path),
    }
  }

  pub fn remote(link: &str) -> Result<Self, url::ParseError> {
    let url = Url::parse(link)?;
    Ok(Self {
      id: link.to_string(),
      origin: Origin::Remote(url),
    })
  }

  /// 以 `http://` 或 `https://` 开头视为远程图像，否则视为本地路径
  pub fn from_location(location: &str) -> Result<Self, url::ParseError> {
    if location.starts_with("http://") || location.starts_with("https://") {
      Self::remote(location)
    } else {
      Ok(Self::local(location))
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn origin(&self) -> &Origin {
    &self.origin
  }

  pub fn is_remote(&self) -> bool {
    matches!(self.origin, Origin::Remote(_))
  }
}

impl fmt::Display for ImageSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.id)
  }
}

#[derive(Error, Debug)]
pub enum SourceError {
  #[error("目录不存在: {}", .0.display())]
  DirectoryNotFound(PathBuf),
  #[error("读取目录失败: {0}")]
  IoError(#[from] std::io::Error),
  #[error("页面请求失败: {0}")]
  PageFetch(#[from] reqwest::Error),
  #[error("页面返回非成功状态 {status}: {url}")]
  PageStatus {
    url: Url,
    status: reqwest::StatusCode,
  },
  #[error("HTML 选择器无效: {0}")]
  Selector(String),
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
}

impl SourceError {
  pub fn is_retryable(&self) -> bool {
    match self {
      SourceError::PageFetch(err) => crate::is_retryable_request(err),
      SourceError::PageStatus { status, .. } => crate::is_retryable_status(*status),
      _ => false,
    }
  }
}

/// 一次性发现全部图像来源
pub trait Discover {
  fn discover(&self, client: &Client) -> Result<Vec<ImageSource>, SourceError>;
}

pub enum SourceWrapper {
  #[cfg(feature = "local_dir")]
  LocalDir(LocalDirSource),
  #[cfg(feature = "web_page")]
  WebPage(WebPageSource),
}

impl FromUrl for SourceWrapper {
  type Error = SourceError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "local_dir")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == LocalDirSource::SCHEME {
        return Ok(SourceWrapper::LocalDir(LocalDirSource::from_url(url)?));
      }
    }
    #[cfg(feature = "web_page")]
    {
      if WebPageSource::accepts(url) {
        return Ok(SourceWrapper::WebPage(WebPageSource::from_url(url)?));
      }
    }
    Err(SourceError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl SourceWrapper {
  #[cfg(feature = "local_dir")]
  pub fn local_dir(directory: impl AsRef<Path>) -> Self {
    SourceWrapper::LocalDir(LocalDirSource::new(directory))
  }

  #[cfg(feature = "web_page")]
  pub fn web_page(page: Url) -> Self {
    SourceWrapper::WebPage(WebPageSource::new(page))
  }

  /// 设置页面请求超时，对本地目录无效
  #[cfg_attr(not(feature = "web_page"), allow(unused_variables))]
  pub fn with_page_timeout(self, timeout: std::time::Duration) -> Self {
    match self {
      #[cfg(feature = "local_dir")]
      SourceWrapper::LocalDir(_) => self,
      #[cfg(feature = "web_page")]
      SourceWrapper::WebPage(page) => SourceWrapper::WebPage(page.with_timeout(timeout)),
    }
  }

  pub fn describe(&self) -> String {
    match self {
      #[cfg(feature = "local_dir")]
      SourceWrapper::LocalDir(dir) => format!("本地目录 {}", dir.directory().display()),
      #[cfg(feature = "web_page")]
      SourceWrapper::WebPage(page) => format!("网页 {}", page.page()),
    }
  }
}

impl Discover for SourceWrapper {
  fn discover(&self, client: &Client) -> Result<Vec<ImageSource>, SourceError> {
    match self {
      #[cfg(feature = "local_dir")]
      SourceWrapper::LocalDir(dir) => dir.discover(client),
      #[cfg(feature = "web_page")]
      SourceWrapper::WebPage(page) => page.discover(client),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn local_source_uses_file_name_as_id() {
    let source = ImageSource::local("/tmp/photos/cat.png");
    assert_eq!(source.id(), "cat.png");
    assert!(!source.is_remote());
  }

  #[test]
  fn remote_source_keeps_link_verbatim() {
    let source = ImageSource::remote("https://example.com/a.png").unwrap();
    assert_eq!(source.to_string(), "https://example.com/a.png");
    assert!(source.is_remote());
  }

  #[test]
  fn location_picks_origin_by_prefix() {
    assert!(ImageSource::from_location("http://example.com/x.jpg").unwrap().is_remote());
    assert!(!ImageSource::from_location("images/x.jpg").unwrap().is_remote());
  }

  #[cfg(feature = "local_dir")]
  #[test]
  fn page_timeout_leaves_directory_untouched() {
    let source = SourceWrapper::local_dir("/tmp/photos")
      .with_page_timeout(std::time::Duration::from_secs(1));
    match source {
      SourceWrapper::LocalDir(dir) => assert_eq!(dir.directory(), Path::new("/tmp/photos")),
      #[allow(unreachable_patterns)]
      _ => panic!("本地目录来源被替换"),
    }
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("ftp://example.com/images/").unwrap();
    assert!(matches!(
      SourceWrapper::from_url(&url),
      Err(SourceError::SchemeMismatch(scheme)) if scheme == "ftp"
    ));
  }
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/source/web_page.rs - 网页图像来源
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

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
  FromUrl,
  source::{Discover, ImageSource, SourceError},
};

const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// 抓取网页并收集其中所有 `<img>` 的链接
#[derive(Debug, Clone)]
pub struct WebPageSource {
  page: Url,
  timeout: Duration,
}

impl FromUrl for WebPageSource {
  type Error = SourceError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if !Self::accepts(url) {
      return Err(SourceError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(Self::new(url.clone()))
  }
}

impl WebPageSource {
  pub fn new(page: Url) -> Self {
    Self {
      page,
      timeout: DEFAULT_PAGE_TIMEOUT,
    }
  }

  pub fn accepts(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn page(&self) -> &Url {
    &self.page
  }

  fn fetch_page(&self, client: &Client) -> Result<String, SourceError> {
    info!("抓取页面: {}", self.page);
    let response = client
      .get(self.page.clone())
      .timeout(self.timeout)
      .send()?;

    let status = response.status();
    if !status.is_success() {
      error!("页面返回状态 {}: {}", status, self.page);
      return Err(SourceError::PageStatus {
        url: self.page.clone(),
        status,
      });
    }

    let body = response.text()?;
    debug!("页面大小: {} 字节", body.len());
    Ok(body)
  }
}

impl Discover for WebPageSource {
  fn discover(&self, client: &Client) -> Result<Vec<ImageSource>, SourceError> {
    let body = self.fetch_page(client)?;
    let links = extract_image_urls(&body)?;

    let mut sources = Vec::with_capacity(links.len());
    for link in links {
      match ImageSource::remote(&link) {
        Ok(source) => sources.push(source),
        Err(e) => warn!("无法解析图像链接 {}: {}", link, e),
      }
    }
    Ok(sources)
  }
}

/// 按文档顺序返回所有 `<img>` 的规范化链接，无效条目被丢弃
pub fn extract_image_urls(html: &str) -> Result<Vec<String>, SourceError> {
  let selector = Selector::parse("img").map_err(|e| SourceError::Selector(e.to_string()))?;
  let document = Html::parse_document(html);

  let mut total = 0usize;
  let links: Vec<String> = document
    .select(&selector)
    .inspect(|_| total += 1)
    .filter_map(|element| element.value().attr("src"))
    .filter_map(normalize_src)
    .collect();

  info!("找到 {} 个 img 标签, 其中 {} 个可用", total, links.len());
  Ok(links)
}

/// 规范化 `src` 属性
///
/// - 空值丢弃
/// - `//host/...` 补全为 `https://host/...`
/// - 非 `http://`/`https://` 丢弃
/// - 含 `.svg` 丢弃
pub fn normalize_src(src: &str) -> Option<String> {
  if src.is_empty() {
    return None;
  }

  let link = match src.strip_prefix("//") {
    Some(rest) => format!("https://{}", rest),
    None => src.to_string(),
  };

  if !(link.starts_with("http://") || link.starts_with("https://")) {
    debug!("跳过非 HTTP 链接: {}", link);
    return None;
  }
  if link.contains(".svg") {
    debug!("跳过 SVG: {}", link);
    return None;
  }

  Some(link)
}

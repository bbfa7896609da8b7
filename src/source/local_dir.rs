// 该文件是 Tuyu （图语） 项目的一部分。
// src/source/local_dir.rs - 本地目录图像来源
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

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  source::{Discover, ImageSource, SourceError},
};

/// 参与处理的扩展名，大小写敏感
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// 枚举目录下（不递归）扩展名匹配的普通文件
#[derive(Debug, Clone)]
pub struct LocalDirSource {
  directory: PathBuf,
}

impl FromUrlWithScheme for LocalDirSource {
  const SCHEME: &'static str = "file";
}

impl FromUrl for LocalDirSource {
  type Error = SourceError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(SourceError::SchemeMismatch(url.scheme().to_string()));
    }

    let directory = url
      .to_file_path()
      .map_err(|_| SourceError::SchemeMismatch(format!("无法转换为本地路径: {}", url)))?;

    Ok(Self { directory })
  }
}

impl LocalDirSource {
  pub fn new(directory: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
    }
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }
}

fn has_image_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

impl Discover for LocalDirSource {
  fn discover(&self, _client: &Client) -> Result<Vec<ImageSource>, SourceError> {
    if !self.directory.is_dir() {
      error!("目录不存在: {}", self.directory.display());
      return Err(SourceError::DirectoryNotFound(self.directory.clone()));
    }

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(&self.directory)? {
      let path = entry?.path();
      if path.is_file() && has_image_extension(&path) {
        sources.push(ImageSource::local(path));
      } else {
        debug!("忽略: {}", path.display());
      }
    }

    Ok(sources)
  }
}

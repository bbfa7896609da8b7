// 该文件是 Tuyu （图语） 项目的一部分。
// src/output/caption_file.rs - 描述记录文件
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

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
  output::{OutputError, Render},
  source::ImageSource,
};

/// 网页抓取默认输出
pub const PAGE_OUTPUT: &str = "captions.txt";
/// 本地目录默认输出
pub const LOCAL_OUTPUT: &str = "local_captions.txt";
/// 命令行 `--local-dir` 默认输出
pub const CLI_LOCAL_OUTPUT: &str = LOCAL_OUTPUT;
/// 命令行 `--url` 默认输出
pub const CLI_URL_OUTPUT: &str = "url_captions.txt";

/// 每条成功结果写一行 `<来源>: <描述>`
///
/// 文件在创建时截断，每写一行立即刷新。
pub struct CaptionFileOutput {
  path: PathBuf,
  writer: BufWriter<File>,
  records: usize,
}

impl CaptionFileOutput {
  pub fn create(path: impl AsRef<Path>) -> Result<Self, OutputError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let file = File::create(&path)?;
    debug!("打开输出文件: {}", path.display());
    Ok(Self {
      path,
      writer: BufWriter::new(file),
      records: 0,
    })
  }

  pub fn records(&self) -> usize {
    self.records
  }
}

impl Render<String> for CaptionFileOutput {
  type Error = OutputError;

  fn render_result(&mut self, source: &ImageSource, caption: &String) -> Result<(), Self::Error> {
    writeln!(self.writer, "{}: {}", source.id(), single_line(caption))?;
    self.writer.flush()?;
    self.records += 1;
    Ok(())
  }

  fn finish(&mut self) -> Result<(), Self::Error> {
    self.writer.flush()?;
    info!(
      "已保存 {} 条描述到 {}",
      self.records,
      self.path.display()
    );
    Ok(())
  }
}

/// 每条记录占一行，描述内部的换行替换为空格
fn single_line(caption: &str) -> String {
  caption.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

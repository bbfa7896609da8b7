// 该文件是 Tuyu （图语） 项目的一部分。
// src/output/console.rs - 终端结果展示
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

use std::io::Write;

use crate::{
  model::Classification,
  output::{OutputError, Render},
  source::ImageSource,
};

const DEFAULT_TOP_K: usize = 3;

/// 把描述或分类的前几名写到终端（或任意 writer）
pub struct ConsoleOutput<W> {
  writer: W,
  top_k: usize,
}

impl ConsoleOutput<std::io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }
}

impl<W: Write> ConsoleOutput<W> {
  pub fn new(writer: W) -> Self {
    Self {
      writer,
      top_k: DEFAULT_TOP_K,
    }
  }

  pub fn with_top_k(mut self, top_k: usize) -> Self {
    self.top_k = top_k;
    self
  }

  pub fn into_inner(self) -> W {
    self.writer
  }
}

impl<W: Write> Render<String> for ConsoleOutput<W> {
  type Error = OutputError;

  fn render_result(&mut self, _source: &ImageSource, caption: &String) -> Result<(), Self::Error> {
    writeln!(self.writer, "{}", caption)?;
    Ok(())
  }

  fn finish(&mut self) -> Result<(), Self::Error> {
    self.writer.flush()?;
    Ok(())
  }
}

impl<W: Write> Render<Classification> for ConsoleOutput<W> {
  type Error = OutputError;

  fn render_result(
    &mut self,
    _source: &ImageSource,
    result: &Classification,
  ) -> Result<(), Self::Error> {
    for (rank, prediction) in result.top_k(self.top_k).iter().enumerate() {
      writeln!(
        self.writer,
        "{}. {}: {:.2}%",
        rank + 1,
        prediction.label,
        prediction.score * 100.0
      )?;
    }
    Ok(())
  }

  fn finish(&mut self) -> Result<(), Self::Error> {
    self.writer.flush()?;
    Ok(())
  }
}

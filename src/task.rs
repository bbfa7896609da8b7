// 该文件是 Tuyu （图语） 项目的一部分。
// src/task.rs - 任务执行
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
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{
  ErrorKind,
  fetch::ImageFetcher,
  frame::DecodedImage,
  model::Model,
  output::Render,
  source::ImageSource,
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 注册 Ctrl-C 处理：第一次设置停止标志，第二次直接退出进程
pub fn interrupt_flag() -> Result<Arc<AtomicBool>, ctrlc::Error> {
  let flag = Arc::new(AtomicBool::new(false));
  let handler_flag = flag.clone();
  ctrlc::set_handler(move || {
    if handler_flag.swap(true, Ordering::SeqCst) {
      warn!("再次收到中断信号，强制退出");
      std::process::exit(130);
    }
    info!("收到中断信号，处理完当前图像后退出...");
  })?;
  Ok(flag)
}

/// 只处理第一张图像，错误直接返回
pub struct OneShotTask {
  fetcher: ImageFetcher,
}

impl OneShotTask {
  pub fn new(fetcher: ImageFetcher) -> Self {
    Self { fetcher }
  }
}

impl<
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: IntoIterator<Item = ImageSource>,
  M: Model<Input = DecodedImage, Output = D, Error = ME>,
  O: Render<D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = D;
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, mut output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let source = input
      .into_iter()
      .next()
      .ok_or_else(|| anyhow::anyhow!("没有输入图像"))?;
    let image = self.fetcher.fetch(&source)?;
    info!(
      "图像获取成功 ({}x{})，开始推理...",
      image.width(),
      image.height()
    );
    let now = Instant::now();
    let result = model.infer(&image)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&source, &result)?;
    output.finish()?;

    Ok(result)
  }
}

/// 一次批处理的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub discovered: usize,
  pub processed: usize,
  pub written: usize,
  pub rejected: usize,
  pub fetch_failed: usize,
  pub decode_failed: usize,
  pub generate_failed: usize,
  pub interrupted: bool,
}

impl RunSummary {
  fn record(&mut self, kind: ErrorKind) {
    match kind {
      ErrorKind::Fetch => self.fetch_failed += 1,
      ErrorKind::Decode => self.decode_failed += 1,
      ErrorKind::SizeRejected => self.rejected += 1,
      ErrorKind::Generate => self.generate_failed += 1,
    }
  }

  pub fn failed(&self) -> usize {
    self.fetch_failed + self.decode_failed + self.generate_failed
  }
}

impl fmt::Display for RunSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "发现 {} 张, 处理 {} 张, 写入 {} 条, 尺寸过小 {} 张, 失败 {} 张 (获取 {}, 解码 {}, 生成 {})",
      self.discovered,
      self.processed,
      self.written,
      self.rejected,
      self.failed(),
      self.fetch_failed,
      self.decode_failed,
      self.generate_failed
    )?;
    if self.interrupted {
      write!(f, ", 已中断")?;
    }
    Ok(())
  }
}

/// 逐张处理全部来源
///
/// 单张图像的获取、解码、尺寸、生成错误只记录并跳过；
/// 输出写入失败会中止任务。
pub struct CaptionTask {
  fetcher: ImageFetcher,
  stop: Option<Arc<AtomicBool>>,
}

impl CaptionTask {
  pub fn new(fetcher: ImageFetcher) -> Self {
    Self {
      fetcher,
      stop: None,
    }
  }

  pub fn with_stop_flag(mut self, stop: Option<Arc<AtomicBool>>) -> Self {
    self.stop = stop;
    self
  }

  fn should_stop(&self) -> bool {
    self
      .stop
      .as_ref()
      .is_some_and(|flag| flag.load(Ordering::SeqCst))
  }
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: IntoIterator<Item = ImageSource, IntoIter: ExactSizeIterator>,
  M: Model<Input = DecodedImage, Output = String, Error = ME>,
  O: Render<String, Error = RE>,
> Task<I, M, O> for CaptionTask
{
  type Output = RunSummary;
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, mut output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let input = input.into_iter();
    let mut summary = RunSummary {
      discovered: input.len(),
      ..RunSummary::default()
    };

    for source in input {
      if self.should_stop() {
        warn!("中断信号接收，退出任务循环");
        summary.interrupted = true;
        break;
      }
      summary.processed += 1;
      info!("处理图像: {}", source);

      let image = match self.fetcher.fetch(&source) {
        Ok(image) => image,
        Err(e) if e.kind() == ErrorKind::SizeRejected => {
          info!("  -> 跳过过小图像: {}", e);
          summary.record(e.kind());
          continue;
        }
        Err(e) => {
          warn!(
            "  -> 无法处理图像 {} ({}, 可重试: {}): {}",
            source,
            e.kind(),
            e.is_retryable(),
            e
          );
          summary.record(e.kind());
          continue;
        }
      };

      let now = Instant::now();
      let caption = match model.infer(&image) {
        Ok(caption) => caption,
        Err(e) => {
          warn!("  -> 生成描述失败 {}: {}", source, e);
          summary.record(ErrorKind::Generate);
          continue;
        }
      };
      debug!("推理完成，耗时: {:.2?}", now.elapsed());

      output.render_result(&source, &caption)?;
      summary.written += 1;
      info!("  -> 描述: {}", caption);
    }

    output.finish()?;
    info!("任务完成: {}", summary);
    Ok(summary)
  }
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/frame.rs - 解码后的 RGB 图像
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

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};

/// 图像宽高的默认下限，小于该值的图像多为图标或占位图
pub const DEFAULT_MIN_DIMENSION: u32 = 100;

/// 已解码为 RGB8 的图像，用完即丢弃
#[derive(Debug, Clone)]
pub struct DecodedImage {
  image: RgbImage,
}

impl From<RgbImage> for DecodedImage {
  fn from(image: RgbImage) -> Self {
    Self { image }
  }
}

impl From<DynamicImage> for DecodedImage {
  fn from(image: DynamicImage) -> Self {
    Self {
      image: image.to_rgb8(),
    }
  }
}

impl DecodedImage {
  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn dimensions(&self) -> (u32, u32) {
    self.image.dimensions()
  }

  pub fn as_rgb(&self) -> &RgbImage {
    &self.image
  }

  /// 宽和高都不小于 `minimum` 时返回 true
  pub fn meets_minimum(&self, minimum: u32) -> bool {
    self.width() >= minimum && self.height() >= minimum
  }

  /// 编码为 PNG，用于上传到推理服务
  pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    self.image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
  }
}

// 该文件是 Tuyu （图语） 项目的一部分。
// src/model/classification.rs - 分类结果
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

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  pub label: String,
  pub score: f32,
}

/// 标签到置信度的映射，保持模型给出的标签顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
  predictions: Vec<Prediction>,
}

impl From<Vec<Prediction>> for Classification {
  fn from(predictions: Vec<Prediction>) -> Self {
    Self { predictions }
  }
}

impl Classification {
  /// 对原始 logits 做 softmax
  ///
  /// 标签多于 logits 时多余标签被忽略，缺少的标签记为 `class_<i>`。
  pub fn from_logits(labels: &[String], logits: &[f32]) -> Self {
    let max_logit = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&x| (x - max_logit).exp()).collect();
    let sum: f32 = exp.iter().sum();

    let predictions = exp
      .into_iter()
      .enumerate()
      .map(|(i, e)| Prediction {
        label: labels
          .get(i)
          .cloned()
          .unwrap_or_else(|| format!("class_{}", i)),
        score: e / sum,
      })
      .collect();

    Self { predictions }
  }

  pub fn len(&self) -> usize {
    self.predictions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.predictions.is_empty()
  }

  pub fn get(&self, label: &str) -> Option<f32> {
    self
      .predictions
      .iter()
      .find(|p| p.label == label)
      .map(|p| p.score)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Prediction> {
    self.predictions.iter()
  }

  /// 置信度降序的前 k 个，同分时保持原顺序
  pub fn top_k(&self, k: usize) -> Vec<Prediction> {
    let mut sorted = self.predictions.clone();
    sorted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    sorted.truncate(k);
    sorted
  }
}

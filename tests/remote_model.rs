// 该文件是 Tuyu （图语） 项目的一部分。
// tests/remote_model.rs - 远程推理服务测试
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

mod support;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::RgbImage;
use support::{Route, TestServer, client};
use tuyu::{
  FromUrl,
  config::PipelineConfig,
  frame::DecodedImage,
  model::{Model, ModelError, RemoteModelBuilder},
  output::{ConsoleOutput, Render},
  pipeline::Pipeline,
  source::{ImageSource, SourceWrapper},
};
use url::Url;

fn builder(server: &TestServer, path: &str) -> RemoteModelBuilder {
  let url = Url::parse(&server.url(path)).unwrap();
  RemoteModelBuilder::from_url(&url).unwrap().client(client())
}

fn image(width: u32, height: u32) -> DecodedImage {
  DecodedImage::from(RgbImage::new(width, height))
}

#[test]
fn caption_request_carries_image_token_and_limit() {
  let server = TestServer::start(vec![(
    "/models/blip",
    Route::json(r#"[{"generated_text": "a cat sitting on a sofa"}]"#),
  )]);
  let captioner = builder(&server, "/models/blip")
    .token(Some("secret".to_string()))
    .build_captioner(Some(50))
    .unwrap();

  let caption = captioner.infer(&image(160, 120)).unwrap();
  assert_eq!(caption, "a cat sitting on a sofa");

  let requests = server.requests();
  assert_eq!(requests.len(), 1);
  let request = &requests[0];
  assert_eq!(request.method, "POST");
  assert_eq!(request.header("authorization"), Some("Bearer secret"));

  let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
  assert_eq!(body["parameters"]["max_new_tokens"], 50);
  assert_eq!(body["options"]["wait_for_model"], true);
  let png = STANDARD.decode(body["inputs"].as_str().unwrap()).unwrap();
  let uploaded = image::load_from_memory(&png).unwrap();
  assert_eq!((uploaded.width(), uploaded.height()), (160, 120));
}

#[test]
fn unbounded_caption_sends_no_limit_and_no_token() {
  let server = TestServer::start(vec![(
    "/caption",
    Route::json(r#"{"generated_text": "a lighthouse"}"#),
  )]);
  let captioner = builder(&server, "/caption").build_captioner(None).unwrap();

  assert_eq!(captioner.infer(&image(10, 10)).unwrap(), "a lighthouse");

  let request = &server.requests()[0];
  assert_eq!(request.header("authorization"), None);
  let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
  assert_eq!(body["parameters"], serde_json::json!({}));
}

#[test]
fn overloaded_service_is_retryable() {
  let server = TestServer::start(vec![("/busy", Route::status(503))]);
  let captioner = builder(&server, "/busy").build_captioner(Some(50)).unwrap();

  let err = captioner.infer(&image(10, 10)).unwrap_err();
  assert!(matches!(err, ModelError::StatusError { status, .. } if status.as_u16() == 503));
  assert!(err.is_retryable());
}

#[test]
fn malformed_response_is_not_retryable() {
  let server = TestServer::start(vec![("/odd", Route::json(r#"{"unexpected": true}"#))]);
  let captioner = builder(&server, "/odd").build_captioner(None).unwrap();

  let err = captioner.infer(&image(10, 10)).unwrap_err();
  assert!(matches!(err, ModelError::ResponseError(_)));
  assert!(!err.is_retryable());
}

#[test]
fn classifier_returns_ranked_labels() {
  let server = TestServer::start(vec![(
    "/resnet",
    Route::json(
      r#"[
        {"label": "tabby, tabby cat", "score": 0.62},
        {"label": "tiger cat", "score": 0.21},
        {"label": "Egyptian cat", "score": 0.12},
        {"label": "lynx", "score": 0.05}
      ]"#,
    ),
  )]);
  let classifier = builder(&server, "/resnet")
    .build_classifier(Some(3))
    .unwrap();

  let result = classifier.infer(&image(224, 224)).unwrap();
  let top: Vec<String> = result.top_k(3).into_iter().map(|p| p.label).collect();
  assert_eq!(top, vec!["tabby, tabby cat", "tiger cat", "Egyptian cat"]);

  let body: serde_json::Value = serde_json::from_slice(&server.requests()[0].body).unwrap();
  assert_eq!(body["parameters"]["top_k"], 3);
}

#[test]
fn unbounded_classifier_keeps_full_distribution() {
  let server = TestServer::start(vec![(
    "/resnet",
    Route::json(
      r#"[
        {"label": "lynx", "score": 0.05},
        {"label": "tabby, tabby cat", "score": 0.62},
        {"label": "Egyptian cat", "score": 0.12},
        {"label": "tiger cat", "score": 0.21}
      ]"#,
    ),
  )]);
  let classifier = builder(&server, "/resnet").build_classifier(None).unwrap();

  let result = classifier.infer(&image(224, 224)).unwrap();
  assert_eq!(result.len(), 4);
  assert_eq!(result.get("lynx"), Some(0.05));

  let body: serde_json::Value = serde_json::from_slice(&server.requests()[0].body).unwrap();
  assert_eq!(body["parameters"], serde_json::json!({}));

  let mut console = ConsoleOutput::new(Vec::new()).with_top_k(3);
  console
    .render_result(&ImageSource::local("cat.jpg"), &result)
    .unwrap();
  assert_eq!(
    String::from_utf8(console.into_inner()).unwrap(),
    "1. tabby, tabby cat: 62.00%\n2. tiger cat: 21.00%\n3. Egyptian cat: 12.00%\n"
  );
}

#[test]
fn generation_failures_are_skipped_in_batch() {
  let server = TestServer::start(vec![("/busy", Route::status(500))]);
  let captioner = builder(&server, "/busy").build_captioner(Some(50)).unwrap();

  let dir = tempfile::tempdir().unwrap();
  let images = dir.path().join("images");
  std::fs::create_dir(&images).unwrap();
  RgbImage::new(150, 150).save(images.join("a.png")).unwrap();
  RgbImage::new(150, 150).save(images.join("b.png")).unwrap();
  let out = dir.path().join("local_captions.txt");

  let summary = Pipeline::new(PipelineConfig::default(), client(), captioner)
    .run(SourceWrapper::local_dir(&images), &out)
    .unwrap();

  assert_eq!(summary.processed, 2);
  assert_eq!(summary.generate_failed, 2);
  assert_eq!(summary.written, 0);
  assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
  assert_eq!(server.requests().len(), 2);
}

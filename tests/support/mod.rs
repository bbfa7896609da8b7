// 该文件是 Tuyu （图语） 项目的一部分。
// tests/support/mod.rs - 测试用 HTTP 服务与图像工具
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

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
  Router,
  body::Bytes,
  extract::State,
  http::{HeaderMap, Method, StatusCode, Uri, header},
  response::{IntoResponse, Response},
};
use image::{ImageFormat, RgbImage};
use reqwest::blocking::Client;
use tokio::runtime::Runtime;

#[derive(Clone)]
pub struct Route {
  pub status: u16,
  pub content_type: &'static str,
  pub body: Vec<u8>,
}

impl Route {
  pub fn png(width: u32, height: u32) -> Self {
    Route {
      status: 200,
      content_type: "image/png",
      body: png_bytes(width, height),
    }
  }

  pub fn html(body: &str) -> Self {
    Route {
      status: 200,
      content_type: "text/html; charset=utf-8",
      body: body.as_bytes().to_vec(),
    }
  }

  pub fn json(body: &str) -> Self {
    Route {
      status: 200,
      content_type: "application/json",
      body: body.as_bytes().to_vec(),
    }
  }

  pub fn status(status: u16) -> Self {
    Route {
      status,
      content_type: "text/plain",
      body: format!("status {}", status).into_bytes(),
    }
  }
}

impl IntoResponse for Route {
  fn into_response(self) -> Response {
    let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
  }
}

#[derive(Debug, Clone)]
pub struct Recorded {
  pub method: String,
  pub path: String,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl Recorded {
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }
}

#[derive(Clone)]
struct ServerState {
  routes: Arc<HashMap<String, Route>>,
  requests: Arc<Mutex<Vec<Recorded>>>,
}

/// 记录每个请求并按路径返回固定响应，未知路径返回 404
async fn respond(
  State(state): State<ServerState>,
  method: Method,
  uri: Uri,
  headers: HeaderMap,
  body: Bytes,
) -> Route {
  let headers = headers
    .iter()
    .map(|(name, value)| {
      (
        name.as_str().to_string(),
        value.to_str().unwrap_or_default().to_string(),
      )
    })
    .collect();
  state.requests.lock().unwrap().push(Recorded {
    method: method.to_string(),
    path: uri.path().to_string(),
    headers,
    body: body.to_vec(),
  });

  state
    .routes
    .get(uri.path())
    .cloned()
    .unwrap_or_else(|| Route::status(404))
}

/// 在后台运行时上提供 axum 服务，随测试结束一起销毁
pub struct TestServer {
  addr: SocketAddr,
  requests: Arc<Mutex<Vec<Recorded>>>,
  _runtime: Runtime,
}

impl TestServer {
  pub fn start(routes: Vec<(&str, Route)>) -> Self {
    let runtime = tokio::runtime::Builder::new_multi_thread()
      .worker_threads(1)
      .enable_all()
      .build()
      .unwrap();

    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
      routes: Arc::new(
        routes
          .into_iter()
          .map(|(path, route)| (path.to_string(), route))
          .collect(),
      ),
      requests: requests.clone(),
    };
    let app = Router::new().fallback(respond).with_state(state);

    let listener = runtime
      .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
      .unwrap();
    let addr = listener.local_addr().unwrap();
    runtime.spawn(async move {
      let _ = axum::serve(listener, app).await;
    });

    TestServer {
      addr,
      requests,
      _runtime: runtime,
    }
  }

  pub fn url(&self, path: &str) -> String {
    format!("http://{}{}", self.addr, path)
  }

  pub fn requests(&self) -> Vec<Recorded> {
    self.requests.lock().unwrap().clone()
  }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
  let mut buffer = Cursor::new(Vec::new());
  RgbImage::new(width, height)
    .write_to(&mut buffer, ImageFormat::Png)
    .unwrap();
  buffer.into_inner()
}

/// 测试环境可能配置了代理，本地服务需绕过
pub fn client() -> Client {
  Client::builder().no_proxy().build().unwrap()
}

use thiserror::Error;

use crate::handler::HandlerResponse;

/// Policy-driven rejections. Each maps to a specific status code and is
/// returned as a normal response, never retried.
#[derive(Error, Debug)]
pub enum Rejection {
  #[error("Ignored bucket: {0}")]
  WrongBucket(String),
  #[error("Unsupported file type: {0}")]
  UnsupportedFileType(String),
  #[error("No such key: {0}")]
  NoSuchKey(String),
}

impl Rejection {
  pub fn status_code(&self) -> u16 {
    match self {
      Rejection::WrongBucket(_) => 403,
      Rejection::UnsupportedFileType(_) => 400,
      Rejection::NoSuchKey(_) => 404,
    }
  }
}

impl From<Rejection> for HandlerResponse {
  fn from(rejection: Rejection) -> Self {
    HandlerResponse {
      status_code: rejection.status_code(),
      body: rejection.to_string(),
    }
  }
}

use anyhow::{anyhow, Context, Result};
use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::LambdaEvent;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::Config;

mod error;
pub mod local_storage;
mod s3;
pub mod storage;
pub mod thumbnail;

use self::error::Rejection;
use self::storage::GetObjectResult;

/// Invocation result record, serialized the way the invoking
/// infrastructure expects it.
#[derive(Serialize, Debug)]
pub struct HandlerResponse {
  #[serde(rename = "statusCode")]
  pub status_code: u16,
  pub body: String,
}

#[derive(Clone)]
pub struct HandlerState {
  storage_client: Arc<dyn storage::Storage>,
  config: Arc<Config>,
}

impl HandlerState {
  pub fn new(storage_client: Arc<dyn storage::Storage>, config: Config) -> Self {
    Self {
      storage_client,
      config: Arc::new(config),
    }
  }
}

/// Builds the process-wide handler state backed by the real S3 client.
pub async fn bootstrap(cfg: Config) -> Result<HandlerState> {
  let shared_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
  let client = aws_sdk_s3::Client::new(&shared_config);

  Ok(HandlerState::new(
    Arc::new(s3::Client::new(client)),
    cfg,
  ))
}

/// Entry point for one invocation. Rejections come back as their mapped
/// status codes; everything else is caught here and turned into a 500.
pub async fn handle(state: &HandlerState, event: LambdaEvent<S3Event>) -> HandlerResponse {
  match process(state, event.payload).await {
    Ok(response) => response,
    Err(err) => {
      error!("unhandled error: {:#}", err);
      HandlerResponse {
        status_code: 500,
        body: format!("Internal error: {:#}", err),
      }
    }
  }
}

async fn process(state: &HandlerState, event: S3Event) -> Result<HandlerResponse> {
  let record = event
    .records
    .first()
    .ok_or_else(|| anyhow!("event contains no records"))?;
  let bucket = record
    .s3
    .bucket
    .name
    .clone()
    .ok_or_else(|| anyhow!("record is missing a bucket name"))?;
  let raw_key = record
    .s3
    .object
    .key
    .as_deref()
    .ok_or_else(|| anyhow!("record is missing an object key"))?;

  let key = decode_key(raw_key);
  debug!("decoded key: {}", key);

  if bucket != state.config.buckets.source {
    warn!("ignoring event from unexpected bucket: {}", bucket);
    return Ok(Rejection::WrongBucket(bucket).into());
  }

  if !has_allowed_extension(&key, &state.config.thumbnail.allowed_extensions) {
    warn!("unsupported file type: {}", key);
    return Ok(Rejection::UnsupportedFileType(key).into());
  }

  let object = match state.storage_client.get_object(&bucket, &key).await? {
    GetObjectResult::Found(object) => object,
    GetObjectResult::NotFound => {
      warn!("object not found: {}", key);
      return Ok(Rejection::NoSuchKey(key).into());
    }
  };

  // Decode/resize/encode is CPU-bound, keep it off the async runtime
  let (width, height) = (state.config.thumbnail.width, state.config.thumbnail.height);
  let data = object.data;
  let resized = tokio::task::spawn_blocking(move || thumbnail::render(&data, width, height))
    .await
    .context("thumbnail task failed")??;

  let dest_bucket = &state.config.buckets.destination;
  let dest_key = format!("{}{}", state.config.buckets.dest_prefix, basename(&key));

  // The content-type is carried over from the fetch, even when the
  // re-encode fell back to another format.
  state
    .storage_client
    .put_object(dest_bucket, &dest_key, resized, &object.content_type)
    .await?;

  info!("stored thumbnail at: {}/{}", dest_bucket, dest_key);

  Ok(HandlerResponse {
    status_code: 200,
    body: format!("Resized image stored at: {}/{}", dest_bucket, dest_key),
  })
}

/// Decodes an object key from its notification wire form: `+` means space,
/// then percent-escapes are resolved. Invalid UTF-8 is replaced rather than
/// rejected, matching the notification source's convention.
fn decode_key(raw: &str) -> String {
  let plus_decoded = raw.replace('+', " ");
  percent_decode_str(&plus_decoded)
    .decode_utf8_lossy()
    .into_owned()
}

fn has_allowed_extension(key: &str, allowed: &[String]) -> bool {
  let lowered = key.to_lowercase();
  allowed.iter().any(|ext| lowered.ends_with(ext.as_str()))
}

/// Final path segment of a key. Two keys sharing a basename map to the same
/// destination object; last writer wins.
fn basename(key: &str) -> &str {
  key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decode_key_resolves_plus_and_percent_escapes() {
    assert_eq!(
      decode_key("uploads/2024/vacation+photo.jpg"),
      "uploads/2024/vacation photo.jpg"
    );
    assert_eq!(decode_key("pics/caf%C3%A9.png"), "pics/café.png");
    // a literal plus arrives percent-encoded and survives decoding
    assert_eq!(decode_key("a%2Bb.webp"), "a+b.webp");
    assert_eq!(decode_key("plain.jpeg"), "plain.jpeg");
  }

  #[test]
  fn basename_takes_the_final_segment() {
    assert_eq!(basename("pics/cat.png"), "cat.png");
    assert_eq!(basename("a/b/c/deep.jpg"), "deep.jpg");
    assert_eq!(basename("toplevel.webp"), "toplevel.webp");
  }

  #[test]
  fn extension_check_is_case_insensitive_and_suffix_based() {
    let allowed: Vec<String> = [".png", ".jpg", ".jpeg", ".webp"]
      .iter()
      .map(|s| s.to_string())
      .collect();

    assert!(has_allowed_extension("pics/cat.PNG", &allowed));
    assert!(has_allowed_extension("pics/cat.jpeg", &allowed));
    assert!(!has_allowed_extension("pics/cat.gif", &allowed));
    assert!(!has_allowed_extension("pics/catpng", &allowed));
    assert!(!has_allowed_extension("notes.txt", &allowed));
  }
}

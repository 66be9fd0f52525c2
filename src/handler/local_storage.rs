use std::io::ErrorKind;
use std::path::PathBuf;

use crate::handler::storage::{GetObjectResult, Storage, StoredObject};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Filesystem-backed storage used by the integration tests. Objects live at
/// `<root>/<bucket>/<key>`; the content-type on fetch is derived from the
/// key extension since the filesystem keeps no metadata.
pub struct Client {
  root: PathBuf,
}

impl Client {
  pub fn new(root: PathBuf) -> Self {
    Self { root }
  }
}

#[async_trait]
impl Storage for Client {
  async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectResult> {
    let file_path = self.root.join(bucket).join(key);

    let data = match tokio::fs::read(&file_path).await {
      Ok(data) => data,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(GetObjectResult::NotFound),
      Err(err) => {
        return Err(anyhow::Error::new(err).context(format!(
          "failed to read object: {}/{}",
          bucket, key
        )))
      }
    };

    Ok(GetObjectResult::Found(StoredObject {
      data,
      content_type: content_type_for_key(key).to_owned(),
    }))
  }

  async fn put_object(
    &self,
    bucket: &str,
    key: &str,
    data: Vec<u8>,
    _content_type: &str,
  ) -> Result<()> {
    let file_path = self.root.join(bucket).join(key);

    if let Some(parent) = file_path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("failed to create directory for: {}/{}", bucket, key))?;
    }

    tokio::fs::write(&file_path, &data)
      .await
      .with_context(|| format!("failed to write object: {}/{}", bucket, key))?;

    Ok(())
  }
}

fn content_type_for_key(key: &str) -> &'static str {
  let lowered = key.to_lowercase();
  match lowered.rsplit('.').next() {
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  }
}

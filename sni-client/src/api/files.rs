use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::{SniClientError, SniClientResult};
use crate::models::UploadedFile;
use crate::SniClient;

const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

fn check_size(len: u64) -> SniClientResult<()> {
    if len == 0 {
        return Err(SniClientError::InvalidRequest("file is empty".to_string()));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(SniClientError::InvalidRequest(format!(
            "file is larger than {MAX_UPLOAD_BYTES} bytes"
        )));
    }
    Ok(())
}

fn file_part(name: &str, bytes: Vec<u8>) -> SniClientResult<Part> {
    check_size(bytes.len() as u64)?;
    Ok(Part::bytes(bytes).file_name(name.to_string()))
}

/// Читает файл для загрузки; размер проверяется по метаданным до чтения.
async fn read_upload(path: &Path) -> SniClientResult<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SniClientError::InvalidRequest("invalid file name".to_string()))?
        .to_string();

    let unreadable = |err: std::io::Error| {
        SniClientError::InvalidRequest(format!("failed to read {}: {err}", path.display()))
    };
    let metadata = tokio::fs::metadata(path).await.map_err(unreadable)?;
    if !metadata.is_file() {
        return Err(SniClientError::InvalidRequest(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    check_size(metadata.len())?;

    let bytes = tokio::fs::read(path).await.map_err(unreadable)?;
    Ok((name, bytes))
}

impl SniClient {
    /// Загружает файл (`multipart/form-data`, поле `file`).
    pub async fn upload_file(&self, path: &Path) -> SniClientResult<UploadedFile> {
        let token = self.require_token()?;
        let (name, bytes) = read_upload(path).await?;
        self.upload_bytes(&name, bytes, &token).await
    }

    async fn upload_bytes(
        &self,
        name: &str,
        bytes: Vec<u8>,
        token: &str,
    ) -> SniClientResult<UploadedFile> {
        let form = Form::new().part("file", file_part(name, bytes)?);
        self.http
            .send_multipart("/api/files/upload", form, Some(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock must be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("sni_{nanos}_{name}"))
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = file_part("a.png", Vec::new()).expect_err("must fail");
        assert!(matches!(err, SniClientError::InvalidRequest(_)));
    }

    #[test]
    fn oversized_part_is_rejected() {
        let err = check_size(MAX_UPLOAD_BYTES + 1).expect_err("must fail");
        assert!(matches!(err, SniClientError::InvalidRequest(_)));
        assert!(check_size(MAX_UPLOAD_BYTES).is_ok());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_from_metadata() {
        let path = temp_path("big.bin");
        let file = std::fs::File::create(&path).expect("file must be created");
        // разреженный файл: длина есть, данных на диске нет
        file.set_len(MAX_UPLOAD_BYTES + 1).expect("length must be set");
        drop(file);

        let err = read_upload(&path).await.expect_err("must fail");
        let _ = std::fs::remove_file(&path);
        match err {
            SniClientError::InvalidRequest(message) => assert!(message.contains("larger")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn directories_and_missing_files_are_rejected() {
        let err = read_upload(&std::env::temp_dir()).await.expect_err("must fail");
        assert!(matches!(err, SniClientError::InvalidRequest(_)));

        let err = read_upload(&temp_path("missing.png"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, SniClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn small_file_is_read_with_its_name() {
        let path = temp_path("avatar.png");
        std::fs::write(&path, b"png").expect("file must be written");

        let (name, bytes) = read_upload(&path).await.expect("must read");
        let _ = std::fs::remove_file(&path);
        assert!(name.ends_with("avatar.png"));
        assert_eq!(bytes, b"png");
    }
}

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::telemetry::record_store_operation;
use shared::AppError;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize {document}: {source}")]
    Serialize {
        document: &'static str,
        source: serde_json::Error,
    },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Serialize { .. } => AppError::Serialization(e.to_string()),
            _ => AppError::Storage(e.to_string()),
        }
    }
}

/// 1つのJSONファイルに丸ごと保存されるドキュメント
pub trait Document: Serialize + DeserializeOwned + Default + Send + 'static {
    /// ログ用の名前
    const NAME: &'static str;
}

impl Document for domain::AttendanceBook {
    const NAME: &'static str = "attendance";
}

impl Document for domain::TaskBook {
    const NAME: &'static str = "tasks";
}

/// JSONファイルを読み書きするストア
///
/// 読み込み→変更→保存の一連の操作はドキュメントごとのミューテックスで直列化される。
/// 保存は一時ファイルに書いてからリネームするため、途中まで書かれたファイルは残らない。
pub struct JsonDocumentStore<D> {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for JsonDocumentStore<D> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            lock: Arc::clone(&self.lock),
            _document: PhantomData,
        }
    }
}

impl<D: Document> JsonDocumentStore<D> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ドキュメントを読み込む。ファイルがなければ空のドキュメントを返す
    ///
    /// 旧形式のファイル（タスクIDやステータスのない行など）を読んだ場合は、
    /// 補完した内容をその場で書き戻す。一度表示したIDは次の読み込みでも変わらない。
    pub async fn load(&self) -> Result<D, StoreError> {
        let _guard = self.lock.lock().await;

        let (document, stale) = self.read().await?;
        if stale {
            info!(document = D::NAME, "Normalizing legacy document on load");
            self.write(&document).await?;
        }

        Ok(document)
    }

    /// ドキュメント全体でファイルを置き換える
    pub async fn save(&self, document: &D) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write(document).await
    }

    /// ロックを保持したまま読み込み→変更→保存を行う
    /// `mutate` がエラーを返した場合は何も書き込まない
    pub async fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut D) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;

        let (mut document, _) = self.read().await?;
        let result = mutate(&mut document)?;
        self.write(&document).await?;

        Ok(result)
    }

    /// ファイルを読み込み、書き戻しが必要かどうかも返す
    async fn read(&self) -> Result<(D, bool), StoreError> {
        let started = Instant::now();

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(document = D::NAME, path = %self.path.display(), "Document file absent");
                return Ok((D::default(), false));
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok((D::default(), false));
        }

        let malformed = |source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        };
        let stored: serde_json::Value = serde_json::from_slice(&bytes).map_err(malformed)?;
        let document: D = serde_json::from_value(stored.clone()).map_err(malformed)?;

        // 読み込み時に補完された値があれば、ファイルの内容と一致しなくなる
        let stale = serde_json::to_value(&document)
            .map(|normalized| normalized != stored)
            .map_err(|source| StoreError::Serialize {
                document: D::NAME,
                source,
            })?;

        record_store_operation(D::NAME, "load", started);
        Ok((document, stale))
    }

    async fn write(&self, document: &D) -> Result<(), StoreError> {
        let started = Instant::now();
        let bytes = to_pretty_json(document).map_err(|source| StoreError::Serialize {
            document: D::NAME,
            source,
        })?;

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &bytes)
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_err)?;

        record_store_operation(D::NAME, "save", started);
        info!(document = D::NAME, bytes = bytes.len(), "Document saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// 4スペースインデントで整形（既存ファイルと同じ書式）
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer)?;
    Ok(bytes)
}

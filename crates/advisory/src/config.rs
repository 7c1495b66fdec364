//! 권고 감사 설정
//!
//! [`AdvisoryConfig`]는 core의 [`AuditConfig`](vulnaudit_core::config::AuditConfig)에서
//! 파생되며 로더와 감사기가 사용하는 값만 담습니다.
//!
//! ```
//! use vulnaudit_advisory::AdvisoryConfigBuilder;
//!
//! let config = AdvisoryConfigBuilder::new()
//!     .db_dir("/tmp/pkgdb")
//!     .workers(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.audit_file_path().to_str(), Some("/tmp/pkgdb/auditfile"));
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AdvisoryError;

/// 데이터베이스 파일 최대 허용 크기 상한 (1 GiB)
const MAX_DB_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

/// 최대 워커 수
const MAX_WORKERS: usize = 1024;

/// 권고 감사 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// 데이터베이스 디렉토리
    pub db_dir: String,
    /// 데이터베이스 파일 이름 (`db_dir` 기준)
    pub audit_file: String,
    /// 데이터베이스 다운로드 URL
    pub fetch_url: String,
    /// 감사 전 데이터베이스 갱신 여부
    pub fetch_before_audit: bool,
    /// 데이터베이스 파일 최대 크기 (바이트)
    pub max_db_size: u64,
    /// 병렬 감사 워커 수 (0이면 CPU 수)
    pub workers: usize,
    /// 결과 출력 시 요약만 표시
    pub quiet: bool,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self::from_core(&vulnaudit_core::config::AuditConfig::default())
    }
}

impl AdvisoryConfig {
    /// core의 `AuditConfig`에서 설정을 생성합니다.
    pub fn from_core(core: &vulnaudit_core::config::AuditConfig) -> Self {
        Self {
            db_dir: core.db_dir.clone(),
            audit_file: core.audit_file.clone(),
            fetch_url: core.fetch_url.clone(),
            fetch_before_audit: core.fetch_before_audit,
            max_db_size: core.max_db_size,
            workers: core.workers,
            quiet: core.quiet,
        }
    }

    /// 데이터베이스 파일 전체 경로
    pub fn audit_file_path(&self) -> PathBuf {
        Path::new(&self.db_dir).join(&self.audit_file)
    }

    /// 실제로 사용할 워커 수 (`workers == 0`이면 사용 가능한 CPU 수)
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `max_db_size`: 1-1073741824 (1 GiB)
    /// - `audit_file`: 비어 있지 않고 `..` 컴포넌트가 없어야 함
    /// - `workers`: 0-1024
    pub fn validate(&self) -> Result<(), AdvisoryError> {
        if self.max_db_size == 0 || self.max_db_size > MAX_DB_SIZE_LIMIT {
            return Err(AdvisoryError::Config {
                field: "max_db_size".to_owned(),
                reason: format!("must be 1-{MAX_DB_SIZE_LIMIT}"),
            });
        }

        if self.audit_file.is_empty() {
            return Err(AdvisoryError::Config {
                field: "audit_file".to_owned(),
                reason: "audit_file must not be empty".to_owned(),
            });
        }

        if Path::new(&self.audit_file)
            .components()
            .any(|c| c == Component::ParentDir)
        {
            return Err(AdvisoryError::Config {
                field: "audit_file".to_owned(),
                reason: format!(
                    "audit_file '{}' contains path traversal pattern '..'",
                    self.audit_file
                ),
            });
        }

        if self.workers > MAX_WORKERS {
            return Err(AdvisoryError::Config {
                field: "workers".to_owned(),
                reason: format!("must be 0 (auto) or 1-{MAX_WORKERS}"),
            });
        }

        Ok(())
    }
}

/// [`AdvisoryConfig`] 빌더
///
/// `build()` 시점에 [`AdvisoryConfig::validate`]를 수행합니다.
#[derive(Default)]
pub struct AdvisoryConfigBuilder {
    config: AdvisoryConfig,
}

impl AdvisoryConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 데이터베이스 디렉토리를 설정합니다.
    pub fn db_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.db_dir = dir.into();
        self
    }

    /// 데이터베이스 파일 이름을 설정합니다.
    pub fn audit_file(mut self, file: impl Into<String>) -> Self {
        self.config.audit_file = file.into();
        self
    }

    /// 다운로드 URL을 설정합니다.
    pub fn fetch_url(mut self, url: impl Into<String>) -> Self {
        self.config.fetch_url = url.into();
        self
    }

    /// 감사 전 갱신 여부를 설정합니다.
    pub fn fetch_before_audit(mut self, fetch: bool) -> Self {
        self.config.fetch_before_audit = fetch;
        self
    }

    /// 데이터베이스 파일 최대 크기(바이트)를 설정합니다.
    pub fn max_db_size(mut self, size: u64) -> Self {
        self.config.max_db_size = size;
        self
    }

    /// 병렬 감사 워커 수를 설정합니다.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 요약 출력 여부를 설정합니다.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.config.quiet = quiet;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 [`AdvisoryError::Config`] 반환
    pub fn build(self) -> Result<AdvisoryConfig, AdvisoryError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

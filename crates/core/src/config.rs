//! 설정 관리 — vulnaudit.toml 파싱 및 런타임 설정
//!
//! [`VulnauditConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`VULNAUDIT_AUDIT_DB_DIR=/var/db/pkg` 형식)
//! 2. 설정 파일 (`vulnaudit.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), vulnaudit_core::error::VulnauditError> {
//! use vulnaudit_core::config::VulnauditConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = VulnauditConfig::load("vulnaudit.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VulnauditConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VulnauditError};

/// vulnaudit 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnauditConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 감사(audit) 설정
    #[serde(default)]
    pub audit: AuditConfig,
}

impl VulnauditConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VulnauditError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VulnauditError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VulnauditError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VulnauditError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VulnauditError> {
        toml::from_str(toml_str).map_err(|e| {
            VulnauditError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VULNAUDIT_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VULNAUDIT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VULNAUDIT_GENERAL_LOG_FORMAT");

        // Audit
        override_string(&mut self.audit.db_dir, "VULNAUDIT_AUDIT_DB_DIR");
        override_string(&mut self.audit.audit_file, "VULNAUDIT_AUDIT_AUDIT_FILE");
        override_string(&mut self.audit.fetch_url, "VULNAUDIT_AUDIT_FETCH_URL");
        override_bool(
            &mut self.audit.fetch_before_audit,
            "VULNAUDIT_AUDIT_FETCH_BEFORE_AUDIT",
        );
        override_u64(&mut self.audit.max_db_size, "VULNAUDIT_AUDIT_MAX_DB_SIZE");
        override_usize(&mut self.audit.workers, "VULNAUDIT_AUDIT_WORKERS");
        override_bool(&mut self.audit.quiet, "VULNAUDIT_AUDIT_QUIET");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VulnauditError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.audit.db_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "audit.db_dir".to_owned(),
                reason: "db_dir must not be empty".to_owned(),
            }
            .into());
        }

        if self.audit.audit_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "audit.audit_file".to_owned(),
                reason: "audit_file must not be empty".to_owned(),
            }
            .into());
        }

        if self.audit.fetch_before_audit && self.audit.fetch_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "audit.fetch_url".to_owned(),
                reason: "fetch_url must not be empty when fetch_before_audit is set".to_owned(),
            }
            .into());
        }

        if self.audit.max_db_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audit.max_db_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 감사 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// 권고 데이터베이스가 위치한 디렉토리
    pub db_dir: String,
    /// 권고 데이터베이스 파일명
    pub audit_file: String,
    /// 원격 권고 데이터베이스 주소
    pub fetch_url: String,
    /// 감사 전에 데이터베이스 갱신 시도
    pub fetch_before_audit: bool,
    /// 데이터베이스 파일 최대 크기 (바이트)
    pub max_db_size: u64,
    /// 병렬 감사 워커 수 (0이면 CPU 수)
    pub workers: usize,
    /// 취약 패키지 이름만 출력 (결과 출력기용)
    pub quiet: bool,
}

impl AuditConfig {
    /// 권고 데이터베이스 파일의 전체 경로를 반환합니다.
    pub fn audit_file_path(&self) -> PathBuf {
        Path::new(&self.db_dir).join(&self.audit_file)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            db_dir: "/var/db/pkg".to_owned(),
            audit_file: "auditfile".to_owned(),
            fetch_url: "http://portaudit.FreeBSD.org/auditfile.tbz".to_owned(),
            fetch_before_audit: false,
            max_db_size: 64 * 1024 * 1024, // 64MB
            workers: 0,
            quiet: false,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

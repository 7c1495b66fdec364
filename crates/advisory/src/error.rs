//! 권고 데이터베이스 에러 타입
//!
//! [`AdvisoryError`]는 파일 단위로 로딩을 중단시키는 에러입니다.
//! 줄 단위 문제는 [`LoadWarning`]으로 기록되고 로딩은 계속됩니다.
//! `From<AdvisoryError> for VulnauditError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **파일 단위 (중단)**: `SourceNotFound`, `SourceIo`, `FileTooBig`
//! - **설정**: `Config`
//! - **갱신**: `Fetch`
//! - **줄 단위 (복구)**: [`PatternParseError`], [`LoadWarning`]

use vulnaudit_core::error::{ConfigError, DatabaseError, FetchError, VulnauditError};

/// 권고 데이터베이스 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    /// 데이터베이스 파일이 없음
    #[error("unable to open advisory database {path}, try fetching it first")]
    SourceNotFound {
        /// 데이터베이스 파일 경로
        path: String,
    },

    /// 데이터베이스 파일 읽기 실패
    #[error("unable to read advisory database {path}: {source}")]
    SourceIo {
        /// 데이터베이스 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("advisory database too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 데이터베이스 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 데이터베이스 갱신 실패
    #[error("advisory database refresh failed: {0}")]
    Fetch(String),
}

impl From<AdvisoryError> for VulnauditError {
    fn from(err: AdvisoryError) -> Self {
        match err {
            AdvisoryError::SourceNotFound { path } => {
                VulnauditError::Database(DatabaseError::SourceNotFound(path))
            }
            AdvisoryError::SourceIo { path, source } => {
                VulnauditError::Database(DatabaseError::SourceIo(format!("{path}: {source}")))
            }
            AdvisoryError::FileTooBig { path, size, max } => VulnauditError::Database(
                DatabaseError::SourceIo(format!("{path}: {size} bytes exceeds maximum {max}")),
            ),
            AdvisoryError::Config { field, reason } => {
                VulnauditError::Config(ConfigError::InvalidValue { field, reason })
            }
            AdvisoryError::Fetch(msg) => VulnauditError::Fetch(FetchError::Extract(msg)),
        }
    }
}

/// 패턴 파싱 에러
///
/// 해당 레코드만 건너뛰며 전체 로딩을 중단하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternParseError {
    /// 연산자 앞의 패키지 이름이 비어 있음
    #[error("empty package name in pattern '{pattern}'")]
    EmptyName {
        /// 원본 패턴
        pattern: String,
    },
}

/// 로딩 중 복구된 줄 단위 경고
///
/// 모든 변형은 1부터 시작하는 줄 번호를 포함합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadWarning {
    /// 패턴을 해석할 수 없어 레코드를 건너뜀
    #[error("line {line}: {error}, record skipped")]
    InvalidPattern {
        /// 줄 번호
        line: usize,
        /// 파싱 에러
        error: PatternParseError,
    },

    /// 세 번째 이후 필드는 무시됨
    #[error("line {line}: extra column in advisory database ({extra} ignored)")]
    ExtraColumn {
        /// 줄 번호
        line: usize,
        /// 무시된 필드 수
        extra: usize,
    },

    /// 세 번째 이후 버전 제약은 무시됨
    #[error("line {line}: more than two version constraints ({ignored} ignored)")]
    ExcessConstraint {
        /// 줄 번호
        line: usize,
        /// 무시된 제약 수
        ignored: usize,
    },

    /// 연산자 뒤에 버전이 없음
    #[error("line {line}: version constraint without a version")]
    EmptyVersion {
        /// 줄 번호
        line: usize,
    },
}

impl LoadWarning {
    /// 경고가 발생한 줄 번호를 반환합니다.
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidPattern { line, .. }
            | Self::ExtraColumn { line, .. }
            | Self::ExcessConstraint { line, .. }
            | Self::EmptyVersion { line } => *line,
        }
    }

    /// 메트릭 레이블용 경고 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::ExtraColumn { .. } => "extra_column",
            Self::ExcessConstraint { .. } => "excess_constraint",
            Self::EmptyVersion { .. } => "empty_version",
        }
    }
}

//! 에러 타입 — 도메인별 에러 정의

/// vulnaudit 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VulnauditError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 권고(advisory) 데이터베이스 에러
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// 설치 패키지 소스 에러
    #[error("package source error: {0}")]
    Source(#[from] SourceError),

    /// 데이터베이스 갱신(fetch) 에러
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 로깅 초기화 실패
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// 권고 데이터베이스 에러
///
/// 파일 단위 에러만 포함합니다. 줄 단위 파싱 실패는 로더가 복구합니다.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// 데이터베이스 파일이 없음 (먼저 fetch 필요)
    #[error("advisory database not found: {0}")]
    SourceNotFound(String),

    /// 데이터베이스 파일을 읽을 수 없음
    #[error("advisory database unreadable: {0}")]
    SourceIo(String),
}

/// 설치 패키지 소스 에러
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// `name-version` 형식이 아닌 패키지 지정
    #[error("bad package name format: {0}")]
    InvalidPackage(String),

    /// 패키지 목록 조회 실패
    #[error("cannot query installed packages: {0}")]
    Enumerate(String),
}

/// 데이터베이스 갱신 에러
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// 원격 파일 다운로드 실패
    #[error("cannot fetch advisory database from {url}: {reason}")]
    Download { url: String, reason: String },

    /// 압축 해제 실패
    #[error("cannot extract advisory database: {0}")]
    Extract(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_converts_to_top_level() {
        let err: VulnauditError =
            DatabaseError::SourceNotFound("/var/db/pkg/auditfile".to_owned()).into();
        assert!(matches!(
            err,
            VulnauditError::Database(DatabaseError::SourceNotFound(_))
        ));
        assert!(err.to_string().contains("/var/db/pkg/auditfile"));
    }

    #[test]
    fn source_error_display() {
        let err = SourceError::InvalidPackage("openssl".to_owned());
        assert_eq!(err.to_string(), "bad package name format: openssl");
    }

    #[test]
    fn fetch_error_display() {
        let err = FetchError::Download {
            url: "http://example/auditfile.tbz".to_owned(),
            reason: "timeout".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("auditfile.tbz"));
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: VulnauditError = io.into();
        assert!(matches!(err, VulnauditError::Io(_)));
    }
}

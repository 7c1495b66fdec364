//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `vulnaudit_`
//! - 모듈명: `advisory_db_`, `audit_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! 레코더가 설치되지 않은 경우 모든 매크로 호출은 no-op입니다.

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 경고 종류 레이블 키 (invalid_pattern, extra_column, ...)
pub const LABEL_WARNING_KIND: &str = "kind";

/// 결과 레이블 키 (updated, up_to_date, error)
pub const LABEL_RESULT: &str = "result";

// ─── Advisory DB 메트릭 ─────────────────────────────────────────────

/// Advisory DB: 로드된 권고 레코드 수 (gauge)
pub const ADVISORY_DB_RECORDS_LOADED: &str = "vulnaudit_advisory_db_records_loaded";

/// Advisory DB: 건너뛴 줄 수 (counter)
pub const ADVISORY_DB_LINES_SKIPPED_TOTAL: &str = "vulnaudit_advisory_db_lines_skipped_total";

/// Advisory DB: 로딩 경고 수 (counter, label: kind)
pub const ADVISORY_DB_WARNINGS_TOTAL: &str = "vulnaudit_advisory_db_warnings_total";

/// Advisory DB: 갱신 시도 수 (counter, label: result)
pub const ADVISORY_DB_REFRESH_TOTAL: &str = "vulnaudit_advisory_db_refresh_total";

// ─── Audit 메트릭 ──────────────────────────────────────────────────

/// Audit: 검사한 패키지 수 (counter)
pub const AUDIT_PACKAGES_SCANNED_TOTAL: &str = "vulnaudit_audit_packages_scanned_total";

/// Audit: 취약 판정된 패키지 수 (counter)
pub const AUDIT_VULNERABLE_PACKAGES_TOTAL: &str = "vulnaudit_audit_vulnerable_packages_total";

/// Audit: 매칭된 권고 수 (counter)
pub const AUDIT_MATCHES_TOTAL: &str = "vulnaudit_audit_matches_total";

/// Audit: 전체 감사 소요 시간 (histogram, 초)
pub const AUDIT_SCAN_DURATION_SECONDS: &str = "vulnaudit_audit_scan_duration_seconds";

/// Audit: 취소된 감사 수 (counter)
pub const AUDIT_CANCELLED_TOTAL: &str = "vulnaudit_audit_cancelled_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Advisory DB
    describe_gauge!(
        ADVISORY_DB_RECORDS_LOADED,
        "Number of advisory records in the currently loaded database"
    );
    describe_counter!(
        ADVISORY_DB_LINES_SKIPPED_TOTAL,
        "Total number of advisory lines skipped because the pattern was invalid"
    );
    describe_counter!(
        ADVISORY_DB_WARNINGS_TOTAL,
        "Total number of recovered advisory database warnings by kind"
    );
    describe_counter!(
        ADVISORY_DB_REFRESH_TOTAL,
        "Total number of advisory database refresh attempts by result"
    );

    // Audit
    describe_counter!(
        AUDIT_PACKAGES_SCANNED_TOTAL,
        "Total number of installed packages checked against the advisory index"
    );
    describe_counter!(
        AUDIT_VULNERABLE_PACKAGES_TOTAL,
        "Total number of packages flagged by at least one advisory"
    );
    describe_counter!(
        AUDIT_MATCHES_TOTAL,
        "Total number of advisory matches across all audited packages"
    );
    describe_histogram!(
        AUDIT_SCAN_DURATION_SECONDS,
        "Time to audit a full package set in seconds"
    );
    describe_counter!(
        AUDIT_CANCELLED_TOTAL,
        "Total number of audits stopped early by cancellation"
    );
}

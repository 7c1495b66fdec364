//! vulnaudit 공통 크레이트
//!
//! 모든 vulnaudit 크레이트가 공유하는 타입, 에러, 설정, 로깅, 메트릭 이름과
//! 외부 협력자 trait을 정의합니다.
//!
//! - [`error`]: 최상위 에러 (`VulnauditError`)와 도메인별 에러
//! - [`config`]: `vulnaudit.toml` 설정 (`VulnauditConfig`)
//! - [`logging`]: `tracing-subscriber` 초기화
//! - [`metrics`]: 메트릭 이름 상수
//! - [`source`]: 패키지 소스 / 데이터베이스 갱신기 trait
//! - [`types`]: 도메인 타입 (`InstalledPackage`, `FetchOutcome`)

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod source;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DatabaseError, FetchError, SourceError, VulnauditError};

// 설정
pub use config::{AuditConfig, GeneralConfig, VulnauditConfig};

// 협력자 trait
pub use source::{DatabaseFetcher, PackageList, PackageSource};

// 도메인 타입
pub use types::{FetchOutcome, InstalledPackage};

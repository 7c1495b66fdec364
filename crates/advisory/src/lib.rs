//! vulnaudit 권고 감사 엔진
//!
//! 평문 권고 데이터베이스(auditfile)를 읽어 글롭 없는 접두사로 정렬한 인덱스를
//! 만들고, 설치 패키지 `(name, version)`을 대조하여 해당 권고를 찾습니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`AdvisoryError`, `PatternParseError`, `LoadWarning`)
//! - [`config`]: 감사 설정 (`AdvisoryConfig`, 빌더)
//! - [`pattern`]: 패턴 파서 (`parse_pattern`, `noglob_len`)
//! - [`db`]: 데이터베이스 로더 (`AdvisoryDb`, `AdvisoryRecord`)
//! - [`index`]: 정렬 인덱스 (`AdvisoryIndex`)
//! - [`matcher`]: 매처 (`AdvisoryMatcher`, `AdvisoryMatch`)
//! - [`version`]: 버전 비교기 (`VersionComparator`, `PkgVersionComparator`)
//! - [`glob`]: 글롭 매처 (`GlobMatcher`, `FnmatchGlob`)
//! - [`audit`]: 일괄 감사 (`Auditor`, `AuditReport`)
//!
//! # Architecture
//!
//! ```text
//! auditfile --> AdvisoryDb::load --> Vec<AdvisoryRecord> (+ LoadWarning)
//!                                          |
//!                                   AdvisoryIndex::build   (borrows records)
//!                                          |
//!                                   AdvisoryMatcher <-- VersionComparator, GlobMatcher
//!                                          |
//! PackageSource --> Auditor --> AuditReport { findings, vulnerable_packages }
//! ```
//!
//! # Example
//!
//! ```
//! use vulnaudit_advisory::{AdvisoryDb, AdvisoryMatcher};
//!
//! let db = AdvisoryDb::parse("openssl>=1.0.1<1.0.2|http://example/adv|heartbleed\n");
//! let matcher = AdvisoryMatcher::new(db.index());
//!
//! assert_eq!(matcher.query("openssl", "1.0.1g").len(), 1);
//! assert!(matcher.query("openssl", "1.0.2").is_empty());
//! ```

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod glob;
pub mod index;
pub mod matcher;
pub mod pattern;
pub mod version;

// --- Public API Re-exports ---

// Auditor
pub use audit::{AuditReport, Auditor, Finding};

// Configuration
pub use config::{AdvisoryConfig, AdvisoryConfigBuilder};

// Error
pub use error::{AdvisoryError, LoadWarning, PatternParseError};

// Loader / Index / Matcher
pub use db::{AdvisoryDb, AdvisoryRecord};
pub use index::{AdvisoryIndex, IndexEntry};
pub use matcher::{AdvisoryMatch, AdvisoryMatcher};
pub use pattern::{ConstraintOp, ParsedPattern, VersionConstraint, noglob_len, parse_pattern};

// Collaborators
pub use glob::{FnmatchGlob, GlobMatcher};
pub use version::{PkgVersionComparator, VersionComparator, constraint_satisfied};

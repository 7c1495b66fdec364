//! 권고 데이터베이스 -- 평문 auditfile 로딩
//!
//! [`AdvisoryDb`]는 로컬에 받아 둔 권고 데이터베이스 파일을 읽어
//! [`AdvisoryRecord`] 목록과 줄 단위 경고를 보유합니다.
//!
//! # 파일 형식
//!
//! ```text
//! # 주석
//! openssl>=1.0.1<1.0.2|http://example/adv|heartbleed
//! zlib-[0-9]*=1.2.3|http://example/zlib|inflate overflow
//! ```
//!
//! - 한 줄이 한 레코드이며 `#`로 시작하거나 빈 줄은 무시
//! - 필드 구분자는 `|`: 패턴, URL, 설명 순서. 부족한 필드는 빈 문자열
//! - 네 번째 이후 필드는 무시되고 [`LoadWarning::ExtraColumn`]으로 기록
//! - 패턴에서 이름을 얻지 못한 줄은 레코드 전체를 제외
//!
//! 파일 단위 실패(`SourceNotFound`, `SourceIo`, `FileTooBig`)는 로딩을 중단하고,
//! 줄 단위 문제는 경고로 남긴 채 계속 진행합니다.

use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vulnaudit_core::metrics as m;
use vulnaudit_core::source::DatabaseFetcher;
use vulnaudit_core::types::FetchOutcome;

use crate::config::AdvisoryConfig;
use crate::error::{AdvisoryError, LoadWarning};
use crate::index::AdvisoryIndex;
use crate::pattern::{VersionConstraint, parse_pattern};

/// 필드 구분자
const FIELD_SEPARATOR: char = '|';

/// 권고 레코드 한 건
///
/// 필드 순서가 곧 정렬 동률 시의 비교 순서입니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    /// 패키지 이름 패턴 (글롭 메타문자 포함 가능)
    pub pattern: String,
    /// 첫 번째 버전 제약
    pub primary: Option<VersionConstraint>,
    /// 두 번째 버전 제약 (AND)
    pub secondary: Option<VersionConstraint>,
    /// 권고 URL
    pub url: String,
    /// 설명
    pub description: String,
}

impl AdvisoryRecord {
    /// 이름 패턴만으로 레코드를 생성합니다 (모든 버전에 해당).
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            primary: None,
            secondary: None,
            url: String::new(),
            description: String::new(),
        }
    }

    /// 버전 제약을 설정합니다.
    pub fn with_constraints(
        mut self,
        primary: Option<VersionConstraint>,
        secondary: Option<VersionConstraint>,
    ) -> Self {
        self.primary = primary;
        self.secondary = secondary;
        self
    }

    /// URL과 설명을 설정합니다.
    pub fn with_reference(mut self, url: impl Into<String>, description: impl Into<String>) -> Self {
        self.url = url.into();
        self.description = description.into();
        self
    }
}

/// 로딩이 끝난 권고 데이터베이스
#[derive(Debug, Clone, Default)]
pub struct AdvisoryDb {
    records: Vec<AdvisoryRecord>,
    warnings: Vec<LoadWarning>,
    skipped: usize,
}

impl AdvisoryDb {
    /// 레코드 목록으로 데이터베이스를 생성합니다 (테스트용).
    pub fn from_records(records: Vec<AdvisoryRecord>) -> Self {
        Self {
            records,
            warnings: Vec::new(),
            skipped: 0,
        }
    }

    /// 문자열 전체를 데이터베이스로 파싱합니다.
    pub fn parse(content: &str) -> Self {
        let mut db = Self::default();
        for (idx, line) in content.lines().enumerate() {
            db.push_line(idx + 1, line);
        }
        db
    }

    /// 읽기 스트림에서 데이터베이스를 파싱합니다.
    ///
    /// 잘못된 UTF-8 바이트는 대체 문자로 바뀌며 `\n`, `\r\n` 줄 끝은 제거됩니다.
    pub fn from_reader<R: BufRead>(mut reader: R) -> std::io::Result<Self> {
        let mut db = Self::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            db.push_line(line_no, line.trim_end_matches(['\n', '\r']));
        }

        Ok(db)
    }

    /// 파일에서 데이터베이스를 로드합니다.
    ///
    /// # Errors
    ///
    /// - 파일이 없으면 [`AdvisoryError::SourceNotFound`]
    /// - 파일 크기가 `max_size`를 넘으면 [`AdvisoryError::FileTooBig`]
    /// - 그 밖의 읽기 실패는 [`AdvisoryError::SourceIo`]
    ///
    /// # Note
    ///
    /// 동기 I/O를 수행합니다. async 컨텍스트에서는 [`AdvisoryDb::load_async`]를 사용하세요.
    pub fn load(path: impl AsRef<Path>, max_size: u64) -> Result<Self, AdvisoryError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AdvisoryError::SourceNotFound {
                path: display.clone(),
            },
            _ => AdvisoryError::SourceIo {
                path: display.clone(),
                source: e,
            },
        })?;

        let size = file
            .metadata()
            .map_err(|e| AdvisoryError::SourceIo {
                path: display.clone(),
                source: e,
            })?
            .len();
        if size > max_size {
            return Err(AdvisoryError::FileTooBig {
                path: display,
                size,
                max: max_size,
            });
        }

        let db = Self::from_reader(BufReader::new(file)).map_err(|e| AdvisoryError::SourceIo {
            path: display.clone(),
            source: e,
        })?;

        db.report(&display);
        Ok(db)
    }

    /// [`AdvisoryDb::load`]를 블로킹 스레드에서 실행합니다.
    pub async fn load_async(
        path: impl AsRef<Path>,
        max_size: u64,
    ) -> Result<Self, AdvisoryError> {
        let path = path.as_ref().to_path_buf();
        let display = path.display().to_string();

        tokio::task::spawn_blocking(move || Self::load(path, max_size))
            .await
            .map_err(|e| AdvisoryError::SourceIo {
                path: display,
                source: std::io::Error::other(format!("spawn_blocking failed: {e}")),
            })?
    }

    /// 설정에 따라 원격 데이터베이스를 갱신합니다.
    ///
    /// 로컬 파일의 수정 시각(파일이 없으면 `None`)을 갱신기에 전달하며,
    /// 받은 파일을 다시 읽는 것은 호출자의 몫입니다.
    pub fn refresh(
        fetcher: &dyn DatabaseFetcher,
        config: &AdvisoryConfig,
    ) -> Result<FetchOutcome, AdvisoryError> {
        let dest = config.audit_file_path();
        let local_mtime = std::fs::metadata(&dest)
            .and_then(|meta| meta.modified())
            .ok();

        debug!(
            url = %config.fetch_url,
            dest = %dest.display(),
            has_local = local_mtime.is_some(),
            "refreshing advisory database"
        );

        match fetcher.fetch(&config.fetch_url, &dest, local_mtime) {
            Ok(outcome) => {
                let result = match outcome {
                    FetchOutcome::UpToDate => {
                        info!(path = %dest.display(), "advisory database up to date");
                        "up_to_date"
                    }
                    FetchOutcome::Updated => {
                        info!(path = %dest.display(), "advisory database updated");
                        "updated"
                    }
                };
                metrics::counter!(m::ADVISORY_DB_REFRESH_TOTAL, m::LABEL_RESULT => result)
                    .increment(1);
                Ok(outcome)
            }
            Err(e) => {
                warn!(url = %config.fetch_url, error = %e, "advisory database refresh failed");
                metrics::counter!(m::ADVISORY_DB_REFRESH_TOTAL, m::LABEL_RESULT => "error")
                    .increment(1);
                Err(AdvisoryError::Fetch(e.to_string()))
            }
        }
    }

    /// 로드된 레코드 (파일 순서)
    pub fn records(&self) -> &[AdvisoryRecord] {
        &self.records
    }

    /// 로딩 중 기록된 경고
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// 패턴 오류로 제외된 줄 수
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// 레코드 수
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 레코드가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 이 데이터베이스를 빌리는 정렬 인덱스를 생성합니다.
    pub fn index(&self) -> AdvisoryIndex<'_> {
        AdvisoryIndex::build(&self.records)
    }

    fn push_line(&mut self, line_no: usize, line: &str) {
        if line.trim().is_empty() || line.starts_with('#') {
            return;
        }

        let mut fields = line.split(FIELD_SEPARATOR);
        let pattern = fields.next().unwrap_or_default();
        let url = fields.next().unwrap_or_default();
        let description = fields.next().unwrap_or_default();
        let extra = fields.count();

        let parsed = match parse_pattern(pattern) {
            Ok(parsed) => parsed,
            Err(error) => {
                self.warnings.push(LoadWarning::InvalidPattern {
                    line: line_no,
                    error,
                });
                self.skipped += 1;
                return;
            }
        };

        if extra > 0 {
            self.warnings.push(LoadWarning::ExtraColumn {
                line: line_no,
                extra,
            });
        }
        if parsed.ignored_constraints > 0 {
            self.warnings.push(LoadWarning::ExcessConstraint {
                line: line_no,
                ignored: parsed.ignored_constraints,
            });
        }
        if parsed.has_empty_version() {
            self.warnings.push(LoadWarning::EmptyVersion { line: line_no });
        }

        self.records.push(AdvisoryRecord {
            pattern: parsed.name,
            primary: parsed.primary,
            secondary: parsed.secondary,
            url: url.to_owned(),
            description: description.to_owned(),
        });
    }

    fn report(&self, path: &str) {
        for warning in &self.warnings {
            warn!(path, line = warning.line(), kind = warning.kind(), "{warning}");
            metrics::counter!(m::ADVISORY_DB_WARNINGS_TOTAL, m::LABEL_WARNING_KIND => warning.kind())
                .increment(1);
        }

        metrics::gauge!(m::ADVISORY_DB_RECORDS_LOADED).set(self.records.len() as f64);
        metrics::counter!(m::ADVISORY_DB_LINES_SKIPPED_TOTAL).increment(self.skipped as u64);

        info!(
            path,
            records = self.records.len(),
            skipped = self.skipped,
            warnings = self.warnings.len(),
            "advisory database loaded"
        );
    }
}

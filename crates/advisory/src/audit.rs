//! 일괄 감사 -- 설치 패키지 전체를 권고 데이터베이스와 대조
//!
//! [`Auditor`]는 [`AdvisoryMatcher`]를 감싸 패키지 하나, 패키지 소스 전체,
//! 또는 패키지 목록을 병렬로 감사합니다.
//!
//! # 취소
//!
//! 일괄 감사는 패키지 사이마다 [`CancellationToken`]을 확인합니다. 취소되면
//! 그때까지의 결과를 `cancelled = true`로 표시한 [`AuditReport`]로 반환합니다.
//! 한 패키지의 매칭 자체는 중간에 중단되지 않습니다.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use vulnaudit_core::error::VulnauditError;
use vulnaudit_core::metrics as m;
use vulnaudit_core::source::PackageSource;
use vulnaudit_core::types::InstalledPackage;

use crate::config::AdvisoryConfig;
use crate::db::AdvisoryDb;
use crate::error::AdvisoryError;
use crate::glob::{FnmatchGlob, GlobMatcher};
use crate::matcher::{AdvisoryMatch, AdvisoryMatcher};
use crate::version::{PkgVersionComparator, VersionComparator};

/// 취약 패키지 하나와 해당 권고 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding<'a> {
    /// 취약 패키지
    pub package: InstalledPackage,
    /// 해당 권고 (인덱스 순서)
    pub advisories: Vec<AdvisoryMatch<'a>>,
}

/// 감사 결과
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport<'a> {
    /// 감사 고유 ID
    pub scan_id: String,
    /// 검사한 패키지 수
    pub packages_scanned: usize,
    /// 하나 이상의 권고에 해당한 패키지 수
    pub vulnerable_packages: usize,
    /// 취약 패키지별 결과 (입력 순서)
    pub findings: Vec<Finding<'a>>,
    /// 취소로 중단되었는지 여부
    pub cancelled: bool,
}

impl<'a> AuditReport<'a> {
    fn new() -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            packages_scanned: 0,
            vulnerable_packages: 0,
            findings: Vec::new(),
            cancelled: false,
        }
    }

    fn record(&mut self, finding: Option<Finding<'a>>) {
        self.packages_scanned += 1;
        if let Some(finding) = finding {
            self.vulnerable_packages += 1;
            self.findings.push(finding);
        }
    }

    /// 발견된 권고 매칭 총수
    pub fn match_count(&self) -> usize {
        self.findings.iter().map(|f| f.advisories.len()).sum()
    }

    /// 취약 패키지가 없는지 여부
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// 패키지 감사기
pub struct Auditor<'a, V = PkgVersionComparator, G = FnmatchGlob> {
    matcher: AdvisoryMatcher<'a, V, G>,
}

impl<'a> Auditor<'a> {
    /// 데이터베이스의 인덱스를 만들어 기본 협력자로 감사기를 생성합니다.
    pub fn from_db(db: &'a AdvisoryDb) -> Self {
        Self::new(AdvisoryMatcher::new(db.index()))
    }
}

impl<'a, V, G> Auditor<'a, V, G>
where
    V: VersionComparator,
    G: GlobMatcher,
{
    /// 매처로 감사기를 생성합니다.
    pub fn new(matcher: AdvisoryMatcher<'a, V, G>) -> Self {
        Self { matcher }
    }

    /// 사용 중인 매처
    pub fn matcher(&self) -> &AdvisoryMatcher<'a, V, G> {
        &self.matcher
    }

    /// 패키지 하나를 감사합니다. 해당 권고가 없으면 `None`.
    pub fn audit_package(&self, package: &InstalledPackage) -> Option<Finding<'a>> {
        let advisories = self.matcher.query(&package.name, &package.version);
        if advisories.is_empty() {
            return None;
        }

        info!(
            package = %package,
            advisories = advisories.len(),
            "vulnerable package found"
        );
        for advisory in &advisories {
            debug!(
                package = %package,
                url = %advisory.advisory.url,
                description = %advisory.advisory.description,
                "advisory matched"
            );
        }

        Some(Finding {
            package: package.clone(),
            advisories,
        })
    }

    /// 패키지 소스를 끝까지 순차 감사합니다.
    ///
    /// # Errors
    ///
    /// 패키지 소스가 에러를 반환하면 그대로 전파합니다.
    pub fn audit_source(
        &self,
        source: &mut dyn PackageSource,
        cancel: &CancellationToken,
    ) -> Result<AuditReport<'a>, VulnauditError> {
        let started = Instant::now();
        let mut report = AuditReport::new();
        debug!(scan_id = %report.scan_id, source = source.name(), "audit started");

        loop {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let Some(package) = source.next_package()? else {
                break;
            };
            report.record(self.audit_package(&package));
        }

        finish(&report, started);
        Ok(report)
    }

    /// 패키지 목록을 `workers`개 스레드로 병렬 감사합니다.
    ///
    /// `findings`는 입력 순서를 유지합니다. `workers == 0`이면 CPU 수만큼 사용합니다.
    ///
    /// # Errors
    ///
    /// 스레드 풀을 만들 수 없으면 [`AdvisoryError::Config`]
    pub fn audit_parallel(
        &self,
        packages: &[InstalledPackage],
        workers: usize,
        cancel: &CancellationToken,
    ) -> Result<AuditReport<'a>, AdvisoryError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vulnaudit-worker-{i}"))
            .build()
            .map_err(|e| AdvisoryError::Config {
                field: "workers".to_owned(),
                reason: format!("failed to build worker pool: {e}"),
            })?;

        let started = Instant::now();
        let mut report = AuditReport::new();
        debug!(
            scan_id = %report.scan_id,
            packages = packages.len(),
            workers = pool.current_num_threads(),
            "parallel audit started"
        );

        let outcomes: Vec<Option<Option<Finding<'a>>>> = pool.install(|| {
            packages
                .par_iter()
                .map(|package| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.audit_package(package))
                    }
                })
                .collect()
        });

        for outcome in outcomes {
            match outcome {
                Some(finding) => report.record(finding),
                None => report.cancelled = true,
            }
        }

        finish(&report, started);
        Ok(report)
    }

    /// 설정의 워커 수([`AdvisoryConfig::effective_workers`])로 병렬 감사합니다.
    ///
    /// # Errors
    ///
    /// [`Auditor::audit_parallel`]과 같습니다.
    pub fn audit_with_config(
        &self,
        packages: &[InstalledPackage],
        config: &AdvisoryConfig,
        cancel: &CancellationToken,
    ) -> Result<AuditReport<'a>, AdvisoryError> {
        self.audit_parallel(packages, config.effective_workers(), cancel)
    }
}

fn finish(report: &AuditReport<'_>, started: Instant) {
    let elapsed = started.elapsed().as_secs_f64();

    metrics::counter!(m::AUDIT_PACKAGES_SCANNED_TOTAL).increment(report.packages_scanned as u64);
    metrics::counter!(m::AUDIT_VULNERABLE_PACKAGES_TOTAL)
        .increment(report.vulnerable_packages as u64);
    metrics::counter!(m::AUDIT_MATCHES_TOTAL).increment(report.match_count() as u64);
    metrics::histogram!(m::AUDIT_SCAN_DURATION_SECONDS).record(elapsed);
    if report.cancelled {
        metrics::counter!(m::AUDIT_CANCELLED_TOTAL).increment(1);
    }

    info!(
        scan_id = %report.scan_id,
        packages_scanned = report.packages_scanned,
        vulnerable_packages = report.vulnerable_packages,
        matches = report.match_count(),
        cancelled = report.cancelled,
        elapsed_secs = elapsed,
        "{} problem(s) found",
        report.vulnerable_packages
    );
}

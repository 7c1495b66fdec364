//! 외부 협력자 trait — 패키지 소스와 데이터베이스 갱신기
//!
//! 패키지 레지스트리 조회와 원격 데이터베이스 다운로드는 이 크레이트 밖에서
//! 구현되며, 감사 엔진은 아래 trait을 통해서만 이들을 사용합니다.

use std::collections::VecDeque;
use std::path::Path;
use std::time::SystemTime;

use crate::error::VulnauditError;
use crate::types::{FetchOutcome, InstalledPackage};

/// 설치 패키지 소스 trait
///
/// 유한한 `(name, version)` 시퀀스를 순서대로 생성합니다.
/// 구현체는 전체 목록을 미리 읽지 않고 지연 스트리밍할 수 있습니다.
pub trait PackageSource: Send {
    /// 소스 이름 (로깅용)
    fn name(&self) -> &str;

    /// 다음 패키지를 반환합니다. 소스가 끝나면 `Ok(None)`.
    fn next_package(&mut self) -> Result<Option<InstalledPackage>, VulnauditError>;
}

/// 원격 권고 데이터베이스 갱신 trait
///
/// 다운로드, 압축 해제, 재시도 정책은 모두 구현체의 책임입니다.
pub trait DatabaseFetcher: Send + Sync {
    /// `url`의 데이터베이스를 받아 `dest`에 기록합니다.
    ///
    /// `local_mtime`이 주어지면 그보다 새로운 경우에만 교체하고,
    /// 그렇지 않으면 [`FetchOutcome::UpToDate`]를 반환합니다.
    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        local_mtime: Option<SystemTime>,
    ) -> Result<FetchOutcome, VulnauditError>;
}

/// 메모리 내 패키지 목록
///
/// 단일 패키지 감사나 테스트에서 사용하는 [`PackageSource`] 구현입니다.
#[derive(Debug, Clone, Default)]
pub struct PackageList {
    name: String,
    packages: VecDeque<InstalledPackage>,
}

impl PackageList {
    /// 이름과 패키지 목록으로 소스를 생성합니다.
    pub fn new(
        name: impl Into<String>,
        packages: impl IntoIterator<Item = InstalledPackage>,
    ) -> Self {
        Self {
            name: name.into(),
            packages: packages.into_iter().collect(),
        }
    }

    /// 남은 패키지 수를 반환합니다.
    pub fn remaining(&self) -> usize {
        self.packages.len()
    }
}

impl FromIterator<InstalledPackage> for PackageList {
    fn from_iter<I: IntoIterator<Item = InstalledPackage>>(iter: I) -> Self {
        Self::new("memory", iter)
    }
}

impl PackageSource for PackageList {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_package(&mut self) -> Result<Option<InstalledPackage>, VulnauditError> {
        Ok(self.packages.pop_front())
    }
}

//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// 설치된 패키지
///
/// 패키지 소스가 생성하고 감사기가 소비하는 `(name, version)` 쌍입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// 패키지 이름
    pub name: String,
    /// 패키지 버전
    pub version: String,
}

impl InstalledPackage {
    /// 새 패키지를 생성합니다.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for InstalledPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

impl FromStr for InstalledPackage {
    type Err = SourceError;

    /// `name-version` 형식을 파싱합니다.
    ///
    /// 이름에도 `-`가 올 수 있으므로 마지막 `-`를 기준으로 나눕니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('-') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => {
                Ok(Self::new(name, version))
            }
            _ => Err(SourceError::InvalidPackage(s.to_owned())),
        }
    }
}

/// 데이터베이스 갱신 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    /// 새 파일을 받아 로컬 파일을 교체함
    Updated,
    /// 원격 파일이 로컬 파일보다 새롭지 않음
    UpToDate,
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated => write!(f, "updated"),
            Self::UpToDate => write!(f, "up-to-date"),
        }
    }
}

//! 권고 패턴 파서 -- `name[op version[op version]]` 해석
//!
//! 권고 데이터베이스의 첫 번째 필드는 패키지 이름(글롭 허용)과 최대 두 개의
//! 버전 제약으로 이루어집니다.
//!
//! ```text
//! openssl>=1.0.1<1.0.2     name = "openssl", (>= 1.0.1) AND (< 1.0.2)
//! zlib-[0-9]*=1.2.3        name = "zlib-[0-9]*", (= 1.2.3)
//! cups-base                name = "cups-base", 모든 버전
//! ```
//!
//! 연산자는 `=`, `<`, `<=`, `>`, `>=`이며 입력 버퍼를 변경하지 않고
//! 바이트 오프셋 구간만으로 필드를 잘라냅니다.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PatternParseError;

/// 버전 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintOp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
}

impl ConstraintOp {
    /// 3단 비교 결과(`package` 대 `constraint`)가 이 연산자를 만족하는지 확인합니다.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match ordering {
            Ordering::Less => matches!(self, Self::Lt | Self::Lte),
            Ordering::Equal => matches!(self, Self::Eq | Self::Lte | Self::Gte),
            Ordering::Greater => matches!(self, Self::Gt | Self::Gte),
        }
    }

    /// 연산자 기호
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 단일 버전 제약 (`op version`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionConstraint {
    /// 비교 연산자
    pub op: ConstraintOp,
    /// 비교 대상 버전 (빈 문자열일 수 있음)
    pub version: String,
}

impl VersionConstraint {
    /// 새 제약을 생성합니다.
    pub fn new(op: ConstraintOp, version: impl Into<String>) -> Self {
        Self {
            op,
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// 파싱된 패턴
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    /// 패키지 이름 패턴 (글롭 메타문자 포함 가능)
    pub name: String,
    /// 첫 번째 제약
    pub primary: Option<VersionConstraint>,
    /// 두 번째 제약 (첫 번째와 AND로 결합)
    pub secondary: Option<VersionConstraint>,
    /// 무시된 세 번째 이후 제약 수
    pub ignored_constraints: usize,
}

impl ParsedPattern {
    /// 버전 문자열이 빈 제약이 있는지 확인합니다.
    pub fn has_empty_version(&self) -> bool {
        [&self.primary, &self.secondary]
            .into_iter()
            .flatten()
            .any(|c| c.version.is_empty())
    }
}

/// 한 연산자의 위치 정보
struct OperatorSpan {
    op: ConstraintOp,
    /// 연산자 시작 오프셋
    start: usize,
    /// 버전 텍스트 시작 오프셋
    version_start: usize,
}

/// 패턴 문자열을 이름과 최대 두 개의 버전 제약으로 파싱합니다.
///
/// 두 글자 연산자(`<=`, `>=`)는 다음 바이트가 존재할 때만 인식하며,
/// 끝에 홀로 있는 `<`/`>`는 빈 버전을 가진 한 글자 연산자가 됩니다.
///
/// # Errors
///
/// 첫 연산자 앞의 이름이 비어 있으면 [`PatternParseError::EmptyName`]
pub fn parse_pattern(pattern: &str) -> Result<ParsedPattern, PatternParseError> {
    let spans = operator_spans(pattern.as_bytes());

    let name_end = spans.first().map_or(pattern.len(), |s| s.start);
    let name = &pattern[..name_end];
    if name.is_empty() {
        return Err(PatternParseError::EmptyName {
            pattern: pattern.to_owned(),
        });
    }

    // 각 제약의 버전 텍스트는 다음 연산자 직전(또는 문자열 끝)까지
    let constraint_at = |idx: usize| -> Option<VersionConstraint> {
        let span = spans.get(idx)?;
        let end = spans.get(idx + 1).map_or(pattern.len(), |next| next.start);
        Some(VersionConstraint::new(
            span.op,
            &pattern[span.version_start..end],
        ))
    };

    Ok(ParsedPattern {
        name: name.to_owned(),
        primary: constraint_at(0),
        secondary: constraint_at(1),
        ignored_constraints: spans.len().saturating_sub(2),
    })
}

fn operator_spans(bytes: &[u8]) -> Vec<OperatorSpan> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let next_is_eq = bytes.get(i + 1) == Some(&b'=');
        let found = match bytes[i] {
            b'=' => Some((ConstraintOp::Eq, 1)),
            b'<' if next_is_eq => Some((ConstraintOp::Lte, 2)),
            b'<' => Some((ConstraintOp::Lt, 1)),
            b'>' if next_is_eq => Some((ConstraintOp::Gte, 2)),
            b'>' => Some((ConstraintOp::Gt, 1)),
            _ => None,
        };

        match found {
            Some((op, width)) => {
                spans.push(OperatorSpan {
                    op,
                    start: i,
                    version_start: i + width,
                });
                i += width;
            }
            None => i += 1,
        }
    }

    spans
}

/// `fnmatch(3)` 글롭 메타문자 여부
pub fn is_glob_meta(byte: u8) -> bool {
    matches!(byte, b'*' | b'?' | b'[' | b']' | b'{' | b'}' | b'\\')
}

/// 글롭 메타문자가 없는 가장 긴 접두사의 바이트 길이를 반환합니다.
pub fn noglob_len(pattern: &str) -> usize {
    pattern
        .bytes()
        .position(is_glob_meta)
        .unwrap_or(pattern.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_range_pattern() {
        let parsed = parse_pattern("foo>=1.2<2.0").unwrap();
        assert_eq!(parsed.name, "foo");
        assert_eq!(
            parsed.primary,
            Some(VersionConstraint::new(ConstraintOp::Gte, "1.2"))
        );
        assert_eq!(
            parsed.secondary,
            Some(VersionConstraint::new(ConstraintOp::Lt, "2.0"))
        );
        assert_eq!(parsed.ignored_constraints, 0);
    }

    #[test]
    fn parses_single_equality() {
        let parsed = parse_pattern("bar=3.1").unwrap();
        assert_eq!(parsed.name, "bar");
        assert_eq!(
            parsed.primary,
            Some(VersionConstraint::new(ConstraintOp::Eq, "3.1"))
        );
        assert!(parsed.secondary.is_none());
    }

    #[test]
    fn parses_name_only() {
        let parsed = parse_pattern("baz").unwrap();
        assert_eq!(parsed.name, "baz");
        assert!(parsed.primary.is_none());
        assert!(parsed.secondary.is_none());
    }

    #[test]
    fn parses_all_operators() {
        let cases = [
            ("a=1", ConstraintOp::Eq),
            ("a<1", ConstraintOp::Lt),
            ("a<=1", ConstraintOp::Lte),
            ("a>1", ConstraintOp::Gt),
            ("a>=1", ConstraintOp::Gte),
        ];
        for (pattern, op) in cases {
            let parsed = parse_pattern(pattern).unwrap();
            assert_eq!(parsed.name, "a", "{pattern}");
            assert_eq!(parsed.primary, Some(VersionConstraint::new(op, "1")), "{pattern}");
        }
    }

    #[test]
    fn keeps_glob_characters_in_name() {
        let parsed = parse_pattern("zlib-[0-9]*>1.2").unwrap();
        assert_eq!(parsed.name, "zlib-[0-9]*");
        assert_eq!(
            parsed.primary,
            Some(VersionConstraint::new(ConstraintOp::Gt, "1.2"))
        );
    }

    #[test]
    fn trailing_lone_operator_has_empty_version() {
        let parsed = parse_pattern("foo<").unwrap();
        assert_eq!(parsed.name, "foo");
        assert_eq!(
            parsed.primary,
            Some(VersionConstraint::new(ConstraintOp::Lt, ""))
        );
        assert!(parsed.has_empty_version());

        let parsed = parse_pattern("foo>=1.0>").unwrap();
        assert_eq!(
            parsed.secondary,
            Some(VersionConstraint::new(ConstraintOp::Gt, ""))
        );
    }

    #[test]
    fn trailing_two_char_operator_is_recognized() {
        let parsed = parse_pattern("foo>=").unwrap();
        assert_eq!(
            parsed.primary,
            Some(VersionConstraint::new(ConstraintOp::Gte, ""))
        );
    }

    #[test]
    fn third_constraint_is_ignored() {
        let parsed = parse_pattern("foo>1<3=2").unwrap();
        assert_eq!(
            parsed.primary,
            Some(VersionConstraint::new(ConstraintOp::Gt, "1"))
        );
        assert_eq!(
            parsed.secondary,
            Some(VersionConstraint::new(ConstraintOp::Lt, "3"))
        );
        assert_eq!(parsed.ignored_constraints, 1);
    }

    #[test]
    fn empty_name_is_error() {
        let err = parse_pattern(">=1.0").unwrap_err();
        assert_eq!(
            err,
            PatternParseError::EmptyName {
                pattern: ">=1.0".to_owned()
            }
        );
        assert!(parse_pattern("").is_err());
    }

    #[test]
    fn non_ascii_name_is_preserved() {
        let parsed = parse_pattern("päckage<2").unwrap();
        assert_eq!(parsed.name, "päckage");
    }

    #[test]
    fn op_accepts_orderings() {
        use Ordering::*;
        assert!(ConstraintOp::Eq.accepts(Equal));
        assert!(!ConstraintOp::Eq.accepts(Less));
        assert!(ConstraintOp::Lt.accepts(Less));
        assert!(!ConstraintOp::Lt.accepts(Equal));
        assert!(ConstraintOp::Lte.accepts(Less));
        assert!(ConstraintOp::Lte.accepts(Equal));
        assert!(!ConstraintOp::Lte.accepts(Greater));
        assert!(ConstraintOp::Gt.accepts(Greater));
        assert!(!ConstraintOp::Gt.accepts(Equal));
        assert!(ConstraintOp::Gte.accepts(Greater));
        assert!(ConstraintOp::Gte.accepts(Equal));
        assert!(!ConstraintOp::Gte.accepts(Less));
    }

    #[test]
    fn constraint_display() {
        assert_eq!(
            VersionConstraint::new(ConstraintOp::Lte, "1.0").to_string(),
            "<=1.0"
        );
    }

    #[test]
    fn noglob_len_stops_at_first_meta() {
        assert_eq!(noglob_len("zlib-[0-9]*"), 5);
        assert_eq!(noglob_len("zlib-devel"), 10);
        assert_eq!(noglob_len("*"), 0);
        assert_eq!(noglob_len("foo?bar"), 3);
        assert_eq!(noglob_len("a{b,c}"), 1);
        assert_eq!(noglob_len("a\\*"), 1);
        assert_eq!(noglob_len(""), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_arbitrary_input_does_not_panic(input in "\\PC{0,64}") {
                let _ = parse_pattern(&input);
            }

            #[test]
            fn parse_recovers_name_and_versions(
                name in "[a-z][a-z0-9_-]{0,15}",
                v1 in "[0-9][0-9.a-z_,]{0,8}",
                v2 in "[0-9][0-9.a-z_,]{0,8}",
            ) {
                let parsed = parse_pattern(&format!("{name}>={v1}<{v2}")).unwrap();
                prop_assert_eq!(parsed.name, name);
                prop_assert_eq!(parsed.primary, Some(VersionConstraint::new(ConstraintOp::Gte, v1)));
                prop_assert_eq!(parsed.secondary, Some(VersionConstraint::new(ConstraintOp::Lt, v2)));
            }

            #[test]
            fn noglob_prefix_has_no_meta(input in "[a-z*?\\[\\]{}]{0,20}") {
                let n = noglob_len(&input);
                prop_assert!(input.as_bytes()[..n].iter().all(|b| !is_glob_meta(*b)));
            }
        }
    }
}

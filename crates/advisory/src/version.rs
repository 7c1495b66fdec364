//! 버전 비교 -- 권고 버전 제약 평가
//!
//! [`VersionComparator`]는 두 버전 문자열 사이의 전순서(less / equal / greater)를
//! 제공하는 외부 협력자입니다. 기본 구현 [`PkgVersionComparator`]는 포트 버전
//! 규칙(`1.0.1g`, `2.4_1`, `5.0,1`)에 SemVer 프리릴리스(`1.0.0-rc.1`)를 더한
//! 하나의 규칙으로 모든 쌍을 비교합니다.

use std::cmp::Ordering;

use semver::Prerelease;

use crate::pattern::VersionConstraint;

/// 버전 전순서 비교기
pub trait VersionComparator: Send + Sync {
    /// `package_version`과 `constraint_version`을 비교합니다.
    fn compare(&self, package_version: &str, constraint_version: &str) -> Ordering;
}

impl<T: VersionComparator + ?Sized> VersionComparator for &T {
    fn compare(&self, package_version: &str, constraint_version: &str) -> Ordering {
        (**self).compare(package_version, constraint_version)
    }
}

/// 버전 제약을 평가합니다.
///
/// 제약이 없으면(`None`) 항상 만족합니다. 한쪽 경계만 있는 권고를
/// 호출자가 별도로 처리하지 않아도 되도록 하기 위함입니다.
pub fn constraint_satisfied<V: VersionComparator + ?Sized>(
    comparator: &V,
    package_version: &str,
    constraint: Option<&VersionConstraint>,
) -> bool {
    match constraint {
        None => true,
        Some(c) => c.op.accepts(comparator.compare(package_version, &c.version)),
    }
}

/// 기본 버전 비교기
///
/// # 비교 규칙
///
/// - `,N` 접미사는 epoch로서 가장 먼저 비교
/// - 본 버전은 `.` 단위 컴포넌트로 나누어 앞자리 숫자, 이어지는 문자 접미사 순으로 비교
/// - 문자 접미사 `alpha`, `beta`, `pre`, `rc`는 접미사 없는 릴리스보다 작고,
///   그 밖의 문자(`1.0.1g`)는 릴리스보다 큼
/// - 짧은 쪽의 빠진 컴포넌트는 `0`으로 간주 (`1.0` == `1.0.0`)
/// - 첫 `-` 뒤는 프리릴리스 태그이며 태그 없는 같은 버전보다 작음.
///   태그끼리는 SemVer 규칙으로, SemVer가 아닌 태그는 그보다 뒤에 문자열로 비교
/// - `_N` 접미사는 revision으로서 가장 나중에 비교
#[derive(Debug, Clone, Copy, Default)]
pub struct PkgVersionComparator;

impl VersionComparator for PkgVersionComparator {
    fn compare(&self, package_version: &str, constraint_version: &str) -> Ordering {
        compare_pkg_versions(package_version, constraint_version)
    }
}

/// 포트 버전 규칙으로 비교합니다.
pub fn compare_pkg_versions(a: &str, b: &str) -> Ordering {
    let a = PkgVersion::split(a);
    let b = PkgVersion::split(b);

    compare_numeric(a.epoch, b.epoch)
        .then_with(|| compare_main(a.main, b.main))
        .then_with(|| a.stage.cmp(&b.stage))
        .then_with(|| compare_numeric(a.revision, b.revision))
}

struct PkgVersion<'a> {
    main: &'a str,
    stage: Stage<'a>,
    revision: &'a str,
    epoch: &'a str,
}

/// 프리릴리스 단계. 태그가 있으면 릴리스보다 작음.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Stage<'a> {
    Pre(PreTag<'a>),
    Release,
}

/// SemVer 태그가 SemVer가 아닌 태그보다 먼저 정렬됨
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreTag<'a> {
    Semver(Prerelease),
    Raw(&'a str),
}

impl<'a> Stage<'a> {
    fn parse(tag: &'a str) -> Self {
        if tag.is_empty() {
            return Self::Release;
        }
        match Prerelease::new(tag) {
            Ok(pre) => Self::Pre(PreTag::Semver(pre)),
            Err(_) => Self::Pre(PreTag::Raw(tag)),
        }
    }
}

impl<'a> PkgVersion<'a> {
    fn split(version: &'a str) -> Self {
        let (rest, epoch) = version.rsplit_once(',').unwrap_or((version, ""));
        let (rest, revision) = rest.rsplit_once('_').unwrap_or((rest, ""));
        let (main, tag) = rest.split_once('-').unwrap_or((rest, ""));
        Self {
            main,
            stage: Stage::parse(tag),
            revision,
            epoch,
        }
    }
}

fn compare_main(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => {
                let ord = compare_component(l.unwrap_or("0"), r.unwrap_or("0"));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_component(a: &str, b: &str) -> Ordering {
    let (a_num, a_suffix) = split_leading_digits(a);
    let (b_num, b_suffix) = split_leading_digits(b);

    // 숫자가 없는 컴포넌트(`alpha`)는 어떤 숫자보다도 작음
    let num_ord = match (a_num.is_empty(), b_num.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_numeric(a_num, b_num),
    };

    num_ord.then_with(|| compare_suffix(a_suffix, b_suffix))
}

fn compare_suffix(a: &str, b: &str) -> Ordering {
    let (a_word, a_rest) = split_leading_alpha(a);
    let (b_word, b_rest) = split_leading_alpha(b);
    let (a_tail_num, a_tail) = split_leading_digits(a_rest);
    let (b_tail_num, b_tail) = split_leading_digits(b_rest);

    suffix_rank(a_word)
        .cmp(&suffix_rank(b_word))
        .then_with(|| a_word.cmp(b_word))
        .then_with(|| compare_numeric(a_tail_num, b_tail_num))
        .then_with(|| a_tail.cmp(b_tail))
}

/// 접미사 분류: 프리릴리스 < 없음 < 기타 문자
fn suffix_rank(word: &str) -> u8 {
    match word.to_ascii_lowercase().as_str() {
        "alpha" => 0,
        "beta" => 1,
        "pre" => 2,
        "rc" => 3,
        "" => 4,
        _ => 5,
    }
}

/// 숫자 문자열을 크기로 비교합니다 (빈 문자열은 0, 길이 제한 없음).
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn split_leading_digits(s: &str) -> (&str, &str) {
    let end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn split_leading_alpha(s: &str) -> (&str, &str) {
    let end = s
        .bytes()
        .position(|b| !b.is_ascii_alphabetic())
        .unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ConstraintOp;

    fn cmp(a: &str, b: &str) -> Ordering {
        PkgVersionComparator.compare(a, b)
    }

    #[test]
    fn semver_versions_follow_semver_ordering() {
        assert_eq!(cmp("1.0.0", "1.0.5"), Ordering::Less);
        assert_eq!(cmp("1.0.5", "1.0.5"), Ordering::Equal);
        assert_eq!(cmp("2.0.0", "1.9.9"), Ordering::Greater);
        // Pre-release versions: 1.0.3-alpha < 1.0.3 in SemVer
        assert_eq!(cmp("1.0.3-alpha", "1.0.3"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha", "1.0.0-alpha.1"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha.beta", "1.0.0-beta"), Ordering::Less);
        assert_eq!(cmp("1.0.0-beta.2", "1.0.0-beta.11"), Ordering::Less);
        assert_eq!(cmp("1.0.0-rc.1", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn prerelease_tag_is_consistent_across_forms() {
        assert_eq!(cmp("1.0.0-alpha", "1.0.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0", "1.0"), Ordering::Equal);
        assert_eq!(cmp("1.0.0-alpha", "1.0"), Ordering::Less);
        assert_eq!(cmp("1.0-alpha", "1.0.0-alpha"), Ordering::Equal);
        assert_eq!(cmp("0.9.9", "1.0.0-alpha"), Ordering::Less);
        assert_eq!(cmp("1.0.0-rc1_2", "1.0.0-rc1_1"), Ordering::Greater);
    }

    #[test]
    fn prerelease_constraint_does_not_depend_on_bound_spelling() {
        let full = VersionConstraint::new(ConstraintOp::Lt, "1.0.0");
        let short = VersionConstraint::new(ConstraintOp::Lt, "1.0");

        for version in ["1.0.0-alpha", "1.0-rc.1", "0.9.9", "1.0.0", "1.0"] {
            assert_eq!(
                constraint_satisfied(&PkgVersionComparator, version, Some(&full)),
                constraint_satisfied(&PkgVersionComparator, version, Some(&short)),
                "{version}"
            );
        }
        assert!(constraint_satisfied(
            &PkgVersionComparator,
            "1.0.0-alpha",
            Some(&short)
        ));
    }

    #[test]
    fn non_semver_tag_sorts_after_semver_tags() {
        assert_eq!(cmp("1.0-rc.01", "1.0-rc.1"), Ordering::Greater);
        assert_eq!(cmp("1.0-rc.01", "1.0"), Ordering::Less);
        assert_eq!(cmp("1.0-", "1.0"), Ordering::Equal);
    }

    #[test]
    fn short_versions_compare_numerically() {
        assert_eq!(cmp("1.0", "1.1"), Ordering::Less);
        assert_eq!(cmp("1.1", "2.0"), Ordering::Less);
        assert_eq!(cmp("0.9", "1.0"), Ordering::Less);
        assert_eq!(cmp("1.10", "1.9"), Ordering::Greater);
    }

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(cmp("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(cmp("1", "1.0.0.0"), Ordering::Equal);
        assert_eq!(cmp("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn letter_suffix_is_patch_level() {
        assert_eq!(cmp("1.0.1g", "1.0.1"), Ordering::Greater);
        assert_eq!(cmp("1.0.1g", "1.0.2"), Ordering::Less);
        assert_eq!(cmp("1.0.1g", "1.0.1h"), Ordering::Less);
        assert_eq!(cmp("0.9.8", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn prerelease_suffix_sorts_before_release() {
        assert_eq!(cmp("2.0rc1", "2.0"), Ordering::Less);
        assert_eq!(cmp("2.0beta3", "2.0rc1"), Ordering::Less);
        assert_eq!(cmp("2.0alpha", "2.0beta"), Ordering::Less);
        assert_eq!(cmp("2.0rc2", "2.0rc10"), Ordering::Less);
    }

    #[test]
    fn revision_and_epoch() {
        assert_eq!(cmp("2.4_1", "2.4"), Ordering::Greater);
        assert_eq!(cmp("2.4_1", "2.4_2"), Ordering::Less);
        assert_eq!(cmp("2.4_9", "2.5"), Ordering::Less);
        // epoch가 본 버전보다 우선
        assert_eq!(cmp("1.0,1", "9.9"), Ordering::Greater);
        assert_eq!(cmp("1.0,1", "1.0,2"), Ordering::Less);
    }

    #[test]
    fn huge_numbers_do_not_overflow() {
        assert_eq!(
            cmp("1.123456789012345678901234567890", "1.123456789012345678901234567891"),
            Ordering::Less
        );
        assert_eq!(cmp("1.007", "1.7"), Ordering::Equal);
    }

    #[test]
    fn constraint_absent_always_satisfied() {
        assert!(constraint_satisfied(&PkgVersionComparator, "anything", None));
    }

    #[test]
    fn range_constraints() {
        let lower = VersionConstraint::new(ConstraintOp::Gte, "1.0");
        let upper = VersionConstraint::new(ConstraintOp::Lt, "2.0");
        let in_range = |v: &str| {
            constraint_satisfied(&PkgVersionComparator, v, Some(&lower))
                && constraint_satisfied(&PkgVersionComparator, v, Some(&upper))
        };

        assert!(in_range("1.0"));
        assert!(in_range("1.1"));
        assert!(!in_range("2.0"));
        assert!(!in_range("0.9"));
    }

    #[test]
    fn reference_comparator_works_through_borrow() {
        let comparator = PkgVersionComparator;
        let by_ref: &dyn VersionComparator = &comparator;
        assert_eq!(by_ref.compare("1.0", "2.0"), Ordering::Less);
        assert_eq!((&comparator).compare("2.0", "1.0"), Ordering::Greater);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn version() -> impl Strategy<Value = String> {
            concat!(
                "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}[a-z]{0,2}",
                "(-(alpha|beta|rc)(\\.?[0-9]{1,2})?|-[a-z0-9.]{1,4})?",
                "(_[0-9])?(,[0-9])?"
            )
        }

        proptest! {
            #[test]
            fn comparison_is_antisymmetric(a in version(), b in version()) {
                prop_assert_eq!(cmp(&a, &b), cmp(&b, &a).reverse());
            }

            #[test]
            fn comparison_is_reflexive(a in version()) {
                prop_assert_eq!(cmp(&a, &a), Ordering::Equal);
            }

            #[test]
            fn comparison_is_transitive(a in version(), b in version(), c in version()) {
                if cmp(&a, &b) != Ordering::Greater && cmp(&b, &c) != Ordering::Greater {
                    prop_assert_ne!(cmp(&a, &c), Ordering::Greater);
                }
            }
        }
    }
}

//! 권고 매처 -- 설치 패키지를 정렬 인덱스에 대조
//!
//! [`AdvisoryMatcher::query`]는 패키지 이름의 첫 바이트로 탐색 시작점을 정한 뒤,
//! 글롭 없는 접두사가 패키지 이름을 넘어서는 지점에서 탐색을 멈춥니다.
//! 접두사가 같은 구간(run)에서만 글롭 매칭과 버전 제약 평가를 수행합니다.
//!
//! 접두사 가지치기는 성능 최적화일 뿐이며, 모든 항목을 검사하는
//! [`AdvisoryMatcher::naive_query`]와 항상 같은 결과를 반환합니다.

use std::cmp::Ordering;

use serde::Serialize;

use crate::db::AdvisoryRecord;
use crate::glob::{FnmatchGlob, GlobMatcher};
use crate::index::{AdvisoryIndex, IndexEntry};
use crate::version::{PkgVersionComparator, VersionComparator, constraint_satisfied};

/// 패키지에 해당하는 권고 하나
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvisoryMatch<'a> {
    /// 해당 권고 레코드
    pub advisory: &'a AdvisoryRecord,
}

/// 권고 매처
///
/// 인덱스를 소유하며, 인덱스가 빌린 레코드의 수명 `'a`만큼 결과를 반환합니다.
/// 읽기 전용이므로 `&self`로 여러 스레드에서 동시에 조회할 수 있습니다.
pub struct AdvisoryMatcher<'a, V = PkgVersionComparator, G = FnmatchGlob> {
    index: AdvisoryIndex<'a>,
    version: V,
    glob: G,
}

impl<'a> AdvisoryMatcher<'a> {
    /// 기본 비교기와 글롭 매처로 매처를 생성합니다.
    pub fn new(index: AdvisoryIndex<'a>) -> Self {
        Self::with_collaborators(index, PkgVersionComparator, FnmatchGlob)
    }
}

impl<'a, V, G> AdvisoryMatcher<'a, V, G>
where
    V: VersionComparator,
    G: GlobMatcher,
{
    /// 버전 비교기와 글롭 매처를 지정하여 매처를 생성합니다.
    pub fn with_collaborators(index: AdvisoryIndex<'a>, version: V, glob: G) -> Self {
        Self {
            index,
            version,
            glob,
        }
    }

    /// 사용 중인 인덱스
    pub fn index(&self) -> &AdvisoryIndex<'a> {
        &self.index
    }

    /// `(name, version)` 패키지에 해당하는 모든 권고를 인덱스 순서로 반환합니다.
    pub fn query(&self, name: &str, version: &str) -> Vec<AdvisoryMatch<'a>> {
        let entries = self.index.entries();
        let mut matches = Vec::new();

        // 접두사가 빈 항목은 첫 바이트와 무관하게 항상 검사
        for entry in &entries[..self.index.unanchored_len()] {
            self.collect(entry, name, version, &mut matches);
        }

        if name.is_empty() {
            return matches;
        }

        let name_bytes = name.as_bytes();
        let mut cursor = self.index.start_for(name);

        while let Some(entry) = entries.get(cursor) {
            let prefix = entry.prefix();
            let k = prefix.len().min(name_bytes.len());

            match prefix[..k].cmp(&name_bytes[..k]) {
                // 이후 접두사는 모두 더 큼
                Ordering::Greater => break,
                Ordering::Less => cursor += 1,
                Ordering::Equal => {
                    let run_end = (cursor + entry.next_pfx_incr).min(entries.len());
                    for member in &entries[cursor..run_end] {
                        self.collect(member, name, version, &mut matches);
                    }
                    cursor = run_end;
                }
            }
        }

        matches
    }

    /// 가지치기 없이 모든 항목을 검사합니다.
    pub fn naive_query(&self, name: &str, version: &str) -> Vec<AdvisoryMatch<'a>> {
        let mut matches = Vec::new();
        for entry in self.index.entries() {
            self.collect(entry, name, version, &mut matches);
        }
        matches
    }

    /// 패키지가 하나 이상의 권고에 해당하는지 확인합니다.
    pub fn is_vulnerable(&self, name: &str, version: &str) -> bool {
        !self.query(name, version).is_empty()
    }

    fn collect(
        &self,
        entry: &IndexEntry<'a>,
        name: &str,
        version: &str,
        matches: &mut Vec<AdvisoryMatch<'a>>,
    ) {
        let record = entry.record;
        if !self.glob.matches(&record.pattern, name) {
            return;
        }

        let in_range = constraint_satisfied(&self.version, version, record.primary.as_ref())
            && constraint_satisfied(&self.version, version, record.secondary.as_ref());
        if in_range {
            matches.push(AdvisoryMatch { advisory: record });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::AdvisoryDb;
    use crate::pattern::{ConstraintOp, VersionConstraint};

    fn urls(matches: &[AdvisoryMatch<'_>]) -> Vec<String> {
        matches.iter().map(|m| m.advisory.url.clone()).collect()
    }

    #[test]
    fn prefix_bucket_uses_glob_not_prefix_equality() {
        let db = AdvisoryDb::parse("zlib-[0-9]*|glob|\nzlib-devel|devel|\n");
        let matcher = AdvisoryMatcher::new(db.index());

        assert_eq!(urls(&matcher.query("zlib-devel", "1.0")), vec!["devel"]);
        assert_eq!(urls(&matcher.query("zlib-1.2.3", "x")), vec!["glob"]);
        assert!(matcher.query("zlib-", "1.0").is_empty());
        assert!(matcher.query("zlib", "1.0").is_empty());
    }

    #[test]
    fn openssl_range_end_to_end() {
        let db = AdvisoryDb::parse("openssl>=1.0.1<1.0.2|http://example/adv|heartbleed\n");
        let matcher = AdvisoryMatcher::new(db.index());

        let hits = matcher.query("openssl", "1.0.1g");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].advisory.description, "heartbleed");
        assert!(!matcher.is_vulnerable("openssl", "1.0.2"));
        assert!(!matcher.is_vulnerable("openssl", "0.9.8"));
    }

    #[test]
    fn returns_all_matching_advisories() {
        let db = AdvisoryDb::parse(
            "php5<5.4|a|\n\
             php5<5.5|b|\n\
             php*|c|\n\
             *php5|d|\n\
             php5-gd|e|\n",
        );
        let matcher = AdvisoryMatcher::new(db.index());

        let mut found = urls(&matcher.query("php5", "5.3"));
        found.sort();
        assert_eq!(found, vec!["a", "b", "c", "d"]);

        let mut found = urls(&matcher.query("php5", "5.4.1"));
        found.sort();
        assert_eq!(found, vec!["b", "c", "d"]);
    }

    #[test]
    fn name_only_pattern_matches_any_version() {
        let db = AdvisoryDb::parse("cups-base|u|\n");
        let matcher = AdvisoryMatcher::new(db.index());
        assert!(matcher.is_vulnerable("cups-base", "1.0"));
        assert!(matcher.is_vulnerable("cups-base", ""));
        assert!(!matcher.is_vulnerable("cups", "1.0"));
    }

    #[test]
    fn unanchored_patterns_are_always_considered() {
        let db = AdvisoryDb::parse("*ssl<2|star|\n[m-p]penssl|bracket|\nzzz|z|\n");
        let matcher = AdvisoryMatcher::new(db.index());
        let mut found = urls(&matcher.query("openssl", "1.0"));
        found.sort();
        assert_eq!(found, vec!["bracket", "star"]);
    }

    #[test]
    fn empty_name_only_matches_unanchored() {
        let db = AdvisoryDb::parse("*|any|\nfoo|foo|\n");
        let matcher = AdvisoryMatcher::new(db.index());
        assert_eq!(urls(&matcher.query("", "1")), vec!["any"]);
    }

    #[test]
    fn name_before_all_entries_finds_nothing() {
        let db = AdvisoryDb::parse("mysql|m|\nnginx|n|\n");
        let matcher = AdvisoryMatcher::new(db.index());
        assert!(matcher.query("apache", "2.4").is_empty());
        assert!(matcher.query("zsh", "5.0").is_empty());
    }

    #[test]
    fn empty_index_matches_nothing() {
        let db = AdvisoryDb::default();
        let matcher = AdvisoryMatcher::new(db.index());
        assert!(matcher.query("anything", "1.0").is_empty());
    }

    struct LexicalComparator;

    impl VersionComparator for LexicalComparator {
        fn compare(&self, a: &str, b: &str) -> Ordering {
            a.cmp(b)
        }
    }

    struct ExactGlob;

    impl GlobMatcher for ExactGlob {
        fn matches(&self, pattern: &str, name: &str) -> bool {
            pattern == name
        }
    }

    #[test]
    fn custom_collaborators_are_used() {
        let records = vec![
            AdvisoryRecord::new("foo*").with_constraints(
                Some(VersionConstraint::new(ConstraintOp::Lt, "10")),
                None,
            ),
        ];
        let index = AdvisoryIndex::build(&records);

        // 사전순 비교에서는 "9" > "10"
        let matcher =
            AdvisoryMatcher::with_collaborators(index.clone(), LexicalComparator, FnmatchGlob);
        assert!(!matcher.is_vulnerable("foobar", "9"));

        let matcher = AdvisoryMatcher::with_collaborators(index, PkgVersionComparator, ExactGlob);
        assert!(!matcher.is_vulnerable("foobar", "9"));
        assert!(matcher.is_vulnerable("foo*", "9"));
    }

    #[test]
    fn matcher_is_shared_across_threads() {
        let db = AdvisoryDb::parse("openssl<1.0.2|a|\nzlib<1.3|b|\n");
        let matcher = AdvisoryMatcher::new(db.index());

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| matcher.query("openssl", "1.0.1").len()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 1);
            }
        });
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn op() -> impl Strategy<Value = ConstraintOp> {
            prop_oneof![
                Just(ConstraintOp::Eq),
                Just(ConstraintOp::Lt),
                Just(ConstraintOp::Lte),
                Just(ConstraintOp::Gt),
                Just(ConstraintOp::Gte),
            ]
        }

        fn constraint() -> impl Strategy<Value = Option<VersionConstraint>> {
            proptest::option::of((op(), "[0-9]").prop_map(|(op, v)| VersionConstraint::new(op, v)))
        }

        fn advisory_record() -> impl Strategy<Value = AdvisoryRecord> {
            ("[ab*?\\[\\]!-]{0,5}", constraint(), constraint(), "[0-9]{1,3}").prop_map(
                |(pattern, primary, secondary, url)| {
                    AdvisoryRecord::new(pattern)
                        .with_constraints(primary, secondary)
                        .with_reference(url, "")
                },
            )
        }

        proptest! {
            #[test]
            fn optimized_query_matches_naive_oracle(
                recs in prop::collection::vec(advisory_record(), 0..32),
                name in "[ab\\[-]{0,5}",
                version in "[0-9]",
            ) {
                let index = AdvisoryIndex::build(&recs);
                let matcher = AdvisoryMatcher::new(index);
                prop_assert_eq!(
                    matcher.query(&name, &version),
                    matcher.naive_query(&name, &version)
                );
            }

            #[test]
            fn literal_pattern_matches_itself(name in "[a-z][a-z0-9-]{0,10}", version in "[0-9]\\.[0-9]") {
                let recs = vec![AdvisoryRecord::new(name.clone())];
                let matcher = AdvisoryMatcher::new(AdvisoryIndex::build(&recs));
                prop_assert_eq!(matcher.query(&name, &version).len(), 1);
            }
        }
    }
}

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vulnaudit_advisory::{AdvisoryDb, AdvisoryMatcher};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 데이터베이스 원본 바이트 (잘못된 UTF-8 포함)
    database: Vec<u8>,
    /// 조회할 패키지 이름
    name: String,
    /// 조회할 패키지 버전
    version: String,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(db) = AdvisoryDb::from_reader(input.database.as_slice()) else {
        return;
    };
    assert!(db.records().iter().all(|r| !r.pattern.is_empty()));

    let matcher = AdvisoryMatcher::new(db.index());
    assert_eq!(
        matcher.query(&input.name, &input.version),
        matcher.naive_query(&input.name, &input.version)
    );
});

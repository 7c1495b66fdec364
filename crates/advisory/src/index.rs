//! 정렬 인덱스 -- 글롭 없는 접두사 기준 정렬과 첫 바이트 테이블
//!
//! [`AdvisoryIndex`]는 레코드 목록을 빌려(`&'a [AdvisoryRecord]`) 각 패턴의
//! 글롭 없는 접두사로 정렬한 뷰입니다. 한 번 만들어지면 변경되지 않으므로
//! 여러 스레드에서 잠금 없이 동시에 조회할 수 있습니다.
//!
//! # 구성
//!
//! 1. 접두사가 빈 항목(`*foo`, `[a-z]*` 등)이 맨 앞에 모임 ([`AdvisoryIndex::unanchored_len`])
//! 2. 나머지는 접두사 바이트의 사전순, 동률이면 레코드 전체 내용 순
//! 3. 같은 접두사 길이와 같은 패턴이 이어지는 구간(run)의 첫 항목은 구간 길이를,
//!    나머지 항목은 1을 `next_pfx_incr`로 가짐
//! 4. 256칸 테이블: 바이트 `c`에 대해 첫 바이트가 `c` 이상인 첫 항목의 위치

use tracing::debug;

use crate::db::AdvisoryRecord;
use crate::pattern::noglob_len;

/// 첫 바이트 테이블 크기
const FIRST_BYTE_TABLE_SIZE: usize = 256;

/// 정렬된 인덱스의 항목 하나
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry<'a> {
    /// 원본 레코드
    pub record: &'a AdvisoryRecord,
    /// 글롭 메타문자가 없는 접두사 길이 (바이트)
    pub noglob_len: usize,
    /// 현재 구간을 벗어나기 위해 건너뛸 칸 수
    pub next_pfx_incr: usize,
}

impl<'a> IndexEntry<'a> {
    /// 글롭 없는 접두사 바이트
    pub fn prefix(&self) -> &'a [u8] {
        &self.record.pattern.as_bytes()[..self.noglob_len]
    }

    /// 접두사가 비어 있어 첫 바이트로 위치를 정할 수 없는 항목인지 여부
    pub fn is_unanchored(&self) -> bool {
        self.noglob_len == 0
    }
}

/// 불변 정렬 인덱스
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryIndex<'a> {
    entries: Vec<IndexEntry<'a>>,
    first_byte: [usize; FIRST_BYTE_TABLE_SIZE],
    unanchored: usize,
}

impl<'a> AdvisoryIndex<'a> {
    /// 레코드 목록에서 인덱스를 생성합니다.
    ///
    /// 결과는 레코드 내용에만 의존하며 입력 순서와 무관합니다.
    pub fn build(records: &'a [AdvisoryRecord]) -> Self {
        let mut entries: Vec<IndexEntry<'a>> = records
            .iter()
            .map(|record| IndexEntry {
                record,
                noglob_len: noglob_len(&record.pattern),
                next_pfx_incr: 1,
            })
            .collect();

        entries.sort_by(|a, b| {
            a.prefix()
                .cmp(b.prefix())
                .then_with(|| a.record.cmp(b.record))
        });

        assign_run_increments(&mut entries);

        let unanchored = entries.iter().take_while(|e| e.is_unanchored()).count();
        let first_byte = first_byte_table(&entries, unanchored);

        debug!(entries = entries.len(), unanchored, "advisory index built");

        Self {
            entries,
            first_byte,
            unanchored,
        }
    }

    /// 정렬된 항목
    pub fn entries(&self) -> &[IndexEntry<'a>] {
        &self.entries
    }

    /// 첫 바이트 테이블
    pub fn first_byte_table(&self) -> &[usize; FIRST_BYTE_TABLE_SIZE] {
        &self.first_byte
    }

    /// 맨 앞에 모인, 접두사가 빈 항목 수
    pub fn unanchored_len(&self) -> usize {
        self.unanchored
    }

    /// 이름의 첫 바이트로 탐색을 시작할 위치
    pub fn start_for(&self, name: &str) -> usize {
        name.as_bytes()
            .first()
            .map_or(self.unanchored, |&b| self.first_byte[usize::from(b)])
    }

    /// 항목 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 항목이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn assign_run_increments(entries: &mut [IndexEntry<'_>]) {
    let mut start = 0;
    while start < entries.len() {
        let head = entries[start];
        let run_len = entries[start..]
            .iter()
            .take_while(|e| {
                e.noglob_len == head.noglob_len && e.record.pattern == head.record.pattern
            })
            .count();
        entries[start].next_pfx_incr = run_len;
        start += run_len;
    }
}

fn first_byte_table(
    entries: &[IndexEntry<'_>],
    unanchored: usize,
) -> [usize; FIRST_BYTE_TABLE_SIZE] {
    let mut table = [0; FIRST_BYTE_TABLE_SIZE];
    let mut cursor = unanchored;

    for (byte, slot) in table.iter_mut().enumerate() {
        while cursor < entries.len()
            && entries[cursor]
                .prefix()
                .first()
                .is_some_and(|&first| usize::from(first) < byte)
        {
            cursor += 1;
        }
        *slot = cursor;
    }

    table
}

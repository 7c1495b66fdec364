//! 글롭 매칭 -- 패키지 이름 패턴 검사
//!
//! [`FnmatchGlob`]은 POSIX `fnmatch(3)`를 플래그 없이 호출한 것과 같은
//! 규칙을 따릅니다. `/`와 선행 `.`은 특별 취급하지 않고, `{a,b}`는
//! 확장하지 않고 문자 그대로 비교합니다.

/// 패키지 이름 글롭 매처
pub trait GlobMatcher: Send + Sync {
    /// `name`이 `pattern` 전체와 일치하는지 확인합니다.
    fn matches(&self, pattern: &str, name: &str) -> bool;
}

impl<T: GlobMatcher + ?Sized> GlobMatcher for &T {
    fn matches(&self, pattern: &str, name: &str) -> bool {
        (**self).matches(pattern, name)
    }
}

/// 기본 글롭 매처
///
/// - `*`: 0개 이상의 임의 문자
/// - `?`: 임의의 한 문자
/// - `[...]`: 문자 집합, 범위(`a-z`), 부정(`!`, `^`), `[:digit:]` 등 문자 클래스
/// - `\`: 다음 문자를 그대로 비교
///
/// 닫히지 않은 `[`는 문자 `[` 자체와 일치합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct FnmatchGlob;

impl GlobMatcher for FnmatchGlob {
    fn matches(&self, pattern: &str, name: &str) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        let name: Vec<char> = name.chars().collect();
        fnmatch(&pattern, &name)
    }
}

fn fnmatch(pattern: &[char], name: &[char]) -> bool {
    let mut p = 0;
    let mut n = 0;
    // 마지막 `*` 다음 패턴 위치와, 그 `*`가 흡수하기 시작한 이름 위치
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if let Some(next_p) = step(pattern, p, name[n]) {
            match next_p {
                Step::Star => {
                    backtrack = Some((p + 1, n));
                    p += 1;
                }
                Step::Advance(next) => {
                    p = next;
                    n += 1;
                }
            }
            continue;
        }

        match backtrack {
            Some((star_p, star_n)) => {
                p = star_p;
                n = star_n + 1;
                backtrack = Some((star_p, star_n + 1));
            }
            None => return false,
        }
    }

    while pattern.get(p) == Some(&'*') {
        p += 1;
    }
    p == pattern.len()
}

enum Step {
    Star,
    Advance(usize),
}

/// 패턴 위치 `p`의 원소를 문자 `c`에 대해 한 단계 진행합니다.
/// 불일치이면 `None`.
fn step(pattern: &[char], p: usize, c: char) -> Option<Step> {
    let current = *pattern.get(p)?;
    match current {
        '*' => Some(Step::Star),
        '?' => Some(Step::Advance(p + 1)),
        '[' => match match_bracket(pattern, p, c) {
            Some((true, next)) => Some(Step::Advance(next)),
            Some((false, _)) => None,
            None => (c == '[').then_some(Step::Advance(p + 1)),
        },
        '\\' => match pattern.get(p + 1) {
            Some(&escaped) => (escaped == c).then_some(Step::Advance(p + 2)),
            None => (c == '\\').then_some(Step::Advance(p + 1)),
        },
        literal => (literal == c).then_some(Step::Advance(p + 1)),
    }
}

/// `pattern[start]`의 `[`에서 시작하는 문자 집합을 `c`에 대해 평가합니다.
///
/// 반환값은 (일치 여부, 집합 다음 위치). 닫히지 않은 집합이면 `None`.
fn match_bracket(pattern: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = matches!(pattern.get(i), Some('!' | '^'));
    if negate {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;

    loop {
        let ch = *pattern.get(i)?;
        // 맨 앞의 `]`는 집합의 원소
        if ch == ']' && !first {
            i += 1;
            break;
        }
        first = false;

        if ch == '[' && pattern.get(i + 1) == Some(&':') {
            if let Some((class, end)) = char_class(pattern, i + 2) {
                matched |= class_contains(&class, c);
                i = end;
                continue;
            }
        }

        let (lo, after_lo) = bracket_char(pattern, i)?;
        i = after_lo;

        let is_range = pattern.get(i) == Some(&'-')
            && pattern.get(i + 1).is_some_and(|&next| next != ']');
        if is_range {
            let (hi, after_hi) = bracket_char(pattern, i + 1)?;
            i = after_hi;
            matched |= lo <= c && c <= hi;
        } else {
            matched |= lo == c;
        }
    }

    Some((matched != negate, i))
}

fn bracket_char(pattern: &[char], i: usize) -> Option<(char, usize)> {
    match *pattern.get(i)? {
        '\\' => Some((*pattern.get(i + 1)?, i + 2)),
        ch => Some((ch, i + 1)),
    }
}

/// `[:name:]`의 이름 부분을 읽습니다. `start`는 이름 첫 글자 위치.
fn char_class(pattern: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start;
    while i + 1 < pattern.len() {
        if pattern[i] == ':' && pattern[i + 1] == ']' {
            return Some((pattern[start..i].iter().collect(), i + 2));
        }
        if !pattern[i].is_ascii_alphabetic() {
            return None;
        }
        i += 1;
    }
    None
}

fn class_contains(class: &str, c: char) -> bool {
    match class {
        "alnum" => c.is_alphanumeric(),
        "alpha" => c.is_alphabetic(),
        "blank" => c == ' ' || c == '\t',
        "cntrl" => c.is_control(),
        "digit" => c.is_ascii_digit(),
        "graph" => c.is_ascii_graphic(),
        "lower" => c.is_lowercase(),
        "print" => c.is_ascii_graphic() || c == ' ',
        "punct" => c.is_ascii_punctuation(),
        "space" => c.is_whitespace(),
        "upper" => c.is_uppercase(),
        "xdigit" => c.is_ascii_hexdigit(),
        _ => false,
    }
}

//! Cover-page detection: a page/front-matter is a "cover" if it's short and carries at least one
//! of a fixed set of bilingual front-matter markers. The keyword set and the two ID regexes are
//! the distilled spec's richer restatement of the original engine's narrower
//! `_STUDENT_ID_PATTERN`-only check; this version is authoritative.

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_LEN: usize = 300;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[-./년]\s*\d{1,2}[-./월]?\s*\d{0,2}일?").unwrap());

static LEGACY_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b20\d{6,8}\b").unwrap());

// `regex` doesn't support lookaround, so the generic ID check uses a plain `\d{6,10}` scan and
// verifies non-digit boundaries by hand below.
static GENERIC_ID_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{6,10}").unwrap());

const COVER_KEYWORDS: &[&str] = &[
    "학번", "사번", "학과", "학부", "소속", "담당 교수", "지도 교수", "제출일", "제출자",
    "작성자", "작성일", "부서", "직책", "성명", "교과목", "과목명",
];

fn has_unbounded_digit_run(text: &str) -> bool {
    let bytes = text.as_bytes();
    GENERIC_ID_DIGITS.find_iter(text).any(|m| {
        let before_ok = text[..m.start()]
            .chars()
            .next_back()
            .map(|c| !c.is_ascii_digit())
            .unwrap_or(true);
        let after_ok = bytes
            .get(m.end())
            .map(|&b| !(b as char).is_ascii_digit())
            .unwrap_or(true);
        before_ok && after_ok
    })
}

pub fn is_cover_page(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() >= MAX_LEN {
        return false;
    }
    DATE_PATTERN.is_match(trimmed)
        || LEGACY_ID_PATTERN.is_match(trimmed)
        || has_unbounded_digit_run(trimmed)
        || COVER_KEYWORDS.iter().any(|kw| trimmed.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_with_student_id_is_cover() {
        assert!(is_cover_page("이름: 홍길동\n학번: 20231234"));
    }

    #[test]
    fn short_text_with_date_is_cover() {
        assert!(is_cover_page("제출일: 2024-03-15"));
    }

    #[test]
    fn long_text_is_never_cover() {
        let text = "학번 20231234 ".repeat(100);
        assert!(!is_cover_page(&text));
    }

    #[test]
    fn plain_short_text_without_markers_is_not_cover() {
        assert!(!is_cover_page("this is just a short sentence"));
    }

    #[test]
    fn generic_id_without_surrounding_digits_matches() {
        assert!(is_cover_page("참고번호 123456 입니다"));
    }

    #[test]
    fn digit_run_embedded_in_longer_number_does_not_match() {
        assert!(!is_cover_page("tracking 11234567890 code"));
    }
}

//! Built-in category keyword tables, carried over verbatim from the original engine's Tier-2
//! prototype construction. Each category's prototype embedding is the element-wise mean of its
//! keywords' embeddings, not the embedding of a concatenated string — so each keyword contributes
//! equally and the prototype stays in a single coherent region.

pub const CATEGORIES: &[&str] = &["문서", "프레젠테이션", "스프레드시트", "코드", "데이터"];

pub fn category_keywords(category: &str) -> &'static [&'static str] {
    match category {
        "문서" => &[
            "보고서", "report", "논문", "paper", "제안서", "명세서", "과제", "레포트", "계획서",
            "기획서", "회의록", "계약서", "지침서", "매뉴얼", "안내문", "공문", "설명서", "협약서",
            "의뢰서",
        ],
        "프레젠테이션" => &[
            "발표", "presentation", "슬라이드", "PPT", "피피티", "keynote", "덱", "deck",
            "발표자료", "강의", "세미나", "프레젠테이션", "발표문", "발표회", "시연",
        ],
        "스프레드시트" => &[
            "스프레드시트", "엑셀", "excel", "표", "통계", "집계", "수식", "셀", "시트",
            "데이터표", "가계부", "예산", "정산", "매출", "재무",
        ],
        "코드" => &[
            "프로그래밍", "programming", "코드", "함수", "클래스", "알고리즘", "algorithm",
            "보안", "security", "데이터베이스", "database", "네트워크", "network", "머신러닝",
            "machine learning", "운영체제", "OS", "소스코드", "개발", "구현",
        ],
        "데이터" => &[
            "데이터", "data", "분석", "CSV", "JSON", "XML", "쿼리", "SQL", "파이프라인", "ETL",
            "로그", "수집", "전처리", "시각화", "통계", "샘플",
        ],
        _ => &[],
    }
}

pub fn tag_candidates(category: &str) -> &'static [&'static str] {
    match category {
        "문서" => &[
            "논문", "보고서", "기획서", "계획서", "회의록", "계약서", "매뉴얼", "제안서", "안내문",
            "공문", "설명서", "협약서", "과제", "레포트", "학술", "연구",
        ],
        "프레젠테이션" => &[
            "발표자료", "세미나", "강의", "컨퍼런스", "시연", "교육", "워크숍", "프로젝트발표",
            "연구발표", "업무보고",
        ],
        "스프레드시트" => &[
            "예산", "정산", "매출", "재무", "통계", "집계", "가계부", "재고", "일정", "현황",
        ],
        "코드" => &[
            "보안", "네트워크", "알고리즘", "머신러닝", "데이터베이스", "운영체제", "암호화",
            "웹개발", "시스템", "인공지능",
        ],
        "데이터" => &[
            "분석결과", "로그", "설문", "통계데이터", "실험데이터", "수집데이터", "전처리",
            "시각화", "파이프라인",
        ],
        _ => &[],
    }
}

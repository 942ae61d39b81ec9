//! Static code -> label tables for the health claims extract.
//!
//! Sex, age group and region codes fall back to [`UNKNOWN_LABEL`]. Diagnosis
//! codes fall back to the code itself.

use std::{collections::HashMap, sync::LazyLock};

pub const UNKNOWN_LABEL: &str = "알수없음";

const SEX: &[(i64, &str)] = &[(1, "남자"), (2, "여자")];

const AGE_GROUPS: &[(i64, &str)] = &[
    (1, "0~4세"),
    (2, "5~9세"),
    (3, "10~14세"),
    (4, "15~19세"),
    (5, "20~24세"),
    (6, "25~29세"),
    (7, "30~34세"),
    (8, "35~39세"),
    (9, "40~44세"),
    (10, "45~49세"),
    (11, "50~54세"),
    (12, "55~59세"),
    (13, "60~64세"),
    (14, "65~69세"),
    (15, "70~74세"),
    (16, "75~79세"),
    (17, "80~84세"),
    (18, "85세+"),
];

const SIDO: &[(i64, &str)] = &[
    (11, "서울특별시"),
    (26, "부산광역시"),
    (27, "대구광역시"),
    (28, "인천광역시"),
    (29, "광주광역시"),
    (30, "대전광역시"),
    (31, "울산광역시"),
    (36, "세종특별자치시"),
    (41, "경기도"),
    (42, "강원도"),
    (43, "충청북도"),
    (44, "충청남도"),
    (45, "전라북도"),
    (46, "전라남도"),
    (47, "경상북도"),
    (48, "경상남도"),
    (49, "제주특별자치도"),
];

// Shared by primary and secondary diagnosis columns.
const DIAGNOSES: &[(&str, &str)] = &[
    ("I109", "기타 및 상세불명의 원발성 고혈압"),
    ("J209", "상세불명의 급성 기관지염"),
    ("E119", "합병증을 동반하지 않은 2형 당뇨병"),
    ("K210", "식도염을 동반한 위-식도역류병"),
    ("K219", "식도염을 동반하지 않은 위-식도역류병"),
    ("U_", "병인이 불확실"),
    ("N185", "만성 신장병(5기)"),
    ("E785", "상세불명의 고지질혈증"),
    ("K297", "상세불명의 위염"),
    ("J304", "상세불명의 알레르기비염"),
    ("J029", "상세불명의 급성 인두염"),
    ("K291", "기타 급성 위염"),
    ("J00", "급성 비인두염[감기]"),
    ("J060", "급성 후두인두염"),
    ("E782", "혼합성 고지질혈증"),
    ("A099", "상세불명 기원의 위장염 및 결장염"),
    ("J0390", "상세불명의 급성 편도염"),
    ("A090", "감염성 기원의 기타 및 상세불명의 위장염 및 결장염"),
    ("J40", "급성인지 만성인지 명시되지 않은 기관지염"),
    ("J303", "기타 알레르기비염"),
    ("K30", "기능성 소화불량"),
    ("E7808", "기타 및 상세불명의 순수고콜레스테롤혈증"),
    ("F_", "정신 및 행동 장애"),
    ("N_", "비뇨생식계통의 질환"),
];

static SEX_LABELS: LazyLock<HashMap<i64, &'static str>> =
    LazyLock::new(|| SEX.iter().copied().collect());
static AGE_GROUP_LABELS: LazyLock<HashMap<i64, &'static str>> =
    LazyLock::new(|| AGE_GROUPS.iter().copied().collect());
static SIDO_LABELS: LazyLock<HashMap<i64, &'static str>> =
    LazyLock::new(|| SIDO.iter().copied().collect());
static DIAGNOSIS_LABELS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DIAGNOSES.iter().copied().collect());

fn label_or_unknown(table: &HashMap<i64, &'static str>, code: Option<i64>) -> &'static str {
    code.and_then(|c| table.get(&c).copied())
        .unwrap_or(UNKNOWN_LABEL)
}

pub fn sex_label(code: Option<i64>) -> &'static str {
    label_or_unknown(&SEX_LABELS, code)
}

pub fn age_group_label(code: Option<i64>) -> &'static str {
    label_or_unknown(&AGE_GROUP_LABELS, code)
}

pub fn sido_label(code: Option<i64>) -> &'static str {
    label_or_unknown(&SIDO_LABELS, code)
}

/// Label for a diagnosis code, or the code itself when it is not in the table.
pub fn diagnosis_label(code: &str) -> &str {
    DIAGNOSIS_LABELS.get(code).copied().unwrap_or(code)
}

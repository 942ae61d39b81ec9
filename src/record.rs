//! Row parsing, coercion and label enrichment.
//!
//! Every data-policy decision (empty-field defaults, the cost outlier cut)
//! lives in its own function so it can be checked without any I/O.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;

use crate::{
    error::ParseError,
    mappings::{age_group_label, diagnosis_label, sex_label, sido_label},
};

/// Number of positional fields in a source row.
pub const FIELD_COUNT: usize = 10;

/// Rows whose total cost is above this are treated as outliers and dropped.
pub const COST_THRESHOLD: i64 = 10_000_000;

pub mod columns {
    pub const YEAR: &str = "기준년도";
    pub const SEX_CODE: &str = "성별코드";
    pub const AGE_GROUP_CODE: &str = "연령대코드";
    pub const SIDO_CODE: &str = "시도코드";
    pub const PRIMARY_DIAGNOSIS_CODE: &str = "주상병코드";
    pub const SECONDARY_DIAGNOSIS_CODE: &str = "부상병코드";
    pub const TOTAL_COST: &str = "심결요양급여비용총액";
    pub const COPAY: &str = "심결본인부담금";
    pub const INSURER_PAID: &str = "심결보험자부담금";
    pub const PRESCRIPTION_DAYS: &str = "총처방일수";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    #[serde(rename = "기준년도")]
    pub year: Option<i64>,
    #[serde(rename = "성별코드")]
    pub sex_code: Option<i64>,
    #[serde(rename = "연령대코드")]
    pub age_group_code: Option<i64>,
    #[serde(rename = "시도코드")]
    pub sido_code: Option<i64>,
    #[serde(rename = "주상병코드")]
    pub primary_diagnosis_code: Option<String>,
    #[serde(rename = "부상병코드")]
    pub secondary_diagnosis_code: Option<String>,
    #[serde(rename = "심결요양급여비용총액")]
    pub total_cost: Option<i64>,
    #[serde(rename = "심결본인부담금")]
    pub copay: Option<i64>,
    #[serde(rename = "심결보험자부담금")]
    pub insurer_paid: Option<i64>,
    #[serde(rename = "총처방일수")]
    pub prescription_days: i64,
}

/// A raw record plus its human-readable labels. Serializes as one flat
/// JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedRecord {
    #[serde(flatten)]
    pub raw: RawRecord,
    #[serde(rename = "성별")]
    pub sex: &'static str,
    #[serde(rename = "연령대")]
    pub age_group: &'static str,
    #[serde(rename = "시도")]
    pub sido: &'static str,
    #[serde(rename = "주상병")]
    pub primary_diagnosis: Option<String>,
    #[serde(rename = "부상병")]
    pub secondary_diagnosis: Option<String>,
}

impl MappedRecord {
    pub fn from_raw(raw: RawRecord) -> Self {
        let primary_diagnosis = raw
            .primary_diagnosis_code
            .as_deref()
            .map(|code| diagnosis_label(code).to_string());
        let secondary_diagnosis = raw
            .secondary_diagnosis_code
            .as_deref()
            .map(|code| diagnosis_label(code).to_string());
        Self {
            sex: sex_label(raw.sex_code),
            age_group: age_group_label(raw.age_group_code),
            sido: sido_label(raw.sido_code),
            primary_diagnosis,
            secondary_diagnosis,
            raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    CostOverThreshold { cost: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    Keep(MappedRecord),
    Skip(SkipReason),
}

/// Parse, filter and enrich one source line.
pub fn transform_line(line: &str) -> Result<Transformed, ParseError> {
    let raw = parse_line(line)?;
    match raw.total_cost {
        Some(cost) if exceeds_cost_threshold(Some(cost)) => {
            Ok(Transformed::Skip(SkipReason::CostOverThreshold { cost }))
        }
        _ => Ok(Transformed::Keep(MappedRecord::from_raw(raw))),
    }
}

pub fn parse_line(line: &str) -> Result<RawRecord, ParseError> {
    let fields = split_fields(line)?;
    if fields.len() < FIELD_COUNT {
        return Err(ParseError::MissingField {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }
    let field = |index: usize| fields.get(index).unwrap_or("");

    Ok(RawRecord {
        year: coerce_optional_int(field(0), columns::YEAR)?,
        sex_code: coerce_optional_int(field(1), columns::SEX_CODE)?,
        age_group_code: coerce_optional_int(field(2), columns::AGE_GROUP_CODE)?,
        sido_code: coerce_optional_int(field(3), columns::SIDO_CODE)?,
        primary_diagnosis_code: coerce_optional_text(field(4)),
        secondary_diagnosis_code: coerce_optional_text(field(5)),
        total_cost: coerce_optional_int(field(6), columns::TOTAL_COST)?,
        copay: coerce_optional_int(field(7), columns::COPAY)?,
        insurer_paid: coerce_optional_int(field(8), columns::INSURER_PAID)?,
        prescription_days: coerce_prescription_days(field(9))?,
    })
}

/// Splits one physical line on commas, honouring double-quoted fields.
pub fn split_fields(line: &str) -> Result<StringRecord, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => Ok(record),
        Ok(false) => Ok(StringRecord::new()),
        Err(err) => Err(ParseError::Split {
            message: err.to_string(),
        }),
    }
}

/// Empty -> `None`; anything else must be an integer. Surrounding whitespace
/// is ignored.
pub fn coerce_optional_int(value: &str, field: &'static str) -> Result<Option<i64>, ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ParseError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

/// Empty -> `None`; text is kept verbatim, whitespace included.
pub fn coerce_optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Prescription days is the one numeric column that defaults to zero.
pub fn coerce_prescription_days(value: &str) -> Result<i64, ParseError> {
    Ok(coerce_optional_int(value, columns::PRESCRIPTION_DAYS)?.unwrap_or(0))
}

/// Unknown cost is never an outlier.
pub fn exceeds_cost_threshold(total_cost: Option<i64>) -> bool {
    matches!(total_cost, Some(cost) if cost > COST_THRESHOLD)
}

//! Shared domain types.
//!
//! Both pipelines pass these around:
//!
//! - keyword tagging: `KeywordVocabulary` → `PredictionResult` → `ConfidenceTier`
//! - memo extraction: `MemoRow` → `MemoFields` → `ExtractionRow`
//! - streaming: `Progress<T>`

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Separator used when rendering selected keywords into a single cell.
pub const KEYWORD_SEPARATOR: &str = " | ";

/// Ordered label space of the keyword classifier.
///
/// Index `i` names the classifier's `i`-th output. Fixed once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordVocabulary {
    labels: Vec<String>,
}

impl KeywordVocabulary {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Keyword decision for one title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub keywords: Vec<String>,
    /// True iff no label crossed the threshold and the arg-max label was forced in.
    pub fallback_used: bool,
    /// Highest probability among the selected labels (0.0 when nothing is selected).
    pub max_probability: f32,
}

impl PredictionResult {
    /// Result for a blank title. Not a fallback.
    pub fn empty() -> Self {
        Self {
            keywords: Vec::new(),
            fallback_used: false,
            max_probability: 0.0,
        }
    }

    /// Keywords as a single cell value (`"a | b"`).
    pub fn joined(&self) -> String {
        self.keywords.join(KEYWORD_SEPARATOR)
    }

    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::for_result(self)
    }
}

/// Visual triage bucket for a keyword cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Success,
    Warning,
    Failure,
}

impl ConfidenceTier {
    pub const SUCCESS_MIN: f32 = 0.60;
    pub const WARNING_MIN: f32 = 0.40;

    pub const ALL: [ConfidenceTier; 3] = [
        ConfidenceTier::Success,
        ConfidenceTier::Warning,
        ConfidenceTier::Failure,
    ];

    /// Tier for a prediction.
    ///
    /// A fallback result is always `Failure`, whatever its own probability.
    pub fn for_result(result: &PredictionResult) -> Self {
        if result.fallback_used {
            return ConfidenceTier::Failure;
        }
        Self::for_probability(result.max_probability)
    }

    pub fn for_probability(p: f32) -> Self {
        if p >= Self::SUCCESS_MIN {
            ConfidenceTier::Success
        } else if p >= Self::WARNING_MIN {
            ConfidenceTier::Warning
        } else {
            ConfidenceTier::Failure
        }
    }

    /// Spreadsheet fill colour (RGB hex).
    pub fn fill_hex(self) -> &'static str {
        match self {
            ConfidenceTier::Success => "C6EFCE",
            ConfidenceTier::Warning => "FFFACD",
            ConfidenceTier::Failure => "FFC7CE",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ConfidenceTier::Success => "high",
            ConfidenceTier::Warning => "medium",
            ConfidenceTier::Failure => "low/fallback",
        }
    }
}

/// Which fine-tuned backend model extracts memo fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    /// Initial fine-tuned model.
    V1,
    /// Retrained on V1 mismatches; longer titles, may miss some V1 edge cases.
    V2,
}

impl ModelVariant {
    pub fn model_id(self) -> &'static str {
        match self {
            ModelVariant::V1 => "ft:gpt-4o-mini-2024-07-18:visual-infomedia::B01jGrca",
            ModelVariant::V2 => "ft:gpt-4o-mini-2024-07-18:visual-infomedia::BidgnWIU",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelVariant::V1 => "Version 1",
            ModelVariant::V2 => "Version 2",
        }
    }
}

/// Who issued the bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sponsor {
    K12,
    He,
    Gov,
}

impl Sponsor {
    pub const CODES: [&'static str; 3] = ["K12", "HE", "GOV"];

    pub fn as_str(self) -> &'static str {
        match self {
            Sponsor::K12 => "K12",
            Sponsor::He => "HE",
            Sponsor::Gov => "GOV",
        }
    }
}

impl FromStr for Sponsor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "K12" => Ok(Sponsor::K12),
            "HE" => Ok(Sponsor::He),
            "GOV" => Ok(Sponsor::Gov),
            other => Err(format!("unknown sponsor `{other}`")),
        }
    }
}

/// Procurement vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BidType {
    Afb,
    Atb,
    Ifb,
    Itb,
    Ntb,
    Rfb,
    Rfi,
    #[default]
    Rfp,
    Rfq,
}

impl BidType {
    pub const CODES: [&'static str; 9] = ["AFB", "ATB", "IFB", "ITB", "NTB", "RFB", "RFI", "RFP", "RFQ"];

    pub fn as_str(self) -> &'static str {
        match self {
            BidType::Afb => "AFB",
            BidType::Atb => "ATB",
            BidType::Ifb => "IFB",
            BidType::Itb => "ITB",
            BidType::Ntb => "NTB",
            BidType::Rfb => "RFB",
            BidType::Rfi => "RFI",
            BidType::Rfp => "RFP",
            BidType::Rfq => "RFQ",
        }
    }
}

impl FromStr for BidType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AFB" => Ok(BidType::Afb),
            "ATB" => Ok(BidType::Atb),
            "IFB" => Ok(BidType::Ifb),
            "ITB" => Ok(BidType::Itb),
            "NTB" => Ok(BidType::Ntb),
            "RFB" => Ok(BidType::Rfb),
            "RFI" => Ok(BidType::Rfi),
            "RFP" => Ok(BidType::Rfp),
            "RFQ" => Ok(BidType::Rfq),
            other => Err(format!("unknown bid type `{other}`")),
        }
    }
}

impl fmt::Display for BidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated fields extracted from one memo.
///
/// Dates are already rendered as `DD/MM/YYYY`, or passed through unchanged when
/// the model returned something unparseable, or empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoFields {
    pub sponsor: Option<Sponsor>,
    pub bid_type: BidType,
    pub title: String,
    pub institution: String,
    pub publish_date: String,
    pub pre_bid_date: String,
    pub due_date: String,
}

/// One input row of the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoRow {
    pub uid: String,
    pub state: String,
    pub bid_document_url: String,
    pub bid_url: String,
    pub memo: String,
}

/// Output columns of the extraction pipeline, in order.
pub const EXTRACTION_COLUMNS: [&str; 14] = [
    "UID",
    "Bid Keywords",
    "Bid Sponsor",
    "Bid Type",
    "Zip Code",
    "State",
    "Bid Title",
    "Bid Document Url",
    "Institution",
    "Bid Url",
    "Publish Date",
    "Pre Bid",
    "Due Date",
    "Memo",
];

/// One output row of the extraction pipeline.
///
/// Identifier fields and the memo are always copied from the input; the
/// extracted fields are blank when extraction failed or the memo was empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRow {
    pub uid: String,
    pub sponsor: String,
    pub bid_type: String,
    pub state: String,
    pub title: String,
    pub bid_document_url: String,
    pub institution: String,
    pub bid_url: String,
    pub publish_date: String,
    pub pre_bid_date: String,
    pub due_date: String,
    pub memo: String,
}

impl ExtractionRow {
    pub fn from_fields(input: &MemoRow, fields: &MemoFields) -> Self {
        Self {
            sponsor: fields.sponsor.map(Sponsor::as_str).unwrap_or_default().to_string(),
            bid_type: fields.bid_type.as_str().to_string(),
            title: fields.title.clone(),
            institution: fields.institution.clone(),
            publish_date: fields.publish_date.clone(),
            pre_bid_date: fields.pre_bid_date.clone(),
            due_date: fields.due_date.clone(),
            ..Self::blank(input)
        }
    }

    pub fn blank(input: &MemoRow) -> Self {
        Self {
            uid: input.uid.clone(),
            sponsor: String::new(),
            bid_type: String::new(),
            state: input.state.clone(),
            title: String::new(),
            bid_document_url: input.bid_document_url.clone(),
            institution: String::new(),
            bid_url: input.bid_url.clone(),
            publish_date: String::new(),
            pre_bid_date: String::new(),
            due_date: String::new(),
            memo: input.memo.clone(),
        }
    }

    /// True when every extracted field is blank.
    pub fn is_blank(&self) -> bool {
        [
            &self.sponsor,
            &self.bid_type,
            &self.title,
            &self.institution,
            &self.publish_date,
            &self.pre_bid_date,
            &self.due_date,
        ]
        .iter()
        .all(|s| s.is_empty())
    }

    /// Cells in `EXTRACTION_COLUMNS` order. Keywords and zip code stay blank.
    pub fn to_record(&self) -> [&str; 14] {
        [
            self.uid.as_str(),
            "",
            self.sponsor.as_str(),
            self.bid_type.as_str(),
            "",
            self.state.as_str(),
            self.title.as_str(),
            self.bid_document_url.as_str(),
            self.institution.as_str(),
            self.bid_url.as_str(),
            self.publish_date.as_str(),
            self.pre_bid_date.as_str(),
            self.due_date.as_str(),
            self.memo.as_str(),
        ]
    }
}

/// One event of a row stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress<T> {
    /// 1-based index of the row just processed.
    pub index: usize,
    pub total: usize,
    pub item: T,
}

impl<T> Progress<T> {
    pub fn is_complete(&self) -> bool {
        self.index == self.total
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.index * 100) / self.total).min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(keywords: &[&str], fallback_used: bool, max_probability: f32) -> PredictionResult {
        PredictionResult {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            fallback_used,
            max_probability,
        }
    }

    #[test]
    fn tiers_follow_probability_bands() {
        assert_eq!(prediction(&["a"], false, 0.60).tier(), ConfidenceTier::Success);
        assert_eq!(prediction(&["a"], false, 0.59).tier(), ConfidenceTier::Warning);
        assert_eq!(prediction(&["a"], false, 0.40).tier(), ConfidenceTier::Warning);
        assert_eq!(prediction(&["a"], false, 0.39).tier(), ConfidenceTier::Failure);
    }

    #[test]
    fn fallback_is_always_failure_tier() {
        assert_eq!(prediction(&["a"], true, 0.95).tier(), ConfidenceTier::Failure);
    }

    #[test]
    fn blank_title_is_failure_tier() {
        assert_eq!(PredictionResult::empty().tier(), ConfidenceTier::Failure);
    }

    #[test]
    fn keywords_join_with_pipe() {
        assert_eq!(prediction(&["furniture", "school"], false, 0.7).joined(), "furniture | school");
        assert_eq!(PredictionResult::empty().joined(), "");
    }

    #[test]
    fn blank_extraction_row_keeps_identifiers() {
        let input = MemoRow {
            uid: "U-1".to_string(),
            state: "TX".to_string(),
            bid_document_url: "https://docs".to_string(),
            bid_url: "https://bid".to_string(),
            memo: "memo text".to_string(),
        };
        let row = ExtractionRow::blank(&input);
        assert!(row.is_blank());
        let record = row.to_record();
        assert_eq!(record.len(), EXTRACTION_COLUMNS.len());
        assert_eq!(record[0], "U-1");
        assert_eq!(record[5], "TX");
        assert_eq!(record[7], "https://docs");
        assert_eq!(record[9], "https://bid");
        assert_eq!(record[13], "memo text");
    }

    #[test]
    fn codes_round_trip_through_from_str() {
        for code in BidType::CODES {
            assert_eq!(code.parse::<BidType>().unwrap().as_str(), code);
        }
        for code in Sponsor::CODES {
            assert_eq!(code.parse::<Sponsor>().unwrap().as_str(), code);
        }
        assert_eq!(BidType::default(), BidType::Rfp);
    }
}

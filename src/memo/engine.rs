//! Memo field extraction and normalization.
//!
//! One completion call per memo. Any transport problem or non-conforming
//! response becomes an `ExtractionFailure` for that memo only; a conforming
//! response is normalized through the field validators so sponsor and bid type
//! are always allow-listed values.

use std::fmt;

use serde::Deserialize;

use crate::domain::{BidType, MemoFields, ModelVariant, Sponsor};
use crate::memo::client::{CompletionRequest, CompletionService};
use crate::memo::prompt::{SCHEMA_NAME, SYSTEM_INSTRUCTION, build_prompt, memo_schema};
use crate::validate::{normalize_memo_date, validate_enum};

/// Per-memo failure. Carries the record identifier so the row can still be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub uid: String,
    pub cause: String,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error processing UID {}: {}", self.uid, self.cause)
    }
}

impl std::error::Error for ExtractionFailure {}

/// Completion response as it comes off the wire.
#[derive(Debug, Deserialize)]
struct RawMemoFields {
    #[serde(rename = "Bid_Sponsor")]
    sponsor: String,
    #[serde(rename = "Bid_Type")]
    bid_type: String,
    #[serde(rename = "Bid_Title")]
    title: String,
    #[serde(rename = "Institution")]
    institution: String,
    #[serde(rename = "Publish_Date", default)]
    publish_date: Option<String>,
    #[serde(rename = "Pre_Bid_Date", default)]
    pre_bid_date: Option<String>,
    #[serde(rename = "Due_Date", default)]
    due_date: Option<String>,
}

pub struct MemoExtractor<C> {
    client: C,
    schema: serde_json::Value,
}

impl<C: CompletionService> MemoExtractor<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            schema: memo_schema(),
        }
    }

    /// Extract and validate the fields of one memo.
    pub fn extract(&self, uid: &str, memo: &str, variant: ModelVariant) -> Result<MemoFields, ExtractionFailure> {
        let fail = |cause: String| ExtractionFailure {
            uid: uid.to_string(),
            cause,
        };

        let prompt = build_prompt(memo);
        let request = CompletionRequest {
            model: variant.model_id(),
            system: SYSTEM_INSTRUCTION,
            prompt: &prompt,
            schema_name: SCHEMA_NAME,
            schema: &self.schema,
        };

        let value = self.client.complete(&request).map_err(|e| fail(e.to_string()))?;
        let raw: RawMemoFields =
            serde_json::from_value(value).map_err(|e| fail(format!("Response does not match schema: {e}")))?;

        Ok(normalize(raw))
    }
}

fn normalize(raw: RawMemoFields) -> MemoFields {
    let sponsor = validate_enum(raw.sponsor.trim(), &Sponsor::CODES, "").parse::<Sponsor>().ok();
    let bid_type = validate_enum(raw.bid_type.trim(), &BidType::CODES, BidType::default().as_str())
        .parse::<BidType>()
        .unwrap_or_default();

    MemoFields {
        sponsor,
        bid_type,
        title: raw.title,
        institution: raw.institution,
        publish_date: normalize_memo_date(raw.publish_date.as_deref()),
        pre_bid_date: normalize_memo_date(raw.pre_bid_date.as_deref()),
        due_date: normalize_memo_date(raw.due_date.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::client::CompletionError;
    use serde_json::{Value, json};
    use std::cell::RefCell;

    enum Reply {
        Json(Value),
        Timeout,
    }

    struct StubCompletion {
        reply: Reply,
        models: RefCell<Vec<String>>,
    }

    impl StubCompletion {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                models: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionService for StubCompletion {
        fn complete(&self, request: &CompletionRequest<'_>) -> Result<Value, CompletionError> {
            self.models.borrow_mut().push(request.model.to_string());
            match &self.reply {
                Reply::Json(v) => Ok(v.clone()),
                Reply::Timeout => Err(CompletionError::Timeout("operation timed out".to_string())),
            }
        }
    }

    fn full_response() -> Value {
        json!({
            "Bid_Sponsor": "K12",
            "Bid_Type": "RFQ",
            "Bid_Title": "Classroom Furniture",
            "Institution": "Springfield ISD",
            "Publish_Date": "2024-03-05",
            "Pre_Bid_Date": null,
            "Due_Date": "2024-04-01"
        })
    }

    #[test]
    fn valid_response_is_normalized() {
        let extractor = MemoExtractor::new(StubCompletion::new(Reply::Json(full_response())));
        let fields = extractor.extract("U1", "memo", ModelVariant::V1).unwrap();

        assert_eq!(fields.sponsor, Some(Sponsor::K12));
        assert_eq!(fields.bid_type, BidType::Rfq);
        assert_eq!(fields.title, "Classroom Furniture");
        assert_eq!(fields.institution, "Springfield ISD");
        assert_eq!(fields.publish_date, "05/03/2024");
        assert_eq!(fields.pre_bid_date, "");
        assert_eq!(fields.due_date, "01/04/2024");
    }

    #[test]
    fn out_of_list_values_get_defaults() {
        let mut response = full_response();
        response["Bid_Sponsor"] = json!("University");
        response["Bid_Type"] = json!("Tender");
        response["Due_Date"] = json!("next Friday");

        let extractor = MemoExtractor::new(StubCompletion::new(Reply::Json(response)));
        let fields = extractor.extract("U1", "memo", ModelVariant::V1).unwrap();

        assert_eq!(fields.sponsor, None);
        assert_eq!(fields.bid_type, BidType::Rfp);
        assert_eq!(fields.due_date, "next Friday");
    }

    #[test]
    fn absent_pre_bid_date_is_allowed() {
        let mut response = full_response();
        response.as_object_mut().unwrap().remove("Pre_Bid_Date");

        let extractor = MemoExtractor::new(StubCompletion::new(Reply::Json(response)));
        let fields = extractor.extract("U1", "memo", ModelVariant::V2).unwrap();
        assert_eq!(fields.pre_bid_date, "");
    }

    #[test]
    fn missing_required_field_is_a_row_failure() {
        let mut response = full_response();
        response.as_object_mut().unwrap().remove("Bid_Title");

        let extractor = MemoExtractor::new(StubCompletion::new(Reply::Json(response)));
        let failure = extractor.extract("U7", "memo", ModelVariant::V1).unwrap_err();
        assert_eq!(failure.uid, "U7");
        assert!(failure.cause.contains("Bid_Title"));
    }

    #[test]
    fn transport_failure_carries_uid() {
        let extractor = MemoExtractor::new(StubCompletion::new(Reply::Timeout));
        let failure = extractor.extract("U9", "memo", ModelVariant::V1).unwrap_err();
        assert_eq!(failure.uid, "U9");
        assert!(failure.to_string().starts_with("Error processing UID U9"));
    }

    #[test]
    fn variant_selects_backend_model() {
        let extractor = MemoExtractor::new(StubCompletion::new(Reply::Json(full_response())));
        extractor.extract("U1", "memo", ModelVariant::V1).unwrap();
        extractor.extract("U2", "memo", ModelVariant::V2).unwrap();

        let models = extractor.client.models.borrow();
        assert_eq!(models[0], ModelVariant::V1.model_id());
        assert_eq!(models[1], ModelVariant::V2.model_id());
    }
}

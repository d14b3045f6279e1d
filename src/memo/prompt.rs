//! Fixed instructions and response schema for memo extraction.

use serde_json::{Value, json};

pub const SCHEMA_NAME: &str = "MemoInfo";

pub const SYSTEM_INSTRUCTION: &str = "You are an expert at structured data extraction. You will be given an \
unstructured memo and should extract structured values in the defined format.";

/// Embed a memo in the extraction instructions.
pub fn build_prompt(memo: &str) -> String {
    format!(
        "Extract the following information from the memo:\n\
         - Bid Sponsor (one of: HE (Higher Education), K12 (K-12 institutions), GOV (Government institutions))\n\
         - Bid Type (one of: AFB, ATB, IFB, ITB, NTB, RFB, RFI, RFP, RFQ)\n\
         - Bid Title\n\
         - Institution\n\
         - Publish Date (if given, YYYY-MM-DD)\n\
         - Pre-Bid Date (if any, YYYY-MM-DD)\n\
         - Due Date (YYYY-MM-DD)\n\
         \n\
         Memo:\n\
         {memo}\n"
    )
}

/// JSON schema of the completion response.
///
/// Strict structured output requires every property to be listed as required,
/// so optional dates are expressed as nullable instead.
pub fn memo_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "Bid_Sponsor": { "type": "string" },
            "Bid_Type": { "type": "string" },
            "Bid_Title": { "type": "string" },
            "Institution": { "type": "string" },
            "Publish_Date": { "type": ["string", "null"] },
            "Pre_Bid_Date": { "type": ["string", "null"] },
            "Due_Date": { "type": ["string", "null"] }
        },
        "required": [
            "Bid_Sponsor",
            "Bid_Type",
            "Bid_Title",
            "Institution",
            "Publish_Date",
            "Pre_Bid_Date",
            "Due_Date"
        ],
        "additionalProperties": false
    })
}

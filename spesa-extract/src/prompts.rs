//! The two instruction templates sent to the model.
//!
//! Both anchor on the reference date so relative phrases ("yesterday",
//! "last month") resolve against the real current date, and both demand a
//! single JSON object so the reply parses without any scraping.

use chrono::NaiveDate;
use spesa_core::{CATEGORIES, DATE_FORMAT};

/// Prompt for turning a free-text expense message into one transaction
/// record.
pub fn extraction_prompt(user_text: &str, reference_date: NaiveDate) -> String {
    let today = reference_date.format(DATE_FORMAT);
    let categories = CATEGORIES.join(", ");
    format!(
        "You are a precise bookkeeping assistant.\n\
         TEMPORAL CONTEXT: today is {today}.\n\
         Analyze: \"{user_text}\"\n\
         Reply with exactly one JSON object, nothing else:\n\
         {{\n\
           \"date\": \"date of the expense, format DD-MM-YYYY\",\n\
           \"category\": \"one of [{categories}]\",\n\
           \"description\": \"what was purchased\",\n\
           \"amount\": number (use a dot for decimals, e.g. 12.50)\n\
         }}"
    )
}

/// Prompt for resolving a fuzzy month phrase into a canonical `MM-YYYY`
/// key. The model does the month arithmetic; the caller only checks the
/// key's shape.
pub fn resolution_prompt(user_text: &str, reference_date: NaiveDate) -> String {
    let today = reference_date.format(DATE_FORMAT);
    format!(
        "You are a precise bookkeeping assistant.\n\
         TEMPORAL CONTEXT: today is {today}.\n\
         The user asked for expenses of: \"{user_text}\"\n\
         Reply with exactly one JSON object, nothing else:\n\
         {{\"target\": \"the month as MM-YYYY\"}}\n\
         If the text does not refer to any month or date, reply:\n\
         {{\"target\": null}}"
    )
}

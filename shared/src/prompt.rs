//! Prompt composition for the inference provider.
//!
//! Both builders take data that has already crossed the redaction boundary:
//! the search prompt only accepts [`SanitizedRosterEntry`], and the comment
//! prompt runs every free-form field through [`redact_deep`] itself.

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::Locale;
use crate::redact::{redact_deep, redact_text};
use crate::roster::SanitizedRosterEntry;
use crate::Result;

/// Upper bound on ids the model may return, repeated in the instructions.
pub const MAX_RESULT_IDS: usize = 30;

/// Upper bound on items in each comment list.
pub const MAX_COMMENT_ITEMS: usize = 20;

/// System instruction plus user payload for one inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const SEARCH_SYSTEM_TR: &str = r#"Sen bir kişisel antrenör asistanısın. Görevin, verilen öğrenci listesinden antrenörün sorgusuna uyan öğrencileri seçmektir.
KURALLAR:
- Yalnızca "students" listesindeki öğrencilerden seçim yap. Listede olmayan bir id asla üretme.
- Çıktın yalnızca TEK bir JSON nesnesi olmalı, başka hiçbir metin yazma.
- JSON nesnesi tam olarak iki anahtar içermeli: "ids" (string dizisi) ve "reason" (kısa Türkçe açıklama).
- En fazla 30 id döndür.
- Uyan öğrenci yoksa {"ids": [], "reason": "..."} döndür.
- status alanı "Active" veya "Inactive" olabilir; lastActivityAtMs son kayıt zamanıdır (epoch ms)."#;

const SEARCH_SYSTEM_EN: &str = r#"You are a personal trainer's assistant. Your task is to select the students from the given list that match the trainer's query.
RULES:
- Select only from the students in the "students" list. Never produce an id that is not in the list.
- Your output must be a SINGLE JSON object and nothing else.
- The JSON object must have exactly two keys: "ids" (array of strings) and "reason" (short English explanation).
- Return at most 30 ids.
- If no student matches, return {"ids": [], "reason": "..."}.
- status is "Active" or "Inactive"; lastActivityAtMs is the time of the last record (epoch ms)."#;

const FITNESS_SYSTEM_TR: &str = r#"Sen bir kişisel antrenör asistanısın. Görevin yalnızca bir öğrencinin vücut ölçümlerini ve antrenman verilerini yorumlamaktır.
KURALLAR:
- Fitness, vücut kompozisyonu ve antrenman dışındaki konularda yanıt verme; bu durumda summary alanında bunu kısaca belirt.
- Tıbbi teşhis koyma, tedavi veya ilaç önerme. Gerekirse bir sağlık uzmanına danışılmasını öner.
- Çıktın yalnızca TEK bir JSON nesnesi olmalı, başka hiçbir metin yazma.
- JSON anahtarları: "summary" (string), "warnings" (string dizisi), "nextSteps" (string dizisi), "tags" (string dizisi).
- Her dizi en fazla 20 öğe içermeli. Türkçe yaz."#;

const FITNESS_SYSTEM_EN: &str = r#"You are a personal trainer's assistant. Your only task is to interpret one student's body measurements and training data.
RULES:
- Do not answer anything outside fitness, body composition and training; if asked, say so briefly in the summary field.
- Do not diagnose medical conditions or recommend treatment or medication. Suggest consulting a health professional when appropriate.
- Your output must be a SINGLE JSON object and nothing else.
- JSON keys: "summary" (string), "warnings" (array of strings), "nextSteps" (array of strings), "tags" (array of strings).
- Each array holds at most 20 items. Write in English."#;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchPayload<'a> {
    query_text: String,
    students: &'a [SanitizedRosterEntry],
}

/// Build the search prompt. The query text is redacted here; the roster must
/// already be sanitized.
pub fn build_search_prompt(
    query_text: &str,
    roster: &[SanitizedRosterEntry],
    locale: Locale,
) -> Result<Prompt> {
    let system = match locale {
        Locale::Tr => SEARCH_SYSTEM_TR,
        Locale::En => SEARCH_SYSTEM_EN,
    };
    let payload = SearchPayload {
        query_text: redact_text(query_text),
        students: roster,
    };

    Ok(Prompt {
        system: system.to_string(),
        user: serde_json::to_string(&payload)?,
    })
}

/// Fields of a fitness comment request that are forwarded to the model.
#[derive(Debug, Clone)]
pub struct FitnessPromptInput<'a> {
    pub student_id: &'a str,
    pub goal: Option<&'a str>,
    pub question: Option<&'a str>,
    pub measurements: &'a Value,
}

pub fn build_fitness_prompt(input: &FitnessPromptInput<'_>, locale: Locale) -> Result<Prompt> {
    let system = match locale {
        Locale::Tr => FITNESS_SYSTEM_TR,
        Locale::En => FITNESS_SYSTEM_EN,
    };
    let redact_opt = |v: Option<&str>| v.map(|s| redact_deep(&Value::String(s.to_string())));
    let payload = json!({
        "studentId": input.student_id,
        "locale": locale,
        "goal": redact_opt(input.goal),
        "question": redact_opt(input.question),
        "measurements": redact_deep(input.measurements),
    });

    Ok(Prompt {
        system: system.to_string(),
        user: serde_json::to_string(&payload)?,
    })
}

//! Prompt templates.
//!
//! Placeholders in braces are filled by [`verification_prompt`] and
//! [`summary_prompt`]. The field headers in the verification template are
//! taken from the parser's [`HeaderTable`], so the reply format the model is
//! asked for is always one the parser reads.

use claimcheck_core::{FieldKind, HeaderTable, TargetLanguage, EVIDENCE_SEPARATOR};

/// Verification prompt.
///
/// Asks for a verdict, an explanation in the target language, and verbatim
/// quotes with their source tags. `NO_INFO` must come without evidence.
pub const VERIFICATION_TEMPLATE: &str = r#"
You are an expert multilingual fact-checker.
Your task is to verify the CLAIM using only the CONTEXT below.

----------------
CONTEXT (source material):
{context}
----------------

CLAIM: "{claim}"

### CRITICAL INSTRUCTIONS:
1. **TARGET LANGUAGE**: Write the explanation in **{target_language}**.
   The explanation MUST be in {target_language} even when the context is in another language.
2. **EVIDENCE RULE**:
   - If the verdict is "NO_INFO", do not produce any evidence. Write "None".
   - If the verdict is "TRUE" or "FALSE", copy quotes **EXACTLY AS THEY APPEAR** (verbatim) in the context.

### REQUIRED FORMAT:
{verdict_header} [TRUE / FALSE / NO_INFO]
{explanation_header} [Reasoning in {target_language}]
{evidence_header}
- "Verbatim quote from the context" {separator} [SOURCE: Title (URL)]

### YOUR RESPONSE:
"#;

/// Summary prompt.
pub const SUMMARY_TEMPLATE: &str = r#"
You are a helpful assistant.

INPUTS:
- TOPIC OF INTEREST: "{claim}"
- TEXT TO SUMMARIZE: "{context}"

TASK:
Write a clear, concise summary of the information in the TEXT that is relevant to the TOPIC.

GUIDELINES:
1. **Focus**: Include only details related to the TOPIC. Leave out unrelated information.
2. **Style**: Write one smooth paragraph in your own words. Do not list sentences.
3. **No Meta-talk**: Do not write "The text says" or "The article mentions". Present the information directly.
4. **Language**: Write the response strictly in **{target_language}**.

SUMMARY:
"#;

/// Fill the verification template.
pub fn verification_prompt(
    context: &str,
    claim: &str,
    language: TargetLanguage,
    headers: &HeaderTable,
) -> String {
    VERIFICATION_TEMPLATE
        .replace("{verdict_header}", headers.canonical(FieldKind::Verdict))
        .replace("{explanation_header}", headers.canonical(FieldKind::Explanation))
        .replace("{evidence_header}", headers.canonical(FieldKind::Evidence))
        .replace("{separator}", EVIDENCE_SEPARATOR)
        .replace("{target_language}", language.label())
        .replace("{claim}", claim)
        // context last: retrieved text may itself contain braces
        .replace("{context}", context)
}

/// Fill the summary template.
pub fn summary_prompt(context: &str, claim: &str, language: TargetLanguage) -> String {
    SUMMARY_TEMPLATE
        .replace("{target_language}", language.label())
        .replace("{claim}", claim)
        .replace("{context}", context)
}

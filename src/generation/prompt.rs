//! The fixed instruction template sent to the language model.

/// Instruction template with the two slots `{question}` and `{text}`.
///
/// The model always receives the instruction, then the question, then the
/// grounding diary text, in this layout.
pub const DIARY_QA_TEMPLATE: &str = "
你是一个十分优秀的助手，擅长帮人根据他的日记内容回答问题。请根据以下日记回答以下问题。:
Question: {question}

Diary: {text}
";

/// Fill the template. Slots are substituted in a single pass, so braces inside
/// the question or the diary text are never re-interpreted.
pub fn render(question: &str, text: &str) -> String {
    let mut out = String::with_capacity(DIARY_QA_TEMPLATE.len() + question.len() + text.len());
    let mut rest = DIARY_QA_TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{question}") {
            out.push_str(question);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{text}") {
            out.push_str(text);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

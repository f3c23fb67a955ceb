/// Instruction sent to the model for one question.
pub fn build_prompt(main_topic: &str, keyword: &str, language: &str) -> String {
    format!(
        r#"You write questions for an AI and deep learning certification exam.
Create one exam-style multiple-choice question with exactly four options for the theme and keyword below.

Theme: {main_topic}
Focus keyword: {keyword}

Instructions:
- Test understanding of how "{keyword}" works, the ideas behind it, and related knowledge, not only its definition.
- Mix in practical content such as applications and distinguishing characteristics.
- The explanation must say why the correct option is right and why each other option is wrong.
- Write the question, options and explanation in {language}.

Respond with a single JSON object and nothing else, in this shape:
{{
    "question": "question text",
    "options": ["option 1", "option 2", "option 3", "option 4"],
    "answer": "the correct option, copied exactly from options",
    "explanation": "detailed explanation"
}}"#
    )
}

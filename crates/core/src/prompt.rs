//! Prompt assembly: turns every stored record plus the incoming question into the
//! single system-context block sent to the completion model.
//!
//! All records are always included in listing order. Nothing is truncated,
//! deduplicated, or filtered, so the context grows linearly with the store.

use crate::domain::training::TrainingRecord;

pub const DEFAULT_PRODUCT_NAME: &str = "FailSafe";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptAssembler {
    product_name: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_NAME)
    }
}

impl PromptAssembler {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self { product_name: product_name.into() }
    }

    pub fn assemble(&self, records: &[TrainingRecord], question: &str) -> String {
        let mut context = format!(
            "You are a bot trained to answer questions about the {} product. Here is the training data:\n\n",
            self.product_name
        );
        for record in records {
            context.push_str(&format!("Q: {}\nA: {}\n\n", record.question, record.answer));
        }
        context.push_str(&format!("\nUser's Question: {question}\nAnswer:"));
        context
    }
}

#[cfg(test)]
mod tests {
    use super::PromptAssembler;
    use crate::domain::training::{QuestionId, TrainingRecord, UserId};

    fn record(question: &str, answer: &str) -> TrainingRecord {
        TrainingRecord {
            user_id: UserId::generate(),
            question_id: QuestionId::generate(),
            question: question.to_owned(),
            answer: answer.to_owned(),
        }
    }

    #[test]
    fn empty_store_yields_intro_and_question_only() {
        let prompt = PromptAssembler::default().assemble(&[], "What is FailSafe?");

        assert_eq!(
            prompt,
            "You are a bot trained to answer questions about the FailSafe product. Here is the training data:\n\n\nUser's Question: What is FailSafe?\nAnswer:"
        );
    }

    #[test]
    fn single_record_is_rendered_as_q_and_a_block() {
        let records = vec![record("What is FailSafe?", "A monitoring tool.")];
        let prompt = PromptAssembler::default().assemble(&records, "What is FailSafe?");

        assert!(prompt.contains("Q: What is FailSafe?\nA: A monitoring tool.\n\n"));
        assert!(prompt.ends_with("\nUser's Question: What is FailSafe?\nAnswer:"));
    }

    #[test]
    fn every_record_appears_once_in_listing_order() {
        let records = vec![
            record("first?", "one"),
            record("Article", "two"),
            record("third?", "three"),
        ];
        let prompt = PromptAssembler::default().assemble(&records, "which?");

        assert_eq!(prompt.matches("Q: ").count(), 3);
        assert_eq!(prompt.matches("\nA: ").count(), 3);
        assert_eq!(prompt.matches("User's Question: which?").count(), 1);

        let first = prompt.find("Q: first?\nA: one").expect("first block");
        let second = prompt.find("Q: Article\nA: two").expect("second block");
        let third = prompt.find("Q: third?\nA: three").expect("third block");
        let question = prompt.find("User's Question").expect("question marker");
        assert!(first < second && second < third && third < question);
    }

    #[test]
    fn duplicate_records_are_not_collapsed() {
        let records = vec![record("same?", "same"), record("same?", "same")];
        let prompt = PromptAssembler::default().assemble(&records, "q");

        assert_eq!(prompt.matches("Q: same?\nA: same\n\n").count(), 2);
    }

    #[test]
    fn product_name_is_configurable() {
        let prompt = PromptAssembler::new("Acme Pager").assemble(&[], "");

        assert!(prompt.starts_with(
            "You are a bot trained to answer questions about the Acme Pager product."
        ));
        assert!(prompt.ends_with("User's Question: \nAnswer:"));
    }
}

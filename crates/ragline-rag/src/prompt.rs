//! Context assembly and the grounding prompt.

use ragline_core::RetrievalResult;

/// Returned instead of a generated answer when retrieval finds nothing.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not find any information related to your question.";

/// Retrieved texts in rank order, each under a 1-based `[Doc i]` label,
/// separated by a blank line.
pub fn build_context(result: &RetrievalResult) -> String {
    result
        .documents()
        .enumerate()
        .map(|(i, doc)| format!("[Doc {}]\n{}", i + 1, doc.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question using the documents below.\n\
         \n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Rules:\n\
         - Answer strictly from the content of the documents provided above.\n\
         - Do not guess or infer facts that the documents do not state.\n\
         - If the documents are not sufficient, say \"The documents do not contain this information.\"\n\
         \n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_core::{Document, RetrievedDocument};

    fn hits(texts: &[&str]) -> RetrievalResult {
        RetrievalResult::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| RetrievedDocument { document: Document::new(format!("doc_{i}"), *t), score: 1.0 })
                .collect(),
        )
    }

    #[test]
    fn context_labels_follow_rank() {
        let context = build_context(&hits(&["first text", "second text"]));
        assert_eq!(context, "[Doc 1]\nfirst text\n\n[Doc 2]\nsecond text");
    }

    #[test]
    fn empty_result_gives_empty_context() {
        assert_eq!(build_context(&RetrievalResult::default()), "");
    }

    #[test]
    fn prompt_carries_context_question_and_rules() {
        let prompt = build_prompt("[Doc 1]\nRDF is a data model.", "What is RDF?");
        assert!(prompt.contains("[Doc 1]\nRDF is a data model."));
        assert!(prompt.contains("Question: What is RDF?"));
        assert!(prompt.contains("strictly from the content"));
        assert!(prompt.contains("Do not guess"));
        assert!(prompt.contains("do not contain this information"));
        assert!(prompt.ends_with("Answer:"));
    }
}

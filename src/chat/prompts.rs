//! Prompt templates for session chat

use crate::insight::InsightRecord;
use crate::session::ConversationTurn;

/// Render an insight record as a compact context block.
///
/// Used when the session has no retrievable chunks, or when query embedding
/// fails and retrieval has to be skipped.
pub fn insight_context(insights: &InsightRecord) -> String {
    let mut out = String::from("Business profile extracted from the website:\n");
    out.push_str(&format!("- Industry: {}\n", insights.industry));
    out.push_str(&format!("- Company size: {}\n", insights.company_size));
    out.push_str(&format!("- Location: {}\n", insights.location));
    out.push_str(&format!("- Unique selling proposition: {}\n", insights.usp));
    if !insights.products_services.is_empty() {
        out.push_str(&format!(
            "- Products/services: {}\n",
            insights.products_services.join(", ")
        ));
    }
    out.push_str(&format!("- Target audience: {}\n", insights.target_audience));
    if !insights.key_insights.is_empty() {
        out.push_str("- Key insights:\n");
        for insight in &insights.key_insights {
            out.push_str(&format!("  - {}\n", insight));
        }
    }
    out
}

/// Build the grounded chat prompt.
///
/// `context` holds retrieved passages in descending relevance (or the insight
/// block when retrieval yielded nothing); `history` is the trailing window of
/// the conversation, oldest first.
pub fn chat_prompt(
    url: &str,
    context: &str,
    history: &[ConversationTurn],
    question: &str,
) -> String {
    let mut prompt = format!(
        r#"You are a helpful assistant answering questions about the website {url}.

Use ONLY the context below to answer. If the context does not contain the
answer, say so plainly rather than guessing.

Context:
{context}
"#
    );

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for turn in history {
            let speaker = match turn.role {
                crate::session::Role::User => "User",
                crate::session::Role::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{}: {}\n", speaker, turn.content));
        }
    }

    prompt.push_str(&format!("\nUser: {}\nAssistant:", question));
    prompt
}

/// Build the follow-up suggestion prompt.
///
/// The model is asked for a small JSON object so the response parses with the
/// same machinery as insight extraction.
pub fn follow_up_prompt(url: &str, context: &str, history: &[ConversationTurn]) -> String {
    let mut prompt = format!(
        r#"You are helping a user explore the website {url}.

Context:
{context}
"#
    );

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for turn in history {
            let speaker = match turn.role {
                crate::session::Role::User => "User",
                crate::session::Role::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{}: {}\n", speaker, turn.content));
        }
    }

    prompt.push_str(
        "\nSuggest up to 5 short follow-up questions the user could ask next, \
         grounded in the context above. Respond with JSON only, in exactly this \
         shape: {\"suggestions\": [\"question\", ...]}\n",
    );
    prompt
}

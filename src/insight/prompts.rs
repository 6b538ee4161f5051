//! Prompt templates for insight extraction

/// Truncate text to at most `max_chars` bytes on a char boundary
pub(crate) fn truncate_content(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Build the core insight-extraction prompt
pub fn extraction_prompt(content: &str, custom_questions: &[String], max_chars: usize) -> String {
    let content = truncate_content(content, max_chars);

    let mut prompt = format!(
        r#"You are an expert business analyst. Analyze the following website content and extract key business insights.

Website Content:
{content}

Extract the following information and respond with a single JSON object matching exactly this schema:

{{
  "industry": "What industry does this company primarily belong to? (e.g., SaaS, E-commerce, Healthcare)",
  "company_size": "Approximate company size (e.g., Startup, Small, Medium, Large, Enterprise)",
  "location": "Where the company is headquartered or primarily located (city, state/country)",
  "usp": "The company's unique selling proposition - what makes them stand out",
  "products_services": ["List of the main products or services offered"],
  "target_audience": "The primary target audience or customer demographic",
  "contact_info": {{
    "email": "Primary contact email if found, else null",
    "phone": "Phone number if found, else null",
    "address": "Physical address if found, else null"
  }},
  "confidence": 7,
  "key_insights": ["Additional important insights about the business"]
}}

Guidelines:
- Be specific and factual based on the content
- If information is not available, use "Not specified" or empty arrays
- Focus on information explicitly stated or clearly implied
- For company size, infer from context (team size mentions, funding, etc.)
- For industry, be as specific as possible (not just "Technology")
- "confidence" must be an integer from 1 to 10 reflecting how clear the information is in the content
- Respond with JSON only, no surrounding prose
"#
    );

    if !custom_questions.is_empty() {
        prompt.push_str("\nAdditionally, answer these specific questions:\n");
        for question in custom_questions {
            prompt.push_str(&format!("- {}\n", question));
        }
        prompt.push_str(
            "Include the answers as a \"custom_answers\" object in the JSON response, \
             keyed by question.\n",
        );
    }

    prompt
}

/// Build the corrective prompt sent after schema-invalid output
pub fn corrective_prompt(original_prompt: &str, reason: &str) -> String {
    format!(
        "{original_prompt}\n\
         Your previous response was rejected: {reason}.\n\
         Respond again with ONLY the JSON object described above. Do not include \
         explanations, Markdown fences, or any text outside the JSON object.\n"
    )
}

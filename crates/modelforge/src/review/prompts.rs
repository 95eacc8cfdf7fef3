//! Prompt construction for external script review.

use super::types::ReviewRequest;

/// Build the review prompt: criteria, model context, script, and the
/// required JSON response shape.
pub fn review_prompt(request: &ReviewRequest) -> String {
    format!(
        "You are a senior data-warehouse engineer reviewing a generated data model load script.\n\
         \n\
         Review the following COMPLETE load script and provide a score from 0-100.\n\
         \n\
         ## Review Criteria:\n\
         1. Correctness - Do the key renames link facts to dimensions as intended?\n\
         2. Synthetic keys - Could any pair of tables share more than one field name?\n\
         3. Performance - Are loads QVD-optimized where possible?\n\
         4. Naming - Are generated names consistent and collision-free?\n\
         5. Completeness - Are all tables stored and cleaned up at the end?\n\
         \n\
         ## Model Context:\n\
         - Model type: {model}\n\
         - Fact tables: {facts}\n\
         - Dimension tables: {dims}\n\
         - Expected total rows: {rows}\n\
         \n\
         ## FULL LOAD SCRIPT:\n\
         \n\
         {script}\n\
         \n\
         ## Required Response Format (JSON only):\n\
         {{\n\
         \x20 \"review_status\": \"approved\" or \"issues_found\",\n\
         \x20 \"score\": <number 0-100>,\n\
         \x20 \"summary\": \"<brief assessment>\",\n\
         \x20 \"issues\": [\n\
         \x20   {{\n\
         \x20     \"issue_id\": \"ISSUE-001\",\n\
         \x20     \"severity\": \"critical|high|medium|low\",\n\
         \x20     \"category\": \"<category>\",\n\
         \x20     \"title\": \"<short title>\",\n\
         \x20     \"location\": \"<table or stage>\",\n\
         \x20     \"description\": \"<issue description>\",\n\
         \x20     \"recommendation\": \"<fix suggestion>\",\n\
         \x20     \"fix_example\": \"<corrected snippet, optional>\"\n\
         \x20   }}\n\
         \x20 ]\n\
         }}",
        model = request.model_type.label(),
        facts = request.facts_count,
        dims = request.dimensions_count,
        rows = request.expected_rows,
        script = request.script,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ModelType;

    #[test]
    fn test_prompt_embeds_script_and_context() {
        let prompt = review_prompt(&ReviewRequest {
            script: "LOAD A FROM [x.qvd] (qvd);".to_string(),
            model_type: ModelType::StarSchema,
            facts_count: 1,
            dimensions_count: 2,
            expected_rows: 50_500,
        });

        assert!(prompt.contains("Model type: star_schema"));
        assert!(prompt.contains("Fact tables: 1"));
        assert!(prompt.contains("LOAD A FROM [x.qvd] (qvd);"));
        assert!(prompt.contains("\"review_status\""));
    }
}

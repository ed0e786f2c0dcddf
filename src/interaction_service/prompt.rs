use once_cell::sync::Lazy;
use serde_json::{Value, json};

use super::InteractionRequest;

/// Output schema the model is constrained to, in the Gemini schema dialect.
pub static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "interactions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "severity": {
                            "type": "STRING",
                            "description": "One of: Minor, Moderate, Major, Contraindicated"
                        },
                        "drugs": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        },
                        "mechanism": { "type": "STRING" },
                        "clinicalEffect": { "type": "STRING" },
                        "recommendation": { "type": "STRING" }
                    },
                    "required": ["severity", "drugs", "mechanism", "clinicalEffect", "recommendation"]
                }
            },
            "summary": { "type": "STRING" }
        },
        "required": ["interactions", "summary"]
    })
});

fn system_instruction(agent_name: &str) -> String {
    format!(
        r#"You are {agent_name}, an expert clinical pharmacist assistant.
Identify clinically relevant drug-drug interactions among the medications the user lists.
Classify every interaction's severity as exactly one of: Minor, Moderate, Major, Contraindicated.
List interactions from most to least clinically relevant.
For each interaction, explain the mechanism, the clinical effect and a concise management recommendation.
If there are no significant interactions, return an empty interactions array and say so in the summary.
Respond only with JSON matching the provided schema."#
    )
}

fn user_prompt(drug_text: &str) -> String {
    format!(
        "Analyze potential interactions between the following medications: {}",
        drug_text
    )
}

/// Build the request for one analysis. `drug_text` is embedded trimmed but
/// otherwise verbatim; splitting the list is left to the model.
pub fn build_request(model: &str, drug_text: &str, agent_name: &str) -> InteractionRequest {
    InteractionRequest {
        model: model.to_string(),
        prompt: user_prompt(drug_text.trim()),
        system_instruction: system_instruction(agent_name.trim()),
        response_schema: RESPONSE_SCHEMA.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_embeds_drugs_and_persona() {
        let request = build_request("gemini-2.5-flash", "  Warfarin, Aspirin \n", "Dr. Rx");
        assert_eq!(request.model, "gemini-2.5-flash");
        assert!(request.prompt.ends_with("Warfarin, Aspirin"));
        assert!(request.system_instruction.starts_with("You are Dr. Rx,"));
        assert!(request.system_instruction.contains("Contraindicated"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = &*RESPONSE_SCHEMA;
        assert_eq!(schema["required"], json!(["interactions", "summary"]));

        let item = &schema["properties"]["interactions"]["items"];
        let required: Vec<&str> = item["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec!["severity", "drugs", "mechanism", "clinicalEffect", "recommendation"]
        );
        assert_eq!(item["properties"]["drugs"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["summary"]["type"], "STRING");
    }
}

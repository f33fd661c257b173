//! Prompt assembly for grounded answers.
//!
//! Retrieval evidence from both collections is packed into one structured
//! chat request: a system instruction carrying the answering policy, and a
//! user message whose parts hold the text snippets, up to two inline
//! images, and the metadata for both result sets.

use base64::Engine;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm::{ChatMessage, ChatRequest};
use crate::retrieval::Retrieved;

/// Answering policy handed to the model. The tie-break between text and
/// image evidence is deliberately delegated here instead of being fused
/// numerically: the two collections' scores are not comparable.
const ANSWER_INSTRUCTIONS: &str = "\
You are a helpful shopping assistant. Use the following product information \
to answer the question, supplementing your answer with the metadata. Provide \
one main answer and one alternative answer.
If the question concerns appearance (color, size, shape), prioritize the \
image results and their metadata; rating, discount and price become \
secondary. If the answer is not visible in the images, say you cannot find \
it from the image and answer from the text results instead.
If the question concerns the product or brand name, rating or discount, \
prioritize the text results. The results are sorted by relevance: the first \
entry in each list is the closest match.
Answer in prose, not bullet points, and always include the product_id.";

/// How many images a prompt embeds when image evidence is available.
pub const IMAGE_SLOTS: usize = 2;

/// Assembled inputs for one model call. Image slots are all-or-nothing:
/// either both carry base64 data or both are empty placeholders.
#[derive(Debug, Clone)]
pub struct PromptInputs {
    pub query: String,
    pub texts: Vec<String>,
    pub text_metadata: Vec<Value>,
    pub image_data: [String; IMAGE_SLOTS],
    pub image_metadata: [Value; IMAGE_SLOTS],
}

/// Pack retrieval results into [`PromptInputs`].
///
/// The top [`IMAGE_SLOTS`] image locators are read from disk and inlined
/// as base64, but only when at least that many image hits exist;
/// otherwise both slots stay empty (no single-image prompt). A failed
/// image read is a hard error: the caller asked for image grounding and
/// must not get a silently degraded answer.
pub fn assemble(
    query: &str,
    text_results: &[Retrieved],
    image_results: &[Retrieved],
) -> Result<PromptInputs, AppError> {
    let mut image_data: [String; IMAGE_SLOTS] = Default::default();
    let mut image_metadata: [Value; IMAGE_SLOTS] = std::array::from_fn(|_| json!({}));

    if image_results.len() >= IMAGE_SLOTS {
        for slot in 0..IMAGE_SLOTS {
            let result = &image_results[slot];
            let path = std::path::Path::new(&result.content);
            let bytes = std::fs::read(path).map_err(|source| AppError::ImageRead {
                path: path.to_path_buf(),
                source,
            })?;
            image_data[slot] = base64::engine::general_purpose::STANDARD.encode(bytes);
            image_metadata[slot] = result.metadata.clone();
        }
    }

    Ok(PromptInputs {
        query: query.to_string(),
        texts: text_results.iter().map(|r| r.content.clone()).collect(),
        text_metadata: text_results.iter().map(|r| r.metadata.clone()).collect(),
        image_data,
        image_metadata,
    })
}

impl PromptInputs {
    /// Whether the image slots carry data.
    pub fn has_images(&self) -> bool {
        self.image_data.iter().all(|data| !data.is_empty())
    }

    /// Render the chat request: system instructions plus a multi-part user
    /// message. Empty image slots contribute no image parts; their
    /// metadata slots still appear, as empty records.
    pub fn to_request(&self) -> ChatRequest {
        let system = ChatMessage::system(format!(
            "{}\n\nQuestion: {}\n\nAnswer:",
            ANSWER_INSTRUCTIONS, self.query
        ));

        let mut parts = vec![json!({
            "type": "text",
            "text": self.texts.join("\n\n"),
        })];
        if self.has_images() {
            for data in &self.image_data {
                parts.push(json!({
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/jpeg;base64,{data}") },
                }));
            }
        }
        parts.push(json!({
            "type": "text",
            "text": format!("Text Metadata: {}", Value::Array(self.text_metadata.clone())),
        }));
        for (index, metadata) in self.image_metadata.iter().enumerate() {
            parts.push(json!({
                "type": "text",
                "text": format!("Image {} Metadata: {}", index + 1, metadata),
            }));
        }

        ChatRequest::new(vec![system, ChatMessage::user_parts(parts)])
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn image_result(dir: &Path, id: &str) -> Retrieved {
        let path = dir.join(format!("{id}.jpg"));
        std::fs::write(&path, format!("jpeg-{id}")).unwrap();
        let uri = path.to_string_lossy().into_owned();
        Retrieved {
            content: uri.clone(),
            metadata: json!({ "product_id": id }),
            uri,
            distance: 0.1,
        }
    }

    fn text_result(id: &str) -> Retrieved {
        Retrieved {
            content: format!("Product: Widget {id}"),
            metadata: json!({ "product_id": id }),
            uri: format!("/images/{id}.jpg"),
            distance: 0.2,
        }
    }

    #[test]
    fn embeds_exactly_top_two_images() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![
            image_result(dir.path(), "1"),
            image_result(dir.path(), "2"),
            image_result(dir.path(), "3"),
        ];

        let inputs = assemble("query", &[text_result("1")], &images).unwrap();
        assert!(inputs.has_images());
        assert_eq!(
            inputs.image_data[0],
            base64::engine::general_purpose::STANDARD.encode("jpeg-1")
        );
        assert_eq!(inputs.image_metadata[1]["product_id"], "2");
    }

    #[test]
    fn fewer_than_two_image_hits_leaves_both_slots_empty() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![image_result(dir.path(), "1")];

        let inputs = assemble("query", &[], &images).unwrap();
        assert!(!inputs.has_images());
        assert_eq!(inputs.image_data, ["", ""]);
        assert_eq!(inputs.image_metadata[0], json!({}));
    }

    #[test]
    fn unreadable_image_is_a_hard_error() {
        let gone = Retrieved {
            content: "/nonexistent/1.jpg".to_string(),
            metadata: json!({}),
            uri: "/nonexistent/1.jpg".to_string(),
            distance: 0.0,
        };
        let other = gone.clone();

        let err = assemble("query", &[], &[gone, other]).unwrap_err();
        assert!(matches!(err, AppError::ImageRead { .. }));
    }

    #[test]
    fn request_carries_policy_and_evidence() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![image_result(dir.path(), "1"), image_result(dir.path(), "2")];
        let inputs = assemble("red headphones", &[text_result("9")], &images).unwrap();

        let request = inputs.to_request();
        assert_eq!(request.messages.len(), 2);

        let system = request.messages[0].content.as_str().unwrap();
        assert!(system.contains("product_id"));
        assert!(system.contains("Question: red headphones"));

        let parts = request.messages[1].content.as_array().unwrap();
        let image_parts = parts
            .iter()
            .filter(|p| p["type"] == "image_url")
            .count();
        assert_eq!(image_parts, 2);
        assert!(parts[0]["text"].as_str().unwrap().contains("Widget 9"));
    }

    #[test]
    fn request_without_images_has_no_image_parts() {
        let inputs = assemble("query", &[text_result("9")], &[]).unwrap();
        let request = inputs.to_request();
        let parts = request.messages[1].content.as_array().unwrap();
        assert!(parts.iter().all(|p| p["type"] != "image_url"));
        // Metadata placeholders for both slots are still present.
        assert!(parts
            .iter()
            .any(|p| p["text"].as_str().is_some_and(|t| t.starts_with("Image 2 Metadata"))));
    }
}

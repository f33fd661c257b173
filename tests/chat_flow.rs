//! End-to-end flow over the in-memory store backend: ingest a small
//! catalog, then answer text and image queries with a scripted model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use shopmate_backend::assistant::Assistant;
use shopmate_backend::catalog::ProductRow;
use shopmate_backend::errors::AppError;
use shopmate_backend::ingest::ingest;
use shopmate_backend::llm::{ChatModel, ChatRequest};
use shopmate_backend::store::MemoryCollection;

/// Returns a canned answer and keeps every request for inspection.
struct ScriptedModel {
    reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, AppError> {
        self.requests.lock().await.push(request);
        Ok(self.reply.clone())
    }
}

fn row(id: &str, name: &str) -> ProductRow {
    ProductRow {
        product_id: id.to_string(),
        name: name.to_string(),
        sub_category: "Audio".to_string(),
        ratings: "4.5".to_string(),
        no_of_ratings: "120".to_string(),
        discount_price: "19.99".to_string(),
        actual_price: "29.99".to_string(),
    }
}

fn write_image(dir: &Path, id: &str) {
    std::fs::write(dir.join(format!("{id}.jpg")), format!("jpeg-{id}")).unwrap();
}

#[tokio::test]
async fn ingest_then_answer_text_query() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "1");
    write_image(dir.path(), "2");
    write_image(dir.path(), "3");
    let rows = [
        row("1", "Desk Lamp"),
        row("2", "Smartphone X"),
        row("3", "Toaster"),
        row("4", "Ghost Product"), // no image, must be skipped
    ];

    let text = Arc::new(MemoryCollection::new("text"));
    let image = Arc::new(MemoryCollection::new("image"));

    let report = ingest(text.as_ref(), image.as_ref(), &rows, dir.path(), 100)
        .await
        .unwrap();
    assert_eq!(report.processed, 3);
    assert_eq!(report.skipped_missing_image, 1);
    assert_eq!(report.text_total, 3);
    assert_eq!(report.image_total, 3);

    let model = ScriptedModel::new("The closest match is product 2.");
    let assistant = Assistant::new(text.clone(), image.clone(), model.clone(), 5, 0.3);

    let envelope = assistant.answer("smartphone").await.unwrap();
    assert_eq!(envelope.answer, "The closest match is product 2.");
    assert!(!envelope.texts.is_empty());
    assert!(envelope.texts.len() <= 5);
    assert_eq!(envelope.texts[0].metadata["product_id"], "2");

    // Three image hits exist, so the prompt embeds exactly two images.
    let requests = model.requests.lock().await;
    let parts = requests[0].messages[1].content.as_array().unwrap();
    let image_parts = parts.iter().filter(|p| p["type"] == "image_url").count();
    assert_eq!(image_parts, 2);
}

#[tokio::test]
async fn image_query_returns_image_evidence_only() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "1");
    write_image(dir.path(), "2");
    let rows = [row("1", "Desk Lamp"), row("2", "Smartphone X")];

    let text = Arc::new(MemoryCollection::new("text"));
    let image = Arc::new(MemoryCollection::new("image"));
    ingest(text.as_ref(), image.as_ref(), &rows, dir.path(), 100)
        .await
        .unwrap();

    let model = ScriptedModel::new("Looks like a desk lamp.");
    let assistant = Assistant::new(text, image, model, 5, 0.3);

    let query_image = dir.path().join("upload.jpg");
    std::fs::write(&query_image, b"jpeg-upload").unwrap();

    let envelope = assistant.answer_by_image(&query_image).await.unwrap();
    assert_eq!(envelope.answer, "Looks like a desk lamp.");
    assert!(envelope.texts.is_empty());
    assert_eq!(envelope.images.len(), 2);
}

#[tokio::test]
async fn missing_query_image_fails_the_query() {
    let text = Arc::new(MemoryCollection::new("text"));
    let image = Arc::new(MemoryCollection::new("image"));
    let model = ScriptedModel::new("unused");
    let assistant = Assistant::new(text, image, model, 5, 0.3);

    let err = assistant
        .answer_by_image(Path::new("/nonexistent/upload.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ImageRead { .. }));
}

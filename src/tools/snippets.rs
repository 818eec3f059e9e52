//! Snippet save/get tools and their blob bindings.
//!
//! Handlers only see a [`BlobOutput`] slot or the bytes already read; key resolution and the
//! actual store I/O happen in the binding functions around them.

use crate::storage::{BlobOutput, SnippetKey, SnippetStore, StorageError};

use super::{
    ToolError,
    arguments::{self, TriggerPayload},
    spec::{SAVE_SNIPPET, SNIPPET_NAME_PROPERTY, SNIPPET_PROPERTY},
};

/// Validate the arguments and place the snippet content in `file`.
///
/// Returns the user-facing result; validation failures are messages, not errors.
pub fn save_snippet(file: &mut BlobOutput, payload: &TriggerPayload) -> String {
    let args = match arguments::extract_for(payload, &SAVE_SNIPPET) {
        Ok(args) => args,
        Err(err) => return err.to_string(),
    };

    let content = args.required(SNIPPET_PROPERTY);
    file.set(content);
    format!("Snippet '{content}' saved successfully")
}

/// Decode stored snippet bytes as UTF-8 text.
pub fn get_snippet(file: &[u8], _payload: &TriggerPayload) -> Result<String, ToolError> {
    let content = std::str::from_utf8(file)?.to_string();
    tracing::info!(bytes = content.len(), "Retrieved snippet");
    Ok(content)
}

/// Resolve `snippets/{snippetname}.json` from the trigger payload.
pub fn resolve_key(payload: &TriggerPayload) -> Result<SnippetKey, StorageError> {
    let args = arguments::extract(payload)
        .map_err(|err| StorageError::Unresolved(err.to_string()))?;
    let name = args.get_str(SNIPPET_NAME_PROPERTY).ok_or_else(|| {
        StorageError::Unresolved(format!("argument '{SNIPPET_NAME_PROPERTY}' is missing"))
    })?;
    SnippetKey::for_name(name)
}

/// Run `save_snippet` with an output binding flushed to `store`.
pub async fn invoke_save_snippet(
    store: &dyn SnippetStore,
    payload: &TriggerPayload,
) -> Result<String, ToolError> {
    let mut file = BlobOutput::new();
    let result = save_snippet(&mut file, payload);
    if let Some(content) = file.take() {
        let key = resolve_key(payload)?;
        store.write(&key, &content).await?;
        tracing::info!(snippet = %key, bytes = content.len(), "Saved snippet");
    }
    Ok(result)
}

/// Run `get_snippet` with an input binding read from `store`.
pub async fn invoke_get_snippet(
    store: &dyn SnippetStore,
    payload: &TriggerPayload,
) -> Result<String, ToolError> {
    let key = resolve_key(payload)?;
    let bytes = store.read(&key).await?;
    get_snippet(&bytes, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySnippetStore;
    use serde_json::json;

    fn save(payload: TriggerPayload) -> (String, Option<String>) {
        let mut file = BlobOutput::new();
        let result = save_snippet(&mut file, &payload);
        (result, file.take())
    }

    #[test]
    fn save_with_text_context_sets_blob() {
        let ctx = json!({ "arguments": { "snippetname": "name", "snippet": "content" } });
        let (result, written) = save(TriggerPayload::Text(ctx.to_string()));
        assert_eq!(result, "Snippet 'content' saved successfully");
        assert_eq!(written.as_deref(), Some("content"));
    }

    #[test]
    fn save_with_object_context_sets_blob() {
        let ctx = json!({ "arguments": { "snippetname": "name", "snippet": "content" } });
        let (result, written) = save(TriggerPayload::from(ctx));
        assert_eq!(result, "Snippet 'content' saved successfully");
        assert_eq!(written.as_deref(), Some("content"));
    }

    #[test]
    fn save_checks_name_before_content() {
        let (result, written) = save(TriggerPayload::from(json!({ "arguments": {} })));
        assert_eq!(result, "No snippet name provided");
        assert!(written.is_none());

        let ctx = json!({ "arguments": { "snippet": "content" } });
        let (result, _) = save(TriggerPayload::from(ctx));
        assert_eq!(result, "No snippet name provided");
    }

    #[test]
    fn save_rejects_empty_content() {
        let ctx = json!({ "arguments": { "snippetname": "name", "snippet": "" } });
        let (result, written) = save(TriggerPayload::from(ctx));
        assert_eq!(result, "No snippet content provided");
        assert!(written.is_none());
    }

    #[test]
    fn save_reports_payload_shape_errors() {
        assert_eq!(
            save(TriggerPayload::from("not json")).0,
            "Invalid request payload"
        );
        assert_eq!(
            save(TriggerPayload::from(json!(12345))).0,
            "Invalid request payload"
        );
        assert_eq!(
            save(TriggerPayload::from(json!({ "arguments": "not a dict" }))).0,
            "Invalid arguments"
        );
    }

    #[test]
    fn get_returns_blob_text() {
        let result = get_snippet(br#"{"foo": "bar"}"#, &TriggerPayload::from(json!(null)))
            .expect("utf-8 content");
        assert_eq!(result, r#"{"foo": "bar"}"#);
    }

    #[test]
    fn get_fails_on_invalid_utf8() {
        let err = get_snippet(&[0xff], &TriggerPayload::from(json!(null)))
            .expect_err("invalid utf-8 must not decode");
        assert!(matches!(err, ToolError::Decode(_)));
    }

    #[tokio::test]
    async fn save_then_get_round_trips_through_store() {
        let store = MemorySnippetStore::new();
        let save_ctx = TriggerPayload::from(
            json!({ "arguments": { "snippetname": "todo", "snippet": "buy milk" } }),
        );
        let saved = invoke_save_snippet(&store, &save_ctx).await.expect("save");
        assert_eq!(saved, "Snippet 'buy milk' saved successfully");

        let get_ctx = TriggerPayload::from(json!({ "arguments": { "snippetname": "todo" } }));
        let fetched = invoke_get_snippet(&store, &get_ctx).await.expect("get");
        assert_eq!(fetched, "buy milk");
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing() {
        let store = MemorySnippetStore::new();
        let ctx = TriggerPayload::from(json!({ "arguments": { "snippetname": "todo" } }));
        let result = invoke_save_snippet(&store, &ctx).await.expect("no binding error");
        assert_eq!(result, "No snippet content provided");

        let key = SnippetKey::for_name("todo").expect("key");
        assert!(matches!(
            store.read(&key).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_with_unresolvable_key_is_fatal() {
        let store = MemorySnippetStore::new();
        let ctx = TriggerPayload::from(json!({
            "arguments": { "snippetname": "a/b", "snippet": "content" }
        }));
        let err = invoke_save_snippet(&store, &ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::Storage(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn get_binding_errors_are_fatal() {
        let store = MemorySnippetStore::new();

        let missing = TriggerPayload::from(json!({ "arguments": { "snippetname": "nope" } }));
        let err = invoke_get_snippet(&store, &missing).await.unwrap_err();
        assert!(matches!(err, ToolError::Storage(StorageError::NotFound(_))));

        let unnamed = TriggerPayload::from(json!({ "arguments": {} }));
        let err = invoke_get_snippet(&store, &unnamed).await.unwrap_err();
        assert!(matches!(err, ToolError::Storage(StorageError::Unresolved(_))));

        store
            .insert_raw(SnippetKey::for_name("bad").expect("key"), vec![0xff])
            .await;
        let bad = TriggerPayload::from(json!({ "arguments": { "snippetname": "bad" } }));
        let err = invoke_get_snippet(&store, &bad).await.unwrap_err();
        assert!(matches!(err, ToolError::Decode(_)));
    }
}

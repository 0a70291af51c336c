use chrono::NaiveDate;
use llm::{LlmClient, LlmProvider};
use mockito::{Matcher, Server};
use serial_test::serial;
use todo::{Assistant, Category, GenerationSettings, Priority, Task};

fn essay() -> Task {
    let due = NaiveDate::from_ymd_opt(2026, 10, 21)
        .unwrap()
        .and_hms_opt(23, 59, 0)
        .unwrap();
    Task::new("Essay", due)
        .priority(Priority::High)
        .category(Category::School)
}

async fn answer_mock(server: &mut Server, body: serde_json::Value) -> mockito::Mock {
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(body))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "Essay first."}}]}"#)
        .create_async()
        .await
}

#[tokio::test]
#[serial]
async fn test_env_sampling_reaches_model_without_settings() {
    let mut server = Server::new_async().await;
    let mock = answer_mock(&mut server, serde_json::json!({ "max_tokens": 50 })).await;

    std::env::set_var("LLM_PROVIDER", "local");
    std::env::set_var("LOCAL_LLM_URL", format!("{}/v1", server.url()));
    std::env::set_var("MAX_TOKENS", "50");
    let client = LlmClient::from_env();
    std::env::remove_var("LLM_PROVIDER");
    std::env::remove_var("LOCAL_LLM_URL");
    std::env::remove_var("MAX_TOKENS");

    let assistant = Assistant::new(client.expect("local provider needs no key"));
    let answer = assistant.ask(&[essay()], "What first?").await.unwrap();

    assert_eq!(answer, "Essay first.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_explicit_settings_override_client_defaults() {
    let mut server = Server::new_async().await;
    let mock = answer_mock(
        &mut server,
        serde_json::json!({ "max_tokens": 128, "temperature": 0.25 }),
    )
    .await;

    let client = LlmClient::new(
        LlmProvider::Local {
            url: server.url(),
            model: "tiny".to_string(),
        },
        256,
        0.7,
    );
    let assistant = Assistant::new(client).with_settings(GenerationSettings {
        max_tokens: Some(128),
        temperature: Some(0.25),
    });
    let answer = assistant.ask(&[essay()], "What first?").await.unwrap();

    assert_eq!(answer, "Essay first.");
    mock.assert_async().await;
}

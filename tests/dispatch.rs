//! Capability dispatch: degradation, pass-through and failure masking.

mod common;

use ai_provider_hub::config::keys;
use ai_provider_hub::provider::{
    Capability, CapabilityRequest, CapabilitySet, PredictRequest, PromptQuery,
};
use ai_provider_hub::service::CONFIGURE_PROVIDER_FALLBACK;
use ai_provider_hub::{DispatchOutcome, Error};
use common::{harness, single, Scripted};
use serde_json::{json, Value};

fn request_for(capability: Capability) -> CapabilityRequest {
    CapabilityRequest::from_parts(capability, Some("1")).unwrap()
}

#[tokio::test]
async fn unconfigured_provider_degrades_every_capability() {
    let h = harness(
        None,
        Scripted::new(CapabilitySet::ALL),
        Scripted::new(CapabilitySet::ALL),
    );
    for capability in Capability::ALL {
        let outcome = h.service.invoke(request_for(capability)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Unsupported(format!(
                "{} not supported by this LLM Provider",
                capability.description()
            ))
        );
    }
    assert!(h.notifier.is_empty());
}

#[tokio::test]
async fn unknown_provider_name_degrades_without_notifying() {
    let alita = Scripted::new(CapabilitySet::ALL);
    let h = harness(Some("Copilot"), alita.clone(), Scripted::new(CapabilitySet::ALL));

    let outcome = h.service.get_datasources().await;
    assert_eq!(
        outcome.message(),
        Some("List datasources not supported by this LLM Provider")
    );
    assert_eq!(alita.created(), 0);
    assert!(h.service.selector().active().is_none());
    assert!(h.notifier.is_empty());
}

#[tokio::test]
async fn missing_capability_is_reported_by_description() {
    let script = Scripted::new(CapabilitySet::of(&[Capability::Chat]));
    let h = single(script.clone());

    let outcome = h.service.get_prompts(PromptQuery::page(0)).await;
    assert_eq!(
        outcome.into_value(),
        json!("List prompts not supported by this LLM Provider")
    );
    assert_eq!(script.calls(), 0, "undeclared capability must not reach the provider");
    assert!(h.notifier.is_empty());
}

#[tokio::test]
async fn results_pass_through_unchanged() {
    let script = Scripted::new(CapabilitySet::ALL);
    let h = single(script);

    let params = json!({"messages": [{"role": "user", "content": "hi"}], "stream": false});
    let outcome = h.service.chat(params.clone()).await;
    assert_eq!(outcome, DispatchOutcome::Completed(params));

    let outcome = h.service.stop_datasource_task("42").await;
    assert_eq!(outcome.value(), Some(&json!({"called": "stopDatasourceTask"})));
}

#[tokio::test]
async fn provider_failure_is_masked_and_notified_once() {
    let script = Scripted::new(CapabilitySet::ALL).failing(502);
    let h = single(script);

    let outcome = h.service.get_application_detail("7").await;
    assert_eq!(
        outcome,
        DispatchOutcome::Failed(CONFIGURE_PROVIDER_FALLBACK.to_string())
    );
    assert_eq!(outcome.into_value(), Value::String(CONFIGURE_PROVIDER_FALLBACK.into()));

    let notifications = h.notifier.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "test getApplicationDetail");
    assert!(notifications[0].show_output_button);
    assert!(matches!(
        notifications[0].error.as_ref(),
        Error::Remote { status: 502, .. }
    ));
}

#[tokio::test]
async fn predict_passes_through() {
    let h = single(Scripted::new(CapabilitySet::ALL));
    let outcome = h
        .service
        .predict(PredictRequest::new("You are helpful", "hello").with_prompt_template("3"))
        .await;
    assert_eq!(outcome, DispatchOutcome::Completed(json!({"echo": "hello"})));
    assert!(h.notifier.is_empty());
}

#[tokio::test]
async fn predict_without_capability_fails_through_error_path() {
    let script = Scripted::new(CapabilitySet::of(&[Capability::Chat]));
    let h = single(script.clone());

    let outcome = h.service.predict(PredictRequest::new("", "hello")).await;
    assert!(outcome.is_failed());
    assert_eq!(script.calls(), 1, "predict skips the capability check");

    let notifications = h.notifier.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "test is not able to connect");
    assert!(matches!(
        notifications[0].error.as_ref(),
        Error::Unsupported { .. }
    ));
}

#[tokio::test]
async fn predict_without_provider_is_a_failure() {
    let h = harness(
        None,
        Scripted::new(CapabilitySet::ALL),
        Scripted::new(CapabilitySet::ALL),
    );
    let outcome = h.service.predict(PredictRequest::new("", "hello")).await;
    assert_eq!(outcome.message(), Some(CONFIGURE_PROVIDER_FALLBACK));

    let notifications = h.notifier.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(matches!(
        notifications[0].error.as_ref(),
        Error::Configuration { .. }
    ));
}

#[tokio::test]
async fn invalid_provider_settings_are_swallowed() {
    let h = single(Scripted::new(CapabilitySet::ALL));
    h.config.set(keys::TEMPERATURE, "warm");

    let outcome = h.service.get_socket_config().await;
    assert!(outcome.is_unsupported());
    assert!(h.notifier.is_empty());
}

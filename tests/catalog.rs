//! Integration catalog: flattening, cached lookups and invalidation.

mod common;

use ai_provider_hub::catalog::NO_MODEL_SELECTED;
use ai_provider_hub::config::{keys, ConfigSource};
use ai_provider_hub::provider::{Capability, CapabilitySet};
use ai_provider_hub::{Error, ModelChoice};
use common::{harness, sample_integrations, single, Scripted};
use serde_json::{json, Value};

#[tokio::test]
async fn list_model_names_flattens_in_order() {
    let h = single(Scripted::new(CapabilitySet::ALL).with_payload(sample_integrations()));

    let names: Vec<Value> = h
        .service
        .list_model_names()
        .await
        .unwrap()
        .iter()
        .map(ModelChoice::to_value)
        .collect();
    assert_eq!(
        names,
        vec![json!({"A": "m1"}), json!({"A": "m2"}), json!({"B": "m3"})]
    );
}

#[tokio::test]
async fn cached_lookup_reuses_last_fetch() {
    let script = Scripted::new(CapabilitySet::ALL).with_payload(sample_integrations());
    let h = single(script.clone());

    h.service.list_model_names().await.unwrap();
    assert_eq!(script.fetches(), 1);

    assert_eq!(h.service.resolve_uid("B", true).await.unwrap(), vec!["uid-b"]);
    assert!(h.service.resolve_uid("C", true).await.unwrap().is_empty());
    assert_eq!(
        h.service.resolve_integration_name("A", true).await.unwrap(),
        vec!["Integration A"]
    );
    assert_eq!(script.fetches(), 1);

    h.service.resolve_uid("B", false).await.unwrap();
    assert_eq!(script.fetches(), 2);
}

#[tokio::test]
async fn cached_lookup_fetches_when_nothing_is_cached() {
    let script = Scripted::new(CapabilitySet::ALL).with_payload(sample_integrations());
    let h = single(script.clone());

    assert!(h.service.cached_catalog().is_none());
    assert_eq!(h.service.resolve_uid("A", true).await.unwrap(), vec!["uid-a"]);
    assert_eq!(script.fetches(), 1);
}

#[tokio::test]
async fn provider_switch_invalidates_cached_catalog() {
    let alita = Scripted::new(CapabilitySet::ALL).with_payload(sample_integrations());
    let openai = Scripted::new(CapabilitySet::ALL).with_payload(json!([
        {"uid": "uid-b2", "name": "Other B", "config": {"name": "B"},
         "settings": {"models": [{"name": "m9"}]}}
    ]));
    let h = harness(Some("Alita"), alita.clone(), openai.clone());

    h.service.list_model_names().await.unwrap();
    h.config.set(keys::LLM_PROVIDER, "OpenAI");

    // Cached data was requested, but it belongs to the previous provider.
    assert_eq!(h.service.resolve_uid("B", true).await.unwrap(), vec!["uid-b2"]);
    assert_eq!(alita.fetches(), 1);
    assert_eq!(openai.fetches(), 1);

    assert_eq!(h.service.resolve_uid("B", true).await.unwrap(), vec!["uid-b2"]);
    assert_eq!(openai.fetches(), 1);
}

#[tokio::test]
async fn failed_fetch_clears_cache() {
    let script = Scripted::new(CapabilitySet::ALL).with_payload(sample_integrations());
    let h = single(script.clone());
    h.service.list_model_names().await.unwrap();
    assert!(h.service.cached_catalog().is_some());

    script.set_payload(json!({"unexpected": "shape"}));
    let err = h.service.fetch_integrations().await.unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));
    assert!(h.service.cached_catalog().is_none());
}

#[tokio::test]
async fn missing_catalog_capability_is_an_error() {
    let h = single(Scripted::new(CapabilitySet::of(&[Capability::Chat])));
    let err = h.service.list_model_names().await.unwrap_err();
    assert!(err
        .to_string()
        .contains("Get available integrations not supported by this LLM Provider"));
}

#[tokio::test]
async fn select_model_writes_back_selection() {
    let mut payload = sample_integrations();
    if let Value::Array(entries) = &mut payload {
        entries.push(json!({
            "uid": "uid-b-2", "name": "Integration B (eu)", "config": {"name": "B"},
            "settings": {"models": [{"name": "m3"}]}
        }));
    }
    let h = single(Scripted::new(CapabilitySet::ALL).with_payload(payload));
    assert_eq!(h.service.current_model_name().await.unwrap(), NO_MODEL_SELECTED);

    let choice = ModelChoice::parse_label("m3 --- [B]").unwrap();
    let selected = h.service.select_model(&choice).await.unwrap();
    assert_eq!(selected.integration_uids, vec!["uid-b", "uid-b-2"]);

    assert_eq!(
        h.config.get_string(keys::MODEL_NAME).await.unwrap().as_deref(),
        Some("m3")
    );
    assert_eq!(
        h.config.get_string(keys::MODEL_GROUP_NAME).await.unwrap().as_deref(),
        Some("B")
    );
    assert_eq!(
        h.config.get_string(keys::INTEGRATION_UID).await.unwrap().as_deref(),
        Some("uid-b,uid-b-2")
    );
    assert_eq!(h.service.current_model_name().await.unwrap(), "m3");
}

#[tokio::test]
async fn failed_select_keeps_previous_selection() {
    let h = single(Scripted::new(CapabilitySet::of(&[Capability::Chat])));
    h.config.set(keys::MODEL_NAME, "old-model");
    h.config.set(keys::INTEGRATION_UID, "old-uid");

    let choice = ModelChoice::new("B", "m3");
    assert!(h.service.select_model(&choice).await.is_err());

    assert_eq!(
        h.config.get_string(keys::MODEL_NAME).await.unwrap().as_deref(),
        Some("old-model")
    );
    assert_eq!(h.config.get_string(keys::MODEL_GROUP_NAME).await.unwrap(), None);
    assert_eq!(
        h.config.get_string(keys::INTEGRATION_UID).await.unwrap().as_deref(),
        Some("old-uid")
    );
}

#[tokio::test]
async fn integration_name_lookup_fetches_when_not_cached() {
    let script = Scripted::new(CapabilitySet::ALL).with_payload(sample_integrations());
    let h = single(script.clone());

    assert_eq!(
        h.service.resolve_integration_name("B", false).await.unwrap(),
        vec!["Integration B"]
    );
    assert_eq!(script.fetches(), 1);
    assert_eq!(
        h.service.resolve_integration_name("B", false).await.unwrap(),
        vec!["Integration B"]
    );
    assert_eq!(script.fetches(), 2);
}

#[tokio::test]
async fn unknown_config_name_resolves_to_nothing() {
    let script = Scripted::new(CapabilitySet::ALL).with_payload(sample_integrations());
    let h = single(script.clone());

    assert!(h.service.resolve_integration_name("Z", true).await.unwrap().is_empty());
    assert!(h.service.resolve_integration_name("Z", false).await.unwrap().is_empty());
    assert!(h.service.resolve_uid("Z", false).await.unwrap().is_empty());
    assert_eq!(script.fetches(), 3);
}

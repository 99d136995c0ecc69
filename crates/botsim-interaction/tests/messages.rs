mod common;

use botsim_core::BotsimError;
use botsim_core::page::ActionOutcome;
use common::setup;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn test_posted_message_is_visible_to_its_user() {
    let (_bot, harness) = setup().await;
    let mut bob = harness.user("u2");
    bob.open_home_tab().await.unwrap();

    bob.click_by_label("Send form", false).await.unwrap();

    let mut messages = bob.messages();
    for _ in 0..40 {
        if !messages.is_empty() {
            break;
        }
        bob.pause(Duration::from_millis(50)).await;
        messages = bob.messages();
    }
    assert_eq!(messages.len(), 1);
    let message = messages.into_last().unwrap();
    assert_eq!(message.channel(), "u2");
    assert_eq!(message.text(), "Please answer");
    assert!(message.find_by_label("Fill form").is_ok());

    assert_eq!(harness.messages_in("u2").len(), 1);
    assert!(harness.messages_in("u1").is_empty());
}

#[tokio::test]
async fn test_message_click_opens_modal_on_owner_session() {
    let (bot, harness) = setup().await;
    let mut bob = harness.user("u2");
    bob.open_home_tab().await.unwrap();
    bob.click_by_label("Send form", false).await.unwrap();
    for _ in 0..40 {
        if !bob.messages().is_empty() {
            break;
        }
        bob.pause(Duration::from_millis(50)).await;
    }

    let mut message = bob.messages().into_last().unwrap();
    let outcome = message.click_by_label("Fill form", true).await.unwrap();

    assert_eq!(outcome, ActionOutcome::ModalOpened);
    assert_eq!(bob.modal_depth(), 1);
    assert_eq!(bob.top_modal().unwrap().callback_id, "answer");
    assert!(bob.find_by_label("Your answer").is_ok());

    let click = bot.interactions().pop().unwrap();
    assert_eq!(click["channel"]["id"], "u2");
    assert_eq!(click["message"]["ts"], message.ts());
    assert_eq!(click["actions"][0]["value"], "f-1");
    let response_url = click["response_url"].as_str().unwrap();
    assert!(response_url.starts_with(&harness.api_base_url()));
    assert!(response_url.ends_with(&format!("/u2/{}", message.ts())));

    let page = message.wait_update().await.unwrap();
    assert!(page.contains_text("Form opened"));
    assert!(page.find_by_label("Fill form").is_err());
}

#[tokio::test]
async fn test_wait_update_times_out_on_untouched_message() {
    let (_bot, harness) = setup().await;
    let mut bob = harness.user("u2");
    bob.open_home_tab().await.unwrap();
    bob.click_by_label("Send form", false).await.unwrap();
    for _ in 0..40 {
        if !bob.messages().is_empty() {
            break;
        }
        bob.pause(Duration::from_millis(50)).await;
    }

    let mut message = bob.messages().into_last().unwrap();
    let err = message.wait_update().await.unwrap_err();

    assert!(matches!(err, BotsimError::Timeout { .. }));
    assert!(message.contains_text("Please answer"));
}

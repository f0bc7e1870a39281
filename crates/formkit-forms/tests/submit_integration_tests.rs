//! Submission pipeline integration tests
//!
//! Tests cover:
//! - Success path: one success notification, callbacks, flag cleared
//! - Failure path: one error notification derived from the error, never rethrown
//! - Mount-safety: no effects after the owner unmounts, outcome still delivered
//! - Settings-driven notification texts

use formkit_core::exception::ErrorDescription;
use formkit_core::lifecycle::Mounted;
use formkit_core::messages::{Level, MemoryNotifier};
use formkit_core::settings::Settings;
use formkit_forms::submit::{SubmitHandler, SubmitOptions, create_submit_handler};
use formkit_forms::{Form, RuleSet};
use parking_lot::Mutex;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Allocation {
	account: String,
	amount: f64,
}

fn allocation_form() -> Form<Allocation> {
	Form::new(
		Allocation {
			account: "ACC-1".to_string(),
			amount: 100.0,
		},
		RuleSet::new(),
	)
}

#[rstest]
#[tokio::test]
async fn test_successful_submit_notifies_once() {
	// Arrange
	let form = allocation_form();
	let notifier = MemoryNotifier::new();
	let received = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&received);
	let handler = create_submit_handler(
		form.clone(),
		move |values: Allocation| {
			let sink = Arc::clone(&sink);
			async move {
				sink.lock().push(values);
				anyhow::Ok(())
			}
		},
		SubmitOptions::default().success_message("OK"),
	)
	.with_notifier(notifier.clone());

	// Act
	let submitted = handler.submit(form.values()).await;

	// Assert
	assert!(submitted);
	let notifications = notifier.peek();
	assert_eq!(notifications.len(), 1);
	assert_eq!(notifications[0].level, Level::Success);
	assert_eq!(notifications[0].message, "OK");
	assert_eq!(received.lock().len(), 1);
	assert!(!form.is_submitting());
}

#[rstest]
#[tokio::test]
async fn test_failed_submit_resolves_false_and_notifies_once() {
	// Arrange
	let form = allocation_form();
	let notifier = MemoryNotifier::new();
	let errors: Arc<Mutex<Vec<ErrorDescription>>> = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&errors);
	let handler = create_submit_handler(
		form.clone(),
		|_: Allocation| async { Err::<(), _>(anyhow::anyhow!("bad")) },
		SubmitOptions::default().on_error(move |error| sink.lock().push(error.clone())),
	)
	.with_notifier(notifier.clone());

	// Act
	let submitted = handler.submit(form.values()).await;

	// Assert
	assert!(!submitted);
	let notifications = notifier.with_level(Level::Error);
	assert_eq!(notifications.len(), 1);
	assert_eq!(notifications[0].message, "bad");
	assert_eq!(errors.lock()[0].message(), "bad");
	assert!(notifier.with_level(Level::Success).is_empty());
	assert!(!form.is_submitting());
}

#[rstest]
#[tokio::test]
async fn test_unmount_before_settle_suppresses_effects() {
	// Arrange
	let form = allocation_form();
	let mounted = Mounted::new();
	let notifier = MemoryNotifier::new();
	let (release, released) = oneshot::channel::<()>();
	let released = Arc::new(Mutex::new(Some(released)));
	let handler = SubmitHandler::new(form.clone(), move |_: Allocation| {
		let released = released.lock().take();
		async move {
			if let Some(released) = released {
				let _ = released.await;
			}
			Err::<(), _>(anyhow::anyhow!("too late"))
		}
	})
	.with_notifier(notifier.clone())
	.with_mount_state(mounted.watcher());
	let values = form.values();

	// Act
	let pending = tokio::spawn(async move { handler.submit(values).await });
	tokio::time::sleep(Duration::from_millis(10)).await;
	assert!(form.is_submitting());
	drop(mounted);
	release.send(()).unwrap();
	let submitted = pending.await.unwrap();

	// Assert
	assert!(!submitted);
	assert!(notifier.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_dropped_submit_future_clears_flag() {
	// Arrange
	let form = allocation_form();
	let handler = SubmitHandler::new(form.clone(), |_: Allocation| async {
		std::future::pending::<()>().await;
		anyhow::Ok(())
	});

	// Act
	let result = tokio::time::timeout(Duration::from_millis(10), handler.submit(form.values())).await;

	// Assert
	assert!(result.is_err());
	assert!(!form.is_submitting());
}

#[rstest]
#[tokio::test]
async fn test_notification_texts_from_settings() {
	// Arrange
	let settings = Settings::from_toml_str(
		r#"
		[notifications]
		success_title = "Saved"
		success_message = "Allocation stored"
		"#,
	)
	.unwrap();
	let form = allocation_form();
	let notifier = MemoryNotifier::new();
	let handler = SubmitHandler::new(form.clone(), |_: Allocation| async { anyhow::Ok(()) })
		.with_options(SubmitOptions::from_settings(&settings.notifications))
		.with_notifier(notifier.clone());

	// Act
	assert!(handler.submit(form.values()).await);

	// Assert
	let notification = &notifier.peek()[0];
	assert_eq!(notification.title, "Saved");
	assert_eq!(notification.message, "Allocation stored");
}

#[rstest]
#[tokio::test]
async fn test_on_success_receives_submitted_values() {
	// Arrange
	let form = allocation_form();
	form.handle_change("amount", 250.0).unwrap();
	let seen = Arc::new(Mutex::new(None));
	let sink = Arc::clone(&seen);
	let handler = SubmitHandler::new(form.clone(), |_: Allocation| async { anyhow::Ok(()) })
		.with_options(SubmitOptions::default().on_success(move |values: &Allocation| {
			*sink.lock() = Some(values.amount);
		}));

	// Act
	assert!(handler.submit(form.values()).await);

	// Assert
	assert_eq!(*seen.lock(), Some(250.0));
}

use catched_core::capabilities::{HttpError, HttpHeaders, HttpResponse, HttpResult};
use catched_core::detection::ImageHandle;
use catched_core::{Effect, Event, Model, Screen};
use crux_core::testing::AppTester;

fn json_response(status: u16, body: &str) -> Box<HttpResult> {
    let mut headers = HttpHeaders::new();
    headers.insert("Content-Type", "application/json").unwrap();
    Box::new(Ok(HttpResponse::new(
        status,
        headers,
        body.as_bytes().to_vec(),
        "test-request".into(),
    )))
}

fn with_selected_image(app: &AppTester<catched_core::App, Effect>, model: &mut Model) {
    app.update(
        Event::ImageSelected(ImageHandle::new("file:///DCIM/post.jpg")),
        model,
    );
}

#[test]
fn analyze_without_image_never_touches_the_network() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::AnalyzeRequested, &mut model);

    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
    let alert = model.alert.as_ref().expect("validation alert");
    assert_eq!(alert.title, "Error");
    assert_eq!(alert.message, "Please select an image.");
    assert!(!model.capture.is_busy());
}

#[test]
fn second_tap_while_pending_is_a_no_op() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);

    let first = app.update(Event::AnalyzeRequested, &mut model);
    let http_count = first
        .effects
        .iter()
        .filter(|e| matches!(e, Effect::Http(_)))
        .count();
    assert_eq!(http_count, 1);
    assert_eq!(model.capture.in_flight, Some(1));
    assert!(app.view(&model).capture.is_analyzing);

    let second = app.update(Event::AnalyzeRequested, &mut model);
    assert!(second.effects.is_empty());
    assert_eq!(model.capture.in_flight, Some(1));
}

#[test]
fn successful_detection_publishes_result() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);
    app.update(Event::AnalyzeRequested, &mut model);

    assert!(!model.store.result_available());

    app.update(
        Event::DetectionResponded {
            cycle: 1,
            result: json_response(
                200,
                r#"{"real": 82.5, "fake": 17.5, "final_prediction": "Real",
                    "extractedText": "CHED announces new scholarship guidelines",
                    "analytics": {"suspicious_words": 0, "informal_words": 0,
                                  "malicious_words": 0, "inconsistency_score": 0}}"#,
            ),
        },
        &mut model,
    );

    assert!(model.store.result_available());
    assert_eq!(model.store.image_uri(), Some("file:///DCIM/post.jpg"));
    assert_eq!(model.screen, Screen::Result);
    assert!(!model.capture.is_busy());
    assert!(model.capture.selected_image.is_none());
    assert!(model.alert.is_none());

    let view = app.view(&model);
    assert!(!view.capture.can_analyze);
    let result = view.result.expect("result view");
    assert_eq!(result.state, "populated");
    assert_eq!(result.verdict, "Real");
    assert_eq!(result.real, "82.50");
    assert_eq!(result.fake, "17.50");
    assert_eq!(result.verdict_color, "#2ecc71");
    assert_eq!(result.flagged_words, 0);
    assert_eq!(result.link_color, "#2980b9");
    assert_eq!(
        result.suggested_link.map(|l| l.link).as_deref(),
        Some("https://ched.gov.ph")
    );
    assert_eq!(result.image_uri.as_deref(), Some("file:///DCIM/post.jpg"));
}

#[test]
fn payload_without_verdict_or_analytics_is_partially_populated() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);
    app.update(Event::AnalyzeRequested, &mut model);

    app.update(
        Event::DetectionResponded {
            cycle: 1,
            result: json_response(200, r#"{"real": 10, "fake": 90}"#),
        },
        &mut model,
    );

    assert!(model.store.result_available());
    assert_eq!(model.screen, Screen::Result);
    let result = app.view(&model).result.expect("result view");
    assert_eq!(result.state, "partially_populated");
    assert_eq!(result.verdict, "Unknown");
    assert_eq!(result.real, "10.00");
    assert_eq!(result.fake, "90.00");
    assert_eq!(result.extracted_text, "No text detected");
    assert_eq!(result.highlighted, Some(catched_core::presentation::StatBox::Fake));
}

#[test]
fn analyze_on_result_screen_starts_nothing() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);
    app.update(Event::AnalyzeRequested, &mut model);
    app.update(
        Event::DetectionResponded {
            cycle: 1,
            result: json_response(200, r#"{"real": 5, "fake": 95, "final_prediction": "Fake"}"#),
        },
        &mut model,
    );
    assert_eq!(model.screen, Screen::Result);

    // the shell still holds the old image and taps analyze again
    with_selected_image(&app, &mut model);
    let update = app.update(Event::AnalyzeRequested, &mut model);

    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
    assert!(!model.capture.is_busy());
    assert!(model.alert.is_none());
    assert!(!app.view(&model).capture.can_analyze);
    assert_eq!(app.view(&model).result.map(|r| r.verdict).as_deref(), Some("Fake"));
}

#[test]
fn can_analyze_needs_an_image_and_an_idle_capture_screen() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    assert!(!app.view(&model).capture.can_analyze);

    with_selected_image(&app, &mut model);
    assert!(app.view(&model).capture.can_analyze);

    app.update(Event::NavigateTo(Screen::Summary), &mut model);
    assert!(!app.view(&model).capture.can_analyze);

    app.update(Event::NavigateTo(Screen::Capture), &mut model);
    app.update(Event::AnalyzeRequested, &mut model);
    let capture = app.view(&model).capture;
    assert!(capture.is_analyzing);
    assert!(!capture.can_analyze);
}

#[test]
fn out_of_scope_image_shows_reason_and_keeps_store_clear() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);
    app.update(Event::AnalyzeRequested, &mut model);

    app.update(
        Event::DetectionResponded {
            cycle: 1,
            result: json_response(400, r#"{"error": "not education related"}"#),
        },
        &mut model,
    );

    let alert = model.alert.as_ref().expect("rejection alert");
    assert_eq!(alert.title, "Out of Scope");
    assert_eq!(alert.message, "not education related");
    assert!(!model.store.result_available());
    assert_eq!(model.screen, Screen::Capture);
    assert!(!model.capture.is_busy());
    assert!(model.result.is_empty());
}

#[test]
fn transport_failure_shows_generic_error() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);
    app.update(Event::AnalyzeRequested, &mut model);

    app.update(
        Event::DetectionResponded {
            cycle: 1,
            result: Box::new(Err(HttpError::Timeout {
                timeout_ms: 60_000,
                request_id: "test-request".into(),
            })),
        },
        &mut model,
    );

    let alert = model.alert.clone().expect("failure alert");
    assert_eq!(alert.title, "Error");
    assert_eq!(alert.message, "Failed to detect image.");
    assert!(!model.store.result_available());

    app.update(Event::AlertDismissed, &mut model);
    assert!(model.alert.is_none());

    // busy flag was released, so the user can retry
    let retry = app.update(Event::AnalyzeRequested, &mut model);
    assert!(retry.effects.iter().any(|e| matches!(e, Effect::Http(_))));
}

#[test]
fn response_after_leaving_capture_is_discarded() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);
    app.update(Event::AnalyzeRequested, &mut model);
    app.update(Event::NavigateTo(Screen::Summary), &mut model);

    app.update(
        Event::DetectionResponded {
            cycle: 1,
            result: json_response(400, r#"{"error": "not education related"}"#),
        },
        &mut model,
    );

    assert!(model.alert.is_none());
    assert!(!model.capture.is_busy());
    assert!(!model.store.result_available());
    assert_eq!(model.screen, Screen::Summary);
}

#[test]
fn response_for_unknown_cycle_is_ignored() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    with_selected_image(&app, &mut model);
    app.update(Event::AnalyzeRequested, &mut model);

    let update = app.update(
        Event::DetectionResponded {
            cycle: 99,
            result: json_response(200, r#"{"real": 10, "fake": 90}"#),
        },
        &mut model,
    );

    assert!(update.effects.is_empty());
    assert_eq!(model.capture.in_flight, Some(1));
    assert!(!model.store.result_available());
}

#[test]
fn result_screen_is_gated_by_availability() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::NavigateTo(Screen::Result), &mut model);
    assert_eq!(model.screen, Screen::Capture);

    let update = app.update(
        Event::ResultRouteOpened(catched_core::presentation::NavParams::from_pairs([
            ("real", "50.00"),
            ("fake", "50.00"),
        ])),
        &mut model,
    );
    assert!(update.effects.is_empty());
    assert!(model.result.is_empty());
}

#[test]
fn invalid_configuration_keeps_previous() {
    let app = AppTester::<catched_core::App, Effect>::default();
    let mut model = Model::default();
    let before = model.config.clone();

    app.update(
        Event::Configure(catched_core::ServiceConfig::with_base_url("ftp://nope")),
        &mut model,
    );

    assert_eq!(model.config, before);
    assert_eq!(model.alert.as_ref().map(|a| a.code.as_str()), Some("CONFIGURATION_ERROR"));

    app.update(
        Event::Configure(catched_core::ServiceConfig::with_base_url(
            "http://192.168.68.116:5000",
        )),
        &mut model,
    );
    assert_eq!(model.config.base_url, "http://192.168.68.116:5000");
}

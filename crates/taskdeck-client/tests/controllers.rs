mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{FakeTaskService, task};
use serde_json::json;
use taskdeck_client::{
    ApiError, ApiHealth, FormError, ManualScheme, MemoryPreferenceStore, PreferenceStore,
    TaskApi, TaskForm, TaskListController, ThemeResolver, ThemeSnapshot, check_health,
};
use taskdeck_shared::{
    DraftError, EffectiveTheme, THEME_STORAGE_KEY, Task, TaskDraft, TaskId, ThemePreference,
    ViewFilter,
};

fn headers(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.header.as_str()).collect()
}

#[tokio::test]
async fn switching_filter_fetches_once_with_matching_operation() {
    let service = FakeTaskService::with_tasks(vec![
        task(1, "easy", 1, false),
        task(2, "hard", 5, false),
        task(3, "done", 3, true),
    ]);
    let mut list = TaskListController::new(&service);

    list.set_filter(ViewFilter::Prioritized).await;
    assert_eq!(service.calls(), vec!["list_prioritized"]);
    assert_eq!(headers(list.tasks()), vec!["hard", "easy"]);
    assert_eq!(list.state().heading(), "Prioritized Tasks");

    service.clear_calls();
    list.set_filter(ViewFilter::Completed).await;
    assert_eq!(service.calls(), vec!["list_completed"]);
    assert_eq!(headers(list.tasks()), vec!["done"]);
    assert!(!list.state().is_loading());
}

#[tokio::test]
async fn service_order_is_shown_verbatim() {
    let service = FakeTaskService::new();
    service.override_lists(Some(json!({
        "tasks": [
            { "id": 9, "header": "z", "difficulty": 1 },
            { "id": 2, "header": "a", "difficulty": 5 }
        ]
    })));
    let mut list = TaskListController::new(&service);
    list.set_filter(ViewFilter::All).await;
    assert_eq!(headers(list.tasks()), vec!["z", "a"]);
}

#[tokio::test]
async fn fetch_failure_keeps_previous_collection() {
    let service = FakeTaskService::with_tasks(vec![task(1, "kept", 2, false)]);
    let mut list = TaskListController::new(&service);
    list.set_filter(ViewFilter::All).await;

    service.fail_next(ApiError::Service {
        status: 500,
        body: String::new(),
    });
    list.set_filter(ViewFilter::All).await;
    assert_eq!(headers(list.tasks()), vec!["kept"]);
    assert_eq!(
        list.state().error(),
        Some("Failed to load tasks: request failed with status code 500")
    );

    list.set_filter(ViewFilter::All).await;
    assert_eq!(list.state().error(), None);
}

#[tokio::test]
async fn first_fetch_failure_leaves_empty_collection() {
    let service = FakeTaskService::with_tasks(vec![task(1, "hidden", 2, false)]);
    service.fail_next(ApiError::Transport("connection refused".to_string()));
    let mut list = TaskListController::new(&service);

    list.set_filter(ViewFilter::All).await;
    assert!(list.tasks().is_empty());
    assert!(list.state().error().is_some());
}

#[tokio::test]
async fn malformed_list_degrades_to_empty_with_error() {
    let service = FakeTaskService::with_tasks(vec![task(1, "before", 2, false)]);
    let mut list = TaskListController::new(&service);
    list.set_filter(ViewFilter::All).await;

    service.override_lists(Some(json!({ "data": [] })));
    list.notify_changed().await;
    assert!(list.tasks().is_empty());
    assert_eq!(
        list.state().error(),
        Some("Received invalid data format from server")
    );
}

#[tokio::test]
async fn item_actions_refetch_or_report() {
    let service = FakeTaskService::with_tasks(vec![task(1, "toggle me", 2, false)]);
    let mut list = TaskListController::new(&service);
    list.set_filter(ViewFilter::All).await;

    let snapshot = list.tasks()[0].clone();
    list.toggle_completed(&snapshot)
        .await
        .expect("complete succeeds");
    assert!(list.tasks()[0].completed);
    assert_eq!(list.state().revision(), 1);

    let snapshot = list.tasks()[0].clone();
    list.toggle_completed(&snapshot)
        .await
        .expect("uncomplete succeeds");
    assert!(!list.tasks()[0].completed);

    service.clear_calls();
    let err = list
        .delete(&TaskId::Number(99))
        .await
        .expect_err("unknown task");
    assert_eq!(err.status(), Some(404));
    assert_eq!(service.calls(), vec!["delete 99"]);
    assert_eq!(headers(list.tasks()), vec!["toggle me"]);
    assert_eq!(
        list.state().error(),
        Some("Failed to delete task: request failed with status code 404 (Task 99 not found)")
    );
}

#[tokio::test]
async fn invalid_form_never_reaches_the_service() {
    let service = FakeTaskService::new();
    let mut form = TaskForm::new();
    let added = Cell::new(0);

    let result = form.submit(&service, || added.set(added.get() + 1)).await;
    assert_eq!(
        result,
        Err(FormError::Validation(DraftError::MissingHeader))
    );

    form.set_header("Too hard");
    form.set_difficulty(6);
    let result = form.submit(&service, || added.set(added.get() + 1)).await;
    assert_eq!(
        result,
        Err(FormError::Validation(DraftError::DifficultyOutOfRange(6)))
    );

    form.set_difficulty(0);
    assert!(form.submit(&service, || {}).await.is_err());

    assert!(service.calls().is_empty());
    assert_eq!(added.get(), 0);
}

#[tokio::test]
async fn accepted_form_resets_and_signals() {
    let service = FakeTaskService::new();
    let mut form = TaskForm::new();
    let added = Cell::new(0);

    form.set_header("Ship it");
    form.set_difficulty(5);
    form.set_due_date("2026-12-24");
    let created = form
        .submit(&service, || added.set(added.get() + 1))
        .await
        .expect("submission accepted");

    assert_eq!(created, None);
    assert_eq!(added.get(), 1);
    assert_eq!(form.draft(), &TaskDraft::default());
    assert_eq!(
        serde_json::to_value(form.draft()).expect("draft serializes"),
        json!({ "header": "", "description": "", "difficulty": 3, "dueDate": "" })
    );
    assert_eq!(service.calls(), vec!["create Ship it"]);
}

#[tokio::test]
async fn rejected_create_keeps_draft() {
    let service = FakeTaskService::new();
    service.fail_next(ApiError::Transport("offline".to_string()));
    let mut form = TaskForm::new();
    form.set_header("Retry me");

    let added = Cell::new(false);
    let result = form.submit(&service, || added.set(true)).await;
    assert!(matches!(result, Err(FormError::Api(_))));
    assert_eq!(form.error(), Some("Failed to create task"));
    assert_eq!(form.draft().header, "Retry me");
    assert!(!added.get());
}

#[tokio::test]
async fn health_probe_reports_connection() {
    let service = FakeTaskService::new();
    assert_eq!(check_health(&service).await, ApiHealth::Connected);

    service.set_health_status("starting");
    assert_eq!(check_health(&service).await, ApiHealth::Unexpected);

    service.fail_next(ApiError::Transport("refused".to_string()));
    let health = check_health(&service).await;
    assert_eq!(health.message(), "API connection failed: network error: refused");
}

fn theme_fixture(
    stored: Option<&str>,
    os: EffectiveTheme,
) -> (
    Rc<MemoryPreferenceStore>,
    ManualScheme,
    Rc<RefCell<Vec<ThemeSnapshot>>>,
    ThemeResolver<Rc<MemoryPreferenceStore>, ManualScheme>,
) {
    let store = Rc::new(match stored {
        Some(value) => MemoryPreferenceStore::with_entry(THEME_STORAGE_KEY, value),
        None => MemoryPreferenceStore::new(),
    });
    let scheme = ManualScheme::new(os);
    let applied = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&applied);
    let resolver = ThemeResolver::new(Rc::clone(&store), scheme.clone(), move |snapshot| {
        sink.borrow_mut().push(snapshot)
    });
    (store, scheme, applied, resolver)
}

#[test]
fn explicit_preference_ignores_os_signal() {
    for preference in [ThemePreference::Light, ThemePreference::Dark] {
        let (_, scheme, _, mut resolver) = theme_fixture(None, EffectiveTheme::Dark);
        resolver.set_preference(preference);
        let expected = resolve_expected(preference);

        for os in [EffectiveTheme::Light, EffectiveTheme::Dark] {
            scheme.set(os);
            assert_eq!(resolver.effective(), expected);
        }
        assert_eq!(scheme.listener_count(), 0);
    }
}

fn resolve_expected(preference: ThemePreference) -> EffectiveTheme {
    match preference {
        ThemePreference::Dark => EffectiveTheme::Dark,
        _ => EffectiveTheme::Light,
    }
}

#[test]
fn system_preference_tracks_os_changes() {
    let (_, scheme, applied, resolver) = theme_fixture(None, EffectiveTheme::Light);
    assert_eq!(resolver.preference(), ThemePreference::System);
    assert!(resolver.is_following_system());

    scheme.set(EffectiveTheme::Dark);
    assert_eq!(resolver.effective(), EffectiveTheme::Dark);
    scheme.set(EffectiveTheme::Light);
    assert_eq!(resolver.effective(), EffectiveTheme::Light);

    let effective: Vec<EffectiveTheme> = applied
        .borrow()
        .iter()
        .map(|snapshot| snapshot.effective)
        .collect();
    assert_eq!(
        effective,
        vec![
            EffectiveTheme::Light,
            EffectiveTheme::Dark,
            EffectiveTheme::Light
        ]
    );
}

#[test]
fn leaving_system_releases_subscription() {
    let (_, scheme, applied, mut resolver) = theme_fixture(Some("system"), EffectiveTheme::Light);
    assert_eq!(scheme.listener_count(), 1);

    resolver.set_preference(ThemePreference::Light);
    assert_eq!(scheme.listener_count(), 0);
    let applied_before = applied.borrow().len();
    scheme.set(EffectiveTheme::Dark);
    assert_eq!(applied.borrow().len(), applied_before);

    resolver.set_preference(ThemePreference::System);
    assert_eq!(scheme.listener_count(), 1);
    assert_eq!(resolver.effective(), EffectiveTheme::Dark);

    drop(resolver);
    assert_eq!(scheme.listener_count(), 0);
}

#[test]
fn preference_round_trips_through_store() {
    for preference in ThemePreference::ALL {
        let (store, _, _, mut resolver) = theme_fixture(None, EffectiveTheme::Light);
        resolver.set_preference(preference);
        drop(resolver);

        assert_eq!(
            store.load(THEME_STORAGE_KEY).as_deref(),
            Some(preference.as_str())
        );
        let (_, _, _, reloaded) =
            theme_fixture(Some(preference.as_str()), EffectiveTheme::Light);
        assert_eq!(reloaded.preference(), preference);
    }

    let (_, _, _, fresh) = theme_fixture(None, EffectiveTheme::Dark);
    assert_eq!(fresh.preference(), ThemePreference::System);
    assert_eq!(fresh.effective(), EffectiveTheme::Dark);

    let (store, _, _, garbage) = theme_fixture(Some("sepia"), EffectiveTheme::Light);
    assert_eq!(garbage.preference(), ThemePreference::System);
    assert_eq!(store.load(THEME_STORAGE_KEY).as_deref(), Some("system"));
}

#[tokio::test]
async fn create_complete_uncomplete_delete_scenario() {
    let service = FakeTaskService::new();
    let mut form = TaskForm::new();
    let mut list = TaskListController::new(&service);
    list.set_filter(ViewFilter::All).await;

    form.set_header("Buy milk");
    form.set_difficulty(2);
    form.set_due_date("2024-01-01");
    let added = Cell::new(false);
    form.submit(&service, || added.set(true))
        .await
        .expect("create accepted");
    assert!(added.get());
    list.notify_changed().await;

    let created = list
        .tasks()
        .iter()
        .find(|task| task.header == "Buy milk")
        .cloned()
        .expect("created task listed");
    assert!(!created.completed);
    assert_eq!(created.difficulty, 2);
    assert_eq!(created.due_date.as_deref(), Some("2024-01-01"));

    list.toggle_completed(&created)
        .await
        .expect("complete succeeds");
    let completed = service
        .list_completed()
        .await
        .and_then(|body| body.into_tasks())
        .expect("completed list");
    assert_eq!(headers(&completed), vec!["Buy milk"]);
    assert!(service.get(&created.id).await.expect("task exists").completed);

    let snapshot = service.get(&created.id).await.expect("task exists");
    list.toggle_completed(&snapshot)
        .await
        .expect("uncomplete succeeds");
    assert!(!service.get(&created.id).await.expect("task exists").completed);

    list.delete(&created.id).await.expect("delete succeeds");
    for filter in ViewFilter::ALL {
        let tasks = service
            .list(filter)
            .await
            .and_then(|body| body.into_tasks())
            .expect("list succeeds");
        assert!(tasks.iter().all(|task| task.id != created.id));
    }
}

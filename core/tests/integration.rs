//! End-to-end tests against the live task server.
//!
//! # Design
//! Starts the server on a random port, then exercises the client and the
//! manager over real HTTP using ureq, validating that request building and
//! response parsing agree with the actual routes.

use task_core::{
    Action, ApiError, CreateTask, Effect, HttpMethod, HttpRequest, HttpResponse, ListQuery,
    NotificationKind, Outgoing, TaskClient, TaskListView, TaskManager, UpdateTask, ViewFilter,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's status-code-as-error behavior so 4xx/5xx responses come
/// back as data for the core to interpret.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    HttpResponse::new(status, body)
}

/// Start a server on a random port and return its base URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            task_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// Run `outgoing` and every follow-up effect to completion, skipping delays.
fn drive(manager: &mut TaskManager, outgoing: Outgoing) {
    let mut queue = vec![outgoing];
    while let Some(Outgoing { action, request }) = queue.pop() {
        for effect in manager.complete(action, execute(request)) {
            match effect {
                Effect::Send(next) | Effect::SendAfter(_, next) => queue.push(next),
            }
        }
    }
}

#[test]
fn crud_lifecycle() {
    let client = TaskClient::new(&spawn_server());

    // Step 1: list should be empty.
    let tasks = client
        .parse_list_tasks(execute(client.build_list_tasks(&ListQuery::default())))
        .unwrap();
    assert!(tasks.is_empty(), "expected empty list");

    // Step 2: blank title is rejected.
    let blank = CreateTask {
        title: "  ".to_string(),
        ..CreateTask::default()
    };
    let err = client
        .parse_create_task(execute(client.build_create_task(&blank).unwrap()))
        .unwrap_err();
    assert_eq!(err, ApiError::Validation("Task title is required".to_string()));

    // Step 3: create with defaults.
    let input = CreateTask {
        title: "Buy milk".to_string(),
        ..CreateTask::default()
    };
    let created = client
        .parse_create_task(execute(client.build_create_task(&input).unwrap()))
        .unwrap();
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.category, "personal");
    assert!(!created.completed);
    let id = created.id;

    // Step 4: get returns the same record.
    let fetched = client.parse_get_task(execute(client.build_get_task(id))).unwrap();
    assert_eq!(fetched, created);

    // Step 5: partial update leaves other fields alone.
    let update = UpdateTask {
        completed: Some(true),
        ..UpdateTask::default()
    };
    let updated = client
        .parse_update_task(execute(client.build_update_task(id, &update).unwrap()))
        .unwrap();
    assert_eq!(updated.title, "Buy milk");
    assert!(updated.completed);

    // Step 6: filtered list and stats.
    let query = ListQuery {
        completed: Some(true),
        ..ListQuery::default()
    };
    let done = client.parse_list_tasks(execute(client.build_list_tasks(&query))).unwrap();
    assert_eq!(done.len(), 1);
    let stats = client.parse_task_stats(execute(client.build_task_stats())).unwrap();
    assert_eq!((stats.total, stats.completed, stats.percentage), (1, 1, 100));

    // Step 7: delete, then get and delete again are NotFound.
    let message = client.parse_delete_task(execute(client.build_delete_task(id))).unwrap();
    assert_eq!(message, "Task deleted successfully");
    let err = client.parse_get_task(execute(client.build_get_task(id))).unwrap_err();
    assert_eq!(err, ApiError::NotFound);
    let err = client.parse_delete_task(execute(client.build_delete_task(id))).unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

#[test]
fn manager_session() {
    let mut manager = TaskManager::new(TaskClient::new(&spawn_server()));
    let load = manager.load();
    drive(&mut manager, load);
    assert_eq!(manager.render(), TaskListView::Empty);

    let add = manager.add("Write report", "quarterly", "work").unwrap();
    drive(&mut manager, add);
    let add = manager.add("Buy milk", "", "personal").unwrap();
    drive(&mut manager, add);
    assert_eq!(manager.tasks().len(), 2);

    let milk = manager
        .tasks()
        .iter()
        .find(|t| t.title == "Buy milk")
        .map(|t| t.id)
        .unwrap();
    let toggle = manager.toggle(milk).unwrap();
    assert_eq!(toggle.action, Action::Toggle(milk));
    drive(&mut manager, toggle);
    assert_eq!(manager.progress().percentage, 50);

    manager.set_filter(ViewFilter::Pending);
    let TaskListView::Cards(cards) = manager.render() else {
        panic!("expected pending cards");
    };
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Write report");
    assert_eq!(cards[0].description.as_deref(), Some("quarterly"));

    let report = cards[0].id;
    assert!(manager.edit(report));
    manager.edit_buffer_mut().unwrap().title = "Write annual report".to_string();
    let save = manager.save_edit().unwrap();
    drive(&mut manager, save);
    assert!(manager.editing().is_none());
    assert!(manager.tasks().iter().any(|t| t.title == "Write annual report"));

    let delete = manager.delete(report, |_| true).unwrap();
    drive(&mut manager, delete);
    assert_eq!(manager.tasks().len(), 1);
    assert_eq!(manager.render(), TaskListView::Empty);
    assert_eq!(manager.progress().percentage, 100);

    let kinds: Vec<NotificationKind> =
        manager.take_notifications().into_iter().map(|n| n.kind).collect();
    assert!(kinds.iter().all(|k| *k == NotificationKind::Success));
}

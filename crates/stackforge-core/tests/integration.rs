use chrono::{TimeDelta, Utc};
use serde_json::{json, Map, Value};
use stackforge_core::{
    evaluate_all, is_action_in_progress, AlarmTarget, CoreError, EngineRegistry, StackLock,
    TokioActionDispatcher, WatchRule,
};
use stackforge_schema::{
    parse_config_str, ComparisonOperator, EngineId, MetricData, MetricSample, ResourceAction,
    ResourceStatus, StackId, StackStatus, Statistic, WatchName, WatchRuleSpec, WatchState,
};
use stackforge_store::{FileLockStore, FileWatchStore, StoreLayout, WatchStore};
use stackforge_template::mock::{MockResource, MockStack};
use stackforge_template::{
    translate_properties, PropertySchema, PropertyType, RuleKind, Template, TemplateVersion,
    TranslationRule,
};
use std::future::Future;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

fn file_layout(dir: &tempfile::TempDir) -> StoreLayout {
    let layout = StoreLayout::new(dir.path());
    layout.initialize().unwrap();
    layout
}

#[test]
fn concurrent_engines_get_exactly_one_lock() {
    let dir = tempfile::tempdir().unwrap();
    let layout = file_layout(&dir);
    let registry = Arc::new(EngineRegistry::new());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::new(FileLockStore::new(layout.clone()));
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let engine = EngineId::new(format!("engine-{i}"));
                registry.register(&engine);
                let lock = StackLock::new(store, registry, StackId::new("shared"), engine)
                    .with_ping_timeout(Duration::from_millis(100));
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap();
                barrier.wait();
                rt.block_on(lock.acquire())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let acquired = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(acquired, 1, "exactly one engine must win the stack");
    for err in results.into_iter().filter_map(Result::err) {
        assert!(is_action_in_progress(&err), "unexpected error: {err}");
    }
}

#[tokio::test]
async fn crashed_engine_lock_is_taken_over_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();
    let layout = file_layout(&dir);
    let registry = Arc::new(EngineRegistry::new());
    let stack = StackId::new("stack-1");

    // The first engine takes the lock and then disappears without releasing it.
    let crashed = StackLock::new(
        Arc::new(FileLockStore::new(layout.clone())),
        Arc::clone(&registry),
        stack.clone(),
        EngineId::new("crashed"),
    );
    crashed.acquire().await.unwrap();

    let config = parse_config_str("engine_id = \"survivor\"\n[lock]\nping_timeout_secs = 1\n")
        .unwrap();
    let survivor = StackLock::from_config(
        &config,
        Arc::new(FileLockStore::new(layout.clone())),
        Arc::clone(&registry),
        stack.clone(),
    );
    registry.register(survivor.engine_id());

    let guard = survivor.thread_lock().await.unwrap();
    assert_eq!(survivor.holder().unwrap(), Some(EngineId::new("survivor")));

    // Now the survivor is alive, so nobody can take the stack from it.
    let latecomer = StackLock::new(
        Arc::new(FileLockStore::new(layout)),
        Arc::clone(&registry),
        stack,
        EngineId::new("latecomer"),
    );
    assert!(latecomer.try_thread_lock().await.unwrap().is_none());

    drop(guard);
    assert!(latecomer.try_thread_lock().await.unwrap().is_some());
}

#[tokio::test]
async fn template_work_runs_under_stack_lock() {
    let dir = tempfile::tempdir().unwrap();
    let layout = file_layout(&dir);
    let lock = StackLock::new(
        Arc::new(FileLockStore::new(layout)),
        Arc::new(EngineRegistry::new()),
        StackId::new("web"),
        EngineId::new("engine-a"),
    );

    let stack = MockStack::new()
        .with_parameter("flavor", json!("m1.small"))
        .with_resource(
            MockResource::created("server").with_attribute("first_address", json!("10.0.0.5")),
        );
    let template = Template::new(TemplateVersion::V2016_10_14);
    let schema = PropertySchema::new()
        .with("flavor", PropertyType::String)
        .with("instance_type", PropertyType::String);

    let guard = lock.thread_lock().await.unwrap();

    let mut props: Map<String, Value> = serde_json::from_value(json!({
        "instance_type": {"get_param": "flavor"}
    }))
    .unwrap();
    let rules =
        [TranslationRule::new(RuleKind::Replace, &["flavor"]).with_value_name("instance_type")];
    translate_properties(&mut props, &rules, &schema, &template, &stack).unwrap();
    assert!(props.get("instance_type").is_none());

    let resolved = template.resolve(&Value::Object(props), &stack).unwrap();
    assert_eq!(resolved, json!({"flavor": "m1.small"}));

    let url = template
        .resolve(
            &json!({"str_replace": {
                "template": "http://host/",
                "params": {"host": {"get_attr": ["server", "first_address"]}}
            }}),
            &stack,
        )
        .unwrap();
    assert_eq!(url, json!("http://10.0.0.5/"));

    guard.release().unwrap();
    assert_eq!(lock.holder().unwrap(), None);
}

struct Stacks {
    fired: mpsc::UnboundedSender<(StackId, String)>,
    statuses: Mutex<Vec<(StackId, StackStatus)>>,
}

impl AlarmTarget for Stacks {
    fn stack_status(&self, stack_id: &StackId) -> Option<StackStatus> {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == stack_id)
            .map(|(_, status)| *status)
    }

    fn alarm(
        &self,
        stack_id: &StackId,
        resource: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        let sent = self.fired.send((stack_id.clone(), resource.to_owned()));
        async move {
            sent.map_err(|e| CoreError::ActionFailed {
                resource: e.0 .1,
                message: "receiver closed".to_owned(),
            })
        }
    }
}

fn cpu_sample(value: f64) -> MetricData {
    let mut data = MetricData::new();
    data.insert("CPUUtilization".to_owned(), MetricSample::new(value, Some("Percent")));
    data
}

#[tokio::test]
async fn watch_rule_alarms_through_file_store_and_dispatcher() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileWatchStore::new(file_layout(&dir));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let stack = StackId::new("web");
    let dispatcher = TokioActionDispatcher::current(Arc::new(Stacks {
        fired: tx,
        statuses: Mutex::new(vec![(
            stack.clone(),
            StackStatus::new(ResourceAction::Update, ResourceStatus::Complete),
        )]),
    }));

    let rule: WatchRuleSpec = serde_json::from_value(json!({
        "MetricName": "CPUUtilization",
        "Statistic": "Average",
        "ComparisonOperator": "GreaterThanThreshold",
        "Threshold": "80",
        "Period": "60",
        "EvaluationPeriods": "1",
        "AlarmActions": ["ScaleUpPolicy"],
        "OKActions": ["ScaleDownPolicy"]
    }))
    .unwrap();
    let start = Utc::now() - TimeDelta::seconds(120);
    let name = WatchName::new("cpu-high");

    let mut watch = WatchRule::new(
        &store,
        &dispatcher,
        name.clone(),
        Some(stack.clone()),
        rule,
        start,
    );
    watch.store().unwrap();
    watch
        .create_watch_data(cpu_sample(95.0), start + TimeDelta::seconds(100))
        .unwrap();
    watch
        .create_watch_data(cpu_sample(85.0), start + TimeDelta::seconds(110))
        .unwrap();
    drop(watch);

    // A periodic pass reloads the rule from disk and finds it due.
    let now = start + TimeDelta::seconds(120);
    assert_eq!(evaluate_all(&store, &dispatcher, now).unwrap(), 1);
    assert_eq!(rx.recv().await.unwrap(), (stack.clone(), "ScaleUpPolicy".to_owned()));

    let reloaded = WatchRule::load(&store, &dispatcher, &name).unwrap();
    assert_eq!(reloaded.state(), WatchState::Alarm);
    assert_eq!(reloaded.last_evaluated(), now);
    assert_eq!(store.list_data(&name).unwrap().len(), 2);

    // Administrative reset back to normal fires the OK actions.
    let mut reloaded = reloaded;
    reloaded.set_watch_state("NORMAL").unwrap();
    assert_eq!(rx.recv().await.unwrap(), (stack, "ScaleDownPolicy".to_owned()));
    assert_eq!(store.get_rule(&name).unwrap().state, WatchState::Normal);

    assert!(reloaded.delete().unwrap());
    assert!(matches!(
        WatchRule::load(&store, &dispatcher, &name),
        Err(CoreError::UnknownWatch(_))
    ));
}

#[test]
fn watch_rule_records_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();
    let name = WatchName::new("disk-full");
    let rule = WatchRuleSpec::new(
        "DiskUsage",
        Statistic::Maximum,
        ComparisonOperator::GreaterThanOrEqualToThreshold,
        90.0,
        300,
    );
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();
    let dispatcher = TokioActionDispatcher::new(
        Arc::new(Stacks {
            fired: tx,
            statuses: Mutex::new(Vec::new()),
        }),
        rt.handle().clone(),
    );

    {
        let store = FileWatchStore::new(file_layout(&dir));
        let mut watch = WatchRule::new(&store, &dispatcher, name.clone(), None, rule.clone(), now);
        watch.store().unwrap();
    }

    let store = FileWatchStore::new(StoreLayout::new(dir.path()));
    let loaded = WatchRule::load(&store, &dispatcher, &name).unwrap();
    assert_eq!(loaded.rule(), &rule);
    assert_eq!(loaded.state(), WatchState::Normal);
    assert!(loaded.stack_id().is_none());
    assert!(loaded.record().checksum.is_some());
}

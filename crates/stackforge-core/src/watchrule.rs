//! Watch rules: threshold alarms over a sliding window of metric samples.
//!
//! A rule aggregates the samples submitted within the last `Period` seconds with
//! its statistic and compares the result against its threshold. When the
//! resulting state differs from the stored one, the actions listed for the new
//! state are dispatched to the owning stack, and the state only changes if that
//! dispatch was possible.

use crate::dispatch::ActionDispatcher;
use crate::CoreError;
use chrono::{DateTime, TimeDelta, Utc};
use stackforge_schema::{MetricData, StackId, Statistic, WatchName, WatchRuleSpec, WatchState};
use stackforge_store::{StoreError, WatchDataPoint, WatchRuleRecord, WatchStore};
use tracing::{debug, info, warn};

pub struct WatchRule<'a> {
    store: &'a dyn WatchStore,
    dispatcher: &'a dyn ActionDispatcher,
    record: WatchRuleRecord,
    stored: bool,
}

impl<'a> WatchRule<'a> {
    /// A new rule in state NORMAL; nothing is persisted until [`store`](Self::store).
    pub fn new(
        store: &'a dyn WatchStore,
        dispatcher: &'a dyn ActionDispatcher,
        name: WatchName,
        stack_id: Option<StackId>,
        rule: WatchRuleSpec,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            record: WatchRuleRecord::new(name, stack_id, rule, now),
            stored: false,
        }
    }

    pub fn load(
        store: &'a dyn WatchStore,
        dispatcher: &'a dyn ActionDispatcher,
        name: &WatchName,
    ) -> Result<Self, CoreError> {
        let record = match store.get_rule(name) {
            Ok(record) => record,
            Err(StoreError::WatchNotFound(_)) => {
                return Err(CoreError::UnknownWatch(name.to_string()));
            }
            Err(e) => {
                warn!("loading watch rule {name} failed: {e}");
                return Err(e.into());
            }
        };
        Ok(Self::from_record(store, dispatcher, record))
    }

    fn from_record(
        store: &'a dyn WatchStore,
        dispatcher: &'a dyn ActionDispatcher,
        record: WatchRuleRecord,
    ) -> Self {
        Self {
            store,
            dispatcher,
            record,
            stored: true,
        }
    }

    pub fn name(&self) -> &WatchName {
        &self.record.name
    }

    pub fn state(&self) -> WatchState {
        self.record.state
    }

    pub fn rule(&self) -> &WatchRuleSpec {
        &self.record.rule
    }

    pub fn stack_id(&self) -> Option<&StackId> {
        self.record.stack_id.as_ref()
    }

    pub fn last_evaluated(&self) -> DateTime<Utc> {
        self.record.last_evaluated
    }

    pub fn record(&self) -> &WatchRuleRecord {
        &self.record
    }

    /// Persist name, rule, state and last evaluation time, creating the rule on
    /// first call.
    pub fn store(&mut self) -> Result<(), CoreError> {
        if self.stored {
            self.record.updated_at = Some(Utc::now());
        }
        self.store.put_rule(&self.record)?;
        self.stored = true;
        Ok(())
    }

    /// Delete the rule and its data. Returns whether it was stored.
    pub fn delete(self) -> Result<bool, CoreError> {
        Ok(self.store.delete_rule(&self.record.name)?)
    }

    /// Run the rule if a full period has passed since the last evaluation.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        let due = self
            .record
            .last_evaluated
            .checked_add_signed(self.period())
            .is_some_and(|next| now >= next);
        if !due {
            debug!("watch {} not due for evaluation", self.record.name);
            return Ok(());
        }
        self.run_rule(now).map(|_| ())
    }

    /// Evaluate against the stored samples regardless of the period, then store
    /// the outcome.
    pub fn run_rule(&mut self, now: DateTime<Utc>) -> Result<WatchState, CoreError> {
        let data = self.watch_data()?;
        let new_state = self.get_alarm_state(now, &data);

        if new_state != self.record.state && self.rule_action(new_state) {
            info!(
                "watch {} changed state {} -> {new_state}",
                self.record.name, self.record.state
            );
            self.record.state = new_state;
        }

        self.record.last_evaluated = now;
        self.store()?;
        Ok(self.record.state)
    }

    /// State the samples in `[now - period, now]` put the rule in.
    pub fn get_alarm_state(&self, now: DateTime<Utc>, data: &[WatchDataPoint]) -> WatchState {
        let rule = &self.record.rule;
        let start = now.checked_sub_signed(self.period());
        let window: Vec<&WatchDataPoint> = data
            .iter()
            .filter(|point| point.created_at <= now)
            .filter(|point| !start.is_some_and(|start| point.created_at < start))
            .collect();
        let values: Vec<f64> = window
            .iter()
            .filter_map(|point| match point.data.get(&rule.metric_name) {
                Some(sample) => Some(sample.value),
                None => {
                    debug!(
                        "watch {} ignoring sample without metric {}",
                        self.record.name, rule.metric_name
                    );
                    None
                }
            })
            .collect();

        let aggregate = match rule.statistic {
            Statistic::SampleCount => Some(window.len() as f64),
            Statistic::Sum => Some(values.iter().sum()),
            Statistic::Average => {
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
            }
            Statistic::Minimum => values.iter().copied().reduce(f64::min),
            Statistic::Maximum => values.iter().copied().reduce(f64::max),
        };

        match aggregate {
            None => WatchState::Nodata,
            Some(value) if rule.comparison_operator.compare(value, rule.threshold) => {
                WatchState::Alarm
            }
            Some(_) => WatchState::Normal,
        }
    }

    /// Dispatch the actions configured for `new_state`. Returns whether the
    /// transition may be recorded.
    pub fn rule_action(&self, new_state: WatchState) -> bool {
        let name = &self.record.name;
        info!(
            "watch {name} on stack {} entering {new_state}",
            self.record.stack_id.as_deref().unwrap_or("-")
        );

        let Some(actions) = self.record.rule.actions_for(new_state) else {
            debug!("watch {name} has no action for new state {new_state}");
            return true;
        };

        let accepting = self.record.stack_id.as_ref().filter(|stack_id| {
            self.dispatcher
                .stack_status(stack_id)
                .is_some_and(|status| status.accepts_alarms())
        });
        let Some(stack_id) = accepting else {
            warn!("could not process watch state {new_state} for watch {name}");
            return false;
        };

        for action in actions {
            self.dispatcher.dispatch(stack_id, action);
        }
        true
    }

    /// Record a new sample. SampleCount rules are re-evaluated immediately.
    pub fn create_watch_data(
        &mut self,
        data: MetricData,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let metric = &self.record.rule.metric_name;
        if !data.contains_key(metric) {
            warn!("new data for watch {} has incorrect metric: {metric}", self.record.name);
            return Err(CoreError::MissingMetric {
                watch: self.record.name.to_string(),
                metric: metric.clone(),
            });
        }

        let point = WatchDataPoint {
            created_at: now,
            data,
        };
        self.store.append_data(&self.record.name, &point)?;
        debug!("new data for watch {}", self.record.name);

        if self.record.rule.statistic == Statistic::SampleCount {
            self.run_rule(now)?;
        }
        Ok(())
    }

    /// Administrative override of the rule state, running the new state's
    /// actions like a real transition would.
    pub fn set_watch_state(&mut self, state: &str) -> Result<(), CoreError> {
        let state: WatchState = state
            .parse()
            .map_err(CoreError::UnknownWatchState)?;
        if state == self.record.state {
            return Ok(());
        }

        if self.rule_action(state) {
            debug!(
                "overriding state {} for watch {} with {state}",
                self.record.state, self.record.name
            );
            self.record.state = state;
            self.store()?;
        } else {
            warn!(
                "unable to override state {} for watch {}",
                self.record.state, self.record.name
            );
        }
        Ok(())
    }

    fn watch_data(&self) -> Result<Vec<WatchDataPoint>, CoreError> {
        match self.store.list_data(&self.record.name) {
            Ok(data) => Ok(data),
            Err(StoreError::WatchNotFound(_)) if !self.stored => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn period(&self) -> TimeDelta {
        TimeDelta::from_std(self.record.rule.period()).unwrap_or(TimeDelta::MAX)
    }
}

/// Periodic pass over every stored rule; each is run only if due. A failing rule
/// is logged and skipped. Returns how many rules were checked without error.
pub fn evaluate_all(
    store: &dyn WatchStore,
    dispatcher: &dyn ActionDispatcher,
    now: DateTime<Utc>,
) -> Result<usize, CoreError> {
    let mut evaluated = 0;
    for record in store.list_rules(None)? {
        let mut rule = WatchRule::from_record(store, dispatcher, record);
        match rule.evaluate(now) {
            Ok(()) => evaluated += 1,
            Err(e) => warn!("watch {} evaluation failed: {e}", rule.name()),
        }
    }
    Ok(evaluated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackforge_schema::{
        ComparisonOperator, MetricSample, ResourceAction, ResourceStatus, StackStatus,
    };
    use stackforge_store::MemoryWatchStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Dispatcher {
        status: Option<StackStatus>,
        dispatched: Mutex<Vec<String>>,
    }

    impl Dispatcher {
        fn complete() -> Self {
            Self {
                status: Some(StackStatus::new(
                    ResourceAction::Create,
                    ResourceStatus::Complete,
                )),
                ..Self::default()
            }
        }

        fn dispatched(&self) -> Vec<String> {
            self.dispatched.lock().unwrap().clone()
        }
    }

    impl ActionDispatcher for Dispatcher {
        fn stack_status(&self, _stack_id: &StackId) -> Option<StackStatus> {
            self.status
        }

        fn dispatch(&self, _stack_id: &StackId, action: &str) {
            self.dispatched.lock().unwrap().push(action.to_owned());
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    fn ago(secs: i64) -> DateTime<Utc> {
        now() - TimeDelta::seconds(secs)
    }

    fn spec(statistic: Statistic, op: ComparisonOperator, threshold: f64) -> WatchRuleSpec {
        WatchRuleSpec::new("test_metric", statistic, op, threshold, 60)
    }

    fn point(value: f64, at: DateTime<Utc>) -> WatchDataPoint {
        let mut data = MetricData::new();
        data.insert("test_metric".to_owned(), MetricSample::new(value, Some("Count")));
        WatchDataPoint {
            created_at: at,
            data,
        }
    }

    fn sample(value: f64) -> MetricData {
        let mut data = MetricData::new();
        data.insert("test_metric".to_owned(), MetricSample::new(value, None));
        data
    }

    fn rule<'a>(
        store: &'a MemoryWatchStore,
        dispatcher: &'a Dispatcher,
        spec: WatchRuleSpec,
    ) -> WatchRule<'a> {
        WatchRule::new(
            store,
            dispatcher,
            WatchName::new("testwatch"),
            Some(StackId::new("stack-1")),
            spec,
            ago(300),
        )
    }

    #[test]
    fn average_below_threshold_is_normal() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let r = rule(
            &store,
            &d,
            spec(Statistic::Average, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        let data = [point(5.0, ago(10)), point(15.0, ago(20))];
        assert_eq!(r.get_alarm_state(now(), &data), WatchState::Normal);
        assert_eq!(r.get_alarm_state(now(), &[]), WatchState::Nodata);
    }

    #[test]
    fn average_above_threshold_alarms() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let r = rule(
            &store,
            &d,
            spec(Statistic::Average, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        let data = [point(12.0, ago(10)), point(15.0, ago(20))];
        assert_eq!(r.get_alarm_state(now(), &data), WatchState::Alarm);
    }

    #[test]
    fn samples_outside_window_are_ignored() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let r = rule(
            &store,
            &d,
            spec(Statistic::Maximum, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        let data = [
            point(50.0, ago(61)),
            point(5.0, ago(30)),
            point(99.0, now() + TimeDelta::seconds(5)),
        ];
        assert_eq!(r.get_alarm_state(now(), &data), WatchState::Normal);
        assert_eq!(r.get_alarm_state(now(), &data[..1]), WatchState::Nodata);
        // The window is closed at its start.
        assert_eq!(
            r.get_alarm_state(now(), &[point(50.0, ago(60))]),
            WatchState::Alarm
        );
    }

    #[test]
    fn minimum_and_maximum() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let data = [point(3.0, ago(10)), point(40.0, ago(20)), point(7.0, ago(30))];

        let min = rule(
            &store,
            &d,
            spec(Statistic::Minimum, ComparisonOperator::LessThanOrEqualToThreshold, 3.0),
        );
        assert_eq!(min.get_alarm_state(now(), &data), WatchState::Alarm);
        assert_eq!(min.get_alarm_state(now(), &[]), WatchState::Nodata);

        let max = rule(
            &store,
            &d,
            spec(Statistic::Maximum, ComparisonOperator::GreaterThanOrEqualToThreshold, 41.0),
        );
        assert_eq!(max.get_alarm_state(now(), &data), WatchState::Normal);
    }

    #[test]
    fn sum_and_sample_count_compare_zero_without_data() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();

        let sum = rule(
            &store,
            &d,
            spec(Statistic::Sum, ComparisonOperator::LessThanThreshold, 1.0),
        );
        assert_eq!(sum.get_alarm_state(now(), &[]), WatchState::Alarm);
        let data = [point(0.5, ago(10)), point(0.75, ago(20))];
        assert_eq!(sum.get_alarm_state(now(), &data), WatchState::Normal);

        let count = rule(
            &store,
            &d,
            spec(Statistic::SampleCount, ComparisonOperator::GreaterThanOrEqualToThreshold, 2.0),
        );
        assert_eq!(count.get_alarm_state(now(), &[]), WatchState::Normal);
        assert_eq!(count.get_alarm_state(now(), &data), WatchState::Alarm);
    }

    #[test]
    fn unsupported_operator_never_alarms() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let r = rule(
            &store,
            &d,
            spec(Statistic::Sum, ComparisonOperator::Unsupported("Between".to_owned()), 0.0),
        );
        assert_eq!(r.get_alarm_state(now(), &[point(100.0, ago(1))]), WatchState::Normal);
    }

    #[test]
    fn evaluate_waits_for_a_full_period() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut r = WatchRule::new(
            &store,
            &d,
            WatchName::new("w"),
            Some(StackId::new("stack-1")),
            spec(Statistic::Average, ComparisonOperator::GreaterThanThreshold, 10.0),
            ago(30),
        );
        r.store().unwrap();

        r.evaluate(now()).unwrap();
        assert_eq!(r.last_evaluated(), ago(30));
        assert_eq!(r.state(), WatchState::Normal);

        r.evaluate(ago(30) + TimeDelta::seconds(60)).unwrap();
        assert_eq!(r.last_evaluated(), ago(30) + TimeDelta::seconds(60));
        // No samples at all, so the average has no data.
        assert_eq!(r.state(), WatchState::Nodata);
    }

    #[test]
    fn transition_dispatches_alarm_actions() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut s = spec(Statistic::Maximum, ComparisonOperator::GreaterThanThreshold, 10.0);
        s.alarm_actions = Some(vec!["WebServerRestartPolicy".to_owned()]);
        let mut r = rule(&store, &d, s);
        r.store().unwrap();
        r.create_watch_data(sample(25.0), ago(5)).unwrap();

        assert_eq!(r.run_rule(now()).unwrap(), WatchState::Alarm);
        assert_eq!(d.dispatched(), ["WebServerRestartPolicy"]);

        let stored = store.get_rule(&WatchName::new("testwatch")).unwrap();
        assert_eq!(stored.state, WatchState::Alarm);
        assert_eq!(stored.last_evaluated, now());
        assert!(stored.updated_at.is_some());
    }

    #[test]
    fn transition_blocked_when_stack_not_complete() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher {
            status: Some(StackStatus::new(
                ResourceAction::Update,
                ResourceStatus::InProgress,
            )),
            ..Dispatcher::default()
        };
        let mut s = spec(Statistic::Maximum, ComparisonOperator::GreaterThanThreshold, 10.0);
        s.alarm_actions = Some(vec!["policy".to_owned()]);
        let mut r = rule(&store, &d, s);
        r.store().unwrap();
        r.create_watch_data(sample(25.0), ago(5)).unwrap();

        assert_eq!(r.run_rule(now()).unwrap(), WatchState::Normal);
        assert!(d.dispatched().is_empty());
        // The evaluation time still moves forward.
        assert_eq!(
            store.get_rule(r.name()).unwrap().last_evaluated,
            now()
        );
    }

    #[test]
    fn transition_without_actions_is_recorded() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::default();
        let mut r = rule(
            &store,
            &d,
            spec(Statistic::Average, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        r.store().unwrap();

        assert_eq!(r.run_rule(now()).unwrap(), WatchState::Nodata);
        assert!(d.dispatched().is_empty());
    }

    #[test]
    fn actions_need_a_stack() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut s = spec(Statistic::Average, ComparisonOperator::GreaterThanThreshold, 10.0);
        s.insufficient_data_actions = Some(vec!["notify".to_owned()]);
        let r = WatchRule::new(&store, &d, WatchName::new("w"), None, s, ago(300));

        assert!(!r.rule_action(WatchState::Nodata));
        assert!(d.dispatched().is_empty());
    }

    #[test]
    fn create_watch_data_rejects_wrong_metric() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut r = rule(
            &store,
            &d,
            spec(Statistic::Sum, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        r.store().unwrap();

        let mut data = MetricData::new();
        data.insert("other".to_owned(), MetricSample::new(1.0, None));
        let err = r.create_watch_data(data, now()).unwrap_err();
        assert!(matches!(err, CoreError::MissingMetric { .. }));
        assert!(store.list_data(r.name()).unwrap().is_empty());
    }

    #[test]
    fn sample_count_rules_run_on_new_data() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut s = spec(
            Statistic::SampleCount,
            ComparisonOperator::GreaterThanOrEqualToThreshold,
            2.0,
        );
        s.alarm_actions = Some(vec!["scale_up".to_owned()]);
        let mut r = rule(&store, &d, s);
        r.store().unwrap();

        r.create_watch_data(sample(1.0), ago(2)).unwrap();
        assert_eq!(r.state(), WatchState::Normal);
        r.create_watch_data(sample(1.0), ago(1)).unwrap();
        assert_eq!(r.state(), WatchState::Alarm);
        assert_eq!(d.dispatched(), ["scale_up"]);
        assert_eq!(r.last_evaluated(), ago(1));
    }

    #[test]
    fn non_sample_count_rules_only_store_data() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut r = rule(
            &store,
            &d,
            spec(Statistic::Sum, ComparisonOperator::GreaterThanThreshold, 0.0),
        );
        r.store().unwrap();

        r.create_watch_data(sample(5.0), now()).unwrap();
        assert_eq!(r.state(), WatchState::Normal);
        assert_eq!(r.last_evaluated(), ago(300));
        assert_eq!(store.list_data(r.name()).unwrap().len(), 1);
    }

    #[test]
    fn set_watch_state_overrides_and_dispatches() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut s = spec(Statistic::Sum, ComparisonOperator::GreaterThanThreshold, 10.0);
        s.alarm_actions = Some(vec!["policy".to_owned()]);
        let mut r = rule(&store, &d, s);
        r.store().unwrap();

        r.set_watch_state("ALARM").unwrap();
        assert_eq!(r.state(), WatchState::Alarm);
        assert_eq!(d.dispatched(), ["policy"]);
        assert_eq!(store.get_rule(r.name()).unwrap().state, WatchState::Alarm);

        // Same state again is a no-op.
        r.set_watch_state("ALARM").unwrap();
        assert_eq!(d.dispatched().len(), 1);
    }

    #[test]
    fn set_watch_state_rejects_unknown_state() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut r = rule(
            &store,
            &d,
            spec(Statistic::Sum, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        let err = r.set_watch_state("BOGUS").unwrap_err();
        assert!(matches!(err, CoreError::UnknownWatchState(s) if s == "BOGUS"));
    }

    #[test]
    fn set_watch_state_refused_when_stack_not_ready() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::default();
        let mut s = spec(Statistic::Sum, ComparisonOperator::GreaterThanThreshold, 10.0);
        s.ok_actions = Some(vec!["policy".to_owned()]);
        let mut r = rule(&store, &d, s);
        r.store().unwrap();
        r.set_watch_state("NODATA").unwrap();
        assert_eq!(r.state(), WatchState::Nodata);

        r.set_watch_state("NORMAL").unwrap();
        assert_eq!(r.state(), WatchState::Nodata);
    }

    #[test]
    fn load_store_delete() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        assert!(matches!(
            WatchRule::load(&store, &d, &WatchName::new("testwatch")),
            Err(CoreError::UnknownWatch(_))
        ));

        let mut r = rule(
            &store,
            &d,
            spec(Statistic::Sum, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        r.store().unwrap();
        let loaded = WatchRule::load(&store, &d, &WatchName::new("testwatch")).unwrap();
        assert_eq!(loaded.rule(), r.rule());
        assert_eq!(loaded.stack_id(), Some(&StackId::new("stack-1")));

        assert!(loaded.delete().unwrap());
        assert!(store.get_rule(&WatchName::new("testwatch")).is_err());
    }

    #[test]
    fn unstored_rule_runs_on_empty_data() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut r = rule(
            &store,
            &d,
            spec(Statistic::Sum, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        assert_eq!(r.run_rule(now()).unwrap(), WatchState::Normal);
        assert!(store.get_rule(r.name()).is_ok());
    }

    #[test]
    fn evaluate_all_skips_rules_not_due() {
        let store = MemoryWatchStore::new();
        let d = Dispatcher::complete();
        let mut due = rule(
            &store,
            &d,
            spec(Statistic::Average, ComparisonOperator::GreaterThanThreshold, 10.0),
        );
        due.store().unwrap();
        let mut fresh = WatchRule::new(
            &store,
            &d,
            WatchName::new("fresh"),
            None,
            spec(Statistic::Average, ComparisonOperator::GreaterThanThreshold, 10.0),
            now(),
        );
        fresh.store().unwrap();

        assert_eq!(evaluate_all(&store, &d, now()).unwrap(), 2);
        assert_eq!(
            store.get_rule(&WatchName::new("testwatch")).unwrap().state,
            WatchState::Nodata
        );
        assert_eq!(
            store.get_rule(&WatchName::new("fresh")).unwrap().state,
            WatchState::Normal
        );
    }
}

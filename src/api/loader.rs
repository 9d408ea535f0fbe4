//! Runs the fetches requested by [`AppState`](crate::app::AppState) and feeds
//! their results back into the event loop.

use crate::api::RunsApi;
use crate::app::Effect;
use crate::events::{panic_message, AppEvent};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

fn task_label(effect: &Effect) -> &'static str {
    match effect {
        Effect::LoadRuns { .. } => "load_runs",
        Effect::LoadRun { .. } => "load_run",
        Effect::LoadOutput { .. } => "load_output",
        Effect::LoadVersion => "load_version",
    }
}

/// Performs one fetch. Failures become event payloads, never errors.
pub async fn execute(api: &dyn RunsApi, effect: Effect) -> AppEvent {
    match effect {
        Effect::LoadRuns { token, query } => AppEvent::RunsLoaded {
            token,
            result: api.list_runs(&query).await.map_err(|e| e.to_string()),
        },
        Effect::LoadRun { token, id } => {
            let result = api.get_run(&id).await.map(Box::new).map_err(|e| e.to_string());
            AppEvent::RunLoaded { token, id, result }
        }
        Effect::LoadOutput { token, id } => AppEvent::OutputLoaded {
            token,
            output: api.get_output(&id).await,
        },
        Effect::LoadVersion => AppEvent::VersionLoaded(api.get_version().await),
    }
}

/// The payload that settles an effect's slot when its task dies before
/// producing a result.
fn crash_event(effect: &Effect, msg: &str) -> Option<AppEvent> {
    match effect {
        Effect::LoadRuns { token, .. } => Some(AppEvent::RunsLoaded {
            token: *token,
            result: Err(msg.to_string()),
        }),
        Effect::LoadRun { token, id } => Some(AppEvent::RunLoaded {
            token: *token,
            id: id.clone(),
            result: Err(msg.to_string()),
        }),
        Effect::LoadOutput { token, .. } => Some(AppEvent::OutputLoaded {
            token: *token,
            output: None,
        }),
        Effect::LoadVersion => None,
    }
}

/// Spawns one monitored task per effect.
pub fn dispatch(api: &Arc<dyn RunsApi>, tx: &UnboundedSender<AppEvent>, effects: Vec<Effect>) {
    for effect in effects {
        let label = task_label(&effect);
        let pending = effect.clone();
        let api = Arc::clone(api);
        let result_tx = tx.clone();
        spawn_monitored(
            tx.clone(),
            label,
            move |msg| crash_event(&pending, msg),
            async move {
                let event = execute(api.as_ref(), effect).await;
                if result_tx.send(event).is_err() {
                    tracing::warn!("{label}: channel closed");
                }
            },
        );
    }
}

/// Runs `fut` on its own task. A panic is logged, `on_crash` gets a chance
/// to settle whatever the task owed, and the panic is reported as
/// [`AppEvent::Error`] instead of vanishing with the task.
pub fn spawn_monitored<F>(
    tx: UnboundedSender<AppEvent>,
    label: &'static str,
    on_crash: F,
    fut: impl Future<Output = ()> + Send + 'static,
) where
    F: FnOnce(&str) -> Option<AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let handle = tokio::spawn(fut);
        if let Err(join_err) = handle.await {
            let msg = if join_err.is_panic() {
                panic_message(join_err.into_panic())
            } else {
                "task cancelled".to_string()
            };
            tracing::error!("{label} panicked: {msg}");
            if let Some(event) = on_crash(&msg) {
                if tx.send(event).is_err() {
                    tracing::warn!("{label}: channel closed while settling crash");
                }
            }
            if tx
                .send(AppEvent::Error(format!("{label} crashed: {msg}")))
                .is_err()
            {
                tracing::warn!("{label}: channel closed while reporting panic");
            }
        }
    });
}

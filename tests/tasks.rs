//! Background task behavior: recovery handler and effects dispatch

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::anyhow;
use bench_timers::{
    effects::EffectsSink,
    state::{now_ms, AppState, EngineSettings, ResumeSource},
    tasks::{dispatch_completions, handle_resumes},
    CompletionEvent,
};
use futures::future::{self, BoxFuture};
use tokio::sync::broadcast;

#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<CompletionEvent>>,
    fail: bool,
}

impl EffectsSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn deliver(&self, event: CompletionEvent) -> BoxFuture<'static, anyhow::Result<()>> {
        self.delivered.lock().unwrap().push(event);
        let result = if self.fail { Err(anyhow!("speaker unplugged")) } else { Ok(()) };
        Box::pin(future::ready(result))
    }
}

fn engine() -> Arc<AppState> {
    Arc::new(AppState::new(0, "127.0.0.1".to_string(), EngineSettings::default()))
}

#[tokio::test]
async fn recovery_handler_completes_expired_countdown() {
    let state = engine();
    let id = state.add("Anneal").unwrap().id;
    state.toggle_mode(id).unwrap();
    state.apply_preset(id, 5_000).unwrap();
    // Started well in the past, as if the process had been frozen since
    state.start(id, now_ms() - 60_000).unwrap();

    let mut completions = state.subscribe_completions();
    let resume_rx = state.subscribe_resume();
    let handler = tokio::spawn(handle_resumes(Arc::clone(&state), resume_rx));

    state.signal_resume(ResumeSource::Signal);
    let event = tokio::time::timeout(Duration::from_secs(5), completions.recv())
        .await
        .expect("recovery pass did not run")
        .unwrap();

    assert_eq!(event.timer_id, id);
    assert!(state.get(id).unwrap().has_completed);

    // A second resume finds nothing new
    state.signal_resume(ResumeSource::Api);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(completions.try_recv().is_err());

    handler.abort();
}

#[tokio::test]
async fn dispatcher_delivers_each_completion() {
    let (tx, rx) = broadcast::channel(8);
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = tokio::spawn(dispatch_completions(rx, sink.clone()));

    let state = engine();
    let timer = state.add("Pipette").unwrap();
    tx.send(CompletionEvent::for_timer(&timer, 1_000)).unwrap();
    tx.send(CompletionEvent::for_timer(&timer, 2_000)).unwrap();
    drop(tx);

    dispatcher.await.unwrap();
    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].timer_name, "Pipette");
}

#[tokio::test]
async fn sink_failure_does_not_undo_completion() {
    let state = engine();
    let sink = Arc::new(RecordingSink { fail: true, ..Default::default() });
    let dispatcher = tokio::spawn(dispatch_completions(state.subscribe_completions(), sink.clone()));

    let id = state.add("Vortex").unwrap().id;
    state.toggle_mode(id).unwrap();
    state.apply_preset(id, 100).unwrap();
    state.start(id, 0).unwrap();
    assert_eq!(state.tick(100).len(), 1);

    for _ in 0..100 {
        if !sink.delivered.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(sink.delivered.lock().unwrap().len(), 1);

    let timer = state.get(id).unwrap();
    assert!(timer.has_completed);
    assert!(!timer.is_running);
    assert!(state.tick(200).is_empty());

    dispatcher.abort();
}

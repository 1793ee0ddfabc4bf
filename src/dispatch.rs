use crate::conversation::{self, prompts, SessionStore, StepOutcome};
use crate::error::CollectError;
use crate::event::{InboundEvent, PromptSender, UserId};
use crate::persist::PersistenceGateway;
use crate::record::RecordDraft;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Drives one inbound event through the state machine and the store, and
/// through the persistence gateway on completion.
///
/// Side-effect order is fixed: the session is committed to the store before
/// any prompt goes out, so a crash between the two can at worst cost the
/// user a prompt, never a state transition. A re-delivered event in that
/// window is dropped by the duplicate watermark.
pub struct Collector {
    store: SessionStore,
    gateway: PersistenceGateway,
    sender: Arc<dyn PromptSender>,
    max_voice_secs: u32,
}

impl Collector {
    pub fn new(
        store: SessionStore,
        gateway: PersistenceGateway,
        sender: Arc<dyn PromptSender>,
        max_voice_secs: u32,
    ) -> Self {
        Self {
            store,
            gateway,
            sender,
            max_voice_secs,
        }
    }

    pub async fn handle_event(&self, event: InboundEvent) {
        let mut session = self.store.get_or_create(event.user_id).await;

        // Transport retries re-deliver the same update id; anything at or
        // below the watermark has already been applied.
        if let Some(last) = session.last_event_id {
            if event.event_id <= last {
                debug!(user = %event.user_id, event_id = event.event_id, "dropping duplicate delivery");
                return;
            }
        }
        session.last_event_id = Some(event.event_id);
        session.touch();

        match conversation::step(&mut session, &event.kind, self.max_voice_secs) {
            StepOutcome::Reply(prompt) => {
                self.store.put(session).await;
                self.send(event.user_id, &prompt).await;
            }
            StepOutcome::Cancel(ack) => {
                info!(user = %event.user_id, "conversation cancelled");
                self.store.delete(event.user_id).await;
                self.send(event.user_id, &ack).await;
            }
            StepOutcome::Finish { name } => self.finish(session, name).await,
        }
    }

    /// Final step: assemble, persist, and only then advance the session.
    async fn finish(&self, mut session: conversation::Session, name: String) {
        let user_id = session.user_id;
        info!(
            user = %user_id,
            clip_secs = session.voice_duration_secs,
            "collection complete, persisting"
        );

        let draft = match RecordDraft::from_session(&session, name) {
            Ok(draft) => draft,
            Err(e @ CollectError::IncompleteSession(_)) => {
                // Invariant violation: an earlier state's field is missing.
                // The session is beyond saving; start over.
                error!(user = %user_id, error = %e, "cannot assemble record");
                self.store.delete(user_id).await;
                self.send(user_id, prompts::RESTART_NEEDED).await;
                return;
            }
            Err(e) => {
                error!(user = %user_id, error = %e, "unexpected assembly failure");
                self.store.delete(user_id).await;
                self.send(user_id, prompts::RESTART_NEEDED).await;
                return;
            }
        };

        match self.gateway.persist(draft).await {
            Ok(_record) => {
                // Reset keeps the watermark: a re-delivered final answer
                // lands in Idle and can never append a second row.
                session.reset();
                self.store.put(session).await;
                self.send(user_id, prompts::DONE).await;
            }
            Err(e) => {
                // Nothing was appended. Keep the session in AwaitingName
                // (with the watermark advanced) so resending the name
                // retries the whole persist step.
                error!(user = %user_id, error = %e, "persist failed, keeping session for retry");
                self.store.put(session).await;
                self.send(user_id, prompts::SAVE_FAILED).await;
            }
        }
    }

    async fn expire(&self, user_id: UserId) {
        debug!(user = %user_id, "expiring idle session");
        self.store.delete(user_id).await;
    }

    /// Prompts are fire-and-forget; a delivery failure never rolls back
    /// conversation state.
    async fn send(&self, user_id: UserId, text: &str) {
        if let Err(e) = self.sender.send_prompt(user_id, text).await {
            warn!(user = %user_id, error = %e, "failed to deliver prompt");
        }
    }
}

/// Fans inbound events out to one worker task per active user.
///
/// A worker consumes its user's events strictly in arrival order, so two
/// messages from the same person can never interleave field writes; distinct
/// users run fully in parallel. Workers that sit idle past the TTL drop the
/// session and exit, which doubles as session expiry.
pub struct Dispatcher {
    collector: Arc<Collector>,
    idle_ttl: Duration,
    workers: Mutex<HashMap<UserId, mpsc::UnboundedSender<InboundEvent>>>,
}

impl Dispatcher {
    pub fn new(collector: Arc<Collector>, idle_ttl: Duration) -> Self {
        Self {
            collector,
            idle_ttl,
            workers: Mutex::new(HashMap::new()),
        }
    }

    pub async fn dispatch(&self, event: InboundEvent) {
        let user_id = event.user_id;
        let mut workers = self.workers.lock().await;

        let pending = match workers.get(&user_id) {
            Some(tx) => match tx.send(event) {
                Ok(()) => return,
                // Worker hit its idle TTL and exited; respawn below.
                Err(mpsc::error::SendError(returned)) => returned,
            },
            None => event,
        };

        let tx = self.spawn_worker(user_id);
        let _ = tx.send(pending);
        workers.insert(user_id, tx);
    }

    fn spawn_worker(&self, user_id: UserId) -> mpsc::UnboundedSender<InboundEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel::<InboundEvent>();
        let collector = Arc::clone(&self.collector);
        let idle_ttl = self.idle_ttl;

        tokio::spawn(async move {
            debug!(user = %user_id, "worker started");
            loop {
                match tokio::time::timeout(idle_ttl, rx.recv()).await {
                    Ok(Some(event)) => collector.handle_event(event).await,
                    Ok(None) => break,
                    Err(_elapsed) => {
                        // Refuse new sends first, then drain whatever raced
                        // in, so no event is lost to the shutdown.
                        rx.close();
                        while let Some(event) = rx.recv().await {
                            collector.handle_event(event).await;
                        }
                        collector.expire(user_id).await;
                        break;
                    }
                }
            }
            debug!(user = %user_id, "worker stopped");
        });

        tx
    }
}

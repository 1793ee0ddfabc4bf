//! End-to-end tests for the event driver: state machine + store + gateway,
//! with in-memory backends standing in for Telegram, Sheets, and Drive.

use anyhow::{anyhow, Result};
use crowcall::conversation::prompts;
use crowcall::{
    AssetStore, Collector, EventKind, InboundEvent, PersistenceGateway, PromptSender, RecordLog,
    SessionStore, UserId, VoiceRef,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// In-memory fakes
// ============================================================================

#[derive(Default)]
struct MemoryLog {
    rows: Mutex<Vec<Vec<String>>>,
    fail_next: AtomicBool,
}

impl MemoryLog {
    fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }

    fn fail_next_append(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

struct LogHandle(Arc<MemoryLog>);

#[async_trait::async_trait]
impl RecordLog for LogHandle {
    async fn append_record(&self, record: &crowcall::CollectedRecord) -> Result<()> {
        if self.0.fail_next.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("sheet unavailable"));
        }
        self.0.rows.lock().unwrap().push(record.row());
        Ok(())
    }
}

#[derive(Default)]
struct MemoryAssets {
    fail: AtomicBool,
    uploads: Mutex<Vec<String>>,
}

struct AssetsHandle(Arc<MemoryAssets>);

#[async_trait::async_trait]
impl AssetStore for AssetsHandle {
    async fn upload_asset(&self, voice_ref: &VoiceRef, suggested_filename: &str) -> Result<String> {
        if self.0.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("drive unavailable"));
        }
        self.0.uploads.lock().unwrap().push(suggested_filename.to_string());
        Ok(format!("https://files.example/{}", voice_ref.0))
    }
}

#[derive(Default)]
struct MemorySender {
    prompts: Mutex<Vec<(UserId, String)>>,
}

impl MemorySender {
    fn last_prompt_for(&self, user: UserId) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, _)| *u == user)
            .map(|(_, p)| p.clone())
    }
}

struct SenderHandle(Arc<MemorySender>);

#[async_trait::async_trait]
impl PromptSender for SenderHandle {
    async fn send_prompt(&self, user_id: UserId, text: &str) -> Result<()> {
        self.0.prompts.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }
}

struct Harness {
    collector: Collector,
    log: Arc<MemoryLog>,
    assets: Arc<MemoryAssets>,
    sender: Arc<MemorySender>,
    next_event_id: Mutex<u64>,
}

impl Harness {
    fn new(with_upload: bool) -> Self {
        let log = Arc::new(MemoryLog::default());
        let assets = Arc::new(MemoryAssets::default());
        let sender = Arc::new(MemorySender::default());

        let asset_store: Option<Box<dyn AssetStore>> = if with_upload {
            Some(Box::new(AssetsHandle(assets.clone())))
        } else {
            None
        };
        let gateway = PersistenceGateway::new(Box::new(LogHandle(log.clone())), asset_store);
        let collector = Collector::new(
            SessionStore::new(),
            gateway,
            Arc::new(SenderHandle(sender.clone())),
            15,
        );

        Self {
            collector,
            log,
            assets,
            sender,
            next_event_id: Mutex::new(0),
        }
    }

    async fn send(&self, user: UserId, kind: EventKind) {
        let event_id = {
            let mut next = self.next_event_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.collector
            .handle_event(InboundEvent {
                user_id: user,
                event_id,
                kind,
            })
            .await;
    }

    async fn send_with_id(&self, user: UserId, event_id: u64, kind: EventKind) {
        self.collector
            .handle_event(InboundEvent {
                user_id: user,
                event_id,
                kind,
            })
            .await;
    }
}

fn voice(id: &str, secs: u32) -> EventKind {
    EventKind::Voice {
        voice_ref: VoiceRef(id.to_string()),
        duration_secs: secs,
    }
}

fn text(t: &str) -> EventKind {
    EventKind::Text(t.to_string())
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn happy_path_appends_exactly_one_row() {
    let h = Harness::new(false);
    let anna = UserId(1);

    h.send(anna, EventKind::Start).await;
    h.send(anna, voice("file-anna", 8)).await;
    h.send(anna, text("Yes")).await;
    h.send(anna, text("German")).await;
    h.send(anna, text("Anna")).await;

    assert_eq!(
        h.log.rows(),
        vec![vec![
            "Anna".to_string(),
            "German".to_string(),
            "Yes".to_string(),
            "file-anna".to_string(),
            "1".to_string(),
        ]]
    );
    assert_eq!(h.sender.last_prompt_for(anna), Some(prompts::DONE.to_string()));

    // The flow is reusable: a fresh /start is welcomed again.
    h.send(anna, EventKind::Start).await;
    assert_eq!(
        h.sender.last_prompt_for(anna),
        Some(prompts::WELCOME.to_string())
    );
}

#[tokio::test]
async fn answers_are_trimmed_verbatim_otherwise() {
    let h = Harness::new(false);
    let user = UserId(5);

    h.send(user, EventKind::Start).await;
    h.send(user, voice("f", 3)).await;
    h.send(user, text("  probably not?  ")).await;
    h.send(user, text(" Swiss German ")).await;
    h.send(user, text("  anna k  ")).await;

    let rows = h.log.rows();
    assert_eq!(rows[0][0], "anna k");
    assert_eq!(rows[0][1], "Swiss German");
    // Free-text permission answers are stored, not validated.
    assert_eq!(rows[0][2], "probably not?");
}

#[tokio::test]
async fn over_limit_voice_never_produces_a_row() {
    let h = Harness::new(false);
    let user = UserId(2);

    h.send(user, EventKind::Start).await;
    h.send(user, voice("file-long", 20)).await;

    assert_eq!(
        h.sender.last_prompt_for(user),
        Some(prompts::voice_too_long(15))
    );
    assert!(h.log.rows().is_empty());

    // A short retry proceeds normally.
    h.send(user, voice("file-short", 5)).await;
    assert_eq!(
        h.sender.last_prompt_for(user),
        Some(prompts::ASK_PERMISSION.to_string())
    );
}

#[tokio::test]
async fn cancel_discards_everything() {
    let h = Harness::new(false);
    let user = UserId(3);

    h.send(user, EventKind::Start).await;
    h.send(user, voice("file-1", 5)).await;
    h.send(user, text("Yes")).await;
    h.send(user, EventKind::Cancel).await;

    assert_eq!(
        h.sender.last_prompt_for(user),
        Some(prompts::CANCELLED.to_string())
    );

    // A fresh start leaks nothing: finishing afterwards still needs the
    // whole flow, and no record came out of the cancelled attempt.
    h.send(user, EventKind::Start).await;
    h.send(user, text("Anna")).await;
    assert_eq!(
        h.sender.last_prompt_for(user),
        Some(prompts::EXPECTED_VOICE.to_string())
    );
    assert!(h.log.rows().is_empty());
}

#[tokio::test]
async fn interleaved_users_do_not_cross_contaminate() {
    let h = Harness::new(false);
    let anna = UserId(10);
    let piotr = UserId(20);

    h.send(anna, EventKind::Start).await;
    h.send(piotr, EventKind::Start).await;
    h.send(anna, voice("file-anna", 8)).await;
    h.send(piotr, voice("file-piotr", 4)).await;
    h.send(piotr, text("No")).await;
    h.send(anna, text("Yes")).await;
    h.send(anna, text("German")).await;
    h.send(piotr, text("Polish")).await;
    h.send(piotr, text("Piotr")).await;
    h.send(anna, text("Anna")).await;

    let mut rows = h.log.rows();
    rows.sort();
    assert_eq!(
        rows,
        vec![
            vec![
                "Anna".to_string(),
                "German".to_string(),
                "Yes".to_string(),
                "file-anna".to_string(),
                "10".to_string(),
            ],
            vec![
                "Piotr".to_string(),
                "Polish".to_string(),
                "No".to_string(),
                "file-piotr".to_string(),
                "20".to_string(),
            ],
        ]
    );
}

#[tokio::test]
async fn redelivered_final_answer_appends_once() {
    let h = Harness::new(false);
    let user = UserId(4);

    h.send_with_id(user, 1, EventKind::Start).await;
    h.send_with_id(user, 2, voice("file-1", 5)).await;
    h.send_with_id(user, 3, text("Yes")).await;
    h.send_with_id(user, 4, text("German")).await;
    h.send_with_id(user, 5, text("Anna")).await;
    assert_eq!(h.log.rows().len(), 1);

    // Transport retry: same update id again.
    h.send_with_id(user, 5, text("Anna")).await;
    assert_eq!(h.log.rows().len(), 1);

    // An out-of-order stale delivery is dropped too.
    h.send_with_id(user, 3, text("Yes")).await;
    assert_eq!(h.log.rows().len(), 1);
    assert_eq!(h.sender.last_prompt_for(user), Some(prompts::DONE.to_string()));
}

#[tokio::test]
async fn append_failure_keeps_session_for_retry() {
    let h = Harness::new(false);
    let user = UserId(6);

    h.send(user, EventKind::Start).await;
    h.send(user, voice("file-1", 5)).await;
    h.send(user, text("Yes")).await;
    h.send(user, text("German")).await;

    h.log.fail_next_append();
    h.send(user, text("Anna")).await;

    assert!(h.log.rows().is_empty());
    assert_eq!(
        h.sender.last_prompt_for(user),
        Some(prompts::SAVE_FAILED.to_string())
    );

    // Resending only the last answer completes the flow.
    h.send(user, text("Anna")).await;
    assert_eq!(h.log.rows().len(), 1);
    assert_eq!(h.log.rows()[0][0], "Anna");
    assert_eq!(h.sender.last_prompt_for(user), Some(prompts::DONE.to_string()));
}

#[tokio::test]
async fn upload_enabled_adds_trailing_url_cell() {
    let h = Harness::new(true);
    let user = UserId(7);

    h.send(user, EventKind::Start).await;
    h.send(user, voice("file-7", 5)).await;
    h.send(user, text("Yes")).await;
    h.send(user, text("German")).await;
    h.send(user, text("Anna")).await;

    let rows = h.log.rows();
    assert_eq!(rows[0].len(), 6);
    assert_eq!(rows[0][5], "https://files.example/file-7");

    let uploads = h.assets.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with("Kikeriki_German_Anna_"));
}

#[tokio::test]
async fn upload_failure_degrades_to_row_without_url() {
    let h = Harness::new(true);
    let user = UserId(8);
    h.assets.fail.store(true, Ordering::SeqCst);

    h.send(user, EventKind::Start).await;
    h.send(user, voice("file-8", 5)).await;
    h.send(user, text("Yes")).await;
    h.send(user, text("German")).await;
    h.send(user, text("Anna")).await;

    // The row is appended anyway, without an (empty) URL cell.
    let rows = h.log.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 5);
    assert_eq!(h.sender.last_prompt_for(user), Some(prompts::DONE.to_string()));
}

#[tokio::test]
async fn wrong_event_type_reprompts_and_preserves_progress() {
    let h = Harness::new(false);
    let user = UserId(9);

    h.send(user, text("hello bot")).await;
    assert_eq!(
        h.sender.last_prompt_for(user),
        Some(prompts::NOT_STARTED.to_string())
    );

    h.send(user, EventKind::Start).await;
    h.send(user, voice("file-9", 5)).await;
    h.send(user, voice("file-other", 5)).await;
    assert_eq!(
        h.sender.last_prompt_for(user),
        Some(prompts::EXPECTED_TEXT.to_string())
    );

    // Progress intact: the three answers still finish the original clip.
    h.send(user, text("Yes")).await;
    h.send(user, text("German")).await;
    h.send(user, text("Anna")).await;
    assert_eq!(h.log.rows()[0][3], "file-9");
}

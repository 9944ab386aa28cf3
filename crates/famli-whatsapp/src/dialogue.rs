//! Guided "save an item" dialogue
//!
//! The state machine itself ([`advance`]) is pure: it takes the current state
//! and one input and returns the next state plus what the caller must do.
//! [`ConversationHandler`] wires it to the session store, the command parser
//! and the item repository.
//!
//! ```text
//! Idle --content--> AwaitingCategory --category--> AwaitingConfirmation --yes--> Idle (commit)
//!   \--location-------------------------------------^              \--no---> Idle (discard)
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use famli_core::{Category, ItemRepository, ItemType, NewItem};

use crate::classify::{MessageKind, classify};
use crate::command::{self, Command, Confirmation};
use crate::phone;
use crate::reply;
use crate::session::{Session, SessionStore};
use crate::twilio::IncomingMessage;

/// Maximum characters kept in a draft title
pub const MAX_TITLE_CHARS: usize = 50;

/// Category assigned to shared locations, which skip the category menu
pub const DEFAULT_LOCATION_CATEGORY: Category = Category::Memories;

/// Number of items shown by the list command
const LIST_LIMIT: usize = 5;

const ITEM_SOURCE: &str = "whatsapp";

/// Item being assembled by the save flow
#[derive(Debug, Clone, PartialEq)]
pub struct PendingItem {
    pub content: String,
    pub category: Category,
    pub item_type: ItemType,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub title: String,
}

impl PendingItem {
    /// Build a draft from classified content
    pub fn from_content(content: &Content) -> Self {
        let text = content.text.trim();

        let (body, title, media_url) = match content.kind {
            MessageKind::Location => {
                let (lat, lon) = content.coordinates.unwrap_or_default();
                let body = format!("{},{}", lat, lon);
                let title = if text.is_empty() {
                    "Localização".to_string()
                } else {
                    derive_title(text)
                };
                let url = format!("https://www.google.com/maps?q={},{}", lat, lon);
                (body, title, Some(url))
            }
            kind => {
                let title = if text.is_empty() {
                    media_title(kind).to_string()
                } else {
                    derive_title(text)
                };
                (text.to_string(), title, content.media_url.clone())
            }
        };

        let category = match content.kind {
            MessageKind::Location => DEFAULT_LOCATION_CATEGORY,
            _ => Category::Other,
        };

        Self {
            content: body,
            category,
            item_type: content.kind.item_type(),
            media_url,
            media_type: content.media_type.clone(),
            title,
        }
    }

    pub fn into_new_item(self) -> NewItem {
        NewItem {
            item_type: self.item_type,
            title: self.title,
            content: self.content,
            category: self.category,
            media_url: self.media_url,
            source: ITEM_SOURCE.to_string(),
        }
    }
}

fn media_title(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Image => "Foto",
        MessageKind::Audio => "Áudio",
        MessageKind::Document => "Documento",
        MessageKind::Location => "Localização",
        MessageKind::Text => "Nota",
    }
}

/// First [`MAX_TITLE_CHARS`] characters of a text, on one line
pub fn derive_title(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= MAX_TITLE_CHARS {
        return single_line;
    }

    let cut: String = single_line.chars().take(MAX_TITLE_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

/// Where a conversation is in the save flow.
///
/// The draft lives inside the non-idle variants, so there is never a draft
/// while idle and never a missing draft otherwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingCategory(PendingItem),
    AwaitingConfirmation(PendingItem),
}

impl DialogueState {
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::AwaitingCategory(_) => "awaiting_category",
            DialogueState::AwaitingConfirmation(_) => "awaiting_confirmation",
        }
    }

    pub fn draft(&self) -> Option<&PendingItem> {
        match self {
            DialogueState::Idle => None,
            DialogueState::AwaitingCategory(draft) | DialogueState::AwaitingConfirmation(draft) => {
                Some(draft)
            }
        }
    }
}

/// Non-command content of one inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub kind: MessageKind,
    pub text: String,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub coordinates: Option<(f64, f64)>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            text: text.into(),
            media_url: None,
            media_type: None,
            coordinates: None,
        }
    }

    pub fn from_message(message: &IncomingMessage) -> Self {
        let kind = classify(message);
        let has_media = message.num_media > 0;

        Self {
            kind,
            text: message.body.trim().to_string(),
            media_url: message.media_url.clone().filter(|_| has_media),
            media_type: message.media_content_type.clone().filter(|_| has_media),
            coordinates: message.latitude.zip(message.longitude),
        }
    }
}

/// Input to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueInput {
    Content(Content),
    Cancel,
}

/// What the caller has to do after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Reply(String),
    /// Persist the draft, then tell the user whether it worked
    Commit(PendingItem),
    Discard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: DialogueState,
    pub action: Action,
}

impl Transition {
    fn reply(next: DialogueState, text: String) -> Self {
        Self {
            next,
            action: Action::Reply(text),
        }
    }
}

/// Advance the dialogue by one input
pub fn advance(state: DialogueState, input: DialogueInput) -> Transition {
    match (state, input) {
        (DialogueState::Idle, DialogueInput::Cancel) => {
            Transition::reply(DialogueState::Idle, reply::nothing_to_cancel())
        }
        (DialogueState::AwaitingCategory(_), DialogueInput::Cancel)
        | (DialogueState::AwaitingConfirmation(_), DialogueInput::Cancel) => Transition {
            next: DialogueState::Idle,
            action: Action::Discard,
        },

        (DialogueState::Idle, DialogueInput::Content(content)) => {
            let draft = PendingItem::from_content(&content);
            if content.kind == MessageKind::Location {
                let text = reply::confirm_prompt(&draft);
                Transition::reply(DialogueState::AwaitingConfirmation(draft), text)
            } else {
                let text = reply::category_menu(&draft);
                Transition::reply(DialogueState::AwaitingCategory(draft), text)
            }
        }

        (DialogueState::AwaitingCategory(mut draft), DialogueInput::Content(content)) => {
            draft.category = command::parse_category(&content.text);
            let text = reply::confirm_prompt(&draft);
            Transition::reply(DialogueState::AwaitingConfirmation(draft), text)
        }

        (DialogueState::AwaitingConfirmation(mut draft), DialogueInput::Content(content)) => {
            match command::parse_confirmation(&content.text) {
                Some(Confirmation::Affirmative) => Transition {
                    next: DialogueState::Idle,
                    action: Action::Commit(draft),
                },
                Some(Confirmation::Negative) => Transition {
                    next: DialogueState::Idle,
                    action: Action::Discard,
                },
                None => {
                    let title = content.text.trim();
                    if !title.is_empty() {
                        draft.title = derive_title(title);
                    }
                    let text = reply::confirm_prompt(&draft);
                    Transition::reply(DialogueState::AwaitingConfirmation(draft), text)
                }
            }
        }
    }
}

/// Turns inbound WhatsApp messages into replies and stored items
pub struct ConversationHandler {
    sessions: SessionStore,
    items: Arc<dyn ItemRepository>,
}

impl ConversationHandler {
    pub fn new(sessions: SessionStore, items: Arc<dyn ItemRepository>) -> Self {
        Self { sessions, items }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn items(&self) -> &Arc<dyn ItemRepository> {
        &self.items
    }

    /// Handle one inbound message; `None` means no reply is warranted.
    pub async fn handle(&self, message: &IncomingMessage) -> Option<String> {
        let phone = phone::normalize(&message.from);
        if phone.is_empty() {
            warn!("Dropping WhatsApp message without sender");
            return None;
        }

        let mut session = self.sessions.get_or_create(&phone).await;
        session.user_id = self.sessions.linked_user(&phone).await;
        session.touch();

        let content = Content::from_message(message);
        if content.kind == MessageKind::Text && content.text.is_empty() {
            self.sessions.save(session).await;
            return None;
        }

        debug!(
            phone = %phone::mask(&phone),
            kind = ?content.kind,
            state = session.state.name(),
            "Handling WhatsApp message"
        );

        let command = match content.kind {
            MessageKind::Text => command::parse(&content.text),
            _ => None,
        };

        let reply = match command {
            Some(command) => {
                self.handle_command(&mut session, command, message.profile_name.as_deref())
                    .await
            }
            None => self.handle_content(&mut session, content).await,
        };

        self.sessions.save(session).await;
        Some(reply)
    }

    async fn handle_command(
        &self,
        session: &mut Session,
        command: Command,
        profile_name: Option<&str>,
    ) -> String {
        match command {
            Command::Help => reply::help(profile_name),
            Command::Save => {
                if session.is_linked() {
                    reply::save_prompt()
                } else {
                    reply::link_required()
                }
            }
            Command::Cancel => {
                let state = std::mem::take(&mut session.state);
                self.apply(session, advance(state, DialogueInput::Cancel)).await
            }
            Command::Status => {
                let item_count = match &session.user_id {
                    Some(user_id) => match self.items.count_items(user_id).await {
                        Ok(count) => Some(count),
                        Err(e) => {
                            warn!("Failed to count items: {}", e);
                            None
                        }
                    },
                    None => None,
                };
                reply::status(session.is_linked(), &session.state, item_count)
            }
            Command::List => {
                let Some(user_id) = session.user_id.as_deref() else {
                    return reply::link_required();
                };
                match self.items.list_items(user_id, LIST_LIMIT).await {
                    Ok(items) => reply::item_list(&items),
                    Err(e) => {
                        error!("Failed to list items: {}", e);
                        reply::apology()
                    }
                }
            }
            Command::Link => {
                if session.is_linked() {
                    return reply::already_linked();
                }
                let code = self.sessions.issue_link_code(&session.phone).await;
                info!(phone = %phone::mask(&session.phone), "Issued link code");
                reply::link_code(&code, self.sessions.link_code_ttl().num_minutes())
            }
        }
    }

    async fn handle_content(&self, session: &mut Session, content: Content) -> String {
        if !session.is_linked() {
            return reply::link_required();
        }

        let state = std::mem::take(&mut session.state);
        self.apply(session, advance(state, DialogueInput::Content(content)))
            .await
    }

    /// Install the next state and carry out the transition's action
    async fn apply(&self, session: &mut Session, transition: Transition) -> String {
        session.state = transition.next;

        match transition.action {
            Action::Reply(text) => text,
            Action::Discard => reply::cancelled(),
            Action::Commit(draft) => {
                let Some(user_id) = session.user_id.clone() else {
                    return reply::link_required();
                };

                let title = draft.title.clone();
                let category = draft.category;
                match self.items.create_item(&user_id, draft.into_new_item()).await {
                    Ok(item) => {
                        info!(item_id = %item.id, user_id = %user_id, "Saved item from WhatsApp");
                        reply::saved(&title, category)
                    }
                    Err(e) => {
                        error!(user_id = %user_id, "Failed to save WhatsApp item: {}", e);
                        reply::save_failed()
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use famli_core::{Item, ItemStore, PhoneLink};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PHONE: &str = "+5511999990000";

    fn text_message(body: &str) -> IncomingMessage {
        IncomingMessage {
            message_sid: "SM1".to_string(),
            from: format!("whatsapp:{}", PHONE),
            to: "whatsapp:+14155238886".to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    fn location_message() -> IncomingMessage {
        IncomingMessage {
            latitude: Some(-23.5505),
            longitude: Some(-46.6333),
            ..text_message("")
        }
    }

    fn draft(title: &str) -> PendingItem {
        PendingItem::from_content(&Content::text(title))
    }

    /// Repository that counts calls and can be told to fail
    #[derive(Default)]
    struct CountingRepo {
        creates: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ItemRepository for CountingRepo {
        async fn create_item(&self, user_id: &str, item: NewItem) -> famli_core::Result<Item> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(famli_core::Error::Database("disk full".to_string()));
            }
            Ok(Item::new(user_id, item))
        }

        async fn list_items(&self, _user_id: &str, _limit: usize) -> famli_core::Result<Vec<Item>> {
            Ok(Vec::new())
        }

        async fn count_items(&self, _user_id: &str) -> famli_core::Result<usize> {
            Ok(0)
        }

        async fn save_link(&self, _link: &PhoneLink) -> famli_core::Result<()> {
            Ok(())
        }

        async fn delete_link(&self, _phone: &str) -> famli_core::Result<()> {
            Ok(())
        }

        async fn load_links(&self) -> famli_core::Result<Vec<PhoneLink>> {
            Ok(Vec::new())
        }
    }

    async fn linked_handler(repo: Arc<dyn ItemRepository>) -> ConversationHandler {
        let sessions = SessionStore::new();
        sessions.link(PHONE, "user-1").await;
        ConversationHandler::new(sessions, repo)
    }

    // ------------------------------------------------------------------
    // Pure transitions
    // ------------------------------------------------------------------

    #[test]
    fn test_idle_text_goes_to_awaiting_category() {
        let input = "lembrar de renovar o passaporte";
        let t = advance(DialogueState::Idle, DialogueInput::Content(Content::text(input)));
        match t.next {
            DialogueState::AwaitingCategory(draft) => {
                assert_eq!(draft.content, input);
                assert_eq!(draft.item_type, ItemType::Note);
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert!(matches!(t.action, Action::Reply(_)));
    }

    #[test]
    fn test_idle_location_skips_category() {
        let content = Content::from_message(&location_message());
        let t = advance(DialogueState::Idle, DialogueInput::Content(content));
        match t.next {
            DialogueState::AwaitingConfirmation(draft) => {
                assert_eq!(draft.category, DEFAULT_LOCATION_CATEGORY);
                assert_eq!(draft.item_type, ItemType::Location);
                assert_eq!(draft.content, "-23.5505,-46.6333");
                assert_eq!(draft.title, "Localização");
                assert!(draft.media_url.unwrap().contains("-23.5505,-46.6333"));
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_category_selection() {
        let state = DialogueState::AwaitingCategory(draft("Exame"));
        let t = advance(state, DialogueInput::Content(Content::text("2")));
        match t.next {
            DialogueState::AwaitingConfirmation(d) => assert_eq!(d.category, Category::Health),
            other => panic!("unexpected state {:?}", other),
        }

        let state = DialogueState::AwaitingCategory(draft("Exame"));
        let t = advance(state, DialogueInput::Content(Content::text("sei lá")));
        assert_eq!(t.next.draft().map(|d| d.category), Some(Category::Other));
    }

    #[test]
    fn test_affirmative_commits_regardless_of_category() {
        for category in Category::ALL {
            let mut d = draft("Nota");
            d.category = category;
            let t = advance(
                DialogueState::AwaitingConfirmation(d.clone()),
                DialogueInput::Content(Content::text("sim")),
            );
            assert_eq!(t.next, DialogueState::Idle);
            assert_eq!(t.action, Action::Commit(d));
        }
    }

    #[test]
    fn test_negative_discards() {
        let t = advance(
            DialogueState::AwaitingConfirmation(draft("Nota")),
            DialogueInput::Content(Content::text("não")),
        );
        assert_eq!(t.next, DialogueState::Idle);
        assert_eq!(t.action, Action::Discard);
    }

    #[test]
    fn test_other_input_replaces_title() {
        let t = advance(
            DialogueState::AwaitingConfirmation(draft("Nota")),
            DialogueInput::Content(Content::text("Senha do Wi-Fi")),
        );
        match t.next {
            DialogueState::AwaitingConfirmation(d) => {
                assert_eq!(d.title, "Senha do Wi-Fi");
                assert_eq!(d.content, "Nota");
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_keeps_title() {
        let t = advance(
            DialogueState::AwaitingConfirmation(draft("Nota")),
            DialogueInput::Content(Content::text("   ")),
        );
        assert_eq!(t.next.draft().map(|d| d.title.as_str()), Some("Nota"));
    }

    #[test]
    fn test_cancel_transitions() {
        let t = advance(DialogueState::Idle, DialogueInput::Cancel);
        assert_eq!(t.next, DialogueState::Idle);
        assert!(matches!(t.action, Action::Reply(_)));

        let t = advance(DialogueState::AwaitingCategory(draft("x")), DialogueInput::Cancel);
        assert_eq!(t.next, DialogueState::Idle);
        assert_eq!(t.action, Action::Discard);
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("  curta \n nota "), "curta nota");

        let long = "a".repeat(80);
        let title = derive_title(&long);
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
        assert!(title.ends_with("..."));

        // Multi-byte characters are cut on char boundaries
        let accented = "ção ".repeat(30);
        assert!(derive_title(&accented).chars().count() <= MAX_TITLE_CHARS);
    }

    #[test]
    fn test_media_draft_without_caption() {
        let msg = IncomingMessage {
            num_media: 1,
            media_url: Some("https://api.twilio.com/m/1".to_string()),
            media_content_type: Some("audio/ogg".to_string()),
            ..text_message("")
        };
        let d = PendingItem::from_content(&Content::from_message(&msg));
        assert_eq!(d.item_type, ItemType::Audio);
        assert_eq!(d.title, "Áudio");
        assert_eq!(d.media_url.as_deref(), Some("https://api.twilio.com/m/1"));
        assert_eq!(d.media_type.as_deref(), Some("audio/ogg"));
    }

    // ------------------------------------------------------------------
    // Handler
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_full_save_flow() {
        let store = Arc::new(ItemStore::in_memory().unwrap());
        let handler = linked_handler(store.clone()).await;

        let text = "Minha senha do banco está no cofre";
        let reply = handler.handle(&text_message(text)).await.unwrap();
        for n in 1..=5 {
            assert!(reply.contains(&format!("{}. ", n)));
        }

        let session = handler.sessions().get_or_create(PHONE).await;
        let d = session.state.draft().unwrap();
        assert_eq!(d.content, text);
        assert_eq!(d.title, text);

        let reply = handler.handle(&text_message("2")).await.unwrap();
        assert!(reply.contains("Saúde"));
        let session = handler.sessions().get_or_create(PHONE).await;
        assert!(matches!(session.state, DialogueState::AwaitingConfirmation(_)));

        let reply = handler.handle(&text_message("sim")).await.unwrap();
        assert!(reply.contains("salvo"));

        let session = handler.sessions().get_or_create(PHONE).await;
        assert_eq!(session.state, DialogueState::Idle);

        let items = store.list_items("user-1", 10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, text);
        assert_eq!(items[0].content, text);
        assert_eq!(items[0].category, Category::Health);
        assert_eq!(items[0].source, "whatsapp");
    }

    #[tokio::test]
    async fn test_unlinked_number_is_told_to_link() {
        let repo = Arc::new(CountingRepo::default());
        let handler = ConversationHandler::new(SessionStore::new(), repo.clone());

        let reply = handler.handle(&text_message("guarde isso")).await.unwrap();
        assert!(reply.contains("vincular"));

        let session = handler.sessions().get_or_create(PHONE).await;
        assert_eq!(session.state, DialogueState::Idle);

        handler.handle(&text_message("sim")).await.unwrap();
        assert_eq!(repo.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_negative_never_persists() {
        let repo = Arc::new(CountingRepo::default());
        let handler = linked_handler(repo.clone()).await;

        handler.handle(&text_message("nota qualquer")).await;
        handler.handle(&text_message("1")).await;
        let reply = handler.handle(&text_message("não")).await.unwrap();

        assert_eq!(reply, reply::cancelled());
        assert_eq!(repo.creates.load(Ordering::SeqCst), 0);
        let session = handler.sessions().get_or_create(PHONE).await;
        assert_eq!(session.state, DialogueState::Idle);
    }

    #[tokio::test]
    async fn test_persistence_failure_resets_to_idle() {
        let repo = Arc::new(CountingRepo {
            fail: true,
            ..Default::default()
        });
        let handler = linked_handler(repo.clone()).await;

        handler.handle(&text_message("nota qualquer")).await;
        handler.handle(&text_message("5")).await;
        let reply = handler.handle(&text_message("ok")).await.unwrap();

        assert_eq!(reply, reply::save_failed());
        assert_eq!(repo.creates.load(Ordering::SeqCst), 1);
        let session = handler.sessions().get_or_create(PHONE).await;
        assert_eq!(session.state, DialogueState::Idle);
    }

    #[tokio::test]
    async fn test_cancel_command_discards_draft() {
        let repo = Arc::new(CountingRepo::default());
        let handler = linked_handler(repo.clone()).await;

        handler.handle(&text_message("nota qualquer")).await;
        let reply = handler.handle(&text_message("/cancelar")).await.unwrap();
        assert_eq!(reply, reply::cancelled());

        let session = handler.sessions().get_or_create(PHONE).await;
        assert_eq!(session.state, DialogueState::Idle);
    }

    #[tokio::test]
    async fn test_help_keeps_state() {
        let handler = linked_handler(Arc::new(CountingRepo::default())).await;
        handler.handle(&text_message("nota qualquer")).await;

        let msg = IncomingMessage {
            profile_name: Some("Ana".to_string()),
            ..text_message("ajuda")
        };
        let reply = handler.handle(&msg).await.unwrap();
        assert!(reply.contains("Ana"));

        let session = handler.sessions().get_or_create(PHONE).await;
        assert!(matches!(session.state, DialogueState::AwaitingCategory(_)));
    }

    #[tokio::test]
    async fn test_link_command_issues_code() {
        let handler = ConversationHandler::new(SessionStore::new(), Arc::new(CountingRepo::default()));
        let reply = handler.handle(&text_message("vincular")).await.unwrap();

        let code: String = reply
            .split('*')
            .nth(1)
            .unwrap_or_default()
            .to_string();
        assert_eq!(code.len(), 6);
        assert!(
            handler
                .sessions()
                .redeem_link_code(PHONE, &code, "user-9")
                .await
        );

        let reply = handler.handle(&text_message("vincular")).await.unwrap();
        assert_eq!(reply, reply::already_linked());
    }

    #[tokio::test]
    async fn test_list_command() {
        let store = Arc::new(ItemStore::in_memory().unwrap());
        let handler = linked_handler(store.clone()).await;

        let reply = handler.handle(&text_message("listar")).await.unwrap();
        assert!(reply.contains("ainda não tem itens"));

        store
            .create_item("user-1", draft("Certidão de nascimento").into_new_item())
            .await
            .unwrap();
        let reply = handler.handle(&text_message("listar")).await.unwrap();
        assert!(reply.contains("1. [Outros] Certidão de nascimento"));
    }

    #[tokio::test]
    async fn test_location_flow_from_handler() {
        let store = Arc::new(ItemStore::in_memory().unwrap());
        let handler = linked_handler(store.clone()).await;

        let reply = handler.handle(&location_message()).await.unwrap();
        assert!(reply.contains("Memórias"));

        handler.handle(&text_message("Casa da vó")).await;
        handler.handle(&text_message("sim")).await;

        let items = store.list_items("user-1", 1).await.unwrap();
        assert_eq!(items[0].item_type, ItemType::Location);
        assert_eq!(items[0].title, "Casa da vó");
        assert_eq!(items[0].category, DEFAULT_LOCATION_CATEGORY);
    }

    #[tokio::test]
    async fn test_empty_body_gets_no_reply() {
        let handler = linked_handler(Arc::new(CountingRepo::default())).await;
        assert!(handler.handle(&text_message("   ")).await.is_none());
    }
}

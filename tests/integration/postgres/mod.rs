//! Repository and controller tests against a real Postgres database
//!
//! Connects to `TEST_DATABASE_URL` (falling back to `DATABASE_URL`) and runs
//! the workspace migrations first. Without a reachable database every test
//! here is skipped.
//!
//! Run with: TEST_DATABASE_URL=postgresql://... cargo test -p chatwidget-integration-tests postgres

use std::env;
use std::sync::{Arc, Once};
use std::time::Duration;

use chatwidget_accounts::{PgUserRepository, User, UserRepository};
use chatwidget_common::RepositoryError;
use chatwidget_conversations::{
    Conversation, ConversationController, ConversationRepository, ConversationsRepositories,
    Message, MessageRepository, NewMessage, PgConversationRepository, PgMessageRepository,
    CONVERSATION_PREAMBLE,
};
use chatwidget_llm::{LlmMessage, MockLlmService};
use sqlx::PgPool;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Postgres-backed repositories sharing one pool
struct PgHarness {
    pool: PgPool,
    users: PgUserRepository,
    conversations: PgConversationRepository,
    messages: PgMessageRepository,
}

impl PgHarness {
    async fn connect() -> Option<Self> {
        INIT.call_once(|| {
            dotenvy::from_filename(".env.test").ok();
        });

        let url = env::var("TEST_DATABASE_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .ok()?;

        let pool = match PgPool::connect(&url).await {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Database at TEST_DATABASE_URL unreachable: {}", e);
                return None;
            }
        };

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("migrations should apply");

        Some(Self {
            users: PgUserRepository::new(pool.clone()),
            conversations: PgConversationRepository::new(pool.clone()),
            messages: PgMessageRepository::new(pool.clone()),
            pool,
        })
    }

    /// Insert a user with a unique name, so tests can share one database
    async fn user(&self) -> User {
        let username = format!("pg_{}", Uuid::new_v4().simple());
        let user = User::new(username, "pw").unwrap();
        self.users.create(&user).await.unwrap()
    }

    async fn conversation(&self, user_id: Uuid) -> Conversation {
        self.conversations
            .create(&Conversation::new(user_id))
            .await
            .unwrap()
    }

    async fn user_turn(&self, conversation_id: Uuid, content: &str) -> Message {
        let msg = NewMessage::user(conversation_id, content.to_string()).unwrap();
        self.messages.append(&msg).await.unwrap()
    }

    async fn assistant_turn(&self, conversation_id: Uuid, content: &str) -> Message {
        let msg = NewMessage::assistant(conversation_id, content.to_string());
        self.messages.append(&msg).await.unwrap()
    }
}

/// Skip test if no database is configured or reachable
macro_rules! skip_if_no_database {
    () => {
        match PgHarness::connect().await {
            Some(db) => db,
            None => {
                eprintln!("TEST_DATABASE_URL not available, skipping test");
                return;
            }
        }
    };
}

fn ids(messages: &[Message]) -> Vec<i64> {
    messages.iter().map(|m| m.id).collect()
}

mod test_users {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_username_maps_to_already_exists() {
        let db = skip_if_no_database!();
        let existing = db.user().await;

        let duplicate = User::new(existing.username.clone(), "other").unwrap();
        let err = db.users.create(&duplicate).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists));

        let found = db
            .users
            .find_by_username(&existing.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, existing.id);
        assert!(found.verify_password("pw"));
    }
}

mod test_messages {
    use super::*;

    #[tokio::test]
    async fn test_paired_reply_is_first_assistant_after_user_turn() {
        let db = skip_if_no_database!();
        let user = db.user().await;
        let conv = db.conversation(user.id).await;

        let q1 = db.user_turn(conv.id, "q1").await;
        let a1 = db.assistant_turn(conv.id, "a1").await;
        let q2 = db.user_turn(conv.id, "q2").await;
        let q3 = db.user_turn(conv.id, "q3").await;
        let a3 = db.assistant_turn(conv.id, "a3").await;

        let paired = db.messages.find_paired_reply(conv.id, q1.id).await.unwrap();
        assert_eq!(paired.map(|m| m.id), Some(a1.id));

        // q2 was never answered, so the next assistant turn after it is a3
        let paired = db.messages.find_paired_reply(conv.id, q2.id).await.unwrap();
        assert_eq!(paired.map(|m| m.id), Some(a3.id));

        let paired = db.messages.find_paired_reply(conv.id, q3.id).await.unwrap();
        assert_eq!(paired.map(|m| m.id), Some(a3.id));

        assert!(db
            .messages
            .find_paired_reply(conv.id, a3.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_paired_reply_stays_inside_conversation() {
        let db = skip_if_no_database!();
        let alice = db.user().await;
        let bob = db.user().await;
        let alice_conv = db.conversation(alice.id).await;
        let bob_conv = db.conversation(bob.id).await;

        let question = db.user_turn(alice_conv.id, "unanswered").await;
        db.assistant_turn(bob_conv.id, "bob's reply").await;

        assert!(db
            .messages
            .find_paired_reply(alice_conv.id, question.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_active_skips_deleted_and_list_through_keeps_them() {
        let db = skip_if_no_database!();
        let user = db.user().await;
        let conv = db.conversation(user.id).await;

        let q1 = db.user_turn(conv.id, "q1").await;
        let a1 = db.assistant_turn(conv.id, "a1").await;
        let q2 = db.user_turn(conv.id, "q2").await;
        let a2 = db.assistant_turn(conv.id, "a2").await;

        db.messages.soft_delete(q2.id).await.unwrap();

        let active = db.messages.list_active(conv.id).await.unwrap();
        assert_eq!(ids(&active), vec![q1.id, a1.id, a2.id]);

        let through = db.messages.list_through(conv.id, a2.id).await.unwrap();
        assert_eq!(ids(&through), vec![q1.id, a1.id, q2.id, a2.id]);
        assert!(through[2].is_deleted);

        let through = db.messages.list_through(conv.id, a1.id).await.unwrap();
        assert_eq!(ids(&through), vec![q1.id, a1.id]);
    }

    #[tokio::test]
    async fn test_update_content_bumps_updated_at() {
        let db = skip_if_no_database!();
        let user = db.user().await;
        let conv = db.conversation(user.id).await;
        let original = db.user_turn(conv.id, "before").await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        let updated = db
            .messages
            .update_content(original.id, "after")
            .await
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.content, "after");
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at > original.updated_at);

        let err = db.messages.update_content(i64::MAX, "x").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let err = db.messages.soft_delete(i64::MAX).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}

mod test_conversations {
    use super::*;

    #[tokio::test]
    async fn test_find_for_user_returns_earliest() {
        let db = skip_if_no_database!();
        let user = db.user().await;

        let later = db.conversation(user.id).await;
        let earlier = db
            .conversations
            .create(&Conversation {
                created_at: later.created_at - chrono::Duration::minutes(5),
                ..Conversation::new(user.id)
            })
            .await
            .unwrap();

        let found = db.conversations.find_for_user(user.id).await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(earlier.id));
    }

    #[tokio::test]
    async fn test_delete_for_user_removes_only_that_users_ledger() {
        let db = skip_if_no_database!();
        let alice = db.user().await;
        let bob = db.user().await;

        let first = db.conversation(alice.id).await;
        let second = db.conversation(alice.id).await;
        let bob_conv = db.conversation(bob.id).await;
        let alice_msg = db.user_turn(first.id, "alice one").await;
        db.user_turn(second.id, "alice two").await;
        let bob_msg = db.user_turn(bob_conv.id, "bob").await;

        let removed = db.conversations.delete_for_user(alice.id).await.unwrap();
        assert_eq!(removed, 2);

        assert!(db.conversations.find_for_user(alice.id).await.unwrap().is_none());
        assert!(db.messages.find(alice_msg.id).await.unwrap().is_none());

        assert!(db.conversations.find(bob_conv.id).await.unwrap().is_some());
        assert!(db.messages.find(bob_msg.id).await.unwrap().is_some());

        let orphaned: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = ANY($1)",
        )
        .bind(vec![first.id, second.id])
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(orphaned, 0);
    }
}

mod test_controller {
    use super::*;

    fn controller(db: &PgHarness, llm: &MockLlmService) -> ConversationController {
        ConversationController::new(
            ConversationsRepositories::postgres(db.pool.clone()),
            Arc::new(llm.clone()),
        )
    }

    #[tokio::test]
    async fn test_edit_regenerates_reply_with_context_through_reply() {
        let db = skip_if_no_database!();
        let llm = MockLlmService::new();
        let controller = controller(&db, &llm);
        let user = db.user().await;

        llm.push_response("a1");
        controller.send(user.id, "q1".to_string()).await.unwrap();
        llm.push_response("a2");
        controller.send(user.id, "q2".to_string()).await.unwrap();

        let ledger = controller.list(user.id).await.unwrap();
        let (q1, a1, q2, a2) = (&ledger[0], &ledger[1], &ledger[2], &ledger[3]);

        // A soft-deleted turn before the reply stays in the edit context
        controller.delete(user.id, q1.id).await.unwrap();

        llm.push_response("a2, regenerated");
        let outcome = controller
            .edit(user.id, q2.id, "q2, edited".to_string())
            .await
            .unwrap();

        let reply = outcome.paired_reply.unwrap();
        assert_eq!(reply.id, a2.id);
        assert_eq!(reply.content, "a2, regenerated");
        assert_eq!(outcome.user_message.content, "q2, edited");

        assert_eq!(
            llm.last_request().unwrap().messages,
            vec![
                LlmMessage::system(CONVERSATION_PREAMBLE),
                LlmMessage::user("q1"),
                LlmMessage::assistant("a1"),
                LlmMessage::user("q2, edited"),
                LlmMessage::assistant("a2"),
            ]
        );

        let after = controller.list(user.id).await.unwrap();
        assert_eq!(ids(&after), vec![a1.id, q2.id, a2.id]);
        assert_eq!(after[0].content, "a1");
    }

    #[tokio::test]
    async fn test_reset_leaves_single_greeting() {
        let db = skip_if_no_database!();
        let llm = MockLlmService::new();
        let controller = controller(&db, &llm);
        let user = db.user().await;

        controller.send(user.id, "hello".to_string()).await.unwrap();
        controller.send(user.id, "again".to_string()).await.unwrap();

        llm.push_response("Welcome back!");
        let greeting = controller.reset(user.id).await.unwrap();

        let ledger = controller.list(user.id).await.unwrap();
        assert_eq!(ids(&ledger), vec![greeting.id]);
        assert_eq!(ledger[0].content, "Welcome back!");
        assert!(!ledger[0].is_user_message);
    }
}

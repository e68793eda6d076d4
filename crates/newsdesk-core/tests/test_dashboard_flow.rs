//! End-to-end flow over the state layer: two-factor login, dashboard
//! initialization, and session restore after a simulated restart.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;

use newsdesk_core::api::{
    ArticleSubmission, ArticlesPayload, CmsApi, InitiateLogin, RawCategory, RawPublication,
    VerifyToken,
};
use newsdesk_core::content::ContentStore;
use newsdesk_core::error::Result;
use newsdesk_core::login::{LoginStep, LoginStore};
use newsdesk_core::session::{MemorySnapshotRepository, SessionStore};

struct FakeCms;

#[async_trait]
impl CmsApi for FakeCms {
    async fn initiate_login(&self, email: &str, password: &str) -> Result<InitiateLogin> {
        Ok(InitiateLogin {
            success: email == "jdoe@example.com" && password == "hunter2",
            user_id: Some(7),
            message: None,
        })
    }

    async fn verify_token(&self, _email: &str, code: &str) -> Result<VerifyToken> {
        Ok(VerifyToken {
            success: code == "424242",
            user: (code == "424242").then(|| {
                json!({
                    "id": 7,
                    "username": "jdoe",
                    "email": "jdoe@example.com",
                    "first_name": "Jane",
                    "last_name": "Doe",
                })
            }),
            message: None,
        })
    }

    async fn resend_token(&self, _email: &str) -> Result<bool> {
        Ok(true)
    }

    async fn publications_by_author(&self, _username: &str) -> Result<Vec<RawPublication>> {
        Ok(vec![RawPublication {
            id: 1,
            name: "Daily Monitor".to_string(),
            slug: "daily-monitor".to_string(),
            description: None,
            categories: vec![RawCategory {
                id: 10,
                name: "News".to_string(),
                slug: "news".to_string(),
                description: None,
            }],
        }])
    }

    async fn articles_by_author(
        &self,
        _username: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<ArticlesPayload> {
        let wire = json!({
            "data": {
                "articles": [
                    {
                        "id": 31,
                        "title": "Budget passes",
                        "publicationId": 1,
                        "excerpt": "Short version",
                        "wp_published_at": "2026-08-01 09:00:00",
                        "authors": [{"id": 7, "username": "jdoe", "display_name": "Jane Doe"}],
                    },
                ],
            },
        });
        serde_json::from_value(wire).map_err(Into::into)
    }

    async fn save_article(&self, submission: ArticleSubmission) -> Result<Value> {
        let mut saved = submission.data;
        saved["id"] = json!(32);
        Ok(saved)
    }
}

#[tokio::test]
async fn test_login_dashboard_and_restore() {
    let api: Arc<dyn CmsApi> = Arc::new(FakeCms);
    let snapshots = Arc::new(MemorySnapshotRepository::new());
    let session = Arc::new(SessionStore::new(api.clone(), snapshots.clone()));
    let login = LoginStore::new(api.clone(), session.clone());

    // Two-factor handshake.
    assert!(login.initiate("jdoe@example.com", "hunter2").await.success);
    assert_eq!(login.step(), LoginStep::Token);
    assert!(login.verify("424242").await.success);
    assert_eq!(login.step(), LoginStep::Success);
    assert!(session.is_authenticated());
    assert_eq!(session.initials(), "JD");
    assert_eq!(session.allowed_publication_ids(), vec![1]);

    // Dashboard entry.
    let content = ContentStore::new(api.clone(), session.clone());
    content.initialize().await;
    assert_eq!(content.current_publication().unwrap().name, "Daily Monitor");
    let articles = content.articles();
    assert_eq!(articles.len(), 1);
    // Legacy upstream spellings normalized.
    assert_eq!(articles[0].summary.as_deref(), Some("Short version"));
    assert_eq!(
        articles[0].published_at.as_deref(),
        Some("2026-08-01 09:00:00")
    );
    assert_eq!(content.authors().len(), 1);

    // Simulated restart: a fresh session store restores from the snapshot
    // without touching the network-derived permission path.
    let revived = SessionStore::new(api, snapshots);
    revived.restore().await;
    assert!(revived.is_authenticated());
    assert_eq!(revived.user().unwrap().name, "Jane Doe");
    assert_eq!(revived.allowed_publication_ids(), vec![1]);
}

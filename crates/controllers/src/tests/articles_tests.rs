use super::*;
use async_trait::async_trait;
use shared::error::HttpErrorResponse;
use std::sync::Mutex as StdMutex;

#[derive(Default)]
struct FakeArticles {
    calls: StdMutex<Vec<String>>,
    saved: StdMutex<Vec<Article>>,
    fail_queries: bool,
}

impl FakeArticles {
    fn failing_queries() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }
}

fn stored(id: i64, title: &str) -> Article {
    Article {
        id: Some(ArticleId(id)),
        title: title.to_string(),
        content: format!("{title} body"),
        created: None,
    }
}

#[async_trait]
impl ArticleResource for FakeArticles {
    async fn save(&self, article: &Article) -> Result<Article, ResourceError> {
        self.record("save".to_string());
        self.saved.lock().expect("lock").push(article.clone());
        let mut saved = article.clone();
        saved.id = Some(ArticleId(42));
        Ok(saved)
    }

    async fn update(&self, article: &Article) -> Result<Article, ResourceError> {
        self.record(format!("update {:?}", article.id.map(|id| id.0)));
        let mut saved = article.clone();
        saved.content = format!("{} (revised)", saved.content);
        Ok(saved)
    }

    async fn remove(&self, article: &Article) -> Result<(), ResourceError> {
        self.record(format!("remove {:?}", article.id.map(|id| id.0)));
        Ok(())
    }

    async fn query(&self) -> Result<Vec<Article>, ResourceError> {
        self.record("query".to_string());
        if self.fail_queries {
            return Err(ResourceError::Status(HttpErrorResponse::new(
                503,
                "Service Unavailable",
                None,
            )));
        }
        Ok(vec![stored(1, "first"), stored(2, "second")])
    }

    async fn get(&self, article_id: ArticleId) -> Result<Article, ResourceError> {
        self.record(format!("get {}", article_id.0));
        Ok(stored(article_id.0, "found"))
    }
}

#[derive(Default)]
struct RecordingNavigator {
    paths: StdMutex<Vec<String>>,
    reloads: StdMutex<usize>,
}

impl Navigator for RecordingNavigator {
    fn go_to_path(&self, path: &str) {
        self.paths.lock().expect("lock").push(path.to_string());
    }

    fn reload_current_state(&self) {
        *self.reloads.lock().expect("lock") += 1;
    }
}

fn controller(
    articles: Arc<FakeArticles>,
    navigator: Arc<RecordingNavigator>,
) -> ArticlesController {
    ArticlesController::new(articles, navigator)
}

#[tokio::test]
async fn invalid_create_only_marks_form_submitted() {
    let articles = Arc::new(FakeArticles::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = controller(articles.clone(), navigator.clone());
    controller.set_form("title", "").await;

    controller.create(false).await.expect("create");

    let view = controller.view().await;
    assert!(view.submitted);
    assert_eq!(view.form.title, "title");
    assert!(articles.calls().is_empty());
    assert!(navigator.paths.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn valid_create_saves_clears_form_and_navigates() {
    let articles = Arc::new(FakeArticles::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = controller(articles.clone(), navigator.clone());
    controller.set_form("Release notes", "Iron Test 0.9").await;

    controller.create(true).await.expect("create");

    let saved = articles.saved.lock().expect("lock").clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, None);
    assert_eq!(saved[0].title, "Release notes");
    assert_eq!(saved[0].content, "Iron Test 0.9");

    let view = controller.view().await;
    assert_eq!(view.form, ArticleForm::default());
    assert!(!view.submitted);
    assert_eq!(
        navigator.paths.lock().expect("lock").as_slice(),
        &["articles/42".to_string()]
    );
}

#[tokio::test]
async fn update_requires_a_loaded_article() {
    let controller = controller(
        Arc::new(FakeArticles::default()),
        Arc::new(RecordingNavigator::default()),
    );

    assert!(!controller.edit_article(|article| article.title.clear()).await);
    let err = controller.update(true).await.expect_err("must fail");
    assert!(matches!(err, ArticlesError::NoArticleLoaded));
}

#[tokio::test]
async fn update_after_find_one_navigates_to_article() {
    let articles = Arc::new(FakeArticles::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = controller(articles.clone(), navigator.clone());

    controller.find_one(ArticleId(7)).await.expect("find one");
    assert_eq!(
        controller.view().await.article.map(|article| article.title),
        Some("found".to_string())
    );

    controller.update(false).await.expect("invalid update");
    assert!(controller.view().await.submitted);

    assert!(
        controller
            .edit_article(|article| article.title = "renamed".to_string())
            .await
    );
    controller.update(true).await.expect("update");
    assert_eq!(articles.calls(), vec!["get 7", "update Some(7)"]);
    let article = controller.view().await.article.expect("article");
    assert_eq!(article.title, "renamed");
    assert_eq!(article.content, "found body (revised)");
    assert_eq!(
        navigator.paths.lock().expect("lock").as_slice(),
        &["articles/7".to_string()]
    );
}

#[tokio::test]
async fn update_without_id_is_rejected_before_calling_server() {
    let articles = Arc::new(FakeArticles::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = controller(articles.clone(), navigator.clone());

    controller.find_one(ArticleId(7)).await.expect("find one");
    assert!(controller.edit_article(|article| article.id = None).await);

    let err = controller.update(true).await.expect_err("must fail");
    assert!(matches!(err, ArticlesError::MissingId));
    assert_eq!(articles.calls(), vec!["get 7"]);
    assert!(navigator.paths.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn remove_reloads_current_state() {
    let articles = Arc::new(FakeArticles::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = controller(articles.clone(), navigator.clone());

    controller.remove(&stored(3, "old")).await.expect("remove");

    assert_eq!(articles.calls(), vec!["remove Some(3)"]);
    assert_eq!(*navigator.reloads.lock().expect("lock"), 1);
}

#[tokio::test]
async fn find_and_find_grid_populate_list() {
    let controller = controller(
        Arc::new(FakeArticles::default()),
        Arc::new(RecordingNavigator::default()),
    );

    controller.find().await.expect("find");
    let view = controller.view().await;
    assert_eq!(view.articles.len(), 2);
    assert!(view.column_defs.is_empty());

    controller.find_grid().await.expect("find grid");
    let view = controller.view().await;
    assert_eq!(view.articles.len(), 2);
    assert_eq!(view.column_defs, grid_column_defs());
    assert_eq!(view.column_defs[0].name, "title");
    assert_eq!(
        view.column_defs[0].cell_template.as_deref(),
        Some(TITLE_CELL_TEMPLATE)
    );
    assert_eq!(view.column_defs[1].cell_template, None);
}

#[tokio::test]
async fn query_failure_propagates_and_keeps_previous_list() {
    let controller = controller(
        Arc::new(FakeArticles::failing_queries()),
        Arc::new(RecordingNavigator::default()),
    );

    let err = controller.find().await.expect_err("must fail");
    match err {
        ArticlesError::Resource(ResourceError::Status(response)) => {
            assert_eq!(response.status, 503)
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(controller.view().await.articles.is_empty());
}

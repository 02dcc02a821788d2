use std::sync::Arc;

use client_core::{ArticleResource, ResourceError};
use shared::{
    domain::ArticleId,
    protocol::{Article, ColumnDef},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const TITLE_CELL_TEMPLATE: &str =
    "<div><a href=\"#/articles/{{row.entity.id}}\">{{COL_FIELD}}</a></div>";

#[derive(Debug, Error)]
pub enum ArticlesError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("no article is loaded")]
    NoArticleLoaded,
    #[error("server returned an article without an id")]
    MissingId,
}

/// Client side routing used after article changes.
pub trait Navigator: Send + Sync {
    fn go_to_path(&self, path: &str);
    fn reload_current_state(&self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlesViewModel {
    pub form: ArticleForm,
    pub submitted: bool,
    pub articles: Vec<Article>,
    pub article: Option<Article>,
    pub column_defs: Vec<ColumnDef>,
}

pub fn article_path(article_id: ArticleId) -> String {
    format!("articles/{article_id}")
}

pub fn grid_column_defs() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            name: "title".to_string(),
            cell_template: Some(TITLE_CELL_TEMPLATE.to_string()),
        },
        ColumnDef {
            name: "content".to_string(),
            cell_template: None,
        },
    ]
}

pub struct ArticlesController {
    articles: Arc<dyn ArticleResource>,
    navigator: Arc<dyn Navigator>,
    view: RwLock<ArticlesViewModel>,
}

impl ArticlesController {
    pub fn new(articles: Arc<dyn ArticleResource>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            articles,
            navigator,
            view: RwLock::new(ArticlesViewModel::default()),
        }
    }

    pub async fn view(&self) -> ArticlesViewModel {
        self.view.read().await.clone()
    }

    pub async fn set_form(&self, title: impl Into<String>, content: impl Into<String>) {
        let mut view = self.view.write().await;
        view.form = ArticleForm {
            title: title.into(),
            content: content.into(),
        };
    }

    /// Applies an edit to the loaded article. Returns false when none is loaded.
    pub async fn edit_article(&self, edit: impl FnOnce(&mut Article)) -> bool {
        match self.view.write().await.article.as_mut() {
            Some(article) => {
                edit(article);
                true
            }
            None => false,
        }
    }

    pub async fn create(&self, is_valid: bool) -> Result<(), ArticlesError> {
        let article = {
            let mut view = self.view.write().await;
            if !is_valid {
                view.submitted = true;
                return Ok(());
            }
            let form = std::mem::take(&mut view.form);
            Article {
                title: form.title,
                content: form.content,
                ..Article::default()
            }
        };

        let saved = self.articles.save(&article).await?;
        let article_id = saved.id.ok_or(ArticlesError::MissingId)?;
        info!(%article_id, "article created");
        self.navigator.go_to_path(&article_path(article_id));
        Ok(())
    }

    pub async fn update(&self, is_valid: bool) -> Result<(), ArticlesError> {
        let article = {
            let mut view = self.view.write().await;
            if !is_valid {
                view.submitted = true;
                return Ok(());
            }
            view.article.clone().ok_or(ArticlesError::NoArticleLoaded)?
        };

        let article_id = article.id.ok_or(ArticlesError::MissingId)?;
        let saved = self.articles.update(&article).await?;
        info!(%article_id, "article updated");
        self.view.write().await.article = Some(saved);
        self.navigator.go_to_path(&article_path(article_id));
        Ok(())
    }

    pub async fn remove(&self, article: &Article) -> Result<(), ArticlesError> {
        self.articles.remove(article).await?;
        info!(article_id = ?article.id, "article removed");
        self.navigator.reload_current_state();
        Ok(())
    }

    pub async fn find(&self) -> Result<(), ArticlesError> {
        let articles = self.articles.query().await?;
        debug!(count = articles.len(), "articles loaded");
        self.view.write().await.articles = articles;
        Ok(())
    }

    pub async fn find_grid(&self) -> Result<(), ArticlesError> {
        let articles = self.articles.query().await?;
        let mut view = self.view.write().await;
        view.articles = articles;
        view.column_defs = grid_column_defs();
        Ok(())
    }

    pub async fn find_one(&self, article_id: ArticleId) -> Result<(), ArticlesError> {
        let article = self.articles.get(article_id).await?;
        self.view.write().await.article = Some(article);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/articles_tests.rs"]
mod tests;

/*
 * Responsibility
 * - Article create/update DTOs, the article wire view and list envelopes
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::{max_len, min_len, profiles::ProfileView, required};
use crate::error::{AppError, FieldError};

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub article: CreateArticle,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticle {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, rename = "tagList")]
    pub tag_list: Vec<String>,
}

impl CreateArticleRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let article = &self.article;
        let mut failures: Vec<FieldError> = Vec::new();

        if let Some(f) =
            required("Title", &article.title).or_else(|| min_len("Title", &article.title, 4))
        {
            failures.push(f);
        }
        if let Some(f) = max_len("Description", &article.description, 2048) {
            failures.push(f);
        }
        if let Some(f) = max_len("Body", &article.body, 2048) {
            failures.push(f);
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(failures))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub article: UpdateArticle,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

impl UpdateArticleRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let article = &self.article;
        let mut failures: Vec<FieldError> = Vec::new();

        if let Some(title) = &article.title
            && let Some(f) = required("Title", title).or_else(|| min_len("Title", title, 4))
        {
            failures.push(f);
        }
        if let Some(description) = &article.description
            && let Some(f) = max_len("Description", description, 2048)
        {
            failures.push(f);
        }
        if let Some(body) = &article.body
            && let Some(f) = max_len("Body", body, 2048)
        {
            failures.push(f);
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(failures))
        }
    }
}

/// Pagination/filter query for article listings.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleListQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ArticleBody {
    pub article: ArticleView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesBody {
    pub articles: Vec<ArticleView>,
    pub articles_count: i64,
}

/// An article as seen by the current viewer. `favorited` and the author's
/// `following` are viewer-relative; `favoritesCount` is global.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: ProfileView,
}

#[derive(Debug, Serialize)]
pub struct TagsBody {
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_title_reports_min_4() {
        let req = CreateArticleRequest {
            article: CreateArticle {
                title: "Hi".to_string(),
                description: String::new(),
                body: String::new(),
                tag_list: Vec::new(),
            },
        };
        match req.validate().unwrap_err() {
            AppError::Validation(failures) => {
                assert_eq!(failures[0].field, "Title");
                assert_eq!(failures[0].tag, "min");
                assert_eq!(failures[0].param.as_deref(), Some("4"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_body_reports_max() {
        let req = CreateArticleRequest {
            article: CreateArticle {
                title: "A valid title".to_string(),
                description: String::new(),
                body: "x".repeat(2049),
                tag_list: Vec::new(),
            },
        };
        match req.validate().unwrap_err() {
            AppError::Validation(failures) => {
                assert_eq!(failures[0].field, "Body");
                assert_eq!(failures[0].tag, "max");
                assert_eq!(failures[0].param.as_deref(), Some("2048"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn article_view_serializes_camel_case() {
        let view = ArticleView {
            slug: "how-to-train-your-dragon".to_string(),
            title: "How to train your dragon".to_string(),
            description: String::new(),
            body: String::new(),
            tag_list: vec!["dragons".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            favorited: false,
            favorites_count: 0,
            author: ProfileView {
                username: "jake".to_string(),
                bio: String::new(),
                image: None,
                following: false,
            },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("tagList").is_some());
        assert!(json.get("favoritesCount").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("tag_list").is_none());
    }
}

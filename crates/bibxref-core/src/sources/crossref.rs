use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, XrefError};
use crate::sources::{Candidate, MetadataSource};

pub struct CrossRefSource {
    client: reqwest::Client,
    base_url: String,
}

impl CrossRefSource {
    pub fn new(polite_email: Option<String>) -> Self {
        Self::with_base_url("https://api.crossref.org", polite_email)
    }

    pub fn with_base_url(base_url: &str, polite_email: Option<String>) -> Self {
        let user_agent = match &polite_email {
            Some(email) => format!("bibxref/0.1 (mailto:{})", email),
            None => "bibxref/0.1".to_string(),
        };

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl MetadataSource for CrossRefSource {
    fn name(&self) -> &'static str {
        "CrossRef"
    }

    async fn best_match(&self, title: &str, author: &str) -> Result<Option<Candidate>> {
        let url = format!(
            "{}/works?query.title={}&query.author={}&rows=1",
            self.base_url,
            urlencoding::encode(title),
            urlencoding::encode(author)
        );

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(XrefError::ApiError(
                url,
                format!("HTTP {status}: {body}"),
            ));
        }

        let text = resp.text().await?;
        let val: Value =
            serde_json::from_str(&text).map_err(|e| XrefError::Parse(e.to_string()))?;

        let Some(item) = val["message"]["items"]
            .as_array()
            .and_then(|items| items.first())
        else {
            return Ok(None);
        };

        Ok(Some(candidate_from_json(item)))
    }
}

fn candidate_from_json(v: &Value) -> Candidate {
    Candidate {
        title: v["title"][0].as_str().map(|s| s.to_string()),
        container: v["container-title"][0].as_str().map(|s| s.to_string()),
        // CrossRef date parts: "issued": {"date-parts": [[2016, 5, 27]]}
        year: v["issued"]["date-parts"][0][0].as_i64(),
        author_family: v["author"][0]["family"].as_str().map(|s| s.to_string()),
        doi: v["DOI"].as_str().map(|s| s.to_string()),
        abstract_text: v["abstract"].as_str().map(|s| s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn best_match_parses_a_full_candidate() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("GET", "/works")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query.title".into(), "Deep Learning".into()),
                Matcher::UrlEncoded("query.author".into(), "John Smith".into()),
                Matcher::UrlEncoded("rows".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "status": "ok",
                "message": {
                    "items": [
                        {
                            "DOI": "10.1038/nature14539",
                            "title": ["Deep Learning"],
                            "container-title": ["Nature"],
                            "author": [{"given": "John", "family": "Smith"}],
                            "issued": {"date-parts": [[2016, 5, 27]]},
                            "abstract": "We review deep learning."
                        }
                    ]
                }
            }"#,
            )
            .create_async()
            .await;

        let source = CrossRefSource::with_base_url(&server.url(), None);
        let candidate = source
            .best_match("Deep Learning", "John Smith")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(candidate.title.as_deref(), Some("Deep Learning"));
        assert_eq!(candidate.container.as_deref(), Some("Nature"));
        assert_eq!(candidate.year, Some(2016));
        assert_eq!(candidate.author_family.as_deref(), Some("Smith"));
        assert_eq!(candidate.doi.as_deref(), Some("10.1038/nature14539"));
        assert_eq!(candidate.abstract_text.as_deref(), Some("We review deep learning."));
    }

    #[tokio::test]
    async fn absent_fields_come_back_none() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status": "ok", "message": {"items": [{"DOI": "10.1000/x"}]}}"#,
            )
            .create_async()
            .await;

        let source = CrossRefSource::with_base_url(&server.url(), None);
        let candidate = source.best_match("T", "A").await.unwrap().unwrap();

        assert_eq!(candidate.doi.as_deref(), Some("10.1000/x"));
        assert!(candidate.title.is_none());
        assert!(candidate.container.is_none());
        assert!(candidate.year.is_none());
        assert!(candidate.author_family.is_none());
        assert!(candidate.abstract_text.is_none());
    }

    #[tokio::test]
    async fn empty_item_list_is_a_miss() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok", "message": {"items": []}}"#)
            .create_async()
            .await;

        let source = CrossRefSource::with_base_url(&server.url(), None);
        let candidate = source.best_match("T", "A").await.unwrap();
        assert!(candidate.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let mut server = Server::new_async().await;

        let _m = server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let source = CrossRefSource::with_base_url(&server.url(), None);
        let err = source.best_match("T", "A").await.unwrap_err();
        assert!(matches!(err, XrefError::ApiError(_, _)));
    }
}

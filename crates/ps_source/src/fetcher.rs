use ps_core::{Article, Error, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use crate::graphql::{ArticlesData, ArticlesPage, GraphqlRequest, GraphqlResponse, GraphqlTransport, PAGE_SIZE};

/// Pages through the `Articles` query until the reported total is reached.
#[derive(Clone)]
pub struct ArticleFetcher {
    transport: Arc<dyn GraphqlTransport>,
}

impl ArticleFetcher {
    pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self { transport }
    }

    /// Fetches every article, optionally only those changed on or after `since`.
    ///
    /// Pages are requested one at a time. The total reported by the first
    /// page is authoritative for the whole run. Any GraphQL error aborts the
    /// fetch and nothing fetched so far is returned.
    pub async fn fetch_articles(&self, since: Option<&str>) -> Result<Vec<Article>> {
        let mut articles: Vec<Article> = Vec::new();
        let mut total: Option<usize> = None;
        let mut skip = 0;

        loop {
            let page = self.fetch_page(skip, since).await?;
            let expected = *total.get_or_insert(page.total);
            let received = page.items.len();
            articles.extend(page.items);
            debug!("Fetched {} articles at skip {} ({}/{})", received, skip, articles.len(), expected);

            if articles.len() >= expected {
                break;
            }
            if received == 0 {
                return Err(Error::Pagination(format!(
                    "empty page at skip {} with {} of {} articles fetched",
                    skip,
                    articles.len(),
                    expected
                )));
            }
            skip += PAGE_SIZE;
        }

        info!("📥 Fetched {} articles", articles.len());
        Ok(articles)
    }

    async fn fetch_page(&self, skip: usize, since: Option<&str>) -> Result<ArticlesPage> {
        let request = GraphqlRequest::articles(skip, since);
        let document = self.transport.execute(&request).await?;
        // Errors come first: a failed query usually carries `data` with null fields.
        let response: GraphqlResponse<Value> = serde_json::from_value(document)?;

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            return Err(Error::Graphql(errors));
        }

        let data = response
            .data
            .filter(|data| !data.is_null())
            .ok_or_else(|| Error::MalformedResponse("response has neither data nor errors".to_string()))?;
        let data: ArticlesData = serde_json::from_value(data)?;

        data.articles
            .ok_or_else(|| Error::MalformedResponse("response data has no Articles".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct PagedTransport {
        total: usize,
        requests: Mutex<Vec<GraphqlRequest>>,
    }

    impl PagedTransport {
        fn new(total: usize) -> Self {
            Self {
                total,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<GraphqlRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn article_json(i: usize) -> Value {
        json!({
            "_id": format!("id-{}", i),
            "_slug": format!("slug-{}", i),
            "_changed_on": "2024-01-01T00:00:00Z",
            "title": format!("Article {}", i),
            "authors": [],
            "categories": [],
            "content": []
        })
    }

    #[async_trait]
    impl GraphqlTransport for PagedTransport {
        async fn execute(&self, request: &GraphqlRequest) -> Result<Value> {
            self.requests.lock().unwrap().push(request.clone());
            let skip = request.variables.skip;
            let end = (skip + PAGE_SIZE).min(self.total);
            let items: Vec<Value> = (skip..end).map(article_json).collect();
            Ok(json!({"data": {"Articles": {"items": items, "total": self.total}}}))
        }
    }

    struct FixedTransport(Value);

    #[async_trait]
    impl GraphqlTransport for FixedTransport {
        async fn execute(&self, _request: &GraphqlRequest) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_requests_ceil_total_over_page_size() {
        for total in [1, 99, 100, 101, 250, 300] {
            let transport = Arc::new(PagedTransport::new(total));
            let fetcher = ArticleFetcher::new(transport.clone());
            let articles = fetcher.fetch_articles(None).await.unwrap();

            assert_eq!(articles.len(), total);
            assert_eq!(transport.requests().len(), (total + PAGE_SIZE - 1) / PAGE_SIZE);
            assert_eq!(articles[total - 1].id, format!("id-{}", total - 1));
        }
    }

    #[tokio::test]
    async fn test_skip_increases_by_page_size() {
        let transport = Arc::new(PagedTransport::new(250));
        let fetcher = ArticleFetcher::new(transport.clone());
        fetcher.fetch_articles(Some("2024-01-01T00:00:00.000Z")).await.unwrap();

        let requests = transport.requests();
        let skips: Vec<usize> = requests.iter().map(|r| r.variables.skip).collect();
        assert_eq!(skips, vec![0, 100, 200]);
        assert!(requests
            .iter()
            .all(|r| r.variables.filter.changed_on_gte.as_deref() == Some("2024-01-01T00:00:00.000Z")));
    }

    #[tokio::test]
    async fn test_empty_total_issues_one_request() {
        let transport = Arc::new(PagedTransport::new(0));
        let fetcher = ArticleFetcher::new(transport.clone());
        assert!(fetcher.fetch_articles(None).await.unwrap().is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_graphql_errors_abort_fetch() {
        let transport = Arc::new(FixedTransport(json!({
            "errors": [
                {"message": "Cannot query field \"foo\"", "locations": [{"line": 4, "column": 7}], "extensions": {"category": "graphql"}},
                {"message": "Unauthorized", "locations": [{"line": 1, "column": 1}], "extensions": {"category": "authorization"}},
                {"message": "Rate limited", "locations": [{"line": 2, "column": 3}]}
            ]
        })));
        let fetcher = ArticleFetcher::new(transport);
        let error = fetcher.fetch_articles(None).await.unwrap_err();

        match &error {
            Error::Graphql(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {:?}", other),
        }
        let message = error.to_string();
        assert!(message.contains("1. Cannot query field \"foo\" (line 4, column 7)"));
        assert!(message.contains("2. Unauthorized (line 1, column 1)"));
        assert!(message.contains("3. Rate limited (line 2, column 3)"));
        assert!(!message.contains("4. "));
    }

    #[tokio::test]
    async fn test_graphql_errors_with_null_data() {
        let transport = Arc::new(FixedTransport(json!({
            "data": {"Articles": null},
            "errors": [{"message": "Boom", "locations": [{"line": 2, "column": 3}], "extensions": {"category": "internal"}}]
        })));
        let fetcher = ArticleFetcher::new(transport);
        let error = fetcher.fetch_articles(None).await.unwrap_err();

        assert!(matches!(&error, Error::Graphql(errors) if errors.len() == 1));
        assert!(error.to_string().contains("1. Boom (line 2, column 3)"));
    }

    #[tokio::test]
    async fn test_null_articles_without_errors_is_malformed() {
        let fetcher = ArticleFetcher::new(Arc::new(FixedTransport(json!({"data": {"Articles": null}}))));
        let result = fetcher.fetch_articles(None).await;
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_null_block_payloads_do_not_abort_fetch() {
        let transport = Arc::new(FixedTransport(json!({
            "data": {"Articles": {"total": 1, "items": [{
                "_id": "a1",
                "_slug": "a1",
                "_changed_on": "2024-01-01T00:00:00Z",
                "title": "Nulls",
                "authors": null,
                "categories": null,
                "content": [
                    {"__typename": "Text", "_id": "t1", "body": "<p>kept</p>"},
                    {"__typename": "CodeBlock", "_id": "c1", "code": "x", "format": null},
                    {"__typename": "Text", "_id": "t2", "body": null},
                    {"__typename": "Assets", "_id": "as1", "items": null}
                ]
            }]}}
        })));
        let fetcher = ArticleFetcher::new(transport);
        let articles = fetcher.fetch_articles(None).await.unwrap();

        assert_eq!(articles.len(), 1);
        assert!(articles[0].authors.is_empty());
        assert_eq!(articles[0].content.len(), 4);
    }

    #[tokio::test]
    async fn test_short_page_below_total_is_an_error() {
        let transport = Arc::new(FixedTransport(json!({
            "data": {"Articles": {"items": [], "total": 5}}
        })));
        let fetcher = ArticleFetcher::new(transport);
        let result = fetcher.fetch_articles(None).await;
        assert!(matches!(result, Err(Error::Pagination(_))));
    }

    #[tokio::test]
    async fn test_document_without_data_is_malformed() {
        let fetcher = ArticleFetcher::new(Arc::new(FixedTransport(json!({}))));
        let result = fetcher.fetch_articles(None).await;
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }
}

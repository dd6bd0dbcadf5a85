use async_trait::async_trait;
use pagefeed::{FetchError, PageNumber, PageResult, Query};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::PageFetcher;

/// JSON body of one page: `{"items": [...], "has_more": bool?, "total": u64?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct WirePage<T> {
    items: Vec<T>,
    #[serde(default)]
    has_more: Option<bool>,
    #[serde(default, alias = "total_count")]
    total: Option<u64>,
}

impl<T> WirePage<T> {
    /// Servers that omit `has_more` are assumed to have more whenever the page came back full.
    pub(crate) fn into_page(self, page_size: u32) -> PageResult<T> {
        let has_more = self
            .has_more
            .unwrap_or(self.items.len() >= page_size as usize);
        PageResult {
            items: self.items,
            has_more,
            total_count: self.total,
        }
    }
}

pub(crate) fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status(status.as_u16()))
    }
}

/// Fetches pages from a JSON endpoint as `GET {endpoint}?q={query}&page={page}&per_page={size}`.
#[derive(Clone, Debug)]
pub struct HttpPageFetcher {
    client: Client,
    endpoint: String,
}

impl HttpPageFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpPageFetcher
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(
        &self,
        query: &Query,
        page: PageNumber,
        page_size: u32,
    ) -> Result<PageResult<T>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str().to_owned()),
                ("page", page.to_string()),
                ("per_page", page_size.to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        check_status(response.status())?;

        let wire: WirePage<T> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(wire.into_page(page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn wire_page_uses_explicit_has_more() {
        let wire: WirePage<u32> =
            serde_json::from_str(r#"{"items":[1,2],"has_more":true,"total":9}"#).unwrap();
        let page = wire.into_page(50);
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.has_more);
        assert_eq!(page.total_count, Some(9));
    }

    #[test]
    fn wire_page_infers_has_more_from_a_full_page() {
        let full: WirePage<u32> = serde_json::from_str(r#"{"items":[1,2,3]}"#).unwrap();
        assert!(full.into_page(3).has_more);

        let short: WirePage<u32> =
            serde_json::from_str(r#"{"items":[1,2],"total_count":2}"#).unwrap();
        let page = short.into_page(3);
        assert!(!page.has_more);
        assert_eq!(page.total_count, Some(2));
    }

    #[test]
    fn non_success_status_maps_to_status_error() {
        assert_eq!(check_status(StatusCode::OK), Ok(()));
        assert_eq!(
            check_status(StatusCode::NOT_FOUND),
            Err(FetchError::Status(404))
        );
        assert_eq!(
            check_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(FetchError::Status(503))
        );
    }

    #[tokio::test]
    async fn fetches_and_decodes_a_page() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/search", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            let body = r#"{"items":["a","b"],"has_more":false,"total":2}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf[..read]).into_owned()
        });

        let fetcher = HttpPageFetcher::new(endpoint);
        let page: PageResult<String> = fetcher.fetch(&Query::from("red cat"), 3, 2).await.unwrap();
        assert_eq!(page.items, vec!["a".to_owned(), "b".to_owned()]);
        assert!(!page.has_more);
        assert_eq!(page.total_count, Some(2));

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap_or_default();
        assert!(request_line.starts_with("GET /search?"), "{request_line}");
        assert!(request_line.contains("q=red+cat"), "{request_line}");
        assert!(request_line.contains("page=3"), "{request_line}");
        assert!(request_line.contains("per_page=2"), "{request_line}");
    }
}

//! Reqwest-backed user directory adapter.
//!
//! This adapter owns transport details only: URL and query construction,
//! timeout and HTTP error mapping, and JSON decoding into domain users.

use std::time::Duration;

use async_trait::async_trait;
use pagination::Page;
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;

use super::dto::{NewUserDto, UserDto};
use crate::domain::ports::{UserListQuery, UsersRepository, UsersRepositoryError};
use crate::domain::{NewUser, User, UserId};

const USERS_PATH: &str = "users";
const TOTAL_COUNT_HEADER: &str = "x-total-count";
const SEARCH_PARAM: &str = "name_like";
const COMPANY_PARAM: &str = "company.name";

/// User directory adapter speaking the json-server REST dialect.
pub struct UsersHttpRepository {
    client: Client,
    base_url: Url,
}

impl UsersHttpRepository {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, id: Option<UserId>) -> Result<Url, UsersRepositoryError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                UsersRepositoryError::transport(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().push(USERS_PATH);
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }

    fn list_url(&self, query: &UserListQuery) -> Result<Url, UsersRepositoryError> {
        let mut url = self.endpoint(None)?;
        query.request.append_to_url(&mut url);
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(search) = query.search.as_deref() {
                // json-server evaluates `_like` filters as case-insensitive regexes.
                pairs.append_pair(SEARCH_PARAM, &regex::escape(search));
            }
            if let Some(company) = query.company.as_deref() {
                pairs.append_pair(COMPANY_PARAM, company);
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<(HeaderMap, Vec<u8>), UsersRepositoryError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok((headers, body.to_vec()))
    }
}

#[async_trait]
impl UsersRepository for UsersHttpRepository {
    async fn list_page(&self, query: &UserListQuery) -> Result<Page<User>, UsersRepositoryError> {
        let url = self.list_url(query)?;
        debug!(url = %url, "requesting users page");
        let (headers, body) = self.send(self.client.get(url)).await?;
        let total_count = parse_total_count(&headers);
        let users = decode_users(body.as_ref())?;
        Page::new(users, query.request, total_count).map_err(|error| {
            UsersRepositoryError::decode(format!("directory ignored the page size: {error}"))
        })
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, UsersRepositoryError> {
        let url = self.endpoint(Some(id))?;
        let (_, body) = self.send(self.client.get(url)).await?;
        decode_user(body.as_ref())
    }

    async fn create(&self, user: &NewUser) -> Result<User, UsersRepositoryError> {
        let url = self.endpoint(None)?;
        let (_, body) = self
            .send(self.client.post(url).json(&NewUserDto::from(user)))
            .await?;
        decode_user(body.as_ref())
    }

    async fn update(&self, id: UserId, user: &NewUser) -> Result<User, UsersRepositoryError> {
        let url = self.endpoint(Some(id))?;
        let (_, body) = self
            .send(self.client.put(url).json(&NewUserDto::from(user)))
            .await?;
        decode_user(body.as_ref())
    }

    async fn delete(&self, id: UserId) -> Result<(), UsersRepositoryError> {
        let url = self.endpoint(Some(id))?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

/// Total count from `X-Total-Count`; absent or unparsable means unknown.
fn parse_total_count(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(TOTAL_COUNT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn decode_users(body: &[u8]) -> Result<Vec<User>, UsersRepositoryError> {
    let decoded: Vec<UserDto> = serde_json::from_slice(body).map_err(|error| {
        UsersRepositoryError::decode(format!("invalid users JSON payload: {error}"))
    })?;
    decoded
        .into_iter()
        .map(UserDto::into_domain)
        .collect::<Result<_, _>>()
        .map_err(UsersRepositoryError::decode)
}

fn decode_user(body: &[u8]) -> Result<User, UsersRepositoryError> {
    let decoded: UserDto = serde_json::from_slice(body).map_err(|error| {
        UsersRepositoryError::decode(format!("invalid user JSON payload: {error}"))
    })?;
    decoded.into_domain().map_err(UsersRepositoryError::decode)
}

fn map_transport_error(error: reqwest::Error) -> UsersRepositoryError {
    if error.is_timeout() {
        UsersRepositoryError::timeout(error.to_string())
    } else {
        UsersRepositoryError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UsersRepositoryError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    } else {
        body_preview
    };
    UsersRepositoryError::status(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use pagination::PageRequest;
    use reqwest::header::HeaderValue;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> UsersHttpRepository {
        UsersHttpRepository::new(
            Url::parse("http://localhost:3001/api/").expect("url"),
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    fn query(search: Option<&str>, company: Option<&str>) -> UserListQuery {
        UserListQuery {
            search: search.map(str::to_owned),
            company: company.map(str::to_owned),
            ..UserListQuery::new(PageRequest::new(2, 8).expect("request"))
        }
    }

    #[rstest]
    fn list_url_carries_page_and_filters(repository: UsersHttpRepository) {
        let url = repository
            .list_url(&query(Some("o'neil (jr)"), Some("Acme & Co")))
            .expect("url");
        assert_eq!(url.path(), "/api/users");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("_page".to_owned(), "2".to_owned()),
                ("_limit".to_owned(), "8".to_owned()),
                ("name_like".to_owned(), r"o'neil \(jr\)".to_owned()),
                ("company.name".to_owned(), "Acme & Co".to_owned()),
            ]
        );
    }

    #[rstest]
    fn unfiltered_list_url_has_only_paging(repository: UsersHttpRepository) {
        let url = repository.list_url(&query(None, None)).expect("url");
        assert_eq!(url.query(), Some("_page=2&_limit=8"));
    }

    #[rstest]
    fn item_endpoint_appends_id(repository: UsersHttpRepository) {
        let url = repository.endpoint(Some(UserId::new(7))).expect("url");
        assert_eq!(url.as_str(), "http://localhost:3001/api/users/7");
    }

    #[rstest]
    #[case::present(Some("10"), Some(10))]
    #[case::padded(Some(" 42 "), Some(42))]
    #[case::garbage(Some("many"), None)]
    #[case::absent(None, None)]
    fn total_count_header_is_optional(#[case] raw: Option<&str>, #[case] expected: Option<u64>) {
        let mut headers = HeaderMap::new();
        if let Some(raw) = raw {
            headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from_str(raw).expect("header"));
        }
        assert_eq!(parse_total_count(&headers), expected);
    }

    #[rstest]
    #[case::not_found(StatusCode::NOT_FOUND, b"".as_slice(), 404, "Not Found")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, b"{ \"error\":\n \"boom\" }".as_slice(), 500, "{ \"error\": \"boom\" }")]
    fn maps_statuses_with_preview(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] code: u16,
        #[case] message: &str,
    ) {
        assert_eq!(
            map_status_error(status, body),
            UsersRepositoryError::status(code, message)
        );
    }

    #[rstest]
    fn decodes_numeric_and_string_ids() {
        let body = r#"[
            {
                "id": 1,
                "name": "Leanne Graham",
                "username": "Bret",
                "email": "Sincere@april.biz",
                "phone": "1-770-736-8031 x56442",
                "website": "hildegard.org",
                "address": {
                    "street": "Kulas Light",
                    "suite": "Apt. 556",
                    "city": "Gwenborough",
                    "zipcode": "92998-3874",
                    "geo": { "lat": "-37.3159", "lng": "81.1496" }
                },
                "company": {
                    "name": "Romaguera-Crona",
                    "catchPhrase": "Multi-layered client-server neural-net",
                    "bs": "harness real-time e-markets"
                }
            },
            { "id": "2", "name": "Ervin Howell", "email": "Shanna@melissa.tv" }
        ]"#;
        let users = decode_users(body.as_bytes()).expect("decodes");
        assert_eq!(users.len(), 2);
        let first = users.first().expect("first user");
        assert_eq!(first.company.catch_phrase, "Multi-layered client-server neural-net");
        assert_eq!(first.address.geo.lat, "-37.3159");
        assert_eq!(users.get(1).map(|user| user.id), Some(UserId::new(2)));
    }

    #[rstest]
    #[case::not_json(b"<html>".as_slice())]
    #[case::bad_id(br#"{ "id": "abc", "name": "X", "email": "x@y.z" }"#.as_slice())]
    fn rejects_undecodable_users(#[case] body: &[u8]) {
        let error = decode_user(body).expect_err("decode should fail");
        assert!(matches!(error, UsersRepositoryError::Decode { .. }));
    }

    #[rstest]
    fn request_body_uses_camel_case() {
        let user = crate::domain::UserForm {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "555".to_owned(),
            company: "Engines".to_owned(),
        }
        .to_new_user(None);
        let json = serde_json::to_value(NewUserDto::from(&user)).expect("serialise");
        assert_eq!(json["company"]["catchPhrase"], "Innovation at its finest");
        assert!(json.get("id").is_none());
    }
}

//! Query-string state held in a `url::Url`.
//!
//! Mirrors the browser address bar: the table state is whatever the URL's
//! query says, and every update rewrites the query in one step.

use std::sync::{Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::domain::ports::{QueryState, QueryStateError, QueryUpdate};

/// [`QueryState`] adapter over an owned URL.
#[derive(Debug)]
pub struct UrlQueryState {
    url: Mutex<Url>,
}

impl UrlQueryState {
    pub fn new(url: Url) -> Self {
        Self {
            url: Mutex::new(url),
        }
    }

    /// Copy of the current URL, suitable for sharing.
    pub fn current(&self) -> Url {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Url> {
        self.url.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueryState for UrlQueryState {
    fn get(&self, name: &str) -> Option<String> {
        self.lock()
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn apply(&self, updates: &[QueryUpdate]) -> Result<(), QueryStateError> {
        let mut url = self.lock();
        if url.cannot_be_a_base() {
            return Err(QueryStateError::unavailable(format!(
                "URL '{url}' cannot carry a query"
            )));
        }

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        for update in updates {
            pairs.retain(|(key, _)| key != update.name());
            if let QueryUpdate::Set { name, value } = update {
                pairs.push((name.clone(), value.clone()));
            }
        }

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn state(raw: &str) -> UrlQueryState {
        UrlQueryState::new(Url::parse(raw).expect("url"))
    }

    #[rstest]
    fn reads_decoded_values() {
        let query = state("http://localhost/?company=Acme%20%26%20Co&search=o%27neil");
        assert_eq!(query.get("company").as_deref(), Some("Acme & Co"));
        assert_eq!(query.get("search").as_deref(), Some("o'neil"));
        assert_eq!(query.get("page"), None);
    }

    #[rstest]
    fn applies_batches_and_keeps_unrelated_params() {
        let query = state("http://localhost/users?tab=table&page=3&search=old");
        query
            .apply(&[
                QueryUpdate::remove("page"),
                QueryUpdate::set("search", "new"),
                QueryUpdate::set("sort", "desc"),
            ])
            .expect("apply");
        assert_eq!(
            query.current().as_str(),
            "http://localhost/users?tab=table&search=new&sort=desc"
        );
    }

    #[rstest]
    fn removing_everything_clears_the_query() {
        let query = state("http://localhost/?page=2");
        query.apply(&[QueryUpdate::remove("page")]).expect("apply");
        assert_eq!(query.current().query(), None);
    }

    #[rstest]
    fn opaque_urls_are_rejected() {
        let query = state("mailto:someone@example.com");
        let err = query
            .apply(&[QueryUpdate::set("page", "2")])
            .expect_err("cannot set query");
        assert!(matches!(err, QueryStateError::Unavailable { .. }));
    }
}

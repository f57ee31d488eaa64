//! Marketplace client: transport boundary and typed API.
//!
//! ## Contents
//! - [`Transport`], [`Response`] — the HTTP seam modules talk through
//! - [`HttpTransport`] — reqwest-backed production transport
//! - [`MarketApi`], [`RaiseResponse`] — typed endpoint accessors plus the
//!   chat send gate

mod api;
pub(crate) mod transport;

pub use api::{MarketApi, RaiseResponse};
pub use transport::{HttpTransport, Response, Transport};

#[cfg(test)]
pub(crate) mod testing {
    //! Canned transport for module and API tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::client::transport::{Response, Transport};
    use crate::error::ModuleError;

    /// Serves queued bodies per path; records every POST it receives.
    ///
    /// Queued GET bodies are consumed in order, with the last one repeating,
    /// so a test can script "first observation, then changed page".
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        gets: Mutex<HashMap<String, VecDeque<Response>>>,
        post_bodies: Mutex<HashMap<String, String>>,
        posts: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn on_get(&self, path: &str, body: &str) {
            self.on_get_response(
                path,
                Response {
                    status: 200,
                    body: body.to_string(),
                    set_cookies: Vec::new(),
                },
            );
        }

        pub fn on_get_response(&self, path: &str, response: Response) {
            self.gets
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .push_back(response);
        }

        pub fn on_post(&self, path: &str, body: &str) {
            self.post_bodies
                .lock()
                .unwrap()
                .insert(path.to_string(), body.to_string());
        }

        /// Every POST so far: `(path, form pairs)`.
        pub fn posts(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(
            &self,
            path: &str,
            _headers: &[(&str, &str)],
            _cookies: &[(&str, &str)],
        ) -> Result<Response, ModuleError> {
            let mut gets = self.gets.lock().unwrap();
            let queue = gets.get_mut(path).ok_or_else(|| ModuleError::Response {
                status: 404,
                message: format!("no canned response for GET {path}"),
            })?;
            if queue.len() > 1 {
                Ok(queue.pop_front().expect("non-empty queue"))
            } else {
                queue
                    .front()
                    .cloned()
                    .ok_or_else(|| ModuleError::Response {
                        status: 404,
                        message: format!("canned responses for GET {path} exhausted"),
                    })
            }
        }

        async fn post_form(
            &self,
            path: &str,
            _headers: &[(&str, &str)],
            _cookies: &[(&str, &str)],
            form: &[(&str, &str)],
        ) -> Result<Response, ModuleError> {
            self.posts.lock().unwrap().push((
                path.to_string(),
                form.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            let body = self
                .post_bodies
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .unwrap_or_else(|| "{}".to_string());
            Ok(Response {
                status: 200,
                body,
                set_cookies: Vec::new(),
            })
        }
    }
}

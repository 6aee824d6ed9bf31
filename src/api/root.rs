#![forbid(unsafe_code)]

use poem_openapi::{ OpenApi, payload::Json, Object };

use crate::utils::config::Config;
use crate::utils::numclass_utils::{timestamp_utc, timestamp_utc_secs_to_str};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct RootApi {
    email: String,
    github_url: String,
}

impl RootApi {
    pub fn new(config: &Config) -> Self {
        Self {email: config.email.clone(), github_url: config.github_url.clone()}
    }
}

#[derive(Object, Debug)]
struct RespRoot
{
    email: String,
    current_datetime: String,
    github_url: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl RootApi {
    /// Service identity and the current UTC time.
    #[oai(path = "/", method = "get")]
    async fn get_root(&self) -> Json<RespRoot> {
        Json(RespRoot::new(&self.email, &self.github_url))
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespRoot {
    fn new(email: &str, github_url: &str) -> Self {
        Self {email: email.to_string(),
              current_datetime: timestamp_utc_secs_to_str(timestamp_utc()),
              github_url: github_url.to_string(),
        }
    }
}

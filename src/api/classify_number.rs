#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, param::Query, ApiResponse };
use anyhow::Result;
use log::{error, info};

use crate::utils::classifier::{self, Classification};
use crate::utils::errors::{Errors, HttpResult};
use crate::utils::fun_facts::FunFactClient;
use crate::utils::numclass_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct ClassifyNumberApi {
    fun_facts: FunFactClient,
}

impl ClassifyNumberApi {
    pub fn new(fun_facts: FunFactClient) -> Self {
        Self {fun_facts}
    }
}

// The raw query parameter, kept as a string so invalid input can be echoed.
struct ReqClassifyNumber
{
    number: Option<String>,
}

#[derive(Object, Debug)]
pub struct RespClassifyNumber
{
    number: i64,
    is_prime: bool,
    is_perfect: bool,
    properties: Vec<String>,
    digit_sum: u32,
    fun_fact: String,
}

// A None number serializes as null.
#[derive(Object, Debug)]
pub struct RespBadNumber
{
    number: Option<String>,
    error: bool,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqClassifyNumber {
    type Req = ReqClassifyNumber;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request parameters:");
        s.push_str("\n    number: ");
        match &self.number {
            Some(n) => s.push_str(&format!("{:?}", n)),
            None => s.push_str("None"),
        }
        s.push('\n');
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum NumclassResponse {
    #[oai(status = 200)]
    Http200(Json<RespClassifyNumber>),
    #[oai(status = 400)]
    Http400(Json<RespBadNumber>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: RespClassifyNumber) -> NumclassResponse {
    NumclassResponse::Http200(Json(resp))
}
fn make_http_400(number: Option<String>) -> NumclassResponse {
    NumclassResponse::Http400(Json(RespBadNumber {number, error: true}))
}
fn make_http_500(msg: String) -> NumclassResponse {
    NumclassResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ClassifyNumberApi {
    /// Classify an integer's mathematical properties and attach a fun fact.
    #[oai(path = "/api/classify-number", method = "get")]
    async fn classify_number_api(&self, http_req: &Request, number: Query<Option<String>>) -> NumclassResponse {
        // Package the request parameters.
        let req = ReqClassifyNumber {number: number.0};

        // -------------------- Process Request ----------------------
        match RespClassifyNumber::process(http_req, &req, &self.fun_facts).await {
            Ok(r) => r,
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespClassifyNumber {
    /// Create a new response.
    fn new(classification: Classification, fun_fact: String) -> Self {
        Self {
            number: classification.number,
            is_prime: classification.is_prime,
            is_perfect: classification.is_perfect,
            properties: classification.properties.iter().map(|p| p.to_string()).collect(),
            digit_sum: classification.digit_sum,
            fun_fact,
        }
    }

    /// Process the request.
    async fn process(http_req: &Request, req: &ReqClassifyNumber, fun_facts: &FunFactClient)
    -> Result<NumclassResponse> {
        // Conditional logging depending on log level.
        numclass_utils::debug_request(http_req, req);

        // Validation failures are reported to the caller, never propagated.
        let n = match classifier::parse_number(req.number.as_deref()) {
            Ok(n) => n,
            Err(e) => {
                info!("Rejected classify-number request: {}", e);
                let echo = match e {
                    Errors::NumberInvalid(raw) => Some(raw),
                    _ => None,
                };
                return Ok(make_http_400(echo));
            }
        };

        // Trial division on large numbers is cpu bound, so it runs on the
        // blocking pool while the fact lookup is in flight.
        let (classification, fun_fact) = tokio::join!(
            tokio::task::spawn_blocking(move || classifier::classify(n)),
            fun_facts.fun_fact(n),
        );

        Ok(make_http_200(Self::new(classification?, fun_fact)))
    }
}

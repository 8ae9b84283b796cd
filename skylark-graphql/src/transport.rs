//! The contract between built documents and whatever executes them.
//!
//! A [`Request`] pairs a [`Document`] with its variables and headers. A [`Transport`] sends it
//! and hands back the raw [`Response`], and a [`Client`] ties the two together: it validates the
//! request against the document's variables contract, logs it, and decodes field aliases out of
//! the response data before returning it.
//!
//! This crate ships no network transport. The [`mock`] transport records requests and replies with
//! canned responses, which is enough to test code built on top of the builders.

use crate::{alias::decode_response, document::Document};
use async_trait::async_trait;
use derive_more::Display;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use snafu::{ResultExt, Snafu};
use std::collections::BTreeMap;

pub mod mock;

/// The error type reported for objects which do not exist.
pub const NOT_FOUND: &str = "NotFound";

/// Disables availability filtering when `true`.
pub const IGNORE_AVAILABILITY_HEADER: &str = "x-ignore-availability";

/// Views objects as they will be at the given time.
pub const TIME_TRAVEL_HEADER: &str = "x-time-travel";

/// Followed by a dimension slug, selects one value of that dimension.
pub const DIMENSION_HEADER_PREFIX: &str = "x-sl-dimension-";

/// Errors encountered executing a document.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("GraphQL errors: {}", errors.iter().join("; ")))]
    GraphQl { errors: Vec<GraphQlError> },

    #[snafu(display("missing required variables: {}", names.join(", ")))]
    MissingVariables { names: Vec<String> },

    #[snafu(display("error decoding response: {source}"))]
    Decode { source: serde_json::Error },

    #[snafu(display("network error: {message}"))]
    Network { message: String },

    #[snafu(display("response has no data"))]
    NoData,
}

impl Error {
    /// A failure of the underlying connection.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Did the API report that the requested object does not exist?
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::GraphQl { errors } => errors.iter().any(|error| error.error_type == NOT_FOUND),
            _ => false,
        }
    }
}

/// One entry of the `errors` array of a response.
#[derive(Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[display(fmt = "{}: {}", error_type, message)]
pub struct GraphQlError {
    #[serde(rename = "errorType", default)]
    pub error_type: String,
    pub message: String,
}

impl GraphQlError {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }
}

/// The availability a request is scoped to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityHeaders {
    /// An ISO 8601 timestamp at which to view objects, instead of now.
    #[serde(default)]
    pub time_travel: Option<String>,
    /// One value slug for each selected dimension, keyed by dimension slug.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
}

/// A document ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    document: Document,
    variables: Map<String, Value>,
    headers: BTreeMap<String, String>,
}

impl Request {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            variables: Map::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Set the value of one variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set the values of many variables.
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Scope the request to an availability.
    ///
    /// This turns availability filtering on, both with the header and, if the document declares
    /// it, with the `ignoreAvailability` variable, which otherwise defaults to `true`.
    pub fn availability(mut self, availability: &AvailabilityHeaders) -> Self {
        self = self.header(IGNORE_AVAILABILITY_HEADER, "false");
        if let Some(time) = &availability.time_travel {
            self = self.header(TIME_TRAVEL_HEADER, time);
        }
        for (dimension, value) in &availability.dimensions {
            self = self.header(format!("{DIMENSION_HEADER_PREFIX}{dimension}"), value);
        }
        if self
            .document
            .variable_names()
            .any(|name| name == "ignoreAvailability")
        {
            self = self.variable("ignoreAvailability", false);
        }
        self
    }

    /// Check that every variable the document requires has a value.
    pub fn validate(&self) -> Result<(), Error> {
        let names = self
            .document
            .required_variables()
            .filter(|name| self.variables.get(*name).map_or(true, Value::is_null))
            .map(str::to_string)
            .collect::<Vec<_>>();
        if names.is_empty() {
            Ok(())
        } else {
            MissingVariablesSnafu { names }.fail()
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// The JSON body of a GraphQL-over-HTTP POST.
    pub fn body(&self) -> Value {
        json!({
            "query": self.document.to_string(),
            "operationName": self.document.name(),
            "variables": self.variables,
        })
    }
}

/// The body of a GraphQL response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
}

impl Response {
    /// A successful response.
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: vec![],
        }
    }

    /// A response with errors and no data.
    pub fn err(errors: impl IntoIterator<Item = GraphQlError>) -> Self {
        Self {
            data: None,
            errors: errors.into_iter().collect(),
        }
    }

    /// Parse a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).context(DecodeSnafu)
    }

    /// The data of a successful response, with field aliases decoded.
    ///
    /// Any error in the response fails the whole request, even if some data came back with it.
    pub fn into_data(self) -> Result<Value, Error> {
        if !self.errors.is_empty() {
            return GraphQlSnafu {
                errors: self.errors,
            }
            .fail();
        }
        match self.data {
            Some(data) if !data.is_null() => Ok(decode_response(data)),
            _ => NoDataSnafu.fail(),
        }
    }
}

/// Executes requests.
///
/// Implementations own the connection and any retry or cancellation policy.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, Error>;
}

/// Runs built documents over a [`Transport`].
#[derive(Clone, Debug)]
pub struct Client<T> {
    transport: T,
    headers: BTreeMap<String, String>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            headers: BTreeMap::new(),
        }
    }

    /// A header to send with every request, unless the request sets it itself.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the output of a builder.
    ///
    /// Builders return no document when there is nothing to do, in which case nothing is sent and
    /// the result is `Ok(None)`.
    pub async fn run(
        &self,
        document: impl Into<Option<Document>>,
        variables: Map<String, Value>,
    ) -> Result<Option<Value>, Error> {
        let Some(document) = document.into() else {
            tracing::debug!("no document, skipping request");
            return Ok(None);
        };
        self.send(Request::new(document).with_variables(variables))
            .await
            .map(Some)
    }

    /// Validate and send a request, returning its decoded data.
    pub async fn send(&self, mut request: Request) -> Result<Value, Error> {
        for (name, value) in &self.headers {
            request
                .headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        request.validate()?;

        tracing::info!(
            operation = request.document().name(),
            variables = request.variables().len(),
            "sending {}",
            request.document().kind()
        );
        let response = self.transport.execute(request).await?;
        response.into_data()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::meta::fixtures::*;
    use crate::mutation::{update_schema_config_mutation, ObjectTypeConfig};
    use crate::init_logging;
    use crate::query::get_object_query;
    use mock::MockTransport;

    fn variables(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validate() {
        let doc = crate::mutation::delete_object_mutation(&episode()).unwrap();
        let request = Request::new(doc);
        match request.validate() {
            Err(Error::MissingVariables { names }) => assert_eq!(names, ["uid"]),
            res => panic!("expected missing variables, got {res:?}"),
        }
        assert!(matches!(
            request.clone().variable("uid", Value::Null).validate(),
            Err(Error::MissingVariables { .. })
        ));
        request.variable("uid", "ep_1").validate().unwrap();
    }

    #[test]
    fn test_availability_headers() {
        let doc = get_object_query(&episode()).unwrap();
        let availability = AvailabilityHeaders {
            time_travel: Some("2026-01-01T00:00:00Z".into()),
            dimensions: [
                ("device-types".to_string(), "tv".to_string()),
                ("regions".to_string(), "europe".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        let request = Request::new(doc).availability(&availability);
        assert_eq!(
            request.headers().iter().collect::<Vec<_>>(),
            [
                (&"x-ignore-availability".to_string(), &"false".to_string()),
                (&"x-sl-dimension-device-types".to_string(), &"tv".to_string()),
                (&"x-sl-dimension-regions".to_string(), &"europe".to_string()),
                (
                    &"x-time-travel".to_string(),
                    &"2026-01-01T00:00:00Z".to_string()
                ),
            ]
        );
        assert_eq!(
            request.variables().get("ignoreAvailability"),
            Some(&Value::Bool(false))
        );

        // Documents without the variable only get the headers.
        let doc = crate::mutation::delete_object_mutation(&episode()).unwrap();
        let request = Request::new(doc).availability(&AvailabilityHeaders::default());
        assert_eq!(request.headers().len(), 1);
        assert!(request.variables().is_empty());
    }

    #[test]
    fn test_body() {
        let doc = get_object_query(&episode()).unwrap();
        let body = Request::new(doc.clone()).variable("uid", "ep_1").body();
        assert_eq!(body["query"], Value::String(doc.to_string()));
        assert_eq!(body["operationName"], "SL_UI_GET_EPISODE");
        assert_eq!(body["variables"], json!({"uid": "ep_1"}));
    }

    #[test]
    fn test_response() {
        let response = Response::from_slice(
            br#"{"data": null, "errors": [{"errorType": "NotFound", "message": "no Episode ep_9"}]}"#,
        )
        .unwrap();
        let err = response.into_data().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "GraphQL errors: NotFound: no Episode ep_9");

        let err = Response::err([GraphQlError::new("Forbidden", "no")])
            .into_data()
            .unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(
            Response::from_slice(br#"{"data": {}}"#).unwrap(),
            Response { data: Some(_), .. }
        ));
        assert!(matches!(
            Response::from_slice(b"<html>"),
            Err(Error::Decode { .. })
        ));
        assert!(matches!(
            Response::default().into_data(),
            Err(Error::NoData)
        ));
    }

    #[async_std::test]
    async fn test_run_decodes_aliases() {
        init_logging();
        let transport = MockTransport::new();
        transport
            .reply(Response::ok(json!({
                "getObject": {
                    "__typename": "Episode",
                    "__Episode__title": "Pilot",
                }
            })))
            .await;
        let client = Client::new(transport.clone()).header("authorization", "Bearer token");

        let data = client
            .run(
                get_object_query(&episode()),
                variables(json!({"uid": "ep_1"})),
            )
            .await
            .unwrap();
        assert_eq!(
            data,
            Some(json!({"getObject": {"__typename": "Episode", "title": "Pilot"}}))
        );

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].document().name(), "SL_UI_GET_EPISODE");
        assert_eq!(
            requests[0].headers().get("authorization").map(String::as_str),
            Some("Bearer token")
        );
    }

    #[async_std::test]
    async fn test_no_request_for_empty_dirty_set() {
        let transport = MockTransport::new();
        let client = Client::new(transport.clone());
        let all = all();

        let doc = update_schema_config_mutation(
            &all,
            &BTreeMap::<String, ObjectTypeConfig>::new(),
            &BTreeMap::new(),
        );
        assert_eq!(client.run(doc, Map::new()).await.unwrap(), None);
        assert!(transport.requests().await.is_empty());
    }

    #[async_std::test]
    async fn test_missing_variables_not_sent() {
        let transport = MockTransport::new();
        let client = Client::new(transport.clone());
        let err = client
            .run(crate::mutation::delete_object_mutation(&episode()), Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingVariables { .. }));
        assert!(transport.requests().await.is_empty());
    }

    #[async_std::test]
    async fn test_not_found() {
        let transport = MockTransport::new();
        transport
            .reply(Response::err([GraphQlError::new(NOT_FOUND, "gone")]))
            .await;
        let client = Client::new(transport);
        let err = client
            .send(Request::new(get_object_query(&episode()).unwrap()).variable("uid", "ep_1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

//! LinkedIn tool declarations and their handlers

use crate::error::ServerError;
use crate::server::{McpServer, ToolHandler};
use futures::FutureExt;
use linkedin_client::{
    GetProfileParams, LinkedInClient, SearchJobsParams, SearchPeopleParams, SendMessageParams,
};
use rmcp::model::{JsonObject, Tool};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

pub const SEARCH_PEOPLE: &str = "search-people";
pub const GET_PROFILE: &str = "get-profile";
pub const SEARCH_JOBS: &str = "search-jobs";
pub const SEND_MESSAGE: &str = "send-message";
pub const GET_MY_PROFILE: &str = "get-my-profile";
pub const GET_NETWORK_STATS: &str = "get-network-stats";
pub const GET_REQUEST_STATS: &str = "get-request-stats";

/// Tools that take no arguments; unknown fields are ignored
#[derive(Debug, Default, Deserialize)]
struct NoParams {}

/// Register every LinkedIn tool on `server`
pub async fn register_linkedin_tools(server: &McpServer, client: Arc<LinkedInClient>) {
    server
        .add_tool(
            tool(
                SEARCH_PEOPLE,
                "Search for LinkedIn profiles based on various criteria",
                json!({
                    "keywords": string_prop("Keywords to search for in profiles"),
                    "currentCompany": string_list_prop("Filter by current company"),
                    "industries": string_list_prop("Filter by industries"),
                    "location": string_prop("Filter by location"),
                }),
                &[],
            ),
            handler(client.clone(), |client, params: SearchPeopleParams| async move {
                client.search_people(&params).await
            }),
        )
        .await;

    server
        .add_tool(
            tool(
                GET_PROFILE,
                "Retrieve detailed LinkedIn profile information. Provide publicId or urnId.",
                json!({
                    "publicId": string_prop("Public ID of the LinkedIn profile"),
                    "urnId": string_prop("URN ID of the LinkedIn profile"),
                }),
                &[],
            ),
            handler(client.clone(), |client, params: GetProfileParams| async move {
                client.get_profile(&params).await
            }),
        )
        .await;

    server
        .add_tool(
            tool(
                SEARCH_JOBS,
                "Search for LinkedIn job postings based on various criteria",
                json!({
                    "keywords": string_prop("Keywords to search for in job postings"),
                    "companies": string_list_prop("Filter by companies"),
                    "location": string_prop("Filter by location"),
                    "jobType": string_list_prop("Filter by job type (e.g., full-time, contract)"),
                }),
                &[],
            ),
            handler(client.clone(), |client, params: SearchJobsParams| async move {
                client.search_jobs(&params).await
            }),
        )
        .await;

    server
        .add_tool(
            tool(
                SEND_MESSAGE,
                "Send a message to a LinkedIn connection",
                json!({
                    "recipientUrn": string_prop("URN of the message recipient"),
                    "messageBody": string_prop("Content of the message to send"),
                }),
                &["recipientUrn", "messageBody"],
            ),
            handler(client.clone(), |client, params: SendMessageParams| async move {
                client.send_message(&params).await
            }),
        )
        .await;

    server
        .add_tool(
            tool(
                GET_MY_PROFILE,
                "Retrieve the current user's LinkedIn profile information",
                json!({}),
                &[],
            ),
            handler(client.clone(), |client, _: NoParams| async move {
                client.get_my_profile().await
            }),
        )
        .await;

    server
        .add_tool(
            tool(
                GET_NETWORK_STATS,
                "Retrieve network statistics for the current user",
                json!({}),
                &[],
            ),
            handler(client.clone(), |client, _: NoParams| async move {
                client.get_network_stats().await
            }),
        )
        .await;

    server
        .add_tool(
            tool(
                GET_REQUEST_STATS,
                "Report request counters and credential status of this server",
                json!({}),
                &[],
            ),
            handler(client, |client, _: NoParams| async move {
                Ok::<_, linkedin_client::ClientError>(json!({
                    "requests": client.metrics(),
                    "credentials": client.credentials().status(),
                }))
            }),
        )
        .await;

    info!("Registered LinkedIn tools");
}

/// Wrap a typed client operation as a tool handler.
///
/// Arguments are decoded into `P` before `op` runs; a decoding failure is
/// reported as invalid arguments without touching the network.
fn handler<P, F, Fut>(client: Arc<LinkedInClient>, op: F) -> ToolHandler
where
    P: DeserializeOwned + Send + 'static,
    F: Fn(Arc<LinkedInClient>, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = linkedin_client::Result<Value>> + Send + 'static,
{
    Arc::new(move |arguments: JsonObject| {
        let call = serde_json::from_value::<P>(Value::Object(arguments))
            .map(|params| op(Arc::clone(&client), params));

        async move {
            let call = call.map_err(|e| ServerError::InvalidArguments(e.to_string()))?;
            let value = call.await?;
            McpServer::json_result(&value)
        }
        .boxed()
    })
}

fn tool(
    name: &'static str,
    description: &'static str,
    properties: Value,
    required: &[&str],
) -> Tool {
    let mut schema = JsonObject::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), properties);
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    Tool::new(name, description, Arc::new(schema))
}

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn string_list_prop(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "description": description,
    })
}

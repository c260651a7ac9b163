//! CLI runner - executes commands

use crate::auth::{signer_from_config, Signer};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::executor::{ExecuteOptions, MutationIntent, RequestExecutor};
use crate::http::{HttpTransport, Transport};
use crate::pagination::{ListFetcher, ListLimit, ListQuery};
use crate::params::{ParamValue, RequestSpec};
use crate::session::{SessionState, WikiSession};
use crate::state::ResumeStore;
use crate::types::{AssertMode, JsonValue, Method};
use futures::TryStreamExt;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Everything a command needs to talk to the wiki
struct Connection {
    config: SessionConfig,
    session: Arc<WikiSession>,
    executor: Arc<RequestExecutor>,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Query {
                params,
                post,
                assert,
                token,
                allow_errors,
            } => {
                self.query(params, *post, *assert, token.as_deref(), *allow_errors)
                    .await
            }
            Commands::List {
                code,
                params,
                limit,
                head_title,
                state,
                key,
            } => {
                let mut query = ListQuery::new(code.clone(), build_spec(params))
                    .with_limit(ListLimit::from_option(*limit)?);
                if let Some(head_title) = head_title {
                    query = query.with_head_title(head_title.clone());
                }
                let store = match state {
                    Some(path) => ResumeStore::from_file(path)?,
                    None => ResumeStore::in_memory(),
                };
                let key = key.clone().unwrap_or_else(|| code.clone());
                self.list(&query, &store, &key).await
            }
        }
    }

    /// Load session configuration
    fn load_config(&self) -> Result<SessionConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;
        SessionConfig::from_file(path)
    }

    /// Build transport, session and executor, logging in when possible
    async fn connect(&self) -> Result<Connection> {
        let config = self.load_config()?;
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::with_config(config.transport_config())?);
        let signer: Option<Arc<dyn Signer>> = signer_from_config(&config.auth);

        let session = Arc::new(
            WikiSession::new(config.api_url.clone(), Arc::clone(&transport))
                .with_credentials(config.login_credentials())
                .with_signer(signer.clone()),
        );
        if session.can_login() {
            session.login().await?;
        }

        let executor = RequestExecutor::new(config.api_url.clone(), transport)
            .with_session(session.clone())
            .with_signer(signer)
            .with_config(config.executor_config());

        Ok(Connection {
            config,
            session,
            executor: Arc::new(executor),
        })
    }

    /// Show the current user
    async fn check(&self) -> Result<()> {
        let conn = self.connect().await?;
        let envelope = conn
            .executor
            .get(
                RequestSpec::new()
                    .with("action", "query")
                    .with("meta", "userinfo"),
            )
            .await?;

        let userinfo = envelope
            .get("query")
            .and_then(|q| q.get("userinfo"))
            .cloned()
            .unwrap_or(JsonValue::Null);
        info!(
            logged_in = conn.session.is_logged_in().await,
            "connection check passed"
        );
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "status": "SUCCEEDED",
            "api_url": conn.config.api_url,
            "userinfo": userinfo,
        }));
        Ok(())
    }

    /// Run one request
    async fn query(
        &self,
        params: &[(String, String)],
        post: bool,
        assert: Option<AssertMode>,
        token: Option<&str>,
        allow_errors: bool,
    ) -> Result<()> {
        let conn = self.connect().await?;
        let spec = build_spec(params);

        let mut options = if post {
            ExecuteOptions::post()
        } else {
            ExecuteOptions::get()
        };
        if let Some(kind) = token {
            options = options.with_token(kind);
        }
        if let Some(intent) = mutation_intent(&spec, options.method) {
            options = options.with_mutation(intent);
        }
        let mutating = options.is_mutating();
        options = options.with_assert(assert.unwrap_or_else(|| conn.config.assert_for(mutating)));
        if allow_errors {
            options = options.allow_errors();
        }

        let envelope = conn.executor.execute(spec, &options).await?;
        self.output_message(&envelope.into_value());
        Ok(())
    }

    /// Page through a list, printing items as they arrive
    async fn list(&self, query: &ListQuery, store: &ResumeStore, key: &str) -> Result<()> {
        let conn = self.connect().await?;
        let fetcher = ListFetcher::new(conn.executor);

        let resume = store.get(key).await;
        if !resume.is_empty() {
            info!(key, "resuming saved query");
        }

        let mut pages = fetcher.pages(query, &resume)?;
        let mut total = 0usize;
        while let Some(page) = pages.try_next().await? {
            total += page.items.len();
            for item in &page.items {
                self.output_message(item);
            }
            store.set(key, page.resume).await?;
        }

        let finished = store.get(key).await.is_empty();
        info!(key, total, finished, "list complete");
        Ok(())
    }

    /// Print a JSON value in the selected format
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Group `key=value` pairs into a request; repeated keys become lists
fn build_spec(params: &[(String, String)]) -> RequestSpec {
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (key, value) in params {
        grouped.entry(key.as_str()).or_default().push(value.clone());
    }

    let mut spec = RequestSpec::new();
    for (key, mut values) in grouped {
        let value = if values.len() == 1 {
            ParamValue::Scalar(values.remove(0))
        } else {
            ParamValue::List(values)
        };
        spec.set(key, value);
    }
    spec
}

/// A POST carrying both `title` and `summary` is treated as an edit to that page
fn mutation_intent(spec: &RequestSpec, method: Method) -> Option<MutationIntent> {
    if method != Method::POST {
        return None;
    }
    Some(MutationIntent::new(
        spec.get_str("title")?,
        spec.get_str("summary")?,
    ))
}

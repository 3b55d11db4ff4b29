//! The auth gate: one session, and at most one successful login, per context.

use std::sync::Arc;

use futures::future::FutureExt;

use crate::auth::{RestContext, SessionState};
use crate::clients::{ApiRequest, AuthError, HttpClient, HttpMethod, RestError};
use crate::RestClient;

impl RestClient {
    /// Ensures `ctx` has a session, logging in first if it has credentials.
    ///
    /// - If the context already has a session, returns it without any
    ///   network call.
    /// - Otherwise creates a fresh session; for contexts with credentials,
    ///   POSTs `{username, password}` to the configured login path using that
    ///   session. Anonymous contexts skip the login but still keep the
    ///   session, so cookies set during anonymous use persist.
    ///
    /// Concurrent first calls on one context share a single login, and all
    /// of them observe its outcome. A failed login is reported to observers
    /// once, as [`RestError::Auth`], whatever the number of waiters.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the session cannot be created or the login
    /// call fails. The half-built session is discarded so a later call can
    /// log in again.
    pub async fn ensure_authenticated(
        &self,
        ctx: &RestContext,
    ) -> Result<Arc<SessionState>, AuthError> {
        let client = self.http_client().clone();
        let settings = ctx.detached();
        ctx.session_or_establish(move || establish_session(client, settings).boxed())
            .await
    }
}

async fn establish_session(
    client: HttpClient,
    ctx: RestContext,
) -> Result<Arc<SessionState>, AuthError> {
    let outcome = log_in(&client, &ctx).await;
    if let Err(e) = &outcome {
        client.report(&RestError::Auth(e.clone()), None);
    }
    outcome
}

async fn log_in(client: &HttpClient, ctx: &RestContext) -> Result<Arc<SessionState>, AuthError> {
    let session = SessionState::new(ctx.strict_tls(), ctx.follow_redirects())
        .map_err(|e| AuthError::from(RestError::from(e)))?;

    let Some(credentials) = ctx.credentials() else {
        tracing::debug!("Created anonymous session for {}", ctx.base_url());
        return Ok(Arc::new(session));
    };

    tracing::debug!(
        "Logging in as '{}' on {}",
        credentials.username(),
        ctx.base_url()
    );
    let request = ApiRequest::builder(HttpMethod::Post, client.config().auth_path())
        .param("username", credentials.username())
        .param("password", credentials.password())
        .build()
        .map_err(|e| AuthError::from(RestError::from(e)))?;

    match client
        .dispatch(ctx, &session, request, &Default::default())
        .await
    {
        Ok(_) => {
            tracing::debug!("Logged in as '{}'", credentials.username());
            Ok(Arc::new(session))
        }
        Err(e) => {
            tracing::warn!(
                "Login as '{}' on {} failed: {}",
                credentials.username(),
                ctx.base_url(),
                e
            );
            Err(e.into())
        }
    }
}

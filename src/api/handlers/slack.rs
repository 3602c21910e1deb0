//! Slack slash-command endpoint
//!
//! Slack posts `application/x-www-form-urlencoded` payloads with `&`, `<` and
//! `>` in the text escaped as HTML entities; the reply is sent back in the same
//! HTTP response as an ephemeral Block Kit message.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Form, Json};
use serde::Deserialize;

use super::error_status;
use crate::slack::blocks::{render_message, unescape_mrkdwn, SlackMessage};
use crate::slack::{interpret_slash_command, CommandKind};
use crate::storage::users;
use crate::storage::Database;

/// Fields of a slash-command payload Dolt reads; the rest are ignored.
#[derive(Debug, Deserialize)]
pub struct SlashCommandPayload {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
    pub team_id: String,
}

/// POST /slack/commands
pub async fn slash_command(
    State(db): State<Arc<Database>>,
    Form(payload): Form<SlashCommandPayload>,
) -> Result<Json<SlackMessage>, StatusCode> {
    let kind = CommandKind::from_command_name(&payload.command).ok_or_else(|| {
        tracing::warn!(command = %payload.command, "unknown slash command");
        StatusCode::BAD_REQUEST
    })?;

    let user = users::get_user_by_slack_id(&db, &payload.user_id)
        .map_err(error_status)?
        .filter(|u| u.slack_team_id == payload.team_id)
        .ok_or_else(|| {
            tracing::warn!(
                slack_user = %payload.user_id,
                team = %payload.team_id,
                "slash command from unknown user"
            );
            StatusCode::UNAUTHORIZED
        })?;

    let text = unescape_mrkdwn(&payload.text);
    let descriptor = interpret_slash_command(&db, user.id, kind, &text);
    tracing::info!(
        user = user.id,
        %kind,
        outcome = ?descriptor.kind,
        "slash command acknowledged"
    );
    Ok(Json(render_message(&descriptor)))
}

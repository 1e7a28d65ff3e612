//! Handlers for the profile interactions.
//!
//! Each handler forwards the extracted [`SanitizedArgs`] to the profile's
//! [`ResourceController`].
//!
//! | Interaction | HTTP Request |
//! |-------------|--------------|
//! | search | `GET [base]/{Type}`, `POST [base]/{Type}/_search` |
//! | searchById | `GET [base]/{Type}/{id}` |
//! | searchByVersionId | `GET [base]/{Type}/{id}/_history/{vid}` |
//! | create | `POST [base]/{Type}` |
//! | update | `PUT [base]/{Type}/{id}` |
//! | remove | `DELETE [base]/{Type}/{id}` |
//! | history | `GET [base]/{Type}/_history` |
//! | historyById | `GET [base]/{Type}/{id}/_history` |

use std::sync::Arc;

use axum::{extract::State, response::Response};

use crate::controller::ResourceController;
use crate::error::RestResult;
use crate::extractors::SanitizedArgs;

type Controller = State<Arc<ResourceController>>;

/// Handler for type-level search.
pub async fn search_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.search(args).await
}

/// Handler for read.
pub async fn search_by_id_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.search_by_id(args).await
}

/// Handler for version read.
pub async fn search_by_version_id_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.search_by_version_id(args).await
}

/// Handler for create.
pub async fn create_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.create(args).await
}

/// Handler for update.
pub async fn update_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.update(args).await
}

/// Handler for delete.
pub async fn remove_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.remove(args).await
}

/// Handler for type-level history.
pub async fn history_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.history(args).await
}

/// Handler for instance-level history.
pub async fn history_by_id_handler(
    State(controller): Controller,
    args: SanitizedArgs,
) -> RestResult<Response> {
    controller.history_by_id(args).await
}
